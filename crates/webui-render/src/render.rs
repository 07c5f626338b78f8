//! Component tree to markup.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use webui_model::{
    Component, Datatype, FieldId, LevelName, LevelSet, NodePath, Parameter, RepeatBounds,
    RepeatMax, Section,
};

use crate::error::{MarkupError, RenderError};
use crate::markup::{Element, Markup, to_html};

/// Validation pattern attached to integer inputs.
pub const INTEGER_PATTERN: &str = "[-+]?[0-9]+";
/// Validation pattern attached to float inputs.
pub const FLOAT_PATTERN: &str = r"[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?";

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Render a choice with at most this many options as a radio group
    /// instead of a dropdown. `None` always uses a dropdown.
    pub radio_max: Option<usize>,
}

/// One rendered parameter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub id: FieldId,
    pub path: NodePath,
    pub name: String,
    pub datatype: String,
    pub default: String,
    pub access_levels: Option<Vec<String>>,
}

/// Output of rendering one top-level component.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub path: NodePath,
    /// `None` when the component was skipped.
    pub markup: Option<Markup>,
    pub fields: Vec<FieldSpec>,
    pub notices: Vec<RenderError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub fragments: Vec<Markup>,
    pub fields: Vec<FieldSpec>,
    pub notices: Vec<RenderError>,
}

impl RenderOutput {
    pub fn to_html(&self) -> Result<String, MarkupError> {
        to_html(&self.fragments)
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id.as_str() == id)
    }
}

/// Only the first field with a given id is kept; later ones become notices.
impl FromIterator<Fragment> for RenderOutput {
    fn from_iter<T: IntoIterator<Item = Fragment>>(iter: T) -> Self {
        let mut output = RenderOutput::default();
        let mut seen = BTreeSet::new();
        for fragment in iter {
            output.fragments.extend(fragment.markup);
            output.notices.extend(fragment.notices);
            for field in fragment.fields {
                if seen.insert(field.id.clone()) {
                    output.fields.push(field);
                    continue;
                }
                let error = RenderError::DuplicateFieldId {
                    path: field.path,
                    id: field.id.to_string(),
                };
                warn!(%error, "field not tracked");
                output.notices.push(error);
            }
        }
        output
    }
}

#[derive(Default)]
struct Collector {
    fields: Vec<FieldSpec>,
    notices: Vec<RenderError>,
}

impl Collector {
    fn notice(&mut self, error: RenderError) {
        warn!(%error, "skipping component");
        self.notices.push(error);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the whole forest.
    pub fn render(&self, forest: &[Component]) -> RenderOutput {
        let output: RenderOutput = self.render_iter(forest).collect();
        debug!(
            fragments = output.fragments.len(),
            fields = output.fields.len(),
            notices = output.notices.len(),
            "render complete"
        );
        output
    }

    /// Lazily render one top-level component per step. Cloning the
    /// iterator restarts from the same position.
    pub fn render_iter<'a>(&'a self, forest: &'a [Component]) -> RenderIter<'a> {
        RenderIter {
            renderer: self,
            forest,
            next: 0,
        }
    }

    /// Append one instance to a repeated component.
    pub fn add_instance(&self, path: &NodePath) -> Result<Markup, RenderError> {
        unimplemented_operation("add instance", path)
    }

    /// Remove one instance from a repeated component.
    pub fn remove_instance(&self, path: &NodePath, _instance: u32) -> Result<(), RenderError> {
        unimplemented_operation("remove instance", path)
    }

    fn render_node(
        &self,
        component: &Component,
        path: &NodePath,
        repeat_indices: &[u32],
        out: &mut Collector,
    ) -> Option<Markup> {
        match component {
            Component::Unknown { kind } => {
                out.notice(RenderError::UnknownComponentType {
                    path: path.clone(),
                    kind: kind.clone(),
                });
                None
            }
            Component::Paragraph(paragraph) => Some(
                Element::new("p")
                    .class("paragraph")
                    .attr("data-path", path.to_string())
                    .text(paragraph.text.as_str())
                    .into(),
            ),
            Component::Section(section) => {
                let element = self.repeated(
                    "section",
                    section.repeat,
                    path,
                    repeat_indices,
                    |indices, out| self.section_instance(section, path, indices, out),
                    &section.label,
                    out,
                );
                Some(gate(element, section.access_levels.as_ref()).into())
            }
            Component::Parameter(parameter) => {
                if let Datatype::Unknown(datatype) = &parameter.datatype {
                    out.notice(RenderError::UnknownDatatype {
                        path: path.clone(),
                        name: parameter.name.clone(),
                        datatype: datatype.clone(),
                    });
                    return None;
                }
                let element = self.repeated(
                    "parameter",
                    parameter.repeat,
                    path,
                    repeat_indices,
                    |indices, out| self.parameter_instance(parameter, path, indices, out),
                    parameter.display_label(),
                    out,
                );
                Some(gate(element, parameter.access_levels.as_ref()).into())
            }
        }
    }

    /// Render `repeat.min` instances of a repeatable component inside a
    /// container, or a disabled placeholder when the minimum is zero.
    #[allow(clippy::too_many_arguments)]
    fn repeated<F>(
        &self,
        kind: &str,
        repeat: RepeatBounds,
        path: &NodePath,
        repeat_indices: &[u32],
        mut instance: F,
        label: &str,
        out: &mut Collector,
    ) -> Element
    where
        F: FnMut(&[u32], &mut Collector) -> Element,
    {
        if !repeat.is_repeatable() {
            return instance(repeat_indices, out).attr("data-path", path.to_string());
        }

        let max = match repeat.max {
            RepeatMax::Bounded(max) => max.to_string(),
            RepeatMax::Unbounded => "unbounded".to_string(),
        };
        let mut container = Element::new("div")
            .class("repeat")
            .class(kind)
            .attr("data-path", path.to_string())
            .attr("data-repeat-min", repeat.min.to_string())
            .attr("data-repeat-max", max);

        if repeat.min == 0 {
            container = container.child(
                Element::new("div")
                    .class("placeholder")
                    .class("disabled")
                    .attr("aria-disabled", "true")
                    .text(label),
            );
            return container;
        }

        let mut indices = repeat_indices.to_vec();
        indices.push(0);
        for idx in 0..repeat.min {
            if let Some(last) = indices.last_mut() {
                *last = idx;
            }
            let element = instance(&indices, out)
                .class("instance")
                .attr("data-instance", idx.to_string());
            container = container.child(element);
        }
        container
    }

    fn section_instance(
        &self,
        section: &Section,
        path: &NodePath,
        repeat_indices: &[u32],
        out: &mut Collector,
    ) -> Element {
        let mut fieldset = Element::new("fieldset").class("section");
        if !section.label.is_empty() {
            fieldset = fieldset.child(Element::new("legend").text(section.label.as_str()));
        }
        for (idx, child) in section.children.iter().enumerate() {
            if let Some(markup) = self.render_node(child, &path.child(idx), repeat_indices, out) {
                fieldset = fieldset.child(markup);
            }
        }
        fieldset
    }

    fn parameter_instance(
        &self,
        parameter: &Parameter,
        path: &NodePath,
        repeat_indices: &[u32],
        out: &mut Collector,
    ) -> Element {
        let id = FieldId::new(&parameter.name, repeat_indices);
        out.fields.push(FieldSpec {
            id: id.clone(),
            path: path.clone(),
            name: parameter.name.clone(),
            datatype: parameter.datatype.to_string(),
            default: parameter.default.clone(),
            access_levels: parameter
                .access_levels
                .as_ref()
                .map(|levels| levels.iter().map(ToString::to_string).collect()),
        });

        Element::new("div")
            .class("parameter")
            .class(&format!("datatype-{}", parameter.datatype))
            .child(
                Element::new("label")
                    .attr("for", id.as_str())
                    .text(parameter.display_label()),
            )
            .child(self.control(parameter, &id))
    }

    fn control(&self, parameter: &Parameter, id: &FieldId) -> Element {
        match &parameter.datatype {
            Datatype::Choice => {
                let use_radio = self
                    .options
                    .radio_max
                    .is_some_and(|max| parameter.options.len() <= max);
                if use_radio {
                    radio_group(parameter, id)
                } else {
                    select(parameter, id)
                }
            }
            Datatype::Integer => text_input(parameter, id).attr("pattern", INTEGER_PATTERN),
            Datatype::Float => text_input(parameter, id).attr("pattern", FLOAT_PATTERN),
            Datatype::File => Element::void("input")
                .attr("type", "file")
                .attr("id", id.as_str())
                .attr("name", id.as_str()),
            // Unknown datatypes are filtered out before instances are built.
            Datatype::String | Datatype::Unknown(_) => text_input(parameter, id),
        }
    }
}

fn unimplemented_operation<T>(operation: &'static str, path: &NodePath) -> Result<T, RenderError> {
    let error = RenderError::UnimplementedOperation {
        operation,
        path: path.clone(),
    };
    warn!(%error, "repeat instance change rejected");
    Err(error)
}

fn text_input(parameter: &Parameter, id: &FieldId) -> Element {
    Element::void("input")
        .attr("type", "text")
        .attr("id", id.as_str())
        .attr("name", id.as_str())
        .attr("value", parameter.default.as_str())
        .attr("data-default", parameter.default.as_str())
}

fn select(parameter: &Parameter, id: &FieldId) -> Element {
    let options = parameter.options.iter().map(|option| {
        let mut element = Element::new("option").attr("value", option.as_str());
        if *option == parameter.default {
            element = element.flag("selected");
        }
        Markup::from(element.text(option.as_str()))
    });
    Element::new("select")
        .attr("id", id.as_str())
        .attr("name", id.as_str())
        .attr("data-default", parameter.default.as_str())
        .children(options)
}

fn radio_group(parameter: &Parameter, id: &FieldId) -> Element {
    let buttons = parameter.options.iter().enumerate().map(|(idx, option)| {
        let mut input = Element::void("input")
            .attr("type", "radio")
            .attr("id", format!("{id}-option-{idx}"))
            .attr("name", id.as_str())
            .attr("value", option.as_str());
        if *option == parameter.default {
            input = input.flag("checked");
        }
        Markup::from(Element::new("label").child(input).text(option.as_str()))
    });
    Element::new("span")
        .class("radio-group")
        .attr("id", id.as_str())
        .attr("data-default", parameter.default.as_str())
        .children(buttons)
}

/// Tag an element with the access levels gating it.
fn gate(mut element: Element, levels: Option<&LevelSet>) -> Element {
    let Some(levels) = levels.filter(|levels| !levels.is_empty()) else {
        return element;
    };
    for level in levels.iter() {
        element.add_class(&format!("level-{level}"));
    }
    let names: Vec<&str> = levels.iter().map(LevelName::as_str).collect();
    element.set_attr("data-accesslevels", names.join(" "));
    element
}

/// Lazy, restartable render sequence.
#[derive(Clone)]
pub struct RenderIter<'a> {
    renderer: &'a Renderer,
    forest: &'a [Component],
    next: usize,
}

impl Iterator for RenderIter<'_> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Self::Item> {
        let component = self.forest.get(self.next)?;
        let path = NodePath::root(self.next);
        self.next += 1;

        let mut out = Collector::default();
        let markup = self.renderer.render_node(component, &path, &[], &mut out);
        debug!(%path, kind = component.kind(), "rendered component");
        Some(Fragment {
            path,
            markup,
            fields: out.fields,
            notices: out.notices,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.forest.len() - self.next;
        (remaining, Some(remaining))
    }
}
