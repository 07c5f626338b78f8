//! Typed markup fragments.
//!
//! The renderer builds a tree of [`Markup`] nodes and only turns it into
//! text at the end, through the `quick-xml` event writer.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::MarkupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Markup>,
    /// Written as a self-closing tag (`<input/>`).
    pub void: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            void: false,
        }
    }

    pub fn void(tag: impl Into<String>) -> Self {
        Self {
            void: true,
            ..Self::new(tag)
        }
    }

    /// Set an attribute, replacing an existing value.
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Boolean attribute such as `disabled` or `selected`.
    #[must_use]
    pub fn flag(self, name: &str) -> Self {
        self.attr(name, name)
    }

    /// Append a class to the `class` attribute.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let merged = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr("class", merged);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text(text.into()))
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

impl Markup {
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Markup::Element(element) => Some(element),
            Markup::Text(_) => None,
        }
    }

    /// All elements in this fragment, pre-order, including the root.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(self, &mut out);
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.elements()
            .into_iter()
            .find(|element| element.get_attr("id") == Some(id))
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        match self {
            Markup::Text(text) => text.clone(),
            Markup::Element(element) => element.children.iter().map(Markup::text_content).collect(),
        }
    }

    pub fn to_html(&self) -> Result<String, MarkupError> {
        to_html(std::slice::from_ref(self))
    }
}

fn collect_elements<'a>(markup: &'a Markup, out: &mut Vec<&'a Element>) {
    if let Markup::Element(element) = markup {
        out.push(element);
        for child in &element.children {
            collect_elements(child, out);
        }
    }
}

/// Serialize a sequence of fragments.
pub fn to_html(fragments: &[Markup]) -> Result<String, MarkupError> {
    let mut writer = Writer::new(Vec::new());
    for fragment in fragments {
        write_markup(&mut writer, fragment)?;
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_markup<W: Write>(writer: &mut Writer<W>, markup: &Markup) -> Result<(), MarkupError> {
    match markup {
        Markup::Text(text) => write_event(writer, Event::Text(BytesText::new(text))),
        Markup::Element(element) => {
            let mut start = BytesStart::new(element.tag.as_str());
            for (name, value) in &element.attrs {
                start.push_attribute((name.as_str(), value.as_str()));
            }
            if element.void {
                return write_event(writer, Event::Empty(start));
            }
            write_event(writer, Event::Start(start))?;
            for child in &element.children {
                write_markup(writer, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(element.tag.as_str())))
        }
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), MarkupError> {
    writer
        .write_event(event)
        .map_err(|e| MarkupError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_elements() {
        let markup: Markup = Element::new("fieldset")
            .class("section")
            .child(Element::new("legend").text("General"))
            .child(Element::new("p").text("Hello"))
            .into();
        insta::assert_snapshot!(
            markup.to_html().unwrap(),
            @r#"<fieldset class="section"><legend>General</legend><p>Hello</p></fieldset>"#
        );
    }

    #[test]
    fn escapes_text() {
        let html = Markup::from(Element::new("p").text("a < b & c")).to_html().unwrap();
        assert!(html.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn empty_non_void_element_keeps_end_tag() {
        let html = Markup::from(Element::new("select")).to_html().unwrap();
        assert_eq!(html, "<select></select>");
    }

    #[test]
    fn classes_are_merged_once() {
        let element = Element::new("div").class("a").class("b").class("a");
        assert_eq!(element.get_attr("class"), Some("a b"));
        assert!(element.has_class("b"));
    }

    #[test]
    fn find_by_id_searches_descendants() {
        let markup: Markup = Element::new("div")
            .child(Element::void("input").attr("id", "x"))
            .into();
        assert!(markup.find_by_id("x").unwrap().void);
        assert!(markup.find_by_id("y").is_none());
    }
}
