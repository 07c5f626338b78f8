//! Access level engine and per-form editing state.
//!
//! A [`FormSession`] holds the selected level, the user's permitted
//! maximum, per-node visibility decisions and field values. The "form has
//! changed" flag guards level downgrades.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use webui_model::{Component, FieldId, Level, LevelCatalog, NodePath, walk};

use crate::error::SessionError;
use crate::markup::{Element, Markup};
use crate::render::FieldSpec;

/// Message shown before a downgrade that may discard edits.
pub const DOWNGRADE_WARNING: &str = "Switching to a lower level disables fields you may have \
     edited. Their values will not be submitted. Continue?";

/// Asked before a level downgrade while the form has unsaved edits.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Result of a level change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target equals the current level and the change was not forced.
    Unchanged,
    /// The confirmation prompt was declined; nothing changed.
    Declined,
    Applied {
        level: Level,
        /// The level exceeds the user's maximum; submission is blocked.
        too_high: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub visible: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
struct FieldState {
    path: NodePath,
    default: String,
    value: String,
    modified: bool,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    forest: Vec<Component>,
    catalog: LevelCatalog,
    current: Level,
    user_max: Level,
    form_has_changed: bool,
    visibility: BTreeMap<NodePath, Visibility>,
    fields: BTreeMap<FieldId, FieldState>,
}

impl FormSession {
    /// Start a session at the lowest level with every level permitted.
    pub fn new(forest: Vec<Component>, catalog: LevelCatalog, fields: &[FieldSpec]) -> Self {
        let current = catalog.lowest();
        let user_max = catalog.highest();
        let fields = fields
            .iter()
            .map(|spec| {
                (
                    spec.id.clone(),
                    FieldState {
                        path: spec.path.clone(),
                        default: spec.default.clone(),
                        value: spec.default.clone(),
                        modified: false,
                    },
                )
            })
            .collect();
        let mut session = Self {
            forest,
            catalog,
            current,
            user_max,
            form_has_changed: false,
            visibility: BTreeMap::new(),
            fields,
        };
        session.apply(current);
        session
    }

    /// Set the highest level the user is permitted to submit at.
    #[must_use]
    pub fn with_user_max(mut self, level: Level) -> Self {
        self.user_max = level;
        self
    }

    /// Move to the configured default level without prompting.
    #[must_use]
    pub fn with_initial_level(mut self, level: Level) -> Self {
        self.apply(level);
        self
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn current_level(&self) -> Level {
        self.current
    }

    pub fn user_max(&self) -> Level {
        self.user_max
    }

    pub fn form_has_changed(&self) -> bool {
        self.form_has_changed
    }

    /// Submission is blocked while the selected level is above the user's maximum.
    pub fn submission_blocked(&self) -> bool {
        self.current > self.user_max
    }

    pub fn set_level_by_name(
        &mut self,
        name: &str,
        force: bool,
        prompt: &mut impl ConfirmPrompt,
    ) -> Result<Transition, SessionError> {
        let target = self
            .catalog
            .find(name)
            .ok_or_else(|| SessionError::UnknownLevel(name.to_string()))?;
        self.set_level(target, force, prompt)
    }

    pub fn set_level(
        &mut self,
        target: Level,
        force: bool,
        prompt: &mut impl ConfirmPrompt,
    ) -> Result<Transition, SessionError> {
        if self.catalog.get(target).is_none() {
            return Err(SessionError::UnknownLevel(target.index().to_string()));
        }
        if target == self.current && !force {
            return Ok(Transition::Unchanged);
        }
        if target < self.current && self.form_has_changed && !prompt.confirm(DOWNGRADE_WARNING) {
            info!(
                current = %self.level_name(self.current),
                target = %self.level_name(target),
                "level downgrade declined"
            );
            return Ok(Transition::Declined);
        }

        self.apply(target);
        let too_high = self.submission_blocked();
        if too_high {
            warn!(
                level = %self.level_name(target),
                max = %self.level_name(self.user_max),
                "selected level exceeds the permitted maximum; submission is blocked"
            );
        }
        info!(level = %self.level_name(target), too_high, "level changed");
        Ok(Transition::Applied {
            level: target,
            too_high,
        })
    }

    fn apply(&mut self, target: Level) {
        let Some(name) = self.catalog.name(target).cloned() else {
            return;
        };
        self.visibility = walk(&self.forest)
            .map(|(path, component)| {
                let visible = component.visible_at(&name);
                (
                    path,
                    Visibility {
                        visible,
                        enabled: visible,
                    },
                )
            })
            .collect();
        self.current = target;
        self.form_has_changed = false;
        debug!(level = %name, nodes = self.visibility.len(), "visibility applied");
    }

    fn level_name(&self, level: Level) -> String {
        self.catalog
            .name(level)
            .map(ToString::to_string)
            .unwrap_or_else(|| level.index().to_string())
    }

    pub fn visibility(&self, path: &NodePath) -> Option<Visibility> {
        self.visibility.get(path).copied()
    }

    /// The node's own decision, ignoring its ancestors.
    pub fn is_visible(&self, path: &NodePath) -> bool {
        self.visibility(path).is_some_and(|v| v.visible)
    }

    pub fn is_enabled(&self, path: &NodePath) -> bool {
        self.visibility(path).is_some_and(|v| v.enabled)
    }

    /// Visible and inside visible ancestors only.
    pub fn is_effectively_visible(&self, path: &NodePath) -> bool {
        self.is_visible(path) && path.ancestors().all(|ancestor| self.is_visible(&ancestor))
    }

    pub fn value(&self, field: &FieldId) -> Option<&str> {
        self.fields.get(field).map(|state| state.value.as_str())
    }

    pub fn is_modified(&self, field: &FieldId) -> bool {
        self.fields.get(field).is_some_and(|state| state.modified)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.keys()
    }

    /// Record a user edit of a field.
    pub fn edit(&mut self, field: &FieldId, value: impl Into<String>) -> Result<(), SessionError> {
        let path = self
            .fields
            .get(field)
            .map(|state| state.path.clone())
            .ok_or_else(|| SessionError::UnknownField(field.to_string()))?;
        let enabled =
            self.is_enabled(&path) && path.ancestors().all(|ancestor| self.is_enabled(&ancestor));
        if !enabled {
            return Err(SessionError::FieldDisabled(field.to_string()));
        }
        if let Some(state) = self.fields.get_mut(field) {
            state.value = value.into();
            state.modified = true;
        }
        self.form_has_changed = true;
        Ok(())
    }

    /// Restore a field to its declared default and clear its modified flag.
    pub fn reset_input(&mut self, field: &FieldId) -> Result<(), SessionError> {
        let state = self
            .fields
            .get_mut(field)
            .ok_or_else(|| SessionError::UnknownField(field.to_string()))?;
        state.value = state.default.clone();
        state.modified = false;
        Ok(())
    }

    /// Mark hidden nodes in rendered markup.
    ///
    /// Elements whose `data-path` names a hidden node get the `disabled`
    /// class (and the `hidden` attribute when `hide` is set); every form
    /// control below them is disabled.
    pub fn apply_to_markup(&self, fragments: &mut [Markup], hide: bool) {
        for fragment in fragments {
            if let Markup::Element(element) = fragment {
                self.mark(element, false, hide);
            }
        }
    }

    fn mark(&self, element: &mut Element, inherited: bool, hide: bool) {
        let mut disabled = inherited;
        if let Some(path) = element.get_attr("data-path").and_then(parse_path)
            && !self.is_enabled(&path)
        {
            disabled = true;
            element.add_class("disabled");
            if hide {
                element.set_attr("hidden", "hidden");
            }
        }
        if disabled && matches!(element.tag.as_str(), "input" | "select" | "textarea") {
            element.set_attr("disabled", "disabled");
        }
        for child in &mut element.children {
            if let Markup::Element(child) = child {
                self.mark(child, disabled, hide);
            }
        }
    }
}

fn parse_path(text: &str) -> Option<NodePath> {
    text.split('.')
        .map(|part| part.parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()
        .map(NodePath::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_round_trips_display() {
        let path = NodePath::from(vec![3, 0, 12]);
        assert_eq!(parse_path(&path.to_string()), Some(path));
        assert_eq!(parse_path("1.x"), None);
    }

    #[test]
    fn closures_are_prompts() {
        let mut asked = 0;
        let mut prompt = |_: &str| {
            asked += 1;
            false
        };
        assert!(!prompt.confirm("?"));
        assert_eq!(asked, 1);
    }
}
