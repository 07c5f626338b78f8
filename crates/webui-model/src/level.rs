//! Access levels.
//!
//! A form declares an ordered list of access levels (for example
//! `easy < expert < guru`). Components reference levels by name; the
//! catalog turns a name into an ordinal [`Level`] that can be compared.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Name of an access level as it appears in the model files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelName(String);

impl LevelName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(ModelError::InvalidLevelName(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LevelName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LevelName> for String {
    fn from(value: LevelName) -> Self {
        value.0
    }
}

impl fmt::Display for LevelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordinal position of a level inside a [`LevelCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Level(pub usize);

impl Level {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Set of level names gating a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSet(BTreeSet<LevelName>);

impl LevelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: LevelName) -> bool {
        self.0.insert(name)
    }

    pub fn contains(&self, name: &LevelName) -> bool {
        self.0.contains(name)
    }

    pub fn contains_str(&self, name: &str) -> bool {
        self.0.iter().any(|level| level.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<LevelName> for LevelSet {
    fn from_iter<T: IntoIterator<Item = LevelName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(LevelName::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

/// One entry of the access level file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLevel {
    pub name: LevelName,
    #[serde(default)]
    pub label: Option<String>,
}

impl AccessLevel {
    pub fn new(name: LevelName) -> Self {
        Self { name, label: None }
    }

    /// Display label, falling back to the level name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.name.as_str())
    }
}

/// Ordered list of access levels, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AccessLevel>", into = "Vec<AccessLevel>")]
pub struct LevelCatalog {
    levels: Vec<AccessLevel>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<AccessLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ModelError::EmptyCatalog);
        }
        let mut seen = BTreeSet::new();
        for level in &levels {
            if !seen.insert(level.name.as_str()) {
                return Err(ModelError::DuplicateLevel(level.name.to_string()));
            }
        }
        Ok(Self { levels })
    }

    /// Build a catalog from bare names, in order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels = names
            .into_iter()
            .map(|name| LevelName::new(name).map(AccessLevel::new))
            .collect::<Result<Vec<_>>>()?;
        Self::new(levels)
    }

    pub fn find(&self, name: &str) -> Option<Level> {
        self.levels
            .iter()
            .position(|level| level.name.as_str() == name)
            .map(Level)
    }

    pub fn get(&self, level: Level) -> Option<&AccessLevel> {
        self.levels.get(level.0)
    }

    pub fn name(&self, level: Level) -> Option<&LevelName> {
        self.get(level).map(|entry| &entry.name)
    }

    pub fn lowest(&self) -> Level {
        Level(0)
    }

    pub fn highest(&self) -> Level {
        Level(self.levels.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &AccessLevel)> {
        self.levels
            .iter()
            .enumerate()
            .map(|(idx, level)| (Level(idx), level))
    }
}

impl TryFrom<Vec<AccessLevel>> for LevelCatalog {
    type Error = ModelError;

    fn try_from(levels: Vec<AccessLevel>) -> Result<Self> {
        Self::new(levels)
    }
}

impl From<LevelCatalog> for Vec<AccessLevel> {
    fn from(catalog: LevelCatalog) -> Self {
        catalog.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_name_rejects_blank() {
        assert!(LevelName::new("  ").is_err());
        assert!(LevelName::new("two words").is_err());
        assert_eq!(LevelName::new(" easy ").unwrap().as_str(), "easy");
    }

    #[test]
    fn catalog_orders_levels() {
        let catalog = LevelCatalog::from_names(["easy", "expert", "guru"]).unwrap();
        let easy = catalog.find("easy").unwrap();
        let guru = catalog.find("guru").unwrap();
        assert!(easy < guru);
        assert_eq!(catalog.highest(), guru);
        assert_eq!(catalog.find("admin"), None);
    }

    #[test]
    fn catalog_rejects_duplicates() {
        let err = LevelCatalog::from_names(["easy", "easy"]).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateLevel(name) if name == "easy"));
    }

    #[test]
    fn catalog_deserializes_from_level_file() {
        let json = r#"[{"name": "easy", "label": "Easy"}, {"name": "expert"}]"#;
        let catalog: LevelCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let (_, easy) = catalog.iter().next().unwrap();
        assert_eq!(easy.display_label(), "Easy");
        assert_eq!(catalog.get(Level(1)).unwrap().display_label(), "expert");
    }
}
