use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a component in the forest: the child index at every depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Iterate over the strict ancestors of this path, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = NodePath> + '_ {
        (1..self.0.len())
            .rev()
            .map(|len| NodePath(self.0[..len].to_vec()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Stable identifier of one rendered parameter instance.
///
/// Derived from the parameter name followed by the repeat index of every
/// repeated ancestor and, when the parameter repeats, its own index:
/// `temperature`, `temperature-0`, `temperature-1-0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(name: &str, repeat_indices: &[u32]) -> Self {
        let mut id = name.trim().to_string();
        for index in repeat_indices {
            id.push('-');
            id.push_str(&index.to_string());
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_appends_repeat_indices() {
        assert_eq!(FieldId::new("temp", &[]).as_str(), "temp");
        assert_eq!(FieldId::new(" temp ", &[1, 0]).as_str(), "temp-1-0");
    }

    #[test]
    fn node_path_ancestors_nearest_first() {
        let path = NodePath::from(vec![2, 0, 3]);
        let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["2.0", "2"]);
        assert_eq!(path.parent(), Some(NodePath::from(vec![2, 0])));
        assert_eq!(NodePath::root(4).parent(), None);
    }
}
