//! Depth-first traversal of a component forest.
//!
//! The walk is driven by an explicit work stack so that a host can process
//! one node at a time and yield in between. Order is pre-order, children
//! left to right.

use crate::component::Component;
use crate::ids::NodePath;

/// Pre-order iterator over `(path, component)` pairs.
pub struct Walk<'a> {
    stack: Vec<(NodePath, &'a Component)>,
}

impl<'a> Walk<'a> {
    pub fn new(forest: &'a [Component]) -> Self {
        let stack = forest
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, component)| (NodePath::root(idx), component))
            .collect();
        Self { stack }
    }

    /// Number of work items still queued.
    pub fn pending(&self) -> usize {
        self.stack.len()
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodePath, &'a Component);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, component) = self.stack.pop()?;
        for (idx, child) in component.children().iter().enumerate().rev() {
            self.stack.push((path.child(idx), child));
        }
        Some((path, component))
    }
}

pub fn walk(forest: &[Component]) -> Walk<'_> {
    Walk::new(forest)
}

/// Total number of nodes. A section counts as one plus its subtree.
pub fn count(forest: &[Component]) -> usize {
    walk(forest).count()
}

/// Look up a component by path.
pub fn find<'a>(forest: &'a [Component], path: &NodePath) -> Option<&'a Component> {
    let (first, rest) = path.indices().split_first()?;
    let mut node = forest.get(*first)?;
    for idx in rest {
        node = node.children().get(*idx)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Paragraph, RepeatBounds, Section};

    fn paragraph(text: &str) -> Component {
        Component::Paragraph(Paragraph {
            text: text.to_string(),
        })
    }

    fn section(children: Vec<Component>) -> Component {
        Component::Section(Section {
            label: String::new(),
            children,
            repeat: RepeatBounds::single(),
            access_levels: None,
        })
    }

    #[test]
    fn empty_forest_counts_zero() {
        assert_eq!(count(&[]), 0);
    }

    #[test]
    fn empty_section_counts_one() {
        assert_eq!(count(&[section(vec![])]), 1);
    }

    #[test]
    fn walk_is_pre_order() {
        let forest = vec![
            section(vec![paragraph("a"), section(vec![paragraph("b")])]),
            paragraph("c"),
        ];
        let paths: Vec<String> = walk(&forest).map(|(path, _)| path.to_string()).collect();
        assert_eq!(paths, vec!["0", "0.0", "0.1", "0.1.0", "1"]);
        assert_eq!(count(&forest), 5);
    }

    #[test]
    fn find_resolves_nested_paths() {
        let forest = vec![section(vec![paragraph("a"), paragraph("b")])];
        let found = find(&forest, &NodePath::from(vec![0, 1]));
        assert_eq!(found, Some(&paragraph("b")));
        assert_eq!(find(&forest, &NodePath::from(vec![0, 5])), None);
        assert_eq!(find(&forest, &NodePath::default()), None);
    }
}
