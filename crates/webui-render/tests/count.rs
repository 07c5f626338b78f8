//! Node counting over generated forests.

use proptest::prelude::*;
use webui_model::{Component, Paragraph, RepeatBounds, Section};
use webui_render::{count, walk};

fn leaf() -> impl Strategy<Value = Component> {
    "[a-z]{0,8}".prop_map(|text| Component::Paragraph(Paragraph { text }))
}

fn component() -> impl Strategy<Value = Component> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(|children| {
            Component::Section(Section {
                label: "s".to_string(),
                children,
                repeat: RepeatBounds::single(),
                access_levels: None,
            })
        })
    })
}

fn recursive_count(forest: &[Component]) -> usize {
    forest
        .iter()
        .map(|component| 1 + recursive_count(component.children()))
        .sum()
}

#[test]
fn empty_forest_counts_zero() {
    assert_eq!(count(&[]), 0);
}

proptest! {
    #[test]
    fn count_matches_recursive_definition(forest in prop::collection::vec(component(), 0..6)) {
        prop_assert_eq!(count(&forest), recursive_count(&forest));
    }

    #[test]
    fn walk_visits_children_after_parent(forest in prop::collection::vec(component(), 0..6)) {
        let paths: Vec<_> = walk(&forest).map(|(path, _)| path).collect();
        for (position, path) in paths.iter().enumerate() {
            if let Some(parent) = path.parent() {
                let parent_position = paths.iter().position(|p| *p == parent).unwrap();
                prop_assert!(parent_position < position);
            }
        }
    }
}
