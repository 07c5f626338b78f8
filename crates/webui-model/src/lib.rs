//! Form description model: the component tree, datatypes, repeat bounds,
//! access levels, the identifiers used to address rendered fields and
//! depth-first traversal of the tree.

#![deny(unsafe_code)]

pub mod component;
pub mod error;
pub mod ids;
pub mod level;
pub mod walk;

pub use component::{
    Component, Datatype, MAX_REPEAT_MIN, Paragraph, Parameter, RepeatBounds, RepeatMax, Section,
    forest_from_value, parse_forest,
};
pub use error::{ModelError, Result};
pub use ids::{FieldId, NodePath};
pub use level::{AccessLevel, Level, LevelCatalog, LevelName, LevelSet};
pub use walk::{Walk, count, find, walk};
