//! Markup rendering, access level engine and markup cache for form
//! component trees.

#![deny(unsafe_code)]

pub mod cache;
pub mod error;
pub mod markup;
pub mod render;
pub mod session;

pub use cache::{CachedMarkup, CachedRender, FileCache, MarkupCache, MemoryCache, render_cached};
pub use error::{CacheError, MarkupError, RenderError, SessionError};
pub use markup::{Element, Markup};
pub use render::{FieldSpec, Fragment, RenderIter, RenderOptions, RenderOutput, Renderer};
pub use session::{ConfirmPrompt, FormSession, Transition, Visibility};
pub use webui_model::{Walk, count, find, walk};
