//! Server-side rendering: markup trees, style groups, page contracts, and
//! the render pipeline.

pub mod markup;
pub mod page;
pub mod pipeline;
pub mod styles;

pub use markup::{Chunks, Markup};
pub use page::{Data, DataLoader, Page, PageEntry, Params, Shell};
pub use pipeline::{RenderError, SsrResult, render_path};
pub use styles::{StyleGroup, StyleSheet};
