//! Naver blog posts as Markdown documents.
//!
//! Pipeline: rendered post HTML → component parser → block IR → Markdown
//! renderer, with a pluggable image strategy (pass-through, CDN rewrite, or
//! fetch-and-localize) applied to every embedded image reference.

pub mod error;
pub mod fetch;
pub mod list;
pub mod markdown;
pub mod metadata;
pub mod parser;
pub mod post;

pub use error::{Error, Result};
pub use markdown::{render, ImageContext, RenderContext};
pub use metadata::FrontMatter;
pub use parser::{Block, ImageRef};
pub use post::Post;
