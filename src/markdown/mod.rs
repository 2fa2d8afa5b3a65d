pub mod image;
pub mod render;

pub use image::{canonical_image_url, ImageContext, ImageResolver};
pub use render::{render, RenderContext};
