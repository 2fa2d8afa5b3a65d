use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::error::{Error, Result};
use crate::markdown::image::canonical_image_url;

use super::blocks::{Block, ImageRef};

static PARAGRAPH_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".se-text-paragraph").unwrap());
static CAPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".se-caption").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static VIDEO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());

pub fn section_title_component(component: ElementRef) -> Block {
    Block::SectionTitle(element_text(component))
}

/// A text component expands to one paragraph per `.se-text-paragraph` child.
/// No paragraph children means no blocks at all.
pub fn text_component(component: ElementRef) -> Vec<Block> {
    component
        .select(&PARAGRAPH_SEL)
        .map(|paragraph| Block::Paragraph(element_text(paragraph)))
        .collect()
}

/// An image component holds exactly one `<img>` or exactly one `<video>`.
/// Anything else is a structural mismatch.
pub fn image_component(component: ElementRef) -> Result<Block> {
    let img = component.select(&IMG_SEL).next();
    let video = component.select(&VIDEO_SEL).next();

    let src = match (img, video) {
        (Some(img), None) => src_attr(img),
        (None, Some(video)) => src_attr(video),
        (Some(_), Some(_)) => {
            return Err(Error::StructuralMismatch(
                "image component contains both an image and a video".into(),
            ))
        }
        (None, None) => {
            return Err(Error::StructuralMismatch(
                "image component contains neither an image nor a video".into(),
            ))
        }
    };

    Ok(Block::Image(ImageRef {
        src,
        alt: caption_text(component),
    }))
}

/// An image group bundles every `<img>` child under one shared caption.
pub fn image_group_component(component: ElementRef) -> Block {
    let alt = caption_text(component);
    let images = component
        .select(&IMG_SEL)
        .map(|img| ImageRef {
            src: src_attr(img),
            alt: alt.clone(),
        })
        .collect();
    Block::ImageGroup(images)
}

fn src_attr(element: ElementRef) -> String {
    canonical_image_url(element.value().attr("src").unwrap_or_default())
}

fn caption_text(component: ElementRef) -> String {
    component
        .select(&CAPTION_SEL)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

pub(super) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
