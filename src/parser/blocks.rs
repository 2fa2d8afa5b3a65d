/// One image reference: canonical source URL plus caption text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

impl ImageRef {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        ImageRef {
            src: src.into(),
            alt: alt.into(),
        }
    }
}

/// Parsed content IR. Produced once by the parser, consumed by the renderer;
/// plain values with no identity beyond their content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    SectionTitle(String),
    Paragraph(String),
    Image(ImageRef),
    /// Images sharing one caption, rendered inline together.
    ImageGroup(Vec<ImageRef>),
}

/// First image of the post: the first `Image` block, or the first entry of
/// the first non-empty `ImageGroup`, whichever comes earlier.
pub fn first_image(blocks: &[Block]) -> Option<ImageRef> {
    blocks.iter().find_map(|block| match block {
        Block::Image(image) => Some(image.clone()),
        Block::ImageGroup(images) => images.first().cloned(),
        _ => None,
    })
}
