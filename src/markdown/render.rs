use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::Result;
use crate::metadata::FrontMatter;
use crate::parser::{Block, ImageRef};

use super::image::{ImageContext, ImageResolver};

/// Immutable render configuration, constructed once per render call through
/// one of the factory functions and shared by reference across workers.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub image: ImageContext,
    pub num_workers: usize,
}

impl RenderContext {
    pub fn new(image: ImageContext, num_workers: usize) -> Self {
        RenderContext {
            image,
            num_workers: num_workers.max(1),
        }
    }

    /// Pass image URLs through unchanged.
    pub fn with_default(num_workers: usize) -> Self {
        Self::new(ImageContext::Default, num_workers)
    }

    /// Rewrite image URLs to their canonical CDN form.
    pub fn with_images_from_cdn(num_workers: usize) -> Self {
        Self::new(ImageContext::Cdn, num_workers)
    }

    /// Download images into `assets_directory` and embed
    /// `{image_src_prefix}{filename}` references.
    pub fn with_fetched_local_images(
        assets_directory: impl Into<PathBuf>,
        image_src_prefix: impl Into<String>,
        num_workers: usize,
    ) -> Self {
        Self::new(
            ImageContext::Fetch {
                assets_directory: assets_directory.into(),
                image_src_prefix: image_src_prefix.into(),
            },
            num_workers,
        )
    }
}

/// Render blocks (plus an optional front-matter header) to Markdown.
///
/// Fragments are reassembled positionally, so parallel output is
/// byte-identical to sequential output for the same input and context.
pub fn render(
    blocks: &[Block],
    front_matter: Option<&FrontMatter>,
    context: &RenderContext,
) -> Result<String> {
    let images = ImageResolver::new(&context.image);

    let mut out = match front_matter {
        Some(front_matter) => header(front_matter, &images)?,
        None => String::new(),
    };

    let fragments = if context.num_workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(context.num_workers)
            .build()?;
        pool.install(|| {
            blocks
                .par_iter()
                .map(|block| render_block(block, &images))
                .collect::<Result<Vec<_>>>()
        })?
    } else {
        blocks
            .iter()
            .map(|block| render_block(block, &images))
            .collect::<Result<Vec<_>>>()?
    };

    for fragment in &fragments {
        out.push_str(fragment);
    }

    let mut out = out.trim_end().to_string();
    out.push('\n');
    Ok(out)
}

fn header(front_matter: &FrontMatter, images: &ImageResolver) -> Result<String> {
    let mut front_matter = front_matter.clone();
    if let Some(preview) = &mut front_matter.image {
        preview.url = images.resolve(&preview.url)?;
    }
    Ok(format!(
        "---\n{}---\n\n",
        serde_yaml::to_string(&front_matter)?
    ))
}

fn render_block(block: &Block, images: &ImageResolver) -> Result<String> {
    Ok(match block {
        Block::SectionTitle(text) => format!("## {}\n\n", text.trim()),
        Block::Paragraph(text) => {
            let text = text.trim();
            if text.is_empty() {
                // Elided entirely, not rendered as a blank line.
                String::new()
            } else {
                format!("{text}\n\n")
            }
        }
        Block::Image(image) => {
            if image.src.is_empty() {
                String::new()
            } else {
                format!("{}\n\n", image_markdown(image, images)?)
            }
        }
        Block::ImageGroup(group) => {
            let rendered = group
                .iter()
                .filter(|image| !image.src.is_empty())
                .map(|image| image_markdown(image, images))
                .collect::<Result<Vec<_>>>()?;
            if rendered.is_empty() {
                String::new()
            } else {
                format!("{}\n\n", rendered.join(" "))
            }
        }
    })
}

fn image_markdown(image: &ImageRef, images: &ImageResolver) -> Result<String> {
    Ok(format!("![{}]({})", image.alt, images.resolve(&image.src)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PreviewImage;

    fn title(text: &str) -> Block {
        Block::SectionTitle(text.into())
    }

    fn para(text: &str) -> Block {
        Block::Paragraph(text.into())
    }

    fn image(src: &str, alt: &str) -> Block {
        Block::Image(ImageRef::new(src, alt))
    }

    #[test]
    fn worked_example_with_cdn_and_front_matter() {
        let blocks = vec![
            title("Intro"),
            para("Hello"),
            image("http://x/a.jpg?x=1", "cap"),
        ];
        let front_matter = FrontMatter {
            title: "T".into(),
            ..FrontMatter::default()
        };
        let out = render(
            &blocks,
            Some(&front_matter),
            &RenderContext::with_images_from_cdn(1),
        )
        .unwrap();
        assert_eq!(
            out,
            "---\ntitle: T\n---\n\n## Intro\n\nHello\n\n![cap](http://x/a.jpg)\n"
        );
    }

    #[test]
    fn pass_through_reproduces_src_and_alt_verbatim() {
        let blocks = vec![image("https://postfiles.pstatic.net/a.jpg?type=w80", "지도")];
        let out = render(&blocks, None, &RenderContext::with_default(1)).unwrap();
        assert_eq!(out, "![지도](https://postfiles.pstatic.net/a.jpg?type=w80)\n");
    }

    #[test]
    fn blank_paragraphs_contribute_nothing() {
        let with_blanks = vec![para("a"), para(""), para("\n"), para("b")];
        let without = vec![para("a"), para("b")];
        let context = RenderContext::with_default(1);
        assert_eq!(
            render(&with_blanks, None, &context).unwrap(),
            render(&without, None, &context).unwrap()
        );
    }

    #[test]
    fn empty_image_group_contributes_nothing() {
        let blocks = vec![para("before"), Block::ImageGroup(vec![]), para("after")];
        let out = render(&blocks, None, &RenderContext::with_default(1)).unwrap();
        assert_eq!(out, "before\n\nafter\n");
    }

    #[test]
    fn placeholder_image_without_src_is_dropped() {
        let blocks = vec![para("before"), image("", "ghost"), para("after")];
        let out = render(&blocks, None, &RenderContext::with_default(1)).unwrap();
        assert_eq!(out, "before\n\nafter\n");
    }

    #[test]
    fn image_group_joins_on_one_line() {
        let blocks = vec![Block::ImageGroup(vec![
            ImageRef::new("http://x/1.jpg", "c"),
            ImageRef::new("http://x/2.jpg", "c"),
        ])];
        let out = render(&blocks, None, &RenderContext::with_default(1)).unwrap();
        assert_eq!(out, "![c](http://x/1.jpg) ![c](http://x/2.jpg)\n");
    }

    #[test]
    fn parallel_render_matches_sequential() {
        let blocks: Vec<Block> = (0..64)
            .flat_map(|i| {
                vec![
                    title(&format!("Section {i}")),
                    para(&format!("paragraph {i}")),
                    image(&format!("https://postfiles.pstatic.net/{i}.jpg?type=w80"), "cap"),
                ]
            })
            .collect();
        let sequential = render(&blocks, None, &RenderContext::with_images_from_cdn(1)).unwrap();
        let parallel = render(&blocks, None, &RenderContext::with_images_from_cdn(4)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn no_front_matter_means_no_header() {
        let out = render(&[para("body")], None, &RenderContext::with_default(1)).unwrap();
        assert_eq!(out, "body\n");
    }

    #[test]
    fn front_matter_preview_image_goes_through_strategy() {
        let front_matter = FrontMatter {
            title: "T".into(),
            image: Some(PreviewImage {
                url: "https://postfiles.pstatic.net/a.jpg?type=w80".into(),
                alt: "preview".into(),
            }),
            ..FrontMatter::default()
        };
        let out = render(
            &[],
            Some(&front_matter),
            &RenderContext::with_images_from_cdn(1),
        )
        .unwrap();
        assert!(out.contains("url: https://blogfiles.pstatic.net/a.jpg"));
        assert!(!out.contains("type=w80"));
    }

    #[test]
    fn worker_count_is_clamped_to_one() {
        let context = RenderContext::with_default(0);
        assert_eq!(context.num_workers, 1);
        assert_eq!(render(&[para("x")], None, &context).unwrap(), "x\n");
    }
}
