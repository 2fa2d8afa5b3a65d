use once_cell::unsync::OnceCell;
use reqwest::blocking::Client;
use scraper::Html;

use crate::error::Result;
use crate::fetch;
use crate::markdown::{render, RenderContext};
use crate::metadata::{self, FrontMatter};
use crate::parser::{self, first_image, Block, ImageRef};

/// Handle on one post. The page fetch and the block parse each happen at
/// most once per handle; the cells key on initialization state, so an empty
/// result is never mistaken for "not yet computed".
pub struct Post {
    blog_id: String,
    log_no: u64,
    client: Client,
    html: OnceCell<String>,
    blocks: OnceCell<Vec<Block>>,
}

impl Post {
    pub fn new(blog_id: impl Into<String>, log_no: u64) -> Result<Self> {
        Ok(Post {
            blog_id: blog_id.into(),
            log_no,
            client: fetch::client()?,
            html: OnceCell::new(),
            blocks: OnceCell::new(),
        })
    }

    /// Handle seeded with already-fetched HTML; no page request will be made.
    pub fn from_html(blog_id: impl Into<String>, log_no: u64, html: String) -> Result<Self> {
        let post = Post::new(blog_id, log_no)?;
        let _ = post.html.set(html);
        Ok(post)
    }

    pub fn blog_id(&self) -> &str {
        &self.blog_id
    }

    pub fn log_no(&self) -> u64 {
        self.log_no
    }

    fn html(&self) -> Result<&str> {
        self.html
            .get_or_try_init(|| fetch::post_html(&self.client, &self.blog_id, self.log_no))
            .map(String::as_str)
    }

    fn document(&self) -> Result<Html> {
        Ok(Html::parse_document(self.html()?))
    }

    /// Materialized block sequence, parsed once and shared by the preview
    /// scan and the body render.
    pub fn blocks(&self) -> Result<&[Block]> {
        self.blocks
            .get_or_try_init(|| parser::parse_components(&self.document()?))
            .map(Vec::as_slice)
    }

    pub fn preview_image(&self) -> Result<Option<ImageRef>> {
        Ok(first_image(self.blocks()?))
    }

    pub fn front_matter(&self) -> Result<FrontMatter> {
        let tags = metadata::tags(&self.client, &self.blog_id, self.log_no)?;
        metadata::front_matter(&self.document()?, tags, self.preview_image()?)
    }

    /// Full Markdown document: front matter header plus rendered body.
    pub fn as_markdown(&self, context: &RenderContext) -> Result<String> {
        let front_matter = self.front_matter()?;
        render(self.blocks()?, Some(&front_matter), context)
    }
}
