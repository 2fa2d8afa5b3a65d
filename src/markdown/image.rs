use std::io::Write as _;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::fetch;

/// Pluggable image-handling strategy. One constructor per variant, each
/// carrying exactly the fields it needs.
#[derive(Debug, Clone)]
pub enum ImageContext {
    /// Embed the raw URL unchanged.
    Default,
    /// Rewrite to the canonical published CDN form.
    Cdn,
    /// Download every image into `assets_directory` and embed
    /// `{image_src_prefix}{filename}` instead.
    Fetch {
        assets_directory: PathBuf,
        image_src_prefix: String,
    },
}

/// Canonical published URL for an image or video source: query string
/// stripped, staging path segment rewritten to the published one, video CDN
/// host rewritten to the image CDN host. Idempotent.
pub fn canonical_image_url(src: &str) -> String {
    let without_query = src.split('?').next().unwrap_or(src);
    without_query
        .replace("postfiles", "blogfiles")
        .replace(
            "https://mblogvideo-phinf.pstatic.net/",
            "https://blogfiles.pstatic.net/",
        )
}

/// Applies one `ImageContext` to raw image URLs. Shared by reference across
/// render workers; the HTTP client is created on first fetch only.
pub struct ImageResolver<'a> {
    context: &'a ImageContext,
    client: OnceCell<Client>,
}

impl<'a> ImageResolver<'a> {
    pub fn new(context: &'a ImageContext) -> Self {
        ImageResolver {
            context,
            client: OnceCell::new(),
        }
    }

    /// Final URL/path to embed for `src`.
    pub fn resolve(&self, src: &str) -> Result<String> {
        match self.context {
            ImageContext::Default => Ok(src.to_string()),
            ImageContext::Cdn => Ok(canonical_image_url(src)),
            ImageContext::Fetch {
                assets_directory,
                image_src_prefix,
            } => self.fetch_and_localize(src, assets_directory, image_src_prefix),
        }
    }

    fn fetch_and_localize(
        &self,
        src: &str,
        assets_directory: &Path,
        image_src_prefix: &str,
    ) -> Result<String> {
        if !assets_directory.is_dir() {
            return Err(Error::AssetsDirectory(assets_directory.to_path_buf()));
        }

        let url = canonical_image_url(src);
        let client = self.client.get_or_try_init(fetch::client)?;

        let response = client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailure { url, status });
        }
        let bytes = response.bytes()?;

        let filename = local_filename(&url);
        write_asset(assets_directory, &filename, &bytes)?;

        Ok(format!("{image_src_prefix}{filename}"))
    }
}

/// Filename for a localized image: the URL's last path segment, with `+`
/// taken as space and percent escapes decoded.
fn local_filename(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or_default();
    let unplussed = segment.replace('+', " ");
    percent_decode_str(&unplussed)
        .decode_utf8_lossy()
        .into_owned()
}

/// Write into the target directory through a temp file and rename, so a
/// concurrent worker hitting the same filename never observes a partial file.
fn write_asset(directory: &Path, filename: &str, bytes: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(directory)?;
    tmp.write_all(bytes)?;
    tmp.persist(directory.join(filename))
        .map_err(|e| Error::Io(e.error))?;
    Ok(())
}
