use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything here is fatal: no retries, no partial output. A failure
/// propagates to the top of the parse/render call that raised it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A component whose discriminator is outside the known set. The IR has
    /// no "unknown" variant to degrade into, so parsing aborts.
    #[error("unknown component type: {0}")]
    UnrecognizedComponent(String),

    /// An image component that does not contain exactly one image or video.
    #[error("malformed component: {0}")]
    StructuralMismatch(String),

    /// A required single-valued metadata element is absent from the page.
    #[error("no {0} found")]
    MissingRequiredElement(&'static str),

    #[error("unrecognized publish date: {0:?}")]
    InvalidDate(String),

    /// Non-success response while localizing an image.
    #[error("image download failed: {url} ({status})")]
    DownloadFailure { url: String, status: StatusCode },

    /// Assets directory for fetched images is missing or not a directory.
    #[error("assets directory does not exist: {}", .0.display())]
    AssetsDirectory(std::path::PathBuf),

    /// Post-list endpoint answered with a non-"S" result code.
    #[error("post list request rejected: {0}")]
    ListResponse(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("front matter serialization failed: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("render pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
