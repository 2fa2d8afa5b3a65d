use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::ImageRef;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".se-title-text").unwrap());
static NICK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".nick").unwrap());
static PUB_DATE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".se_publishDate").unwrap());
static CATEGORY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".blog2_series").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewImage {
    pub url: String,
    pub alt: String,
}

/// Metadata header prepended to the rendered document. Absent optional
/// fields are left out of the YAML entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrontMatter {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PreviewImage>,
}

/// Assemble front matter from a post's parsed document. Title, author,
/// publish date and category are required; without them no meaningful
/// header can be produced.
pub fn front_matter(
    document: &Html,
    tags: Vec<String>,
    preview_image: Option<ImageRef>,
) -> Result<FrontMatter> {
    Ok(FrontMatter {
        title: required_text(document, &TITLE_SEL, "title")?,
        author: Some(required_text(document, &NICK_SEL, "nickname")?),
        pub_date: Some(pub_date(&required_text(document, &PUB_DATE_SEL, "pub date")?)?),
        description: Some(String::new()),
        tags,
        categories: vec![required_text(document, &CATEGORY_SEL, "category")?],
        draft: Some(false),
        image: preview_image.map(|image| PreviewImage {
            url: image.src,
            alt: image.alt,
        }),
    })
}

fn required_text(document: &Html, selector: &Selector, name: &'static str) -> Result<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .ok_or(Error::MissingRequiredElement(name))
}

/// Publish dates render as "2024. 1. 1. 21:03", always KST.
fn pub_date(text: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(&format!("{text}+0900"), "%Y. %m. %d. %H:%M%z")
        .map_err(|_| Error::InvalidDate(text.to_string()))
}

/// Post tags come from a separate JSON endpoint; each `tagName` entry is a
/// percent-encoded comma-joined list.
pub fn tags(client: &Client, blog_id: &str, log_no: u64) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct TagListResponse {
        #[serde(default)]
        taglist: Vec<TagItem>,
    }

    #[derive(Deserialize)]
    struct TagItem {
        #[serde(rename = "tagName")]
        tag_name: String,
    }

    let url = format!(
        "https://blog.naver.com/BlogTagListInfo.naver?blogId={blog_id}&logNoList={log_no}&logType=mylog"
    );
    let response: TagListResponse = client.get(&url).send()?.error_for_status()?.json()?;

    let mut tags = Vec::new();
    for item in response.taglist {
        let decoded = percent_decode_str(&item.tag_name)
            .decode_utf8_lossy()
            .into_owned();
        tags.extend(
            decoded
                .split(',')
                .filter(|tag| !tag.is_empty())
                .map(str::to_string),
        );
    }
    Ok(tags)
}
