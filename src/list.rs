use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};

const LIST_ENDPOINT: &str = "https://blog.naver.com/PostTitleListAsync.naver";

/// One page of a blog's post list. The endpoint answers camelCase JSON with
/// every number spelled as a string and titles percent-encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub result_code: String,
    pub result_message: String,
    #[serde(default)]
    pub post_list: Vec<PostItem>,
    #[serde(deserialize_with = "int_from_str")]
    pub count_per_page: u32,
    #[serde(deserialize_with = "int_from_str")]
    pub total_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostItem {
    #[serde(deserialize_with = "int_from_str")]
    pub log_no: u64,
    #[serde(deserialize_with = "url_decoded")]
    pub title: String,
    #[serde(deserialize_with = "int_from_str")]
    pub category_no: i64,
    #[serde(deserialize_with = "int_from_str")]
    pub parent_category_no: i64,
    #[serde(deserialize_with = "int_from_str")]
    pub comment_count: u64,
    #[serde(deserialize_with = "date_from_str")]
    pub add_date: NaiveDate,
}

/// Fetch one page of the post list. `category_no` 0 means all categories.
pub fn fetch_post_list(
    client: &Client,
    blog_id: &str,
    page: u32,
    category_no: i64,
    count_per_page: u32,
) -> Result<PostListResponse> {
    let url = format!(
        "{LIST_ENDPOINT}?blogId={blog_id}&currentPage={page}&categoryNo={category_no}&countPerPage={count_per_page}"
    );
    debug!(%url, "fetching post list page");
    let response: PostListResponse = client.get(&url).send()?.error_for_status()?.json()?;
    if response.result_code != "S" {
        return Err(Error::ListResponse(response.result_message));
    }
    Ok(response)
}

/// Page through the whole list until `totalCount` summaries are collected.
pub fn fetch_all_posts(client: &Client, blog_id: &str, category_no: i64) -> Result<Vec<PostItem>> {
    const PER_PAGE: u32 = 30;

    let mut posts: Vec<PostItem> = Vec::new();
    let mut page = 1;
    loop {
        let response = fetch_post_list(client, blog_id, page, category_no, PER_PAGE)?;
        let total = response.total_count as usize;
        let fetched = response.post_list.len();
        posts.extend(response.post_list);
        if fetched == 0 || posts.len() >= total {
            return Ok(posts);
        }
        page += 1;
    }
}

fn int_from_str<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) if s.is_empty() => Ok(T::default()),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Number(n) => n.to_string().parse().map_err(serde::de::Error::custom),
    }
}

fn url_decoded<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned())
}

fn date_from_str<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&raw, "%Y. %m. %d.").map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "resultCode": "S",
        "resultMessage": "성공",
        "postList": [
            {
                "logNo": "223000000001",
                "title": "%EA%B0%95%EB%A6%89+%EC%97%AC%ED%96%89%EA%B8%B0",
                "categoryNo": "6",
                "parentCategoryNo": "",
                "commentCount": "3",
                "addDate": "2024. 1. 2."
            }
        ],
        "countPerPage": "30",
        "totalCount": "124"
    }"#;

    #[test]
    fn deserializes_stringly_typed_page() {
        let page: PostListResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(page.result_code, "S");
        assert_eq!(page.count_per_page, 30);
        assert_eq!(page.total_count, 124);

        let post = &page.post_list[0];
        assert_eq!(post.log_no, 223_000_000_001);
        assert_eq!(post.title, "강릉 여행기");
        assert_eq!(post.category_no, 6);
        // Empty string means "no value", not a parse error.
        assert_eq!(post.parent_category_no, 0);
        assert_eq!(post.comment_count, 3);
        assert_eq!(
            post.add_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn accepts_plain_numbers_too() {
        let json = r#"{
            "resultCode": "S",
            "resultMessage": "",
            "postList": [],
            "countPerPage": 30,
            "totalCount": 0
        }"#;
        let page: PostListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.count_per_page, 30);
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn missing_post_list_defaults_to_empty() {
        let json = r#"{
            "resultCode": "S",
            "resultMessage": "",
            "countPerPage": "30",
            "totalCount": "0"
        }"#;
        let page: PostListResponse = serde_json::from_str(json).unwrap();
        assert!(page.post_list.is_empty());
    }
}
