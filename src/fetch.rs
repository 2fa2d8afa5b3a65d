use reqwest::blocking::Client;
use tracing::debug;

use crate::error::Result;

const USER_AGENT: &str = concat!("naver_blog_md/", env!("CARGO_PKG_VERSION"));
const BLOG_HOST: &str = "https://blog.naver.com";

pub fn client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

pub fn post_url(blog_id: &str, log_no: u64) -> String {
    format!("{BLOG_HOST}/PostView.naver?blogId={blog_id}&logNo={log_no}")
}

/// Fetch one post's rendered HTML.
pub fn post_html(client: &Client, blog_id: &str, log_no: u64) -> Result<String> {
    let url = post_url(blog_id, log_no);
    debug!(%url, "fetching post");
    let response = client.get(&url).send()?.error_for_status()?;
    Ok(response.text()?)
}
