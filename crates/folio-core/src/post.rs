//! Post envelope.
//!
//! Posts come back from two different backends that disagree on field
//! spelling (`postDate` vs `post_date`), so the envelope accepts both and
//! fills in anything missing rather than rejecting the post.

use pulldown_cmark_escape::escape_html_body_text;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::model::Document;

pub const DEFAULT_TITLE: &str = "Hidden Project";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPost")]
pub struct Post {
    pub title: String,
    pub post_date: Option<String>,
    pub post_description: String,
    pub content: Document,
    pub creditbox: Document,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPost {
    title: Option<String>,
    #[serde(rename = "postDate")]
    post_date_camel: Option<String>,
    post_date: Option<String>,
    #[serde(rename = "postDescription")]
    post_description_camel: Option<String>,
    post_description: Option<String>,
    content: Value,
    creditbox: Value,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Post {
            title: raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            post_date: raw.post_date_camel.or(raw.post_date),
            post_description: raw
                .post_description_camel
                .or(raw.post_description)
                .unwrap_or_default(),
            content: blocks_or_empty(raw.content),
            creditbox: blocks_or_empty(raw.creditbox),
        }
    }
}

fn blocks_or_empty(value: Value) -> Document {
    if !value.is_array() {
        return Document::default();
    }
    Document::from_value(value).unwrap_or_default()
}

impl Post {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FolioError::InvalidDocument)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(FolioError::InvalidDocument)
    }

    /// Calendar year of the post date, if it has a readable one.
    pub fn year(&self) -> Option<i32> {
        let date = self.post_date.as_deref()?.trim();
        let end = date
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(date.len());
        if end < 4 {
            return None;
        }
        date[..end].parse().ok()
    }
}

/// Markup around a post body: title bar, optional description and an empty
/// `div.post-body` for the document to be mounted into.
pub fn render_post_shell(post: &Post, private: bool) -> String {
    let mut html = String::with_capacity(256);
    html.push_str(if private {
        "<div class=\"post-container private-no-context-menu\">"
    } else {
        "<div class=\"post-container\">"
    });
    html.push_str("<div class=\"title-bar\"><h2>");
    let _ = escape_html_body_text(&mut html, &post.title);
    html.push_str("</h2><p>");
    if let Some(year) = post.year() {
        html.push_str(&year.to_string());
    }
    html.push_str("</p></div>");
    if !post.post_description.is_empty() {
        html.push_str("<p>");
        let _ = escape_html_body_text(&mut html, &post.post_description);
        html.push_str("</p>");
    }
    html.push_str("<div class=\"post-content\"><div class=\"post-body\"></div></div></div>");
    html
}
