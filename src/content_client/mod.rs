#[cfg(test)]
pub mod mock;

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::domain::{
    mapping::{map_book, map_chapter},
    models::{BookAggregate, ChapterEntity},
};

/// The content service answered, but has no such book.
#[derive(Debug, Error)]
#[error("book {0} not found")]
pub struct BookNotFound(pub String);

/// Read side of the remote content service, as the reader sees it.
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    async fn get_book(&self, book_id: &str) -> anyhow::Result<BookAggregate>;
    async fn get_chapter(&self, book_id: &str, chapter_number: u32)
    -> anyhow::Result<ChapterEntity>;
}

#[derive(Clone, Debug)]
pub struct ContentClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ContentClient {
    /// Create a new client with the given base URL (e.g. "http://localhost:8000").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating ContentClient");
        Ok(ContentClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a client with the provided API key set (Bearer). An empty key is ignored.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_header(&self) -> Option<(String, String)> {
        self.api_key
            .as_ref()
            .map(|k| ("Authorization".to_string(), format!("Bearer {}", k)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = self.url(path);
        let mut req = self.client.get(&url);
        if let Some((k, v)) = self.auth_header() {
            req = req.header(&k, &v);
        }
        let resp = req.send().await?;
        let status = resp.error_for_status()?;
        let body = status.text().await?;
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet_len = body.len().min(2000);
                let snippet = body.get(..snippet_len).unwrap_or(&body);
                tracing::error!(
                    error = %e,
                    %url,
                    body_snippet = %snippet,
                    "failed to parse content response"
                );
                Err(e.into())
            }
        }
    }

    /// GET /books/:book_id
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_book(&self, book_id: &str) -> anyhow::Result<BookResponse> {
        tracing::debug!(%book_id, "GET book");
        let book: Option<BookResponse> = self.get_json(&format!("/books/{}", book_id)).await?;
        book.ok_or_else(|| BookNotFound(book_id.to_string()).into())
    }

    /// GET /books/:book_id/chapters/:chapter_number
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_chapter(
        &self,
        book_id: &str,
        chapter_number: u32,
    ) -> anyhow::Result<ChapterResponse> {
        tracing::debug!(%book_id, chapter_number, "GET chapter");
        let chapter: Option<ChapterResponse> = self
            .get_json(&format!("/books/{}/chapters/{}", book_id, chapter_number))
            .await?;
        chapter.with_context(|| {
            format!("chapter {} of book {} not found", chapter_number, book_id)
        })
    }
}

#[async_trait::async_trait]
impl ContentService for ContentClient {
    async fn get_book(&self, book_id: &str) -> anyhow::Result<BookAggregate> {
        Ok(map_book(self.fetch_book(book_id).await?))
    }

    async fn get_chapter(
        &self,
        book_id: &str,
        chapter_number: u32,
    ) -> anyhow::Result<ChapterEntity> {
        let resp = self.fetch_chapter(book_id, chapter_number).await?;
        Ok(map_chapter(book_id, resp))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct BookResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub chapters: Vec<BookChapter>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct BookChapter {
    pub chapter_number: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ChapterResponse {
    pub novel_id: Option<String>,
    pub chapter_number: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub book: Option<ReadingBookSummary>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ReadingBookSummary {
    pub title: String,
    #[serde(rename = "numberChapter")]
    pub number_chapter: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_trims_trailing_slash() {
        let c = ContentClient::new("http://localhost:8000/").unwrap();
        assert_eq!(c.url("/books/b1"), "http://localhost:8000/books/b1");
        assert_eq!(
            c.url("books/b1/chapters/2"),
            "http://localhost:8000/books/b1/chapters/2"
        );
    }

    #[test]
    fn empty_api_key_sends_no_header() {
        let c = ContentClient::new("http://localhost:8000")
            .unwrap()
            .with_api_key("");
        assert!(c.auth_header().is_none());
        let c = c.with_api_key("secret");
        assert_eq!(
            c.auth_header(),
            Some(("Authorization".into(), "Bearer secret".into()))
        );
    }

    #[test]
    fn chapter_deserialize_example() {
        let json = r#"{
            "_id": "665f1c2e9b1e8a0012345678",
            "novel_id": "665f1c2e9b1e8a0087654321",
            "chapter_number": 3,
            "title": "The Gate",
            "content": "It was raining.",
            "price": 0,
            "book": { "title": "Foo", "numberChapter": 5 }
        }"#;
        let parsed: ChapterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.chapter_number, 3);
        assert_eq!(parsed.novel_id.as_deref(), Some("665f1c2e9b1e8a0087654321"));
        let book = parsed.book.unwrap();
        assert_eq!(book.title, "Foo");
        assert_eq!(book.number_chapter, 5);
    }

    #[test]
    fn missing_chapter_is_null_body() {
        let parsed: Option<ChapterResponse> = serde_json::from_str("null").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn book_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "_id": "b1",
            "title": "Foo",
            "author": "Jane",
            "genres": ["Fantasy", "Drama"],
            "description": "A book",
            "cover": "https://example.com/cover.jpg",
            "chapters": [{ "chapter_number": 1, "title": "Start", "content": "..." }]
        }"#;
        let parsed: BookResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, "b1");
        assert_eq!(parsed.title.as_deref(), Some("Foo"));
        assert_eq!(parsed.chapters.len(), 1);
        assert_eq!(parsed.chapters[0].title, "Start");
    }
}
