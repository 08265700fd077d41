use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::models::{
    ChatMessage, Channel, Comment, MentionCandidate, MentionsResponse, NewPost, Post,
    PostsResponse, ThreadEntry,
};

/// REST client for the posts backend
#[derive(Debug, Clone)]
pub struct FeedApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl FeedApiClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &FeedConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.backend_url.clone(),
            client,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn thread_url(&self, post_id: &str, channel: Channel) -> String {
        self.url(&format!("/api/posts/{}/{}", post_id, channel.path_segment()))
    }

    fn entry_url(&self, post_id: &str, channel: Channel, entry_id: &str) -> String {
        format!("{}/{}", self.thread_url(post_id, channel), entry_id)
    }

    pub fn stream_url(&self) -> String {
        self.url("/api/stream")
    }

    /// Fetch all posts. A missing `items` field yields an empty list.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let response = self.client.get(self.url("/api/posts")).send().await?;
        let body: PostsResponse = decode(response).await?;
        Ok(body.items)
    }

    /// Queue a new post, returning whatever the backend answers with
    pub async fn create_post(&self, post: &NewPost) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/api/posts"))
            .json(post)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch the full thread for one post and channel, oldest first as the
    /// backend orders it. A `null` body counts as an empty thread.
    pub async fn fetch_thread(&self, post_id: &str, channel: Channel) -> Result<Vec<ThreadEntry>> {
        let response = self
            .client
            .get(self.thread_url(post_id, channel))
            .send()
            .await?;

        let entries = match channel {
            Channel::Comment => decode::<Option<Vec<Comment>>>(response)
                .await?
                .unwrap_or_default()
                .into_iter()
                .map(ThreadEntry::from)
                .collect(),
            Channel::Chat => decode::<Option<Vec<ChatMessage>>>(response)
                .await?
                .unwrap_or_default()
                .into_iter()
                .map(ThreadEntry::from)
                .collect(),
        };
        Ok(entries)
    }

    /// POST a new comment or chat message. An absent attachment is omitted
    /// from the body entirely.
    pub async fn create_entry(
        &self,
        post_id: &str,
        channel: Channel,
        body: &str,
        author: &str,
        attachment_url: Option<&str>,
    ) -> Result<()> {
        let mut payload = json!({
            (channel.body_field()): body,
            "author": author,
        });
        if let Some(url) = attachment_url {
            payload["attachment_url"] = Value::from(url);
        }

        let response = self
            .client
            .post(self.thread_url(post_id, channel))
            .json(&payload)
            .send()
            .await?;
        ensure_success(response).await
    }

    /// PATCH an existing entry. An absent attachment is sent as explicit null.
    pub async fn update_entry(
        &self,
        post_id: &str,
        channel: Channel,
        entry_id: &str,
        body: &str,
        attachment_url: Option<&str>,
    ) -> Result<()> {
        let payload = json!({
            (channel.body_field()): body,
            "attachment_url": attachment_url,
        });

        let response = self
            .client
            .patch(self.entry_url(post_id, channel, entry_id))
            .json(&payload)
            .send()
            .await?;
        ensure_success(response).await
    }

    pub async fn delete_entry(&self, post_id: &str, channel: Channel, entry_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.entry_url(post_id, channel, entry_id))
            .send()
            .await?;
        ensure_success(response).await
    }

    /// Tell other viewers that `author` is composing in `channel`
    pub async fn send_typing(&self, post_id: &str, channel: Channel, author: &str) -> Result<()> {
        let payload = json!({
            "channel": channel.as_str(),
            "author": author,
            "is_typing": true,
        });

        let response = self
            .client
            .post(self.url(&format!("/api/posts/{}/typing", post_id)))
            .json(&payload)
            .send()
            .await?;
        ensure_success(response).await
    }

    /// Server-side fuzzy lookup of mention candidates
    pub async fn lookup_mentions(&self, query: &str, limit: usize) -> Result<Vec<MentionCandidate>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.url("/api/mentions"))
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        let body: MentionsResponse = decode(response).await?;
        Ok(body.items)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn ensure_success(response: reqwest::Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = check_status(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = FeedApiClient::new(&FeedConfig::new("http://backend.test"));
        assert_eq!(
            api.thread_url("p1", Channel::Comment),
            "http://backend.test/api/posts/p1/comments"
        );
        assert_eq!(
            api.entry_url("p1", Channel::Chat, "9"),
            "http://backend.test/api/posts/p1/chat/9"
        );
        assert_eq!(api.stream_url(), "http://backend.test/api/stream");
    }
}
