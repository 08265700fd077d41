use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{de_id, de_null_default};

/// A queued or scheduled social post. Owned by the backend, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub platform: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub content: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub hashtags: Vec<String>,
}

/// `GET /api/posts` envelope
#[derive(Debug, Default, Deserialize)]
pub struct PostsResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub items: Vec<Post>,
}

/// Body of `POST /api/posts`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub platform: Platform,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub hashtags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Tiktok,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter/X",
            Platform::Linkedin => "LinkedIn",
            Platform::Tiktok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_response_tolerates_missing_items() {
        let resp: PostsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.items.is_empty());

        let resp: PostsResponse = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_post_accepts_numeric_id() {
        let post: Post = serde_json::from_str(
            r#"{"id": 42, "platform": "facebook", "status": "queued", "content": "hi"}"#,
        )
        .unwrap();
        assert_eq!(post.id, "42");
        assert!(post.media_url.is_none());
        assert!(post.hashtags.is_empty());
    }

    #[test]
    fn test_new_post_omits_empty_optionals() {
        let post = NewPost {
            platform: Platform::Linkedin,
            content: "Launch day".to_string(),
            media_url: None,
            hashtags: vec!["#growth".to_string()],
            scheduled_at: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["platform"], "linkedin");
        assert!(json.get("media_url").is_none());
        assert!(json.get("scheduled_at").is_none());
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("TikTok".parse::<Platform>(), Ok(Platform::Tiktok));
        assert!("myspace".parse::<Platform>().is_err());
        assert_eq!(Platform::Twitter.label(), "Twitter/X");
    }
}
