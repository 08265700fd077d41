use serde::{Deserialize, Serialize};

use super::de_null_default;

/// A lookup result used to render the autocomplete list and perform substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionCandidate {
    pub handle: String,
    #[serde(rename = "name", alias = "display_name", default, deserialize_with = "de_null_default")]
    pub display_name: String,
}

/// `GET /api/mentions` envelope
#[derive(Debug, Default, Deserialize)]
pub struct MentionsResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub items: Vec<MentionCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mentions_response() {
        let resp: MentionsResponse = serde_json::from_str(
            r#"{"items": [{"handle": "@nexus", "name": "Nexus Team"}, {"handle": "@ada"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[0].display_name, "Nexus Team");
        assert_eq!(resp.items[1].display_name, "");
    }
}
