// Note card: the loosely-typed post object from the platform feed API.
//
// Field names and types drift between API versions, so everything is
// optional, lists may be null, and counters and ids are accepted as strings
// or numbers. HAR extraction
// adds `unified_title` and `readable_time` to the same object, which is why
// those fields live here too.

use serde::Deserialize;
use serde_json::Value;

use crate::store::models::Post;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteCard {
    pub unified_title: Option<String>,
    pub display_title: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub content: Option<String>,
    pub time: Option<Value>,
    pub readable_time: Option<String>,
    #[serde(rename = "readableTime")]
    pub readable_time_camel: Option<String>,
    pub readable: Option<String>,
    pub ip_location: Option<String>,
    pub user: Option<NoteUser>,
    pub interact_info: Option<InteractInfo>,
    pub tag_list: Option<Vec<NoteTag>>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteUser {
    pub nickname: Option<Value>,
    pub user_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InteractInfo {
    pub liked_count: Option<Value>,
    pub comment_count: Option<Value>,
    pub share_count: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteTag {
    pub name: Option<Value>,
}

/// First non-empty value among the candidates.
fn first_non_empty<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
}

/// Text of a string or number field. Anything else is None.
fn scalar_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Render a counter that may be a string ("1.2万") or a number; absent is "0".
fn counter_text(value: &Option<Value>) -> String {
    scalar_text(value).unwrap_or_else(|| "0".to_string())
}

impl NoteCard {
    /// Parse a note card from any JSON value. Returns None for non-objects
    /// and for objects whose fields have unusable types.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn resolved_title(&self) -> &str {
        first_non_empty(&[&self.unified_title, &self.display_title, &self.title]).unwrap_or("")
    }

    /// Convert to a Post. `url` is used when the card carries none of its own.
    pub fn to_post(&self, url: &str) -> Post {
        let user = self.user.clone().unwrap_or_default();
        let interact = self.interact_info.clone().unwrap_or_default();

        Post {
            title: self.resolved_title().to_string(),
            content: first_non_empty(&[&self.desc, &self.content])
                .unwrap_or("")
                .to_string(),
            timestamp: match &self.time {
                Some(Value::Number(n)) => Some(n.clone()),
                _ => None,
            },
            readable_time: first_non_empty(&[
                &self.readable_time,
                &self.readable_time_camel,
                &self.readable,
            ])
            .map(str::to_string),
            location: self.ip_location.clone().unwrap_or_default(),
            user_nickname: scalar_text(&user.nickname).unwrap_or_default(),
            user_id: scalar_text(&user.user_id).unwrap_or_default(),
            liked_count: counter_text(&interact.liked_count),
            comment_count: counter_text(&interact.comment_count),
            share_count: counter_text(&interact.share_count),
            tags: self
                .tag_list
                .iter()
                .flatten()
                .filter_map(|t| scalar_text(&t.name))
                .collect(),
            url: self
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| url.to_string()),
        }
    }
}
