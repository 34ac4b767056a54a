use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

/// A single VK wall post.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    /// Unix timestamp.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub copy_history: Option<Vec<Post>>,
    #[serde(default)]
    pub coowners: Option<Coowners>,
    #[serde(default, deserialize_with = "flag")]
    pub is_pinned: bool,
}

impl Post {
    /// The reposted post surfaced for this post, if any.
    #[must_use]
    pub fn repost(&self) -> Option<&Post> {
        self.copy_history.as_ref().and_then(|chain| chain.first())
    }

    #[must_use]
    pub fn is_repost(&self) -> bool {
        self.copy_history.is_some()
    }

    /// `owner_post` identifier as accepted by `wall.getById`.
    #[must_use]
    pub fn full_id(&self) -> String {
        format!("{}_{}", self.owner_id, self.id)
    }
}

/// Co-authors credited alongside the primary author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Coowners {
    #[serde(default)]
    pub list: Vec<Coowner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Coowner {
    pub owner_id: i64,
}

/// A typed attachment on a post.
///
/// VK encodes attachments as `{"type": "<kind>", "<kind>": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Photo(Photo),
    Video(Video),
    Link(Link),
    Other {
        kind: String,
        fields: Map<String, Value>,
    },
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match raw.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(de::Error::missing_field("type")),
        };
        let payload = raw.remove(&kind).unwrap_or(Value::Null);

        // A known kind with a payload we cannot read is kept untyped rather
        // than failing the whole page.
        let typed = match kind.as_str() {
            "photo" => typed_payload(&kind, &payload).map(Self::Photo),
            "video" => Some(Self::Video(typed_payload(&kind, &payload).unwrap_or_default())),
            "link" => typed_payload(&kind, &payload).map(Self::Link),
            _ => None,
        };
        Ok(typed.unwrap_or_else(|| Self::Other {
            fields: match payload {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            kind,
        }))
    }
}

fn typed_payload<'a, T: Deserialize<'a>>(kind: &str, payload: &'a Value) -> Option<T> {
    T::deserialize(payload)
        .map_err(|e| warn!(kind, error = %e, "Malformed attachment payload"))
        .ok()
}

impl Attachment {
    /// The attachment's URL when it exposes one generically.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link(link) => Some(&link.url),
            Self::Other { fields, .. } => find_url(fields),
            Self::Photo(_) | Self::Video(_) => None,
        }
    }
}

/// Look up a URL in an untyped payload: `url` first, then any key containing it.
fn find_url(fields: &Map<String, Value>) -> Option<&str> {
    if let Some(Value::String(url)) = fields.get("url") {
        return Some(url);
    }
    fields
        .iter()
        .filter(|(key, _)| key.contains("url"))
        .find_map(|(_, value)| value.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoSize {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// VK size letters from smallest to largest.
const SIZE_LADDER: [&str; 10] = ["s", "o", "m", "p", "q", "r", "x", "y", "z", "w"];

impl PhotoSize {
    fn rank(&self) -> (usize, u64) {
        let letter = SIZE_LADDER
            .iter()
            .position(|l| *l == self.kind)
            .map_or(0, |p| p + 1);
        (letter, u64::from(self.width) * u64::from(self.height))
    }
}

impl Photo {
    /// URL of the largest available size.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        self.sizes
            .iter()
            .max_by_key(|size| size.rank())
            .map(|size| size.url.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Embeddable player URL. VK omits it for many videos.
    #[serde(default)]
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: String,
}

/// VK reports flags as `0`/`1`; accept booleans too.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

/// `response` envelope for `wall.get` and `wall.getById`.
#[derive(Debug, Deserialize)]
pub struct WallResponse {
    #[serde(default)]
    pub items: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub struct UserName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupName {
    pub name: String,
}

/// `groups.getById` returns `{"groups": [...]}` since API 5.139 and a bare array before.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GroupsResponse {
    Wrapped { groups: Vec<GroupName> },
    Bare(Vec<GroupName>),
}

impl GroupsResponse {
    pub fn into_first(self) -> Option<GroupName> {
        match self {
            Self::Wrapped { groups } | Self::Bare(groups) => groups.into_iter().next(),
        }
    }
}

/// Error body returned instead of `response`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: i64,
    pub error_msg: String,
}

/// Top-level VK API envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<ApiErrorBody>,
}
