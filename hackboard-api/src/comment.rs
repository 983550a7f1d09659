use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::{Author, Error, HackathonId, Time, UserId};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

/// A comment as the backend hands it out: flat, with an optional parent reference
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "RawComment")]
pub struct CommentRecord {
    pub id: CommentId,

    pub content: String,

    #[serde(rename = "user")]
    pub author: Author,

    /// None for top-level comments
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,

    /// Absent on comments that were just created
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CommentRecord {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Parses `created_at`, accepting both RFC 3339 and zone-less timestamps (read as UTC)
    pub fn created_at(&self) -> Option<Time> {
        let raw = self.created_at.as_deref()?;
        if let Ok(t) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(t.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|t| Utc.from_utc_datetime(&t))
    }
}

/// A comment with its replies nested inline, as returned by the backend for top-level comments
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(from = "RawComment")]
pub struct CommentPayload {
    pub record: CommentRecord,
    pub replies: Vec<CommentPayload>,
}

#[derive(serde::Deserialize)]
struct ParentRef {
    id: CommentId,
}

#[derive(serde::Deserialize)]
struct RawComment {
    id: CommentId,

    #[serde(default)]
    content: String,

    #[serde(default, alias = "author")]
    user: Author,

    #[serde(default)]
    parent: Option<ParentRef>,

    #[serde(default, rename = "parentId")]
    parent_id: Option<CommentId>,

    #[serde(default, rename = "createdAt")]
    created_at: Option<String>,

    #[serde(default)]
    replies: Vec<CommentPayload>,
}

impl From<RawComment> for CommentPayload {
    fn from(c: RawComment) -> CommentPayload {
        CommentPayload {
            record: CommentRecord {
                id: c.id,
                content: c.content,
                author: c.user,
                parent_id: c.parent_id.or(c.parent.map(|p| p.id)),
                created_at: c.created_at,
            },
            replies: c.replies,
        }
    }
}

impl From<RawComment> for CommentRecord {
    fn from(c: RawComment) -> CommentRecord {
        CommentPayload::from(c).record
    }
}

impl CommentPayload {
    /// Flattens nested payloads into records, in pre-order
    ///
    /// Nested replies that do not name their parent get the enclosing payload's id.
    pub fn flatten(payloads: Vec<CommentPayload>) -> Vec<CommentRecord> {
        let mut res = Vec::with_capacity(payloads.len());
        let mut todo = payloads
            .into_iter()
            .rev()
            .map(|p| (None, p))
            .collect::<Vec<_>>();
        while let Some((parent, p)) = todo.pop() {
            let mut record = p.record;
            if record.parent_id.is_none() {
                record.parent_id = parent;
            }
            let id = record.id;
            todo.extend(p.replies.into_iter().rev().map(|r| (Some(id), r)));
            res.push(record);
        }
        res
    }
}

#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub hackathon_id: HackathonId,
    pub user_id: UserId,
    #[generator(bolero::generator::gen_with::<String>().len(0..1100usize))]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Checks a draft and builds the submission out of it, with its content trimmed
    pub fn new(
        hackathon_id: HackathonId,
        user_id: UserId,
        draft: &str,
        parent_id: Option<CommentId>,
    ) -> Result<NewComment, Error> {
        crate::validate_content(draft)?;
        Ok(NewComment {
            hackathon_id,
            user_id,
            content: draft.trim().to_string(),
            parent_id,
        })
    }

    // See `validate_content`
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}
