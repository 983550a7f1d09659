use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, HackathonId, UserId};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Comment cannot be empty")]
    EmptyContent,

    #[error("Comment must be less than {} characters, got {0}", crate::MAX_CONTENT_LEN)]
    ContentTooLong(usize),

    #[error("Hackathon not found {0:?}")]
    HackathonNotFound(HackathonId),

    #[error("User not found {0:?}")]
    UserNotFound(UserId),

    #[error("Parent comment not found {0:?}")]
    ParentNotFound(CommentId),

    #[error("Parent comment {0:?} belongs to another hackathon")]
    ParentInOtherHackathon(CommentId),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::ContentTooLong(_) => StatusCode::BAD_REQUEST,
            Error::HackathonNotFound(_) => StatusCode::NOT_FOUND,
            Error::UserNotFound(_) => StatusCode::NOT_FOUND,
            Error::ParentNotFound(_) => StatusCode::NOT_FOUND,
            Error::ParentInOtherHackathon(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::EmptyContent => json!({
                "message": "comment cannot be empty",
                "type": "empty-content",
            }),
            Error::ContentTooLong(len) => json!({
                "message": "comment is too long",
                "type": "content-too-long",
                "length": len,
            }),
            Error::HackathonNotFound(id) => json!({
                "message": "hackathon not found",
                "type": "hackathon-not-found",
                "id": id,
            }),
            Error::UserNotFound(id) => json!({
                "message": "user not found",
                "type": "user-not-found",
                "id": id,
            }),
            Error::ParentNotFound(id) => json!({
                "message": "parent comment not found",
                "type": "parent-not-found",
                "id": id,
            }),
            Error::ParentInOtherHackathon(id) => json!({
                "message": "parent comment belongs to another hackathon",
                "type": "parent-in-other-hackathon",
                "id": id,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let id = || {
            data.get("id")
                .and_then(|id| id.as_i64())
                .ok_or_else(|| anyhow!("error refers to an object without a proper id"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "empty-content" => Error::EmptyContent,
                "content-too-long" => Error::ContentTooLong(
                    data.get("length")
                        .and_then(|l| l.as_u64())
                        .ok_or_else(|| anyhow!("error is a too-long content without a length"))?
                        as usize,
                ),
                "hackathon-not-found" => Error::HackathonNotFound(HackathonId(id()?)),
                "user-not-found" => Error::UserNotFound(UserId(id()?)),
                "parent-not-found" => Error::ParentNotFound(CommentId(id()?)),
                "parent-in-other-hackathon" => Error::ParentInOtherHackathon(CommentId(id()?)),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_own_contents() {
        for err in [
            Error::Unknown(String::from("boom")),
            Error::EmptyContent,
            Error::ContentTooLong(1001),
            Error::HackathonNotFound(HackathonId(3)),
            Error::UserNotFound(UserId(4)),
            Error::ParentNotFound(CommentId(5)),
            Error::ParentInOtherHackathon(CommentId(6)),
        ] {
            assert_eq!(Error::parse(&err.contents()).unwrap(), err);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(Error::parse(br#"{"type":"nope","message":"x"}"#).is_err());
        assert!(Error::parse(br#"{"type":"parent-not-found"}"#).is_err());
        assert!(Error::parse(b"not json").is_err());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            Error::EmptyContent.status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ParentNotFound(CommentId(1)).status_code(),
            http::StatusCode::NOT_FOUND
        );
    }
}
