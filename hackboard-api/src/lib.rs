use chrono::Utc;

mod comment;
pub use comment::{CommentId, CommentPayload, CommentRecord, NewComment};

mod error;
pub use error::Error;

mod hackathon;
pub use hackathon::{Hackathon, HackathonId};

mod user;
pub use user::{Author, UserId};

pub type Time = chrono::DateTime<Utc>;

/// Maximum length of a comment, in characters
pub const MAX_CONTENT_LEN: usize = 1000;

// The backend is authoritative, but drafts that would fail validation there are rejected
// here before being sent. Emptiness is checked on the trimmed text, length on the draft
// as typed.
pub fn validate_content(s: &str) -> Result<(), Error> {
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    let len = s.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(Error::ContentTooLong(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_bounds() {
        assert_eq!(validate_content(""), Err(Error::EmptyContent));
        assert_eq!(validate_content("   "), Err(Error::EmptyContent));
        assert_eq!(validate_content("a"), Ok(()));
        assert_eq!(validate_content(&"a".repeat(MAX_CONTENT_LEN)), Ok(()));
        assert_eq!(
            validate_content(&"a".repeat(MAX_CONTENT_LEN + 1)),
            Err(Error::ContentTooLong(MAX_CONTENT_LEN + 1))
        );
    }

    #[test]
    fn fuzz_validate_never_panics() {
        bolero::check!()
            .with_type::<NewComment>()
            .for_each(|c| match c.validate() {
                Ok(()) => assert!(!c.content.trim().is_empty()),
                Err(Error::EmptyContent) => assert!(c.content.trim().is_empty()),
                Err(Error::ContentTooLong(len)) => assert!(len > MAX_CONTENT_LEN),
                Err(e) => panic!("unexpected validation error {e:?}"),
            });
    }
}
