use async_trait::async_trait;

use crate::api::{CommentRecord, Error, HackathonId, NewComment};

/// The server holding the comments
///
/// It is authoritative for ids, timestamps and validation; the client only ever reads
/// whole threads from it and submits new comments to it.
#[async_trait]
pub trait Backend {
    /// Returns every comment of the hackathon, replies included, in any order
    async fn fetch_comments(&self, hackathon: HackathonId) -> Result<Vec<CommentRecord>, Error>;

    async fn post_comment(&self, comment: NewComment) -> Result<CommentRecord, Error>;
}
