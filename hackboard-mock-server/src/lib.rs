use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use hackboard_client::{
    api::{
        Author, CommentId, CommentRecord, Error, Hackathon, HackathonId, NewComment, UserId,
    },
    Backend,
};
use tokio::sync::Mutex;

mod fuzz;

/// In-memory stand-in for the comment endpoints of the real backend
pub struct MockServer {
    users: BTreeMap<UserId, Author>,
    hackathons: BTreeMap<HackathonId, Hackathon>,
    comments: Vec<(HackathonId, CommentRecord)>,
    next_comment_id: i64,
    down: bool,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            hackathons: BTreeMap::new(),
            comments: Vec::new(),
            next_comment_id: 1,
            down: false,
        }
    }

    pub fn add_user(&mut self, name: String, email: String) -> UserId {
        let id = UserId(self.users.len() as i64 + 1);
        self.users.insert(id, Author { id, name, email });
        id
    }

    pub fn add_hackathon(&mut self, title: String) -> HackathonId {
        let id = HackathonId(self.hackathons.len() as i64 + 1);
        self.hackathons.insert(id, Hackathon { id, title });
        id
    }

    /// While down, every request fails
    pub fn set_down(&mut self, down: bool) {
        self.down = down;
    }

    /// Stores a record as-is, bypassing all the checks `post_comment` does
    pub fn test_insert_raw(&mut self, hackathon: HackathonId, record: CommentRecord) {
        self.next_comment_id = self.next_comment_id.max(record.id.0 + 1);
        self.comments.push((hackathon, record));
    }

    /// Return the current number of comments for `hackathon`
    pub fn test_num_comments(&self, hackathon: HackathonId) -> usize {
        self.comments
            .iter()
            .filter(|(h, _)| *h == hackathon)
            .count()
    }

    fn check_up(&self) -> Result<(), Error> {
        match self.down {
            true => Err(Error::Unknown(String::from("mock server is down"))),
            false => Ok(()),
        }
    }

    pub fn fetch_comments(&self, hackathon: HackathonId) -> Result<Vec<CommentRecord>, Error> {
        self.check_up()?;
        if !self.hackathons.contains_key(&hackathon) {
            return Err(Error::HackathonNotFound(hackathon));
        }
        Ok(self
            .comments
            .iter()
            .filter(|(h, _)| *h == hackathon)
            .map(|(_, c)| c.clone())
            .collect())
    }

    pub fn post_comment(&mut self, c: NewComment) -> Result<CommentRecord, Error> {
        self.check_up()?;
        c.validate()?;
        if !self.hackathons.contains_key(&c.hackathon_id) {
            return Err(Error::HackathonNotFound(c.hackathon_id));
        }
        let author = self
            .users
            .get(&c.user_id)
            .ok_or(Error::UserNotFound(c.user_id))?
            .clone();
        if let Some(parent) = c.parent_id {
            match self.comments.iter().find(|(_, p)| p.id == parent) {
                None => return Err(Error::ParentNotFound(parent)),
                Some((h, _)) if *h != c.hackathon_id => {
                    return Err(Error::ParentInOtherHackathon(parent))
                }
                Some(_) => (),
            }
        }

        let record = CommentRecord {
            id: CommentId(self.next_comment_id),
            content: c.content,
            author,
            parent_id: c.parent_id,
            created_at: Some(Utc::now().format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        };
        self.next_comment_id += 1;
        tracing::debug!(id = ?record.id, hackathon = ?c.hackathon_id, "mock server stored comment");
        self.comments.push((c.hackathon_id, record.clone()));
        Ok(record)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// A mock server that can be shared between several clients
#[derive(Clone)]
pub struct SharedMockServer(pub Arc<Mutex<MockServer>>);

impl SharedMockServer {
    pub fn new(server: MockServer) -> SharedMockServer {
        SharedMockServer(Arc::new(Mutex::new(server)))
    }
}

#[async_trait]
impl Backend for SharedMockServer {
    async fn fetch_comments(&self, hackathon: HackathonId) -> Result<Vec<CommentRecord>, Error> {
        self.0.lock().await.fetch_comments(hackathon)
    }

    async fn post_comment(&self, comment: NewComment) -> Result<CommentRecord, Error> {
        self.0.lock().await.post_comment(comment)
    }
}
