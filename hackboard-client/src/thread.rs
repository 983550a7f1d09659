use std::sync::Arc;

use crate::{
    api::{CommentId, CommentRecord, Error, HackathonId, NewComment, UserId},
    build_forest, count_all, Backend, Forest,
};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load comments. Please try again.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to post comment. Please try again.";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ThreadState {
    /// Nothing fetched yet
    Idle,

    /// A fetch is in flight; the last successfully loaded forest, if any, stays displayable
    Loading { previous: Option<Arc<Forest>> },

    Loaded(Arc<Forest>),

    Failed(Error),
}

/// Proof that a fetch was started, to be handed back along with its result
///
/// Only the ticket of the latest started fetch is allowed to update the thread.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

/// Text being typed into a comment or reply box
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Draft {
    pub parent_id: Option<CommentId>,
    pub content: String,

    /// Inline error to show next to the draft
    pub error: Option<String>,
}

impl Draft {
    pub fn top_level() -> Draft {
        Draft::default()
    }

    pub fn reply_to(parent_id: CommentId) -> Draft {
        Draft {
            parent_id: Some(parent_id),
            ..Draft::default()
        }
    }

    /// The "N/1000 characters" counter
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.error = None;
    }
}

/// The comment thread of one hackathon, as seen by one user
///
/// Every change to the thread goes through the backend and is followed by a full re-fetch:
/// the forest is never patched locally.
#[derive(Debug)]
pub struct CommentThread {
    hackathon: HackathonId,
    user: UserId,
    state: ThreadState,

    /// Generation of the latest started fetch
    generation: u64,
}

impl CommentThread {
    pub fn new(hackathon: HackathonId, user: UserId) -> CommentThread {
        CommentThread {
            hackathon,
            user,
            state: ThreadState::Idle,
            generation: 0,
        }
    }

    pub fn hackathon(&self) -> HackathonId {
        self.hackathon
    }

    pub fn state(&self) -> &ThreadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ThreadState::Loading { .. })
    }

    /// The forest to display, possibly stale while a re-fetch is in flight
    pub fn forest(&self) -> Option<&Arc<Forest>> {
        match &self.state {
            ThreadState::Loaded(f) => Some(f),
            ThreadState::Loading { previous } => previous.as_ref(),
            ThreadState::Idle | ThreadState::Failed(_) => None,
        }
    }

    /// Running total for the "Comments (N)" header
    pub fn total(&self) -> usize {
        self.forest().map(|f| count_all(f)).unwrap_or(0)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self.state {
            ThreadState::Failed(_) => Some(FETCH_FAILED_MESSAGE),
            _ => None,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        let previous = self.forest().cloned();
        tracing::info!(
            hackathon = ?self.hackathon,
            generation = self.generation,
            "fetching comments"
        );
        self.state = ThreadState::Loading { previous };
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Lands the result of a fetch, unless a more recent fetch was started since
    ///
    /// Returns whether the result was used.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        res: Result<Vec<CommentRecord>, Error>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                latest = self.generation,
                "ignoring result of outdated comment fetch"
            );
            return false;
        }
        self.state = match res {
            Ok(records) => {
                let forest = build_forest(records);
                tracing::info!(
                    hackathon = ?self.hackathon,
                    num_comments = forest.len(),
                    "loaded comments"
                );
                ThreadState::Loaded(Arc::new(forest))
            }
            Err(err) => {
                tracing::error!(hackathon = ?self.hackathon, ?err, "failed to fetch comments");
                ThreadState::Failed(err)
            }
        };
        true
    }

    /// Fetches the whole thread and rebuilds the forest from it
    pub async fn refresh<B: Backend + ?Sized>(&mut self, backend: &B) {
        let ticket = self.begin_fetch();
        let res = backend.fetch_comments(self.hackathon).await;
        self.complete_fetch(ticket, res);
    }

    /// Same as `refresh`, for the retry button of the failed state
    pub async fn retry<B: Backend + ?Sized>(&mut self, backend: &B) {
        self.refresh(backend).await
    }

    /// Sends a draft as a new comment or reply, then rebuilds the thread
    ///
    /// Drafts that would be refused are not sent. On failure, the draft keeps its content
    /// and gets an inline error; the thread itself is left untouched.
    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        draft: &mut Draft,
    ) -> Result<CommentRecord, Error> {
        let res = NewComment::new(self.hackathon, self.user, &draft.content, draft.parent_id);
        let comment = match res {
            Ok(c) => c,
            Err(e) => {
                draft.error = Some(e.to_string());
                return Err(e);
            }
        };
        let created = match backend.post_comment(comment).await {
            Ok(c) => c,
            Err(err) => {
                tracing::error!(hackathon = ?self.hackathon, ?err, "failed to post comment");
                draft.error = Some(String::from(SUBMIT_FAILED_MESSAGE));
                return Err(err);
            }
        };
        tracing::info!(id = ?created.id, parent = ?created.parent_id, "posted comment");
        draft.clear();
        self.refresh(backend).await;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::Author;

    #[derive(Default)]
    struct FakeBackend {
        comments: Mutex<Vec<CommentRecord>>,
        down: Mutex<bool>,
        posts: Mutex<usize>,
    }

    impl FakeBackend {
        fn set_down(&self, down: bool) {
            *self.down.lock().unwrap() = down;
        }

        fn check_up(&self) -> Result<(), Error> {
            match *self.down.lock().unwrap() {
                true => Err(Error::Unknown(String::from("backend is down"))),
                false => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn fetch_comments(&self, _: HackathonId) -> Result<Vec<CommentRecord>, Error> {
            self.check_up()?;
            Ok(self.comments.lock().unwrap().clone())
        }

        async fn post_comment(&self, c: NewComment) -> Result<CommentRecord, Error> {
            *self.posts.lock().unwrap() += 1;
            self.check_up()?;
            let mut comments = self.comments.lock().unwrap();
            let record = CommentRecord {
                id: CommentId(comments.len() as i64 + 1),
                content: c.content,
                author: Author {
                    id: c.user_id,
                    ..Author::default()
                },
                parent_id: c.parent_id,
                created_at: None,
            };
            comments.push(record.clone());
            Ok(record)
        }
    }

    fn run<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed initializing tokio runtime")
            .block_on(f)
    }

    fn thread() -> CommentThread {
        CommentThread::new(HackathonId(1), UserId(1))
    }

    #[test]
    fn loads_on_first_refresh() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            assert_eq!(t.state(), &ThreadState::Idle);
            assert_eq!(t.total(), 0);
            t.refresh(&backend).await;
            match t.state() {
                ThreadState::Loaded(f) => assert!(f.is_empty()),
                s => panic!("unexpected state {s:?}"),
            }
        })
    }

    #[test]
    fn submit_refetches_everything() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            t.refresh(&backend).await;

            let mut draft = Draft::top_level();
            draft.content = String::from("  first!  ");
            let created = t.submit(&backend, &mut draft).await.unwrap();
            assert_eq!(created.content, "first!");
            assert_eq!(draft, Draft::top_level());

            let mut reply = Draft::reply_to(created.id);
            reply.content = String::from("welcome");
            t.submit(&backend, &mut reply).await.unwrap();

            let forest = t.forest().unwrap();
            assert_eq!(t.total(), 2);
            let root = forest.roots().next().unwrap();
            assert_eq!(root.content(), "first!");
            assert_eq!(root.replies().next().unwrap().content(), "welcome");
        })
    }

    #[test]
    fn invalid_drafts_are_not_sent() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            t.refresh(&backend).await;

            let mut draft = Draft::top_level();
            draft.content = String::from("   ");
            assert_eq!(
                t.submit(&backend, &mut draft).await,
                Err(Error::EmptyContent)
            );
            assert!(draft.error.is_some());

            draft.content = "a".repeat(1001);
            assert_eq!(draft.char_count(), 1001);
            assert_eq!(
                t.submit(&backend, &mut draft).await,
                Err(Error::ContentTooLong(1001))
            );
            assert_eq!(draft.content.len(), 1001);
            assert_eq!(*backend.posts.lock().unwrap(), 0);
        })
    }

    #[test]
    fn failed_submit_keeps_draft() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            t.refresh(&backend).await;
            let before = t.state().clone();

            backend.set_down(true);
            let mut draft = Draft::top_level();
            draft.content = String::from("hello");
            assert!(t.submit(&backend, &mut draft).await.is_err());
            assert_eq!(draft.content, "hello");
            assert_eq!(draft.error.as_deref(), Some(SUBMIT_FAILED_MESSAGE));
            assert_eq!(t.state(), &before);

            backend.set_down(false);
            t.submit(&backend, &mut draft).await.unwrap();
            assert_eq!(draft.error, None);
            assert_eq!(t.total(), 1);
        })
    }

    #[test]
    fn failed_fetch_can_be_retried() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            backend.set_down(true);
            t.refresh(&backend).await;
            assert!(matches!(t.state(), ThreadState::Failed(_)));
            assert_eq!(t.error_message(), Some(FETCH_FAILED_MESSAGE));
            assert!(t.forest().is_none());
            let failed = t.state().clone();
            assert_eq!(&failed, t.state());

            backend.set_down(false);
            t.retry(&backend).await;
            assert!(matches!(t.state(), ThreadState::Loaded(_)));
            assert_eq!(t.error_message(), None);
        })
    }

    #[test]
    fn stale_fetches_are_ignored() {
        let rec = |id| CommentRecord {
            id: CommentId(id),
            content: String::new(),
            author: Author::default(),
            parent_id: None,
            created_at: None,
        };
        let mut t = thread();
        let slow = t.begin_fetch();
        let fast = t.begin_fetch();
        assert!(t.complete_fetch(fast, Ok(vec![rec(1), rec(2)])));
        assert!(!t.complete_fetch(slow, Ok(vec![rec(1)])));
        assert_eq!(t.total(), 2);
        assert!(!t.complete_fetch(slow, Err(Error::Unknown(String::new()))));
        assert!(matches!(t.state(), ThreadState::Loaded(_)));
    }

    #[test]
    fn previous_forest_stays_visible_while_loading() {
        let mut t = thread();
        let ticket = t.begin_fetch();
        assert!(t.is_loading());
        assert!(t.forest().is_none());
        t.complete_fetch(
            ticket,
            Ok(vec![CommentRecord {
                id: CommentId(1),
                content: String::from("x"),
                author: Author::default(),
                parent_id: None,
                created_at: None,
            }]),
        );
        let ticket = t.begin_fetch();
        assert!(t.is_loading());
        assert_eq!(t.total(), 1);
        t.complete_fetch(ticket, Ok(Vec::new()));
        assert_eq!(t.total(), 0);
    }

    #[test]
    fn concurrent_fetches_land_latest() {
        run(async {
            let backend = FakeBackend::default();
            let mut t = thread();
            let first = t.begin_fetch();
            let (a, b) = futures::join!(
                backend.fetch_comments(HackathonId(1)),
                async {
                    backend
                        .post_comment(NewComment::new(HackathonId(1), UserId(1), "late", None)?)
                        .await?;
                    backend.fetch_comments(HackathonId(1)).await
                }
            );
            let second = t.begin_fetch();
            assert!(t.complete_fetch(second, b));
            assert!(!t.complete_fetch(first, a));
            assert_eq!(t.total(), 1);
        })
    }
}
