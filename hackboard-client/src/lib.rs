mod aggregate;
pub use aggregate::{count_all, Walk};

mod backend;
pub use backend::Backend;

mod comment;
pub use comment::{Comment, CommentNode, NodeIdx};

mod forest;
pub use forest::{build_forest, try_build_forest, BuildError, Forest};

pub mod render;

mod thread;
pub use thread::{
    CommentThread, Draft, FetchTicket, ThreadState, FETCH_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE,
};

pub mod api {
    pub use hackboard_api::*;
}
