//! Prints a JSON array of flat comment records, suitable for feeding a mock backend

use chrono::{Duration, Utc};
use hackboard_api::{Author, CommentId, CommentRecord, UserId};
use rand::Rng;

const NUM_USERS: usize = 5;

const NUM_COMMENTS: usize = 200;
const COMMENT_MIN_WORDS: usize = 3;
const COMMENT_MAX_WORDS: usize = 40;

// Probability that a comment answers an earlier one instead of starting a new thread
const REPLY_PROBABILITY: f64 = 0.7;
// Probability that a reply points to a comment that is not part of the output
const DANGLING_PROBABILITY: f64 = 0.02;

fn gen_user(i: usize) -> Author {
    let name = lipsum::lipsum_words(2);
    Author {
        id: UserId(i as i64 + 1),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        // Some users never set a display name
        name: match i % 4 {
            3 => String::new(),
            _ => name,
        },
    }
}

fn main() {
    let mut rng = rand::thread_rng();

    let users = (0..NUM_USERS).map(gen_user).collect::<Vec<_>>();

    let mut comments: Vec<CommentRecord> = Vec::with_capacity(NUM_COMMENTS);
    let mut time = Utc::now() - Duration::days(7);
    for i in 0..NUM_COMMENTS {
        let id = CommentId(i as i64 + 1);
        let parent_id = match comments.is_empty() || !rng.gen_bool(REPLY_PROBABILITY) {
            true => None,
            false if rng.gen_bool(DANGLING_PROBABILITY) => Some(CommentId(-id.0)),
            false => Some(comments[rng.gen_range(0..comments.len())].id),
        };
        time = time + Duration::minutes(rng.gen_range(1..120));
        comments.push(CommentRecord {
            id,
            content: lipsum::lipsum_words(rng.gen_range(COMMENT_MIN_WORDS..=COMMENT_MAX_WORDS)),
            author: users[rng.gen_range(0..users.len())].clone(),
            parent_id,
            created_at: Some(time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        });
    }

    match serde_json::to_string_pretty(&comments) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed serializing comments: {e}"),
    }
}
