use std::fmt::Write;

use crate::{
    api::{Author, CommentRecord},
    count_all, Forest,
};

const INDENT: &str = "  ";
const NO_COMMENTS: &str = "No comments yet. Be the first to comment!";
const NO_AVATAR: &str = "?";

/// Avatar fallback: the upper-cased first letter of each word
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// What goes in the avatar slot: initials of the display name, or a placeholder without one
pub fn avatar(author: &Author) -> String {
    match initials(&author.name) {
        i if i.is_empty() => String::from(NO_AVATAR),
        i => i,
    }
}

pub fn timestamp_label(record: &CommentRecord) -> String {
    match (&record.created_at, record.created_at()) {
        (None, _) => String::from("Just now"),
        (Some(_), Some(t)) => t.format("%b %-d, %Y, %I:%M %p").to_string(),
        // Unparseable timestamps are better shown raw than not at all
        (Some(raw), None) => raw.clone(),
    }
}

pub fn replies_label(count: usize) -> String {
    match count {
        1 => String::from("1 reply"),
        n => format!("{n} replies"),
    }
}

/// Renders a whole thread as indented plain text, each reply one level deeper than its parent
pub fn render_text(forest: &Forest) -> String {
    let mut res = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(res, "Comments ({})", count_all(forest));
    if forest.is_empty() {
        let _ = writeln!(res, "{NO_COMMENTS}");
        return res;
    }
    for (depth, n) in forest.walk() {
        let indent = INDENT.repeat(depth);
        let author = n.author().label();
        let _ = writeln!(
            res,
            "{indent}[{}] {author} ({}) #{}",
            avatar(n.author()),
            timestamp_label(n.record()),
            n.id().0,
        );
        for line in n.content().lines() {
            let _ = writeln!(res, "{indent}{INDENT}{line}");
        }
        if n.has_replies() {
            let _ = writeln!(res, "{indent}{INDENT}{}", replies_label(n.reply_count()));
        }
    }
    res
}
