#![cfg(test)]

use std::panic::AssertUnwindSafe;

use hackboard_client::{
    api::{Author, CommentId, CommentRecord, Error, HackathonId, NewComment, UserId},
    count_all, render, CommentThread, Draft, ThreadState,
};

use crate::*;

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            if std::env::var("RUST_LOG").is_ok() {
                let _ = tracing_subscriber::fmt::try_init();
            }
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed initializing tokio runtime")
        .block_on(f)
}

/// A server with two users and two hackathons
fn setup() -> (SharedMockServer, HackathonId, HackathonId, UserId, UserId) {
    let mut s = MockServer::new();
    let ada = s.add_user(String::from("Ada Lovelace"), String::from("ada@example.com"));
    let bob = s.add_user(String::new(), String::from("bob@example.com"));
    let h1 = s.add_hackathon(String::from("Spring Hack"));
    let h2 = s.add_hackathon(String::from("Autumn Hack"));
    (SharedMockServer::new(s), h1, h2, ada, bob)
}

#[test]
fn post_checks_references() {
    let (server, h1, h2, ada, _) = setup();
    let mut s = block_on(server.0.lock());
    let new = |h, u, p| NewComment {
        hackathon_id: h,
        user_id: u,
        content: String::from("hi"),
        parent_id: p,
    };

    assert_eq!(
        s.post_comment(new(HackathonId(42), ada, None)),
        Err(Error::HackathonNotFound(HackathonId(42)))
    );
    assert_eq!(
        s.post_comment(new(h1, UserId(42), None)),
        Err(Error::UserNotFound(UserId(42)))
    );
    assert_eq!(
        s.post_comment(new(h1, ada, Some(CommentId(42)))),
        Err(Error::ParentNotFound(CommentId(42)))
    );
    let top = s.post_comment(new(h1, ada, None)).unwrap();
    assert_eq!(top.author.name, "Ada Lovelace");
    assert!(top.created_at().is_some());
    assert_eq!(
        s.post_comment(new(h2, ada, Some(top.id))),
        Err(Error::ParentInOtherHackathon(top.id))
    );
    let mut empty = new(h1, ada, None);
    empty.content = String::from("  ");
    assert_eq!(s.post_comment(empty), Err(Error::EmptyContent));

    assert_eq!(s.test_num_comments(h1), 1);
    assert_eq!(s.test_num_comments(h2), 0);
    assert_eq!(
        s.fetch_comments(HackathonId(42)),
        Err(Error::HackathonNotFound(HackathonId(42)))
    );
}

#[test]
fn conversation_between_two_users() {
    let (server, h1, h2, ada, bob) = setup();
    block_on(async move {
        let mut ada_view = CommentThread::new(h1, ada);
        let mut bob_view = CommentThread::new(h1, bob);
        ada_view.refresh(&server).await;
        bob_view.refresh(&server).await;
        assert_eq!(ada_view.total(), 0);

        let mut draft = Draft::top_level();
        draft.content = String::from("Who wants to team up?");
        let question = ada_view.submit(&server, &mut draft).await.unwrap();

        // Bob only sees it after his own refresh
        assert_eq!(bob_view.total(), 0);
        bob_view.refresh(&server).await;
        assert_eq!(bob_view.total(), 1);

        let mut reply = Draft::reply_to(question.id);
        reply.content = String::from("Me!");
        bob_view.submit(&server, &mut reply).await.unwrap();
        let mut other = Draft::top_level();
        other.content = String::from("Is there a theme?");
        bob_view.submit(&server, &mut other).await.unwrap();

        ada_view.refresh(&server).await;
        let forest = ada_view.forest().unwrap();
        assert_eq!(count_all(forest), 3);
        let roots = forest.roots().map(|r| r.content()).collect::<Vec<_>>();
        assert_eq!(roots, vec!["Who wants to team up?", "Is there a theme?"]);
        let answer = forest.get(question.id).unwrap().replies().next().unwrap();
        assert_eq!(answer.author().label(), "bob@example.com");

        let text = render::render_text(forest);
        assert!(text.starts_with("Comments (3)\n"));
        assert!(text.contains("\n  [?] bob@example.com ("));

        // The other hackathon is untouched
        let mut elsewhere = CommentThread::new(h2, ada);
        elsewhere.refresh(&server).await;
        assert_eq!(elsewhere.total(), 0);
    })
}

#[test]
fn outage_keeps_draft_and_recovers() {
    let (server, h1, _, ada, _) = setup();
    block_on(async move {
        let mut view = CommentThread::new(h1, ada);
        server.0.lock().await.set_down(true);
        view.refresh(&server).await;
        assert!(matches!(view.state(), ThreadState::Failed(_)));

        let mut draft = Draft::top_level();
        draft.content = String::from("anyone there?");
        assert!(view.submit(&server, &mut draft).await.is_err());
        assert_eq!(draft.content, "anyone there?");
        assert_eq!(server.0.lock().await.test_num_comments(h1), 0);

        server.0.lock().await.set_down(false);
        view.retry(&server).await;
        assert!(matches!(view.state(), ThreadState::Loaded(_)));
        view.submit(&server, &mut draft).await.unwrap();
        assert!(draft.content.is_empty());
        assert_eq!(view.total(), 1);
    })
}

#[test]
fn raw_records_with_missing_parents_are_hidden() {
    let (server, h1, _, ada, _) = setup();
    block_on(async move {
        {
            let mut s = server.0.lock().await;
            let rec = |id, parent: Option<i64>| CommentRecord {
                id: CommentId(id),
                content: format!("raw {id}"),
                author: Author::default(),
                parent_id: parent.map(CommentId),
                created_at: None,
            };
            s.test_insert_raw(h1, rec(10, Some(11)));
            s.test_insert_raw(h1, rec(11, None));
            s.test_insert_raw(h1, rec(12, Some(99)));
        }
        let mut view = CommentThread::new(h1, ada);
        view.refresh(&server).await;
        let forest = view.forest().unwrap();
        assert_eq!(view.total(), 2);
        assert_eq!(forest.dropped(), &[CommentId(12)]);
        assert_eq!(
            forest.get(CommentId(11)).unwrap().reply_ids(),
            vec![CommentId(10)]
        );

        // Server-assigned ids continue after the raw ones
        let mut draft = Draft::reply_to(CommentId(10));
        draft.content = String::from("deeper");
        let created = view.submit(&server, &mut draft).await.unwrap();
        assert_eq!(created.id, CommentId(13));
        assert_eq!(view.forest().unwrap().max_depth(), 3);
    })
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    Post {
        as_bob: bool,
        #[generator(bolero::generator::gen_with::<String>().len(0..20usize))]
        content: String,
        /// Index into the comments seen so far, if replying
        reply_to: Option<usize>,
    },
    Refresh,
    SetDown(bool),
}

do_tokio_test!(fuzz_update_loop, Vec<FuzzOp>, |ops: Vec<FuzzOp>| async move {
    let (server, h1, _, ada, bob) = setup();
    let mut views = [CommentThread::new(h1, ada), CommentThread::new(h1, bob)];
    let mut posted = Vec::new();
    for op in ops {
        match op {
            FuzzOp::Post {
                as_bob,
                content,
                reply_to,
            } => {
                let view = &mut views[as_bob as usize];
                let parent = match reply_to {
                    Some(i) if !posted.is_empty() => Some(posted[i % posted.len()]),
                    _ => None,
                };
                let mut draft = Draft {
                    parent_id: parent,
                    content: content.clone(),
                    error: None,
                };
                match view.submit(&server, &mut draft).await {
                    Ok(c) => {
                        assert!(draft.content.is_empty());
                        assert_eq!(c.parent_id, parent);
                        posted.push(c.id);
                    }
                    Err(_) => assert_eq!(draft.content, content),
                }
            }
            FuzzOp::Refresh => {
                for v in views.iter_mut() {
                    v.refresh(&server).await;
                }
            }
            FuzzOp::SetDown(down) => server.0.lock().await.set_down(down),
        }

        // Whatever a view shows is consistent with the server's state at the time
        for v in views.iter() {
            if let Some(forest) = v.forest() {
                assert!(forest.dropped().is_empty());
                assert!(forest.duplicates().is_empty());
                assert_eq!(count_all(forest), forest.len());
                assert!(forest.len() <= posted.len());
                for (_, n) in forest.walk() {
                    for r in n.replies() {
                        assert_eq!(r.record().parent_id, Some(n.id()));
                    }
                }
            }
        }
    }
    server.0.lock().await.set_down(false);
    for v in views.iter_mut() {
        v.refresh(&server).await;
        assert_eq!(v.total(), posted.len());
    }
});
