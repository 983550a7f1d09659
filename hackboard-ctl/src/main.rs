use anyhow::Context;
use hackboard_client::{
    api::{CommentId, HackathonId, UserId},
    build_forest, render, try_build_forest, Backend, CommentThread, Draft,
};

mod api;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Backend base url, defaults to the HACKBOARD_HOST environment variable
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the comment thread of a hackathon
    List {
        hackathon: i64,

        /// Refuse threads where the same comment id shows up twice
        #[structopt(long)]
        strict: bool,
    },

    /// Post a top-level comment
    Post {
        hackathon: i64,

        /// Id of the commenting user
        #[structopt(short, long)]
        user: i64,

        content: String,
    },

    /// Reply to an existing comment
    Reply {
        hackathon: i64,

        /// Id of the commenting user
        #[structopt(short, long)]
        user: i64,

        /// Id of the comment being replied to
        parent: i64,

        content: String,
    },
}

fn host(opt: Option<String>) -> anyhow::Result<String> {
    match opt {
        Some(h) => Ok(h),
        None => std::env::var("HACKBOARD_HOST")
            .context("retrieving HACKBOARD_HOST environment variable, as no --host was given"),
    }
}

async fn submit(
    backend: &api::HttpBackend,
    hackathon: i64,
    user: i64,
    mut draft: Draft,
) -> anyhow::Result<()> {
    let mut thread = CommentThread::new(HackathonId(hackathon), UserId(user));
    let created = thread
        .submit(backend, &mut draft)
        .await
        .with_context(|| draft.error.clone().unwrap_or_default())?;
    tracing::info!(id = ?created.id, "comment posted");
    match thread.forest() {
        Some(forest) => print!("{}", render::render_text(forest)),
        None => anyhow::bail!(
            "comment #{} was posted, but: {}",
            created.id.0,
            thread.error_message().unwrap_or_default()
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let backend = api::HttpBackend::new(host(opt.host)?);

    match opt.cmd {
        Command::List { hackathon, strict } => {
            let records = backend
                .fetch_comments(HackathonId(hackathon))
                .await
                .context("fetching comments")?;
            let forest = match strict {
                true => try_build_forest(records).context("building comment tree")?,
                false => build_forest(records),
            };
            if !forest.dropped().is_empty() {
                tracing::warn!(dropped = ?forest.dropped(), "some replies have no visible parent");
            }
            print!("{}", render::render_text(&forest));
        }
        Command::Post {
            hackathon,
            user,
            content,
        } => {
            let mut draft = Draft::top_level();
            draft.content = content;
            submit(&backend, hackathon, user, draft).await?;
        }
        Command::Reply {
            hackathon,
            user,
            parent,
            content,
        } => {
            let mut draft = Draft::reply_to(CommentId(parent));
            draft.content = content;
            submit(&backend, hackathon, user, draft).await?;
        }
    }

    Ok(())
}
