use anyhow::Context as _;
use clap::Args;

use super::find_lesson;
use crate::db::SqliteLessonStore;
use crate::lesson::{encode_lesson_token, share_link};

#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Id of the lesson to share
    pub id: String,

    /// Address of the app that opens shared lessons
    #[arg(long, env = "KOTOBA_SHARE_BASE_URL", default_value = "https://kotoba.app/")]
    pub base_url: String,

    /// Print only the token instead of a full link
    #[arg(long)]
    pub token_only: bool,
}

pub async fn run(args: ShareArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let lesson = find_lesson(store, &args.id).await?;

    let output = if args.token_only {
        encode_lesson_token(&lesson).context("Failed to encode lesson")?
    } else {
        share_link(&args.base_url, &lesson).context("Failed to build share link")?
    };

    println!("{}", output);
    Ok(())
}
