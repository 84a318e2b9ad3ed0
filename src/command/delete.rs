use anyhow::{Context as _, bail};
use clap::Args;
use tracing::info;

use crate::db::{LessonStore, SqliteLessonStore};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Id of the lesson to delete
    pub id: String,
}

pub async fn run(args: DeleteArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let removed = store
        .remove_by_id(&args.id)
        .await
        .context("Failed to delete lesson")?;

    if !removed {
        bail!("No lesson with id {}", args.id);
    }

    info!("Deleted lesson {}", args.id);
    println!("🗑️ Deleted lesson {}", args.id);
    Ok(())
}
