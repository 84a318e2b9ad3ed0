use anyhow::Context as _;
use clap::Args;

use crate::db::SqliteLessonStore;

#[derive(Args, Debug)]
pub struct CrystalsArgs {
    /// Crystals to add to the tally
    #[arg(long)]
    pub add: Option<i64>,
}

pub async fn run(args: CrystalsArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let total = match args.add {
        Some(amount) => store.add_crystals(amount).await,
        None => store.get_crystals().await,
    }
    .context("Failed to read crystal tally")?;

    println!("💎 {} crystals", total);
    Ok(())
}
