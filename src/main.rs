use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod audio;
mod codec;
mod command;
mod config;
mod db;
mod generate;
mod lesson;

use command::{
    crystals::CrystalsArgs, delete::DeleteArgs, export_audio::ExportAudioArgs,
    generate::GenerateArgs, import::ImportArgs, list::ListArgs, share::ShareArgs,
};
use db::SqliteLessonStore;

/// Illustrated, narrated Japanese vocabulary lessons for children
#[derive(Parser, Debug)]
#[command(name = "kotoba", version, about)]
struct Cli {
    /// SQLite database holding the lesson collection
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:data/kotoba.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new lesson from a list of Japanese words
    Generate(GenerateArgs),
    /// List saved lessons
    List(ListArgs),
    /// Delete a saved lesson
    Delete(DeleteArgs),
    /// Print a share link for a lesson
    Share(ShareArgs),
    /// Import a lesson from a share link or token
    Import(ImportArgs),
    /// Write a lesson's narrations as WAV files
    ExportAudio(ExportAudioArgs),
    /// Show or add to the crystal tally
    Crystals(CrystalsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let store = SqliteLessonStore::connect(&cli.database_url)
        .await
        .context("Failed to initialize database")?;

    match cli.command {
        Command::Generate(args) => command::generate::run(args, &store).await,
        Command::List(args) => command::list::run(args, &store).await,
        Command::Delete(args) => command::delete::run(args, &store).await,
        Command::Share(args) => command::share::run(args, &store).await,
        Command::Import(args) => command::import::run(args, &store).await,
        Command::ExportAudio(args) => command::export_audio::run(args, &store).await,
        Command::Crystals(args) => command::crystals::run(args, &store).await,
    }
}
