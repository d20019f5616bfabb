mod atomic_write;
mod config;
mod plan;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use itertools::Itertools;
use story_reply_protocol::PeerId;
use story_reply_protocol::Recipient;
use story_reply_protocol::SendOptions;
use story_reply_protocol::StoryId;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigStore;
use crate::plan::PlanRequest;

#[derive(Parser, Debug)]
#[command(version, about = "Compose story replies and show what would be sent")]
struct Cli {
    /// Config file to use instead of `~/.story-reply/config.toml`.
    #[arg(long, env = "STORY_REPLY_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Run files through preparation, checks and grouping, and print the resulting sends as JSON.
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
struct PlanArgs {
    /// Id of the story's author, who receives the reply.
    #[arg(long)]
    recipient: u64,

    /// Id of the story being replied to.
    #[arg(long)]
    story: i32,

    #[arg(long, default_value = "")]
    caption: String,

    /// Send images as files instead of compressed photos.
    #[arg(long)]
    as_files: bool,

    /// Send every file on its own instead of grouping them.
    #[arg(long)]
    separate: bool,

    /// The recipient has slow mode applied.
    #[arg(long)]
    slowmode: bool,

    /// Use the premium upload limit.
    #[arg(long)]
    premium: bool,

    /// Unix time to schedule the reply at.
    #[arg(long)]
    scheduled: Option<i64>,

    /// Store the confirmed way as the default for later runs.
    #[arg(long)]
    remember_way: bool,

    /// Files (paths or `file://` URLs) to attach.
    #[arg(required = true)]
    inputs: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STORY_REPLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::new_default()?,
    };

    match cli.command {
        CliCommand::Plan(args) => run_plan_command(&store, args),
    }
}

fn run_plan_command(store: &ConfigStore, args: PlanArgs) -> anyhow::Result<()> {
    let config = store
        .reply_config()
        .with_context(|| format!("load {}", store.path().display()))?;

    let mut recipient = Recipient::new(PeerId(args.recipient), format!("user {}", args.recipient));
    recipient.slowmode_applied = args.slowmode;
    let request = PlanRequest {
        recipient,
        story: StoryId(args.story),
        caption: args.caption,
        inputs: args.inputs,
        override_send_images_as_photos: args.as_files.then_some(false),
        group_files: args.separate.then_some(false),
        premium: args.premium,
        options: SendOptions {
            scheduled: args.scheduled,
            ..Default::default()
        },
    };

    let report = plan::run_plan(request, config);
    let rendered = serde_json::to_string_pretty(&report).context("render plan")?;
    println!("{rendered}");

    if args.remember_way
        && let Some(way) = report.way
    {
        store
            .set_send_files_way(way)
            .with_context(|| format!("update {}", store.path().display()))?;
    }

    if report.dispatches.is_empty() {
        anyhow::bail!("nothing was sent: {}", report.notices.iter().join("; "));
    }
    Ok(())
}
