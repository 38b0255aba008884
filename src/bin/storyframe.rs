use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "storyframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a story script headlessly on virtual time.
    Play(PlayArgs),
    /// Print a persisted choice.
    Choice(ChoiceArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Story script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Write the final frame as a PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ChoiceArgs {
    /// Choice document.
    #[arg(long, default_value = storyframe::store::choice::DEFAULT_STORE_FILE)]
    store: PathBuf,

    /// Story id; omit for the last menu choice.
    #[arg(long)]
    id: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Choice(args) => cmd_choice(args),
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut script = storyframe::Script::from_path(&args.script)
        .with_context(|| format!("load script '{}'", args.script.display()))?;
    if let Some(out) = &args.out {
        let out = std::path::absolute(out)
            .with_context(|| format!("resolve output path '{}'", out.display()))?;
        script.steps.push(storyframe::script::ScriptStep::Snapshot(out));
    }

    let base = args.script.parent().unwrap_or_else(|| Path::new("."));
    let report = script.run(base).context("run script")?;

    for c in &report.choices {
        println!("{}", c.choice);
    }
    for shot in &report.snapshots {
        eprintln!("wrote {}", shot.display());
    }
    eprintln!("elapsed {} ms", report.elapsed.as_millis());
    Ok(())
}

fn cmd_choice(args: ChoiceArgs) -> anyhow::Result<()> {
    let store = storyframe::ChoiceStore::new(&args.store);
    let record = store
        .try_load()
        .with_context(|| format!("read choice store '{}'", args.store.display()))?;
    match record.lookup(args.id.as_deref()) {
        Some(choice) => {
            println!("{choice}");
            Ok(())
        }
        None => anyhow::bail!(
            "no choice recorded{}",
            args.id
                .as_deref()
                .map(|id| format!(" for id '{id}'"))
                .unwrap_or_default()
        ),
    }
}
