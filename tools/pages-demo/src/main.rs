//! Pages demo
//!
//! Drives a page switcher from a JSON script and prints every page change
//! as a JSON line.

mod runner;
mod script;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runner::Runner;
use script::Script;

#[derive(Parser, Debug)]
#[command(name = "pages-demo", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a script.
    Run(RunArgs),
    /// Parse a script and list its steps without playing it.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Script JSON.
    script: PathBuf,

    /// Disable segues regardless of the script config.
    #[arg(long, default_value_t = false)]
    no_animations: bool,

    /// Discard pages when they are hidden regardless of the script config.
    #[arg(long, default_value_t = false)]
    restamp: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Script JSON.
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut script = Script::from_path(&args.script)?;
    script.config.no_animations |= args.no_animations;
    script.config.restamp |= args.restamp;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build runtime")?;
    let local = tokio::task::LocalSet::new();

    let outcomes = local.block_on(&runtime, async {
        let runner = Runner::new(&script, true);
        runner.run(&script.steps).await
    })?;

    let skipped = outcomes.iter().filter(|o| !o.change.started()).count();
    eprintln!(
        "{} page changes, {} skipped, {} canceled",
        outcomes.len(),
        skipped,
        outcomes.iter().filter(|o| o.change.canceled() == Some(true)).count()
    );
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = Script::from_path(&args.script)?;
    eprintln!(
        "{}: {} templates, {} steps",
        args.script.display(),
        script.templates.len(),
        script.steps.len()
    );
    for (index, step) in script.steps.iter().enumerate() {
        println!("{index:>3} {step:?}");
    }
    Ok(())
}
