//! Build automation for the pooldb workspace.
//!
//! Run with `cargo xtask <command>`.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

/// Variables the live PostgreSQL tests read.
const LIVE_ENV: [&str; 3] = ["DB_URI", "DB_USER", "DB_PWD"];

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for pooldb")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Format check, clippy, tests and docs
    Ci,
    /// Run cargo fmt --check
    Fmt,
    /// Run clippy on every target, warnings denied
    Clippy,
    /// Run the offline test suite
    Test,
    /// Build documentation with warnings denied
    Doc,
    /// Run the ignored tests against a live PostgreSQL server
    Live,
    /// Fuzz the bind translator
    Fuzz {
        /// Seconds to run for
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    sh.change_dir(workspace_root()?);

    match cli.command {
        Command::Ci => {
            fmt(&sh)?;
            clippy(&sh)?;
            test(&sh)?;
            doc(&sh)?;
            println!("All CI checks passed!");
        }
        Command::Fmt => fmt(&sh)?,
        Command::Clippy => clippy(&sh)?,
        Command::Test => test(&sh)?,
        Command::Doc => doc(&sh)?,
        Command::Live => live(&sh)?,
        Command::Fuzz { seconds } => fuzz(&sh, seconds)?,
    }

    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("failed to run cargo locate-project")?;

    let manifest = String::from_utf8(output.stdout).context("invalid UTF-8 in cargo output")?;
    PathBuf::from(manifest.trim())
        .parent()
        .map(PathBuf::from)
        .context("failed to get workspace root")
}

fn fmt(sh: &Shell) -> Result<()> {
    println!("Checking formatting...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    println!("Running clippy...");
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("Running tests...");
    cmd!(sh, "cargo test --workspace").run()?;
    Ok(())
}

fn doc(sh: &Shell) -> Result<()> {
    println!("Generating documentation...");
    let _rustdocflags = sh.push_env("RUSTDOCFLAGS", "-D warnings");
    cmd!(sh, "cargo doc --workspace --no-deps").run()?;
    Ok(())
}

fn live(sh: &Shell) -> Result<()> {
    let missing: Vec<&str> = LIVE_ENV
        .into_iter()
        .filter(|key| sh.var(key).unwrap_or_default().trim().is_empty())
        .collect();
    ensure!(
        missing.is_empty(),
        "live tests need {} to be set",
        missing.join(", ")
    );

    println!("Running live PostgreSQL tests...");
    cmd!(sh, "cargo test -p pooldb-postgres --test live -- --ignored").run()?;
    Ok(())
}

fn fuzz(sh: &Shell, seconds: u64) -> Result<()> {
    println!("Fuzzing translate for {seconds}s...");
    let _dir = sh.push_dir("fuzz");
    let max_time = format!("-max_total_time={seconds}");
    cmd!(sh, "cargo +nightly fuzz run translate -- {max_time}").run()?;
    Ok(())
}
