//! Shared plumbing for the first-boot wizard binaries: logging setup, SIGINT
//! handling, and the shell-out helpers every hook uses.

#![allow(unsafe_code)] // signal(2) registration below

use anyhow::{bail, Context, Result};
use nix::sys::signal::{signal, SigHandler, Signal};
use std::process::{Command, Stdio};

pub mod screen;

/// Back-title shown on every first-boot dialog.
pub const BACKTITLE: &str = "TurnKey GNU/Linux - First boot configuration";

/// Initialize logging the same way for every hook: `RUST_LOG` wins, default
/// `info`, `DIALOG_DEBUG` raises everything to debug.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        let level = if std::env::var("DIALOG_DEBUG").is_ok() {
            "debug"
        } else {
            "info"
        };
        std::env::set_var("RUST_LOG", level);
    }
    env_logger::init();
}

/// The first-boot console must not be killable mid-wizard; a half-set
/// password is worse than a repeated prompt.
pub fn ignore_sigint() {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigIgn);
    }
}

/// Run a command, capturing combined output; non-zero exit is an error
/// carrying whatever the command printed.
pub fn check_output(program: &str, args: &[&str]) -> Result<String> {
    tracing::debug!(program, ?args, "check_output");
    let output = Command::new(program)
        .args(args)
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .with_context(|| format!("failed to run '{program}'"))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        bail!("'{program}' failed (exit {:?}):\n{text}", output.status.code());
    }
    Ok(text)
}

/// Like [`check_output`] but the exit status is ignored, for tools (screen
/// -list among them) that exit non-zero on benign conditions.
pub fn output_ignoring_status(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .with_context(|| format!("failed to run '{program}'"))?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}

/// Run a command inheriting the console, for tools with their own output.
pub fn run(program: &str, args: &[&str]) -> Result<()> {
    tracing::debug!(program, ?args, "run");
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to run '{program}'"))?;
    if !status.success() {
        bail!("'{program}' failed (exit {:?})", status.code());
    }
    Ok(())
}

/// Print `Error: <msg>` and exit 1, the contract every hook shares.
pub fn fatal(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}
