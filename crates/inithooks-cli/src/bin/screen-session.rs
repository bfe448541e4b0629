//! Run a command in a screen session. If the command is already running in
//! an existing session, attach to that session instead.

use anyhow::Result;
use clap::Parser;
use inithooks_cli::screen::{make_session_key, session_lookup};

#[derive(Parser)]
#[command(
    name = "screen-session",
    version,
    about = "Runs a command in a screen session",
    long_about = "Runs a command in a screen session.\n\nIf the command is \
already running in an existing screen session, attach to that session."
)]
struct Cli {
    /// Command (and arguments) to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let session_key = make_session_key(&cli.command);

    // screen -list exits non-zero when no sessions exist; only the output
    // matters here
    let listing = inithooks_cli::output_ignoring_status("screen", &["-list"])?;

    match session_lookup(&listing, &session_key)? {
        Some(session_id) => inithooks_cli::run("screen", &["-x", &session_id]),
        None => {
            let mut args = vec!["-S", session_key.as_str(), "--"];
            args.extend(cli.command.iter().map(String::as_str));
            inithooks_cli::run("screen", &args)
        }
    }
}

fn main() {
    inithooks_cli::init_logging();
    if let Err(e) = run() {
        inithooks_cli::fatal(e);
    }
}
