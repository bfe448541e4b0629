//! Set an account password, asking interactively when no flag is given.
//! The actual change is delegated to chpasswd(8).

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use clap::Parser;
use inithooks_core::Dialog;

#[derive(Parser)]
#[command(name = "setpass", version, about = "Set account password")]
struct Cli {
    /// Username of account to set password for
    username: String,

    /// If not provided, will ask interactively
    #[arg(short = 'p', long = "pass")]
    pass: Option<String>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn chpasswd(username: &str, password: &str) -> Result<()> {
    let mut child = Command::new("chpasswd")
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to run 'chpasswd'")?;

    // scope ends the pipe so chpasswd sees EOF
    {
        let stdin = child.stdin.as_mut().context("chpasswd stdin unavailable")?;
        write!(stdin, "{username}:{password}")?;
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("chpasswd failed (exit {:?})", status.code());
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let password = match cli.pass {
        Some(pass) => pass,
        None => {
            if !inithooks_core::is_interactive() {
                bail!("no --pass given and stdin is not a terminal");
            }
            let d = Dialog::new(inithooks_cli::BACKTITLE);
            d.get_password(
                &format!("{} Password", capitalize(&cli.username)),
                &format!(
                    "Please enter new password for the {} account.",
                    cli.username
                ),
                8,
                3,
                &[],
            )?
        }
    };

    chpasswd(&cli.username, &password)
}

fn main() {
    inithooks_cli::init_logging();
    inithooks_cli::ignore_sigint();
    if let Err(e) = run() {
        inithooks_cli::fatal(e);
    }
}
