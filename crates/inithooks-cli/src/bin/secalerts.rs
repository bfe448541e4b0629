//! Enable system alerts and notifications: forward root@localhost mail to a
//! real inbox and sign up for the security announcements list. The actual
//! mail configuration is done by the secalerts.sh helper installed next to
//! this binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use inithooks_core::{Dialog, InputResult, EMAIL_RE};

const TITLE: &str = "System Notifications and Critical Security Alerts";

const TEXT: &str = "Enable local system notifications (root@localhost) to be \
forwarded to your regular inbox. These will include details about auto security \
updates and system messages.

Enabling this option will also sign you up to receive critical security and bug \
alerts via TurnKey's low-traffic Security and News announcements newsletter. You \
can unsubscribe at any time.

https://www.turnkeylinux.org/security-alerts

Email:
";

#[derive(Parser)]
#[command(
    name = "secalerts",
    version,
    about = "Enable system alerts and notifications"
)]
struct Cli {
    /// If not provided, will ask interactively
    #[arg(long)]
    email: Option<String>,

    /// Placeholder when asking interactively
    #[arg(long = "email-placeholder", default_value = "")]
    email_placeholder: String,
}

fn helper_script() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate own binary")?;
    let dir = exe.parent().context("binary has no parent directory")?;
    Ok(dir.join("secalerts.sh"))
}

fn ask(placeholder: &str) -> Result<String> {
    let d = Dialog::new(inithooks_cli::BACKTITLE);
    let mut email = placeholder.to_string();
    loop {
        email = match d.inputbox(TITLE, TEXT, &email, "Enable", "Skip")? {
            InputResult::Value(value) => value,
            InputResult::Cancelled => return Ok(String::new()),
        };

        if !EMAIL_RE.is_match(&email) {
            d.error("Email is not valid")?;
            continue;
        }

        if d.yesno("Is your email correct?", &email, "Yes", "No")? {
            return Ok(email);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(email) = &cli.email {
        if !EMAIL_RE.is_match(email) {
            anyhow::bail!("email is not valid");
        }
    }

    let email = match cli.email {
        Some(email) => email,
        None => {
            if !inithooks_core::is_interactive() {
                anyhow::bail!("no --email given and stdin is not a terminal");
            }
            ask(&cli.email_placeholder)?
        }
    };

    if !email.is_empty() {
        let script = helper_script()?;
        inithooks_cli::run(&script.to_string_lossy(), &[&email])?;
    }

    Ok(())
}

fn main() {
    inithooks_cli::init_logging();
    inithooks_cli::ignore_sigint();
    if let Err(e) = run() {
        inithooks_cli::fatal(e);
    }
}
