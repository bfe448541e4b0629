//! Ask whether to install the latest security updates right now. Daily
//! automatic updates are configured regardless; this only covers the window
//! between image build and first boot.

use anyhow::Result;
use clap::Parser;
use inithooks_core::{Dialog, InitLog, LogLevel};

const TEXT: &str = "By default, this system is configured to automatically install \
security updates on a daily basis:

https://www.turnkeylinux.org/security-updates

For maximum protection, we also recommend installing the latest security updates \
right now.

This can take a few minutes. You need to be online.
";

const CONNECTIVITY_ERROR: &str = "Unable to connect to package archive.

Please try again once your network settings are configured by using the following \
shell command:

    turnkey-install-security-updates
";

#[derive(Parser)]
#[command(name = "secupdates-ask", version, about = "Install security updates")]
struct Cli {}

fn run() -> Result<i32> {
    let _ = Cli::parse();
    if !inithooks_core::is_interactive() {
        anyhow::bail!("stdin is not a terminal");
    }
    let log = InitLog::new("secupdates");

    let d = Dialog::new(inithooks_cli::BACKTITLE);
    let install = d.yesno("Security updates", TEXT, "Install", "Skip")?;

    if !install {
        let _ = log.write("security updates skipped", LogLevel::Info);
        return Ok(1);
    }

    if inithooks_cli::check_output("host", &["-W", "2", "archive.turnkeylinux.org"]).is_err() {
        d.error(CONNECTIVITY_ERROR)?;
        let _ = log.write("package archive unreachable", LogLevel::Warn);
        return Ok(1);
    }

    d.infobox("Installing security updates...")?;
    if let Err(e) = inithooks_cli::run("turnkey-install-security-updates", &[]) {
        d.error(&format!("Security update installation failed.\n\n{e}"))?;
        let _ = log.write("security update installation failed", LogLevel::Err);
        return Ok(1);
    }

    let _ = log.write("security updates installed", LogLevel::Info);
    Ok(0)
}

fn main() {
    inithooks_cli::init_logging();
    inithooks_cli::ignore_sigint();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => inithooks_cli::fatal(e),
    }
}
