//! Ask whether to reboot after a kernel security update. Exit 0 means the
//! caller should reboot, exit 1 means the user skipped.

use anyhow::Result;
use clap::Parser;
use inithooks_core::Dialog;

const TEXT: &str = "A security update to the kernel requires a reboot to go into \
effect.

For maximum protection, we recommend rebooting now.
";

#[derive(Parser)]
#[command(
    name = "reboot-ask",
    version,
    about = "Reboot to install kernel upgrade"
)]
struct Cli {}

fn run() -> Result<i32> {
    let _ = Cli::parse();
    if !inithooks_core::is_interactive() {
        anyhow::bail!("stdin is not a terminal");
    }

    let d = Dialog::new("TurnKey GNU/Linux - Reboot after kernel update");
    let reboot = d.yesno("Reboot now?", TEXT, "Reboot", "Skip")?;

    Ok(if reboot { 0 } else { 1 })
}

fn main() {
    inithooks_cli::init_logging();
    inithooks_cli::ignore_sigint();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => inithooks_cli::fatal(e),
    }
}
