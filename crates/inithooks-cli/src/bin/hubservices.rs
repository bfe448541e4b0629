//! Initialize Hub services (TKLBAM, HubDNS): link backups to the TurnKey Hub
//! with an API key, then optionally assign a dynamic DNS hostname. The heavy
//! lifting is done by tklbam-init / hubdns-init / hubdns-update; this wizard
//! only collects the inputs and reports the outcomes.

use anyhow::Result;
use clap::Parser;
use inithooks_core::{Dialog, InputResult};

const TEXT_SERVICES: &str = "1) TurnKey Backup and Migration: saves changes to files,
   databases and package management to encrypted storage
   which servers can be automatically restored from.
   https://www.turnkeylinux.org/tklbam

2) TurnKey Domain Management and Dynamic DNS:
   https://www.turnkeylinux.org/dns

You can start using these services immediately if you initialize now. Or you can \
do this manually later (e.g., from the command line / Webmin)

API Key: (see https://hub.turnkeylinux.org/profile)
";

const TEXT_HUBDNS: &str = "TurnKey supports dynamic DNS configuration, powered by \
Amazon Route 53, a robust cloud DNS service: https://www.turnkeylinux.org/dns

You can assign a hostname under:

1) Any custom domain you are managing with the Hub.
   For example: myhostname.mydomain.com

2) The tklapp.com domain, if the hostname is untaken.
   For example: myhostname.tklapp.com

Set hostname (or press Enter to skip):
";

const SUCCESS_TKLBAM: &str = "Now that TKLBAM is initialized, you can backup using \
the following shell command (no arguments required):

    tklbam-backup

You can enable daily automatic backup updates with this command:

    chmod +x /etc/cron.daily/tklbam-backup

Documentation: https://www.turnkeylinux.org/tklbam
Manage your backups: https://hub.turnkeylinux.org
";

const SUCCESS_HUBDNS: &str = "You can enable hourly automatic updates with this \
command:

    chmod +x /etc/cron.hourly/hubdns-update

Documentation: https://www.turnkeylinux.org/dns
Manage your hostnames: https://hub.turnkeylinux.org
";

const CONNECTIVITY_ERROR: &str = "Unable to connect to the Hub.

Please try again once your network settings are configured, either via the Webmin \
interface, or by using the following shell commands:

    tklbam-init APIKEY

    hubdns-init APIKEY FQDN
    hubdns-update
";

#[derive(Parser)]
#[command(
    name = "hubservices",
    version,
    about = "Initialize Hub Services (TKLBAM, HubDNS)"
)]
struct Cli {
    /// If not provided, will ask interactively
    #[arg(long)]
    apikey: Option<String>,

    /// If not provided, will ask interactively
    #[arg(long)]
    fqdn: Option<String>,
}

fn noninteractive(apikey: &str, fqdn: Option<&str>) -> Result<()> {
    inithooks_cli::run("tklbam-init", &[apikey])?;
    if let Some(fqdn) = fqdn {
        inithooks_cli::run("hubdns-init", &[apikey, fqdn])?;
        inithooks_cli::run("hubdns-update", &[])?;
    }
    Ok(())
}

fn init_tklbam(d: &Dialog, mut apikey: String) -> Result<Option<String>> {
    loop {
        apikey = match d.inputbox(
            "Initialize Hub services",
            TEXT_SERVICES,
            &apikey,
            "Apply",
            "Skip",
        )? {
            InputResult::Value(key) => key,
            InputResult::Cancelled => return Ok(None),
        };

        d.infobox("Linking TKLBAM to the TurnKey Hub...")?;

        if inithooks_cli::check_output("host", &["-W", "2", "hub.turnkeylinux.org"]).is_err() {
            d.error(CONNECTIVITY_ERROR)?;
            return Ok(None);
        }

        match inithooks_cli::check_output("tklbam-init", &[&apikey]) {
            Ok(_) => {
                d.msgbox("Success! Linked TKLBAM to Hub", SUCCESS_TKLBAM)?;
                return Ok(Some(apikey));
            }
            Err(e) => {
                d.msgbox("Failure", &e.to_string())?;
                continue;
            }
        }
    }
}

fn init_hubdns(d: &Dialog, apikey: &str, mut fqdn: String) -> Result<()> {
    loop {
        fqdn = match d.inputbox(
            "Assign TurnKey DNS hostname",
            TEXT_HUBDNS,
            &fqdn,
            "Apply",
            "Skip",
        )? {
            InputResult::Value(fqdn) => fqdn,
            InputResult::Cancelled => return Ok(()),
        };

        d.infobox("Linking HubDNS to the TurnKey Hub...")?;

        let result = inithooks_cli::check_output("hubdns-init", &[apikey, &fqdn])
            .and_then(|_| inithooks_cli::check_output("hubdns-update", &[]));
        match result {
            Ok(_) => {
                d.msgbox(&format!("Success! Assigned {fqdn}"), SUCCESS_HUBDNS)?;
                return Ok(());
            }
            Err(e) => {
                d.msgbox("Failure", &e.to_string())?;
                continue;
            }
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(apikey) = &cli.apikey {
        return noninteractive(apikey, cli.fqdn.as_deref());
    }

    if !inithooks_core::is_interactive() {
        anyhow::bail!("no --apikey given and stdin is not a terminal");
    }

    let d = Dialog::new(inithooks_cli::BACKTITLE);
    if let Some(apikey) = init_tklbam(&d, String::new())? {
        init_hubdns(&d, &apikey, cli.fqdn.unwrap_or_default())?;
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
