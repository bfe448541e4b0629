//! simplehttpd: the minimal static/TLS file server used during installation
//! flows. Serves one webroot over plain HTTP, HTTPS, or both (in which case
//! it forks once and each process runs its own blocking accept loop).

#![allow(unsafe_code)] // fork(2) below

mod addr;
mod daemon;
mod serve;
mod tls;

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use nix::unistd::{fork, ForkResult};

use addr::{parse_address, HostPort};

#[derive(Parser)]
#[command(
    name = "simplehttpd",
    version,
    about = "Simple HTTP server",
    after_help = "An http-port of \"\" or \"0\" disables the plain HTTP listener."
)]
struct Cli {
    /// Write pid to this file and detach from the terminal
    #[arg(long = "daemonize", value_name = "PIDFILE")]
    daemonize: Option<PathBuf>,

    /// Redirect output here (only valid with --daemonize)
    #[arg(long = "logfile", value_name = "LOGFILE")]
    logfile: Option<PathBuf>,

    /// Drop privileges to this user after binding
    #[arg(long = "runas", value_name = "USERNAME")]
    runas: Option<String>,

    /// Directory to serve
    webroot: PathBuf,

    /// Plain HTTP listen address ([address:]port)
    http_address: String,

    /// TLS listen address ([ssl-address:]ssl-port)
    ssl_address: Option<String>,

    /// Combined PEM file (certificate chain + private key)
    pem: Option<PathBuf>,
}

/// Copy the PEM file somewhere the unprivileged user can read once root is
/// gone, mode 0600.
fn certfile_for_user(certfile: &Path, pwent: &nix::unistd::User) -> Result<PathBuf> {
    let mut tmp = tempfile::NamedTempFile::new().context("cannot create temp certfile")?;
    let contents = std::fs::read(certfile)
        .with_context(|| format!("cannot read certfile '{}'", certfile.display()))?;
    tmp.write_all(&contents)?;
    tmp.flush()?;

    std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))?;
    nix::unistd::chown(tmp.path(), Some(pwent.uid), Some(pwent.gid))
        .context("cannot chown temp certfile")?;

    // lives for the rest of the process
    let (_file, path) = tmp.keep().context("cannot persist temp certfile")?;
    Ok(path)
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.logfile.is_some() && cli.daemonize.is_none() {
        bail!("--logfile can only be used with --daemonize");
    }
    if let Some(pidfile) = &cli.daemonize {
        if !daemon::is_writeable(pidfile) {
            bail!("pidfile '{}' not writeable", pidfile.display());
        }
    }
    if let Some(logfile) = &cli.logfile {
        if !daemon::is_writeable(logfile) {
            bail!("logfile '{}' not writeable", logfile.display());
        }
    }
    if cli.ssl_address.is_some() != cli.pem.is_some() {
        bail!("TLS requires both an ssl address and a PEM file");
    }

    let webroot = cli
        .webroot
        .canonicalize()
        .with_context(|| format!("no such webroot '{}'", cli.webroot.display()))?;

    let http_address: Option<HostPort> = match cli.http_address.as_str() {
        "" | "0" => None,
        arg => Some(parse_address(arg)?),
    };
    let https_address: Option<HostPort> = match &cli.ssl_address {
        Some(arg) => Some(parse_address(arg)?),
        None => None,
    };
    if http_address.is_none() && https_address.is_none() {
        bail!("nothing to serve: HTTP disabled and no TLS listener given");
    }

    let pwent = match &cli.runas {
        Some(user) => Some(daemon::lookup_user(user)?),
        None => None,
    };

    let mut certfile = cli.pem.clone();
    if let Some(certfile_path) = &cli.pem {
        if !certfile_path.exists() {
            bail!("no such file '{}'", certfile_path.display());
        }
        if let Some(pwent) = &pwent {
            certfile = Some(certfile_for_user(certfile_path, pwent)?);
        }
    }

    if let Some(pidfile) = &cli.daemonize {
        daemon::daemonize(pidfile, cli.logfile.as_deref())?;
    }

    // bind before dropping privileges; these are usually ports < 1024
    let httpd = match &http_address {
        Some(hp) => Some(
            hp.bind()
                .with_context(|| format!("cannot bind {hp}"))?,
        ),
        None => None,
    };
    let httpsd = match &https_address {
        Some(hp) => Some(
            hp.bind()
                .with_context(|| format!("cannot bind {hp}"))?,
        ),
        None => None,
    };

    let tls_config = match &certfile {
        Some(certfile) => Some(tls::server_config(certfile)?),
        None => None,
    };

    if let Some(pwent) = &pwent {
        daemon::drop_privileges(pwent)?;
    }

    match (httpd, httpsd) {
        (Some(httpd), Some(httpsd)) => {
            let tls_config = tls_config.expect("TLS listener without config");
            daemon::propagate_termination()?;
            // unsafe: no other threads exist yet
            match unsafe { fork() }.context("fork failed")? {
                ForkResult::Child => {
                    drop(httpd);
                    serve::serve_forever(httpsd, &webroot, Some(tls_config))
                }
                ForkResult::Parent { .. } => {
                    drop(httpsd);
                    serve::serve_forever(httpd, &webroot, None)
                }
            }
        }
        (Some(httpd), None) => serve::serve_forever(httpd, &webroot, None),
        (None, Some(httpsd)) => {
            let tls_config = tls_config.expect("TLS listener without config");
            serve::serve_forever(httpsd, &webroot, Some(tls_config))
        }
        (None, None) => unreachable!("validated above"),
    }
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
