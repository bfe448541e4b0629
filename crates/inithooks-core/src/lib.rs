//! Shared pieces of the TurnKey first-boot configuration wizards: the
//! interactive dialog facade, the on-disk answer cache, the init log, and
//! input validation helpers.

pub mod cache;
pub mod dialog;
pub mod log;
pub mod validate;

pub use cache::{CacheError, KeyStore};
pub use dialog::{Dialog, DialogError, InputResult};
pub use log::{InitLog, LogError, LogLevel};
pub use validate::{password_complexity, EMAIL_RE};

use std::os::fd::AsRawFd;

/// True when stdin is attached to a terminal, i.e. a wizard can actually
/// prompt. Headless first-boot runs (cloud-init, preseeded answers) are not
/// interactive and must rely on flags or cached answers.
pub fn is_interactive() -> bool {
    nix::unistd::isatty(std::io::stdin().as_raw_fd()).unwrap_or(false)
}
