//! Process plumbing: daemonization, privilege dropping, and the writability
//! pre-checks that keep failures in front of the user instead of in a log
//! nobody reads.

use std::fs::File;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::unistd::{
    chdir, dup2, fork, getgrouplist, setgid, setgroups, setsid, setuid, ForkResult, User,
};

/// True when `path` (or, if it does not exist yet, its parent directory) is
/// writable by this process.
pub fn is_writeable(path: &Path) -> bool {
    let target: PathBuf = if path.exists() {
        path.to_path_buf()
    } else {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    };
    nix::unistd::access(&target, nix::unistd::AccessFlags::W_OK).is_ok()
}

/// Fork into the background: the parent writes the child pid to `pidfile`
/// and exits, the child detaches from the terminal and redirects stdio to
/// `logfile` (default `/dev/null`).
pub fn daemonize(pidfile: &Path, logfile: Option<&Path>) -> Result<()> {
    // unsafe: single-threaded at this point, nothing holds locks
    match unsafe { fork() }.context("fork failed")? {
        ForkResult::Parent { child } => {
            std::fs::write(pidfile, format!("{child}\n"))
                .with_context(|| format!("cannot write pidfile '{}'", pidfile.display()))?;
            std::process::exit(0);
        }
        ForkResult::Child => {}
    }

    chdir("/").context("chdir / failed")?;
    setsid().context("setsid failed")?;

    let logfile = logfile.unwrap_or_else(|| Path::new("/dev/null"));
    let log = File::create(logfile)
        .with_context(|| format!("cannot open logfile '{}'", logfile.display()))?;
    dup2(log.as_raw_fd(), libc::STDOUT_FILENO).context("dup2 stdout failed")?;
    dup2(log.as_raw_fd(), libc::STDERR_FILENO).context("dup2 stderr failed")?;

    let devnull = File::open("/dev/null").context("cannot open /dev/null")?;
    dup2(devnull.as_raw_fd(), libc::STDIN_FILENO).context("dup2 stdin failed")?;

    Ok(())
}

/// Look up `user`, failing early if it does not exist.
pub fn lookup_user(user: &str) -> Result<User> {
    match User::from_name(user).context("user lookup failed")? {
        Some(pwent) => Ok(pwent),
        None => bail!("no such user '{user}'"),
    }
}

/// Give up root: supplementary groups, gid, then uid, plus the environment
/// a login would have set up.
pub fn drop_privileges(pwent: &User) -> Result<()> {
    std::env::remove_var("XAUTHORITY");
    std::env::set_var("USER", &pwent.name);
    std::env::set_var("HOME", &pwent.dir);

    let name = std::ffi::CString::new(pwent.name.as_str()).context("bad username")?;
    let groups = getgrouplist(&name, pwent.gid).context("getgrouplist failed")?;
    setgroups(&groups).context("setgroups failed")?;
    setgid(pwent.gid).context("setgid failed")?;
    setuid(pwent.uid).context("setuid failed")?;
    Ok(())
}

extern "C" fn propagate_to_group(sig: libc::c_int) {
    // async-signal-safe only in here
    unsafe {
        libc::signal(sig, libc::SIG_IGN);
        libc::kill(0, sig);
        libc::_exit(0);
    }
}

/// Forward SIGINT/SIGTERM to the whole process group, so killing either
/// listener takes down its sibling too.
pub fn propagate_termination() -> Result<()> {
    let handler = SigHandler::Handler(propagate_to_group);
    unsafe {
        signal(Signal::SIGINT, handler).context("sigaction SIGINT failed")?;
        signal(Signal::SIGTERM, handler).context("sigaction SIGTERM failed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writability_checks_parent_for_missing_files() {
        let dir = tempdir().unwrap();
        assert!(is_writeable(&dir.path().join("new.pid")));
        assert!(!is_writeable(Path::new("/nonexistent-dir/new.pid")));

        let existing = dir.path().join("present.log");
        std::fs::write(&existing, "x").unwrap();
        assert!(is_writeable(&existing));
    }
}
