//! Helpers for running a command inside a reattachable screen session. The
//! session name is derived from the command so a second invocation attaches
//! to the first one's session instead of starting over (the first-boot
//! console may be reached from both the VGA console and serial).

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};

/// Stable session key for a command vector.
pub fn make_session_key(command: &[String]) -> String {
    let mut hasher = Sha256::new();
    for arg in command {
        hasher.update(arg.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Parse `screen -list` output: session lines are tab-indented, first field
/// is `pid.name`.
pub fn parse_screen_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.starts_with('\t'))
        .filter_map(|line| line.trim().split('\t').next())
        .map(|id| id.to_string())
        .collect()
}

/// Find the session whose name matches `session_key`, if any.
pub fn session_lookup(list_output: &str, session_key: &str) -> Result<Option<String>> {
    let matches: Vec<String> = parse_screen_list(list_output)
        .into_iter()
        .filter(|session_id| {
            session_id
                .split_once('.')
                .map(|(_pid, name)| name == session_key)
                .unwrap_or(false)
        })
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches.into_iter().next().unwrap())),
        _ => bail!("too many session matches"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "There are screens on:\n\
        \t1234.abcdef\t(Attached)\n\
        \t5678.cafe00\t(Detached)\n\
        2 Sockets in /run/screen/S-root.\n";

    #[test]
    fn parses_tab_indented_sessions() {
        assert_eq!(parse_screen_list(LISTING), vec!["1234.abcdef", "5678.cafe00"]);
    }

    #[test]
    fn lookup_matches_on_name() {
        assert_eq!(
            session_lookup(LISTING, "cafe00").unwrap(),
            Some("5678.cafe00".to_string())
        );
        assert_eq!(session_lookup(LISTING, "missing").unwrap(), None);
    }

    #[test]
    fn lookup_rejects_ambiguity() {
        let dup = "\t1.key\t(Attached)\n\t2.key\t(Detached)\n";
        assert!(session_lookup(dup, "key").is_err());
    }

    #[test]
    fn session_key_is_stable_and_argument_sensitive() {
        let a = vec!["install".to_string(), "--now".to_string()];
        assert_eq!(make_session_key(&a), make_session_key(&a));
        // "ab c" vs "a bc" must not collide
        let b = vec!["ab".to_string(), "c".to_string()];
        let c = vec!["a".to_string(), "bc".to_string()];
        assert_ne!(make_session_key(&b), make_session_key(&c));
    }
}
