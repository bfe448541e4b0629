//! Input validation shared by the wizards and their non-interactive flag
//! paths.

use once_cell::sync::Lazy;
use regex::Regex;

/// Deliberately loose: the authoritative check is the verification mail the
/// hub sends, this only catches obvious typos.
pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|\s).*\S@\S+(?:\s|$)").unwrap());

/// Password complexity score from 0 (invalid) to 4 (strong): one point per
/// character class present (lowercase, uppercase, digit, non-alphanumeric).
pub fn password_complexity(password: &str) -> u8 {
    let lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let number = password.chars().any(|c| c.is_ascii_digit());
    let nonalpha = password.chars().any(|c| !c.is_alphanumeric());

    [lowercase, uppercase, number, nonalpha]
        .iter()
        .filter(|&&b| b)
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_scores() {
        assert_eq!(password_complexity(""), 0);
        assert_eq!(password_complexity("abc"), 1);
        assert_eq!(password_complexity("ABC"), 1);
        assert_eq!(password_complexity("abcABC"), 2);
        assert_eq!(password_complexity("abcABC123"), 3);
        assert_eq!(password_complexity("abcABC123!"), 4);
        assert_eq!(password_complexity("123!"), 2);
    }

    #[test]
    fn email_accepts_plausible_addresses() {
        assert!(EMAIL_RE.is_match("alon@turnkeylinux.org"));
        assert!(EMAIL_RE.is_match("first.last+tag@sub.example.com"));
        assert!(EMAIL_RE.is_match("UPPER@EXAMPLE.COM"));
    }

    #[test]
    fn email_rejects_garbage() {
        assert!(!EMAIL_RE.is_match(""));
        assert!(!EMAIL_RE.is_match("not-an-email"));
        assert!(!EMAIL_RE.is_match("trailing@"));
    }
}
