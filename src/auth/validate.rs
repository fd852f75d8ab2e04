use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Password policy: 8-16 characters with at least one digit.
pub fn is_valid_password(password: &str) -> bool {
    let len = password.chars().count();
    (8..=16).contains(&len) && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn password_policy_boundaries() {
        assert!(is_valid_password("abc12345"));
        assert!(is_valid_password("a23456789012345b"));
        assert!(!is_valid_password("abcdefgh"));
        assert!(!is_valid_password("short1"));
        assert!(!is_valid_password("thisisaverylongpassword123"));
    }
}
