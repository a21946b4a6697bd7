//! Field-level syntax checks for user input. Each validator returns the
//! message key for the first rule the value breaks, or `None` when it passes.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

pub fn validate_username(username: &str) -> Option<&'static str> {
    if username.is_empty() {
        return Some("blank");
    }

    let len = username.chars().count();
    if !(4..=32).contains(&len) {
        return Some("username_size");
    }

    None
}

pub fn validate_email(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("blank");
    }

    if !EMAIL_RE.is_match(email) {
        return Some("not_valid");
    }

    None
}

pub fn validate_password(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        return Some("blank");
    }

    if password.chars().count() < 6 {
        return Some("password_size");
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Some("password_chars");
    }

    None
}
