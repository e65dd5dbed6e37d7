use std::sync::LazyLock;

use regex::Regex;

const PASSWORD_SYMBOLS: &str = "!#$%&*+-.<=>?@^_";
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 16;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// Character set and length rules shared by registration, profile updates and resets.
pub fn check_password(password: &str) -> Result<(), String> {
    if let Some(bad) = password
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !PASSWORD_SYMBOLS.contains(*c))
    {
        return Err(format!("Password contains a forbidden character: {bad}"));
    }

    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(format!(
            "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
        ));
    }

    Ok(())
}

/// Trims and lowercases, then checks the address shape.
pub fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err("Invalid email address".to_string());
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_policy_passwords() {
        assert!(check_password("password1").is_ok());
        assert!(check_password("P@ss-w0rd_^").is_ok());
        assert!(check_password("12345678").is_ok());
    }

    #[test]
    fn rejects_length_outside_bounds() {
        assert!(check_password("short").is_err());
        assert!(check_password("a-very-long-password").is_err());
    }

    #[test]
    fn rejects_forbidden_characters() {
        let err = check_password("pass word1").unwrap_err();
        assert!(err.contains("forbidden"));
        assert!(check_password("pässword1").is_err());
        assert!(check_password("pass(word)").is_err());
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(
            normalize_email("  User@Example.COM ").unwrap(),
            "user@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
    }
}
