//! # Log Sanitization
//!
//! Scrubs strings before they reach a log line. Control characters are
//! escaped so externally supplied input cannot forge extra log entries, and
//! `name=value` pairs whose name hints at credentials are masked.

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(password\s*=\s*)([^\s]+)",
        r"(?i)(token\s*=\s*)([^\s]+)",
        r"(?i)(api[-_]?key\s*=\s*)([^\s]+)",
        r"(?i)(master\s*=\s*)([^\s]+)",
        r"(?i)(key\s*=\s*)([^\s]+)",
        r"(?i)(secret\s*=\s*)([^\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Sanitize a string for inclusion in a log message.
///
/// Escapes newlines, carriage returns and tabs, then masks the value of any
/// credential-looking `name=value` pair with `*****`.
pub fn sanitize_log_message(message: &str) -> String {
    let mut sanitized = message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");

    for pattern in SENSITIVE_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, "${1}*****").into_owned();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_password_values() {
        assert_eq!(
            sanitize_log_message("login failed: password=hunter2"),
            "login failed: password=*****"
        );
    }

    #[test]
    fn masks_api_key_variants() {
        assert_eq!(sanitize_log_message("api_key=abc123"), "api_key=*****");
        assert_eq!(sanitize_log_message("api-key=abc123"), "api-key=*****");
        assert_eq!(sanitize_log_message("APIKEY=abc123"), "APIKEY=*****");
    }

    #[test]
    fn masks_token_master_key_and_secret() {
        assert_eq!(sanitize_log_message("token=xyz"), "token=*****");
        assert_eq!(sanitize_log_message("master=passphrase"), "master=*****");
        assert_eq!(sanitize_log_message("key=somekey"), "key=*****");
        assert_eq!(sanitize_log_message("secret=mysecret"), "secret=*****");
    }

    #[test]
    fn masks_multiple_pairs_in_one_message() {
        let message = "request password=a token=b ended";
        assert_eq!(
            sanitize_log_message(message),
            "request password=***** token=***** ended"
        );
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(
            sanitize_log_message("line one\nline two\r\tend"),
            "line one\\nline two\\r\\tend"
        );
    }

    #[test]
    fn ignores_case_when_matching_names() {
        assert_eq!(sanitize_log_message("PASSWORD=abc"), "PASSWORD=*****");
        assert_eq!(sanitize_log_message("Secret = abc"), "Secret = *****");
    }

    #[test]
    fn leaves_plain_messages_untouched() {
        let message = "secret lookup finished in 3ms";
        assert_eq!(sanitize_log_message(message), message);
    }
}
