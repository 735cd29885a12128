//! Remote fetch error types.
//!
//! This module classifies GitHub API failures into the four categories the
//! poller reacts to:
//!
//! - **RateLimited** - the shared account-wide quota is exhausted (HTTP 429,
//!   or 403 with rate limit markers)
//! - **AuthExpired** - the bearer credential was rejected (401, non-rate-limit
//!   403)
//! - **Transient** - server errors, network failures, timeouts
//! - **NotFound** - the repository is missing or was renamed (404)
//!
//! Each repository's failure is isolated: classification never aborts a sweep,
//! it only decides what gets logged and whether the sweep counts as failed.

use thiserror::Error;

/// A classified remote fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote API rate limit was hit.
    #[error("rate limited by the remote API: {message}")]
    RateLimited { message: String },

    /// The bearer credential was rejected; retrying cannot succeed until an
    /// external collaborator supplies a fresh one.
    #[error("credential rejected by the remote API: {message}")]
    AuthExpired { message: String },

    /// Network failure, server error, or timeout - safe to retry next sweep.
    #[error("transient fetch error: {message}")]
    Transient { message: String },

    /// The repository does not exist remotely (missing, renamed, or the
    /// identifiers could never name one).
    #[error("repository not found: {message}")]
    NotFound { message: String },
}

impl FetchError {
    /// Creates a transient error from a plain message.
    pub fn transient(message: impl Into<String>) -> Self {
        FetchError::Transient {
            message: message.into(),
        }
    }

    /// Creates a not-found error from a plain message.
    pub fn not_found(message: impl Into<String>) -> Self {
        FetchError::NotFound {
            message: message.into(),
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// Examines the HTTP status code and the error message for known GitHub
    /// API response patterns.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = err.to_string();
        classify(status_code, message)
    }
}

/// Classifies an error by status code and message text.
///
/// Errors with no recognizable status code default to `Transient`: the next
/// sweep retries them, and backoff keeps sustained failures cheap.
fn classify(status_code: Option<u16>, message: String) -> FetchError {
    if is_rate_limit_error(&message) {
        return FetchError::RateLimited { message };
    }

    match status_code {
        Some(429) => FetchError::RateLimited { message },
        Some(401) | Some(403) => FetchError::AuthExpired { message },
        Some(404) => FetchError::NotFound { message },
        Some(code) if (500..600).contains(&code) => FetchError::Transient { message },
        Some(_) => FetchError::Transient { message },
        None => FetchError::Transient { message },
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// octocrab's `Error` type doesn't expose a stable status-code accessor
/// across all error variants, so this parses well-established patterns from
/// the message. The fallback (`None`) is safe: `classify` treats unknown
/// errors as transient.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    let err_str = err.to_string();

    // octocrab formats errors like "GitHub API returned error 404"
    // or includes "status: 404" in messages
    if let Some(idx) = err_str.find("status: ") {
        let rest = &err_str[idx + 8..];
        if let Some(end) = rest.find(|c: char| !c.is_ascii_digit()) {
            if let Ok(code) = rest[..end].parse() {
                return Some(code);
            }
        } else if let Ok(code) = rest.trim().parse() {
            return Some(code);
        }
    }

    for (needle, code) in [
        ("404", 404u16),
        ("429", 429),
        ("403", 403),
        ("401", 401),
        ("422", 422),
        ("500", 500),
        ("502", 502),
        ("503", 503),
    ] {
        if err_str.contains(needle) {
            return Some(code);
        }
    }

    None
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("secondary rate limit"));
        assert!(is_rate_limit_error("abuse detection mechanism"));
        assert!(!is_rate_limit_error("Permission denied"));
    }

    #[test]
    fn status_429_is_rate_limited() {
        assert!(matches!(
            classify(Some(429), "too many requests".into()),
            FetchError::RateLimited { .. }
        ));
    }

    #[test]
    fn rate_limit_message_wins_over_403() {
        assert!(matches!(
            classify(Some(403), "API rate limit exceeded for user".into()),
            FetchError::RateLimited { .. }
        ));
    }

    #[test]
    fn auth_statuses_are_auth_expired() {
        assert!(matches!(
            classify(Some(401), "bad credentials".into()),
            FetchError::AuthExpired { .. }
        ));
        assert!(matches!(
            classify(Some(403), "resource not accessible by integration".into()),
            FetchError::AuthExpired { .. }
        ));
    }

    #[test]
    fn status_404_is_not_found() {
        assert!(matches!(
            classify(Some(404), "not found".into()),
            FetchError::NotFound { .. }
        ));
    }

    #[test]
    fn server_errors_are_transient() {
        for code in [500, 502, 503] {
            assert!(matches!(
                classify(Some(code), "server error".into()),
                FetchError::Transient { .. }
            ));
        }
    }

    #[test]
    fn unknown_errors_default_to_transient() {
        assert!(matches!(
            classify(None, "connection reset by peer".into()),
            FetchError::Transient { .. }
        ));
    }
}
