//! HTTP failure categories
//!
//! Everything else in the crate reports through `eyre`; these variants are
//! wrapped inside the report so the sync loop can tell a fatal authentication
//! failure apart from a failure that only ends one stream.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapError {
    /// The API rejected the token (401 or 403)
    #[error("Authentication failed ({status}): {body}")]
    Authentication { status: StatusCode, body: String },

    /// Any other non-success status while fetching a page
    #[error("Request to {url} failed ({status}): {body}")]
    Http {
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl TapError {
    /// Classify a non-success response status.
    pub fn from_status(url: &str, status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Authentication { status, body }
            }
            _ => Self::Http {
                url: url.to_string(),
                status,
                body,
            },
        }
    }
}

/// Whether an error should abort the whole run rather than a single stream.
pub fn is_fatal(report: &eyre::Report) -> bool {
    report.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TapError>(),
            Some(TapError::Authentication { .. })
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn test_classify_status() {
        let err = TapError::from_status("http://x/checks", StatusCode::UNAUTHORIZED, "".into());
        assert!(matches!(err, TapError::Authentication { .. }));

        let err = TapError::from_status("http://x/checks", StatusCode::FORBIDDEN, "".into());
        assert!(matches!(err, TapError::Authentication { .. }));

        let err = TapError::from_status(
            "http://x/checks",
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
        );
        assert!(matches!(err, TapError::Http { .. }));
        assert!(err.to_string().contains("http://x/checks"));
    }

    #[test]
    fn test_is_fatal_through_context() {
        let report: eyre::Report = TapError::Authentication {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid token".to_string(),
        }
        .into();
        let wrapped = Err::<(), _>(report)
            .wrap_err("Failed to fetch page")
            .unwrap_err();
        assert!(is_fatal(&wrapped));

        let report: eyre::Report = TapError::Http {
            url: "http://x".to_string(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
        .into();
        assert!(!is_fatal(&report));
        assert!(!is_fatal(&eyre::eyre!("connection reset")));
    }
}
