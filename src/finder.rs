//! Optional external document-similarity finder (§6, §4.8, §5): a
//! request/response collaborator used to attach a source-document snippet
//! to the first selected angle. Modeled as a trait object so the core stays
//! decoupled from any particular transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of asking the finder where `needle` best matches inside
/// `haystack`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinderResponse {
    pub best_match: Option<String>,
    pub index: i64,
    pub score: f64,
}

#[derive(Debug, Serialize)]
struct FinderRequest<'a> {
    needle: &'a str,
    haystack: &'a [String],
}

/// What went wrong when the finder was invoked; mapped to
/// `Warning::FinderUnavailable` / `Warning::FinderBadResponse` by the
/// coordinator — encoding itself never fails because of this (§5, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderError {
    Unavailable,
    BadResponse,
}

/// A source-document-similarity lookup. `HttpDocumentFinder` is the
/// production implementation; tests substitute a stub.
pub trait DocumentFinder {
    fn find(&self, needle: &str, haystack: &[String]) -> Result<FinderResponse, FinderError>;
}

/// Blocking HTTP client for the finder endpoint, using `ureq` (consistent
/// with the single-threaded-per-invocation pipeline of §5).
#[cfg(feature = "http-finder")]
pub struct HttpDocumentFinder {
    endpoint: String,
    timeout: Duration,
}

#[cfg(feature = "http-finder")]
impl HttpDocumentFinder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "http-finder")]
impl DocumentFinder for HttpDocumentFinder {
    fn find(&self, needle: &str, haystack: &[String]) -> Result<FinderResponse, FinderError> {
        let body = FinderRequest { needle, haystack };

        let response = ureq::post(&self.endpoint)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(&body).map_err(|_| FinderError::BadResponse)?);

        match response {
            Ok(resp) => resp
                .into_json::<FinderResponse>()
                .map_err(|_| FinderError::BadResponse),
            Err(ureq::Error::Status(_, _)) => Err(FinderError::BadResponse),
            Err(ureq::Error::Transport(_)) => Err(FinderError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFinder(Result<FinderResponse, FinderError>);

    impl DocumentFinder for StubFinder {
        fn find(&self, _needle: &str, _haystack: &[String]) -> Result<FinderResponse, FinderError> {
            self.0.clone()
        }
    }

    #[test]
    fn stub_finder_returns_configured_response() {
        let finder = StubFinder(Ok(FinderResponse {
            best_match: Some("quote".into()),
            index: 2,
            score: 0.9,
        }));
        let result = finder.find("needle", &["a".into(), "b".into(), "quote".into()]);
        assert!(result.is_ok());
    }
}
