//! Page retrieval over HTTP with bounded retry.

use std::time::{Duration, SystemTime};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::{EntityKind, RawPage, WikiError};

/// Source of raw page markup. The pipeline is generic over this seam so
/// tests run against an in-memory source instead of the wiki.
pub trait PageSource {
    /// Retrieve the page for `title`. A definitive "no such page" answer is
    /// `NotFound` and is not retried; network failures that survive the
    /// retry budget surface as `Transient`.
    fn fetch(&self, title: &str, kind_hint: EntityKind) -> Result<RawPage, WikiError>;
}

/// Retry and transport policy. Network conditions vary by deployment, so
/// these are data, not constants.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    /// Per-request timeout, bounding each attempt.
    pub timeout: Duration,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per retry.
    pub initial_backoff: Duration,
    /// Backoff growth cap.
    pub max_backoff: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            base_url: "https://prts.wiki".to_string(),
            timeout: Duration::from_secs(15),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            user_agent: "doctah-core/0.1 (+https://prts.wiki)".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetcherInitError {
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Blocking HTTP fetcher for wiki pages. Stateless between calls; safe to
/// share across threads.
pub struct HttpFetcher {
    client: Client,
    base: Url,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetcherInitError> {
        let base = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(HttpFetcher {
            client,
            base,
            config,
        })
    }

    /// `https://prts.wiki/w/{title}` with the title percent-encoded.
    pub fn page_url(&self, title: &str) -> String {
        let joined = self
            .base
            .join(&format!("w/{}", urlencoding::encode(title)))
            .unwrap_or_else(|_| self.base.clone());
        joined.to_string()
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, title: &str, kind_hint: EntityKind) -> Result<RawPage, WikiError> {
        let url = self.page_url(title);
        let mut backoff = self.config.initial_backoff;
        let mut last_reason = String::new();

        for attempt in 1..=self.config.max_attempts {
            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::NOT_FOUND {
                        // definitive miss, never retried
                        return Err(WikiError::NotFound(title.to_string()));
                    }
                    if status.is_success() {
                        match resp.text() {
                            Ok(html) => {
                                debug!(%title, attempt, "fetched page");
                                return Ok(RawPage {
                                    title: title.to_string(),
                                    kind_hint,
                                    html,
                                    fetched_at: SystemTime::now(),
                                });
                            }
                            Err(e) => last_reason = e.to_string(),
                        }
                    } else if status.is_server_error() {
                        last_reason = format!("server returned {status}");
                    } else {
                        // unexpected client-side status, retrying won't help
                        return Err(WikiError::Transient {
                            attempts: attempt,
                            reason: format!("unexpected status {status}"),
                        });
                    }
                }
                Err(e) => last_reason = e.to_string(),
            }
            if attempt < self.config.max_attempts {
                warn!(%title, attempt, reason = %last_reason, "fetch failed, retrying");
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.config.max_backoff);
            }
        }

        Err(WikiError::Transient {
            attempts: self.config.max_attempts,
            reason: last_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Loopback server answering every request with `status_line`,
    /// counting the requests it saw. Connections are closed per request
    /// so each retry shows up as its own hit.
    fn serve_status(status_line: &'static str, hits: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                hits.fetch_add(1, Ordering::SeqCst);
                let resp =
                    format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn fast_config(base_url: String) -> FetchConfig {
        FetchConfig {
            base_url,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn missing_page_is_not_found_after_a_single_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve_status("HTTP/1.1 404 Not Found", hits.clone());
        let f = HttpFetcher::new(fast_config(base)).unwrap();

        let err = f.fetch("银灰", EntityKind::Operator).unwrap_err();
        assert!(matches!(err, WikiError::NotFound(_)), "got {err:?}");
        // a definitive miss must not consume the retry budget
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn persistent_server_errors_exhaust_the_retry_budget() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve_status("HTTP/1.1 500 Internal Server Error", hits.clone());
        let config = fast_config(base);
        let max_attempts = config.max_attempts;
        let f = HttpFetcher::new(config).unwrap();

        let err = f.fetch("银灰", EntityKind::Operator).unwrap_err();
        match err {
            WikiError::Transient { attempts, .. } => assert_eq!(attempts, max_attempts),
            other => panic!("expected Transient, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), max_attempts as usize);
    }

    #[test]
    fn page_url_percent_encodes_cjk_titles() {
        let f = HttpFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(
            f.page_url("银灰"),
            "https://prts.wiki/w/%E9%93%B6%E7%81%B0"
        );
        // disambiguation brackets survive encoding round trips
        assert_eq!(
            f.page_url("阿米娅（医疗）"),
            "https://prts.wiki/w/%E9%98%BF%E7%B1%B3%E5%A8%85%EF%BC%88%E5%8C%BB%E7%96%97%EF%BC%89"
        );
    }

    #[test]
    fn default_policy_is_three_attempts_with_growing_backoff() {
        let c = FetchConfig::default();
        assert_eq!(c.max_attempts, 3);
        assert!(c.initial_backoff < c.max_backoff);
    }

    #[test]
    fn custom_base_url_is_respected() {
        let config = FetchConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..FetchConfig::default()
        };
        let f = HttpFetcher::new(config).unwrap();
        assert_eq!(f.page_url("W"), "http://localhost:8080/w/W");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = FetchConfig {
            base_url: "not a url".to_string(),
            ..FetchConfig::default()
        };
        assert!(matches!(
            HttpFetcher::new(config),
            Err(FetcherInitError::BaseUrl(_))
        ));
    }
}
