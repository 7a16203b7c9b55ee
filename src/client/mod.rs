//! Query submission with availability probing.
//!
//! Before a query is posted the status endpoint is probed. A busy engine
//! answers with a non-200 status whose body mentions when slots free up;
//! such rounds are retried after a fixed interval, up to the configured
//! number of attempts. Once the engine is available the query is posted
//! exactly once and any non-200 answer is returned as a fatal error.

mod http;

use std::path::Path;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{SubmitError, TransportError};
use crate::utils::body_contains;

pub use http::HttpTransport;
pub(crate) use http::{build_agent, read_response};

/// Phrase the status endpoint uses when no slots are free.
pub const RATE_LIMIT_MARKER: &str = "slots available after";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The two blocking round trips the client needs.
pub trait Transport {
    /// GET the status endpoint.
    fn status(&self) -> Result<HttpResponse, TransportError>;
    /// POST a compiled query to the interpreter endpoint.
    fn interpret(&self, query: &str) -> Result<HttpResponse, TransportError>;
}

pub struct Client<T = HttpTransport> {
    transport: T,
    max_attempts: u32,
    retry_interval: Duration,
}

impl Client<HttpTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Client::with_transport(HttpTransport::new(config))
            .max_attempts(config.max_attempts)
            .retry_interval(config.retry_interval())
    }
}

impl Default for Client<HttpTransport> {
    fn default() -> Self {
        Client::new(&ClientConfig::default())
    }
}

impl<T: Transport> Client<T> {
    /// One probe round, five seconds between rounds.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            max_attempts: 1,
            retry_interval: Duration::from_secs(5),
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// A single availability check. Only a non-200 answer carrying
    /// [`RATE_LIMIT_MARKER`] counts as busy; other answers count as available.
    pub fn probe(&self) -> Result<(), SubmitError> {
        let response = self.transport.status()?;
        if response.status != 200 && body_contains(&response.body, RATE_LIMIT_MARKER) {
            return Err(SubmitError::RateLimited {
                body: response.text(),
            });
        }
        Ok(())
    }

    /// Probe until available or out of attempts, sleeping between rounds.
    pub fn wait_until_available(&self) -> Result<(), SubmitError> {
        let attempts = self.max_attempts;
        let mut last = None;

        for attempt in 1..=attempts {
            match self.probe() {
                Ok(()) => {
                    tracing::debug!("Engine available (attempt {}/{})", attempt, attempts);
                    return Ok(());
                }
                Err(err) => {
                    tracing::info!("Engine unavailable (attempt {}/{}): {}", attempt, attempts, err);
                    last = Some(Box::new(err));
                }
            }

            if attempt < attempts {
                tracing::info!(
                    "Sleeping {:.0?} before trying again",
                    self.retry_interval
                );
                std::thread::sleep(self.retry_interval);
            }
        }

        Err(SubmitError::Unavailable { attempts, last })
    }

    pub fn submit_bytes(&self, query: &str) -> Result<Vec<u8>, SubmitError> {
        self.wait_until_available()?;

        tracing::debug!("Submitting query ({} bytes)", query.len());
        let response = self.transport.interpret(query)?;
        if response.status != 200 {
            return Err(SubmitError::Engine {
                status: response.status,
                body: response.text(),
            });
        }

        tracing::debug!("Received {} bytes", response.body.len());
        Ok(response.body)
    }

    pub fn submit(&self, query: &str) -> Result<String, SubmitError> {
        let body = self.submit_bytes(query)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Submit, persist the raw body to `path`, then return it as text.
    /// Write failures are returned as [`SubmitError::Export`].
    pub fn submit_and_export(
        &self,
        query: &str,
        path: impl AsRef<Path>,
    ) -> Result<String, SubmitError> {
        let path = path.as_ref();
        let body = self.submit_bytes(query)?;
        std::fs::write(path, &body).map_err(|source| SubmitError::Export {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Exported {} bytes to {:?}", body.len(), path);
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedTransport {
        probes: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
        answer: RefCell<Option<Result<HttpResponse, TransportError>>>,
        probe_count: Cell<usize>,
        posted: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        fn busy_then_free(busy_rounds: usize) -> Self {
            let transport = Self::default();
            for _ in 0..busy_rounds {
                transport.probes.borrow_mut().push_back(Ok(busy()));
            }
            transport.probes.borrow_mut().push_back(Ok(ok("Connected as: 1234")));
            transport.answer.replace(Some(Ok(ok("{\"elements\":[]}"))));
            transport
        }
    }

    impl Transport for ScriptedTransport {
        fn status(&self) -> Result<HttpResponse, TransportError> {
            self.probe_count.set(self.probe_count.get() + 1);
            self.probes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ok("Connected as: 1234")))
        }

        fn interpret(&self, query: &str) -> Result<HttpResponse, TransportError> {
            self.posted.borrow_mut().push(query.to_string());
            self.answer
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok(ok("")))
        }
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    fn busy() -> HttpResponse {
        HttpResponse {
            status: 429,
            body: b"Rate limit: 2\n0 slots available now.\nSlot available after: 2024-01-01T00:00:05Z, in 5 seconds.\n2 slots available after: soon".to_vec(),
        }
    }

    fn client(transport: ScriptedTransport, attempts: u32) -> Client<ScriptedTransport> {
        Client::with_transport(transport)
            .max_attempts(attempts)
            .retry_interval(Duration::ZERO)
    }

    #[test]
    fn submits_once_after_busy_rounds_within_budget() {
        let client = client(ScriptedTransport::busy_then_free(3), 4);

        let body = client.submit("out count;").unwrap();
        assert_eq!(body, "{\"elements\":[]}");
        assert_eq!(client.transport().probe_count.get(), 4);
        assert_eq!(*client.transport().posted.borrow(), vec!["out count;".to_string()]);
    }

    #[test]
    fn exhausted_budget_never_posts() {
        let client = client(ScriptedTransport::busy_then_free(3), 3);

        let err = client.submit("out count;").unwrap_err();
        assert!(matches!(err, SubmitError::Unavailable { attempts: 3, .. }));
        assert!(err.is_rate_limited());
        assert_eq!(client.transport().probe_count.get(), 3);
        assert!(client.transport().posted.borrow().is_empty());
    }

    #[test]
    fn default_budget_is_a_single_probe() {
        let client = Client::with_transport(ScriptedTransport::busy_then_free(1))
            .retry_interval(Duration::ZERO);

        let err = client.submit("out;").unwrap_err();
        assert!(matches!(err, SubmitError::Unavailable { attempts: 1, .. }));
        assert_eq!(client.transport().probe_count.get(), 1);
    }

    #[test]
    fn zero_attempts_behaves_like_one() {
        let client = client(ScriptedTransport::busy_then_free(0), 0);
        assert!(client.submit("out;").is_ok());
        assert_eq!(client.transport().probe_count.get(), 1);
    }

    #[test]
    fn transport_failures_while_probing_are_retried() {
        let transport = ScriptedTransport::busy_then_free(0);
        transport.probes.borrow_mut().push_front(Err(TransportError::new(
            "http://status",
            "connection refused",
        )));
        let client = client(transport, 2);

        assert!(client.submit("out;").is_ok());
        assert_eq!(client.transport().probe_count.get(), 2);
    }

    #[test]
    fn exhausted_transport_failures_are_not_rate_limits() {
        let transport = ScriptedTransport::default();
        for _ in 0..2 {
            transport.probes.borrow_mut().push_back(Err(TransportError::new(
                "http://status",
                "connection refused",
            )));
        }
        let client = client(transport, 2);

        let err = client.submit("out;").unwrap_err();
        match &err {
            SubmitError::Unavailable { attempts: 2, last: Some(last) } => {
                assert!(matches!(**last, SubmitError::Transport(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_rate_limited());
        assert!(client.transport().posted.borrow().is_empty());
    }

    #[test]
    fn non_200_without_marker_counts_as_available() {
        let transport = ScriptedTransport::busy_then_free(0);
        transport.probes.borrow_mut().push_front(Ok(HttpResponse {
            status: 500,
            body: b"internal error".to_vec(),
        }));
        let client = client(transport, 1);

        assert!(client.submit("out;").is_ok());
        assert_eq!(client.transport().posted.borrow().len(), 1);
    }

    #[test]
    fn engine_errors_are_fatal_and_verbatim() {
        let transport = ScriptedTransport::busy_then_free(0);
        transport.answer.replace(Some(Ok(HttpResponse {
            status: 400,
            body: b"Error: line 1: parse error".to_vec(),
        })));
        let client = client(transport, 5);

        let err = client.submit("way[;").unwrap_err();
        match err {
            SubmitError::Engine { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Error: line 1: parse error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.transport().posted.borrow().len(), 1);
        assert_eq!(client.transport().probe_count.get(), 1);
    }

    #[test]
    fn post_transport_failure_is_fatal() {
        let transport = ScriptedTransport::busy_then_free(0);
        transport.answer.replace(Some(Err(TransportError::new(
            "http://interpreter",
            "connection reset",
        ))));
        let client = client(transport, 3);

        let err = client.submit("out;").unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
        assert_eq!(client.transport().posted.borrow().len(), 1);
    }

    #[test]
    fn export_writes_body_before_returning_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let client = client(ScriptedTransport::busy_then_free(0), 1);

        let body = client.submit_and_export("out;", &path).unwrap();
        assert_eq!(body, "{\"elements\":[]}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn export_failures_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("result.json");
        let client = client(ScriptedTransport::busy_then_free(0), 1);

        let err = client.submit_and_export("out;", &path).unwrap_err();
        assert!(matches!(err, SubmitError::Export { .. }));
    }
}
