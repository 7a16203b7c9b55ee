use std::io::Read;

use super::{HttpResponse, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;

/// Blocking HTTP transport backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    interpreter_endpoint: String,
    status_endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: build_agent(&config.user_agent),
            interpreter_endpoint: config.interpreter_endpoint.clone(),
            status_endpoint: config.status_endpoint.clone(),
        }
    }
}

impl Transport for HttpTransport {
    fn status(&self) -> Result<HttpResponse, TransportError> {
        tracing::debug!("GET {}", self.status_endpoint);
        let result = self.agent.get(&self.status_endpoint).call();
        read_response(&self.status_endpoint, result)
    }

    fn interpret(&self, query: &str) -> Result<HttpResponse, TransportError> {
        tracing::debug!("POST {}", self.interpreter_endpoint);
        let result = self
            .agent
            .post(&self.interpreter_endpoint)
            .set("Content-Type", "text/plain; charset=utf-8")
            .send_string(query);
        read_response(&self.interpreter_endpoint, result)
    }
}

pub(crate) fn build_agent(user_agent: &str) -> ureq::Agent {
    ureq::AgentBuilder::new().user_agent(user_agent).build()
}

/// Status errors still carry a body worth reading; only transport errors fail.
pub(crate) fn read_response(
    endpoint: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<HttpResponse, TransportError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(err)) => return Err(TransportError::new(endpoint, err)),
    };

    let status = response.status();
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| TransportError::new(endpoint, err))?;

    Ok(HttpResponse { status, body })
}
