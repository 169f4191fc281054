//! ureq-backed `Transport` for the demo.

use ureq::Agent;
use zhconvert_core::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport};

const USER_AGENT: &str = concat!("zhconvert-demo/", env!("CARGO_PKG_VERSION"));

/// Runs each blocking ureq round-trip on tokio's blocking pool.
///
/// Non-2xx statuses are returned as data; the converter decides what they
/// mean.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || round_trip(&agent, request)).await?
    }
}

fn round_trip(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, BoxError> {
    tracing::debug!(method = request.method.as_str(), url = %request.url, "sending");
    let mut response = match request.method {
        HttpMethod::Get => agent.get(&request.url).header("user-agent", USER_AGENT).call()?,
        HttpMethod::Post => {
            let mut builder = agent.post(&request.url).header("user-agent", USER_AGENT);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            match request.body {
                Some(body) => builder.send(body.as_bytes())?,
                None => builder.send_empty()?,
            }
        }
    };

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_vec()?;
    tracing::debug!(status, bytes = body.len(), "received");
    Ok(HttpResponse {
        status: Some(status),
        headers: Vec::new(),
        body: Some(body),
    })
}
