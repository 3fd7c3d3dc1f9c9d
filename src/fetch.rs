use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, trace};

use crate::company::Company;

pub type FetchResult = Result<Vec<Company>, FetchError>;

/// Why a fetch failed. Only used for the log line, the caller treats every
/// failure the same.
#[derive(Debug)]
pub enum FetchFailure {
    Network(String),
    Status(u16),
    Parse(String),
}

#[derive(Debug)]
pub struct FetchError {
    pub cause: FetchFailure,
}

impl FetchError {
    fn new(cause: FetchFailure) -> Self {
        Self { cause }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FetchFailure::Network(e) => write!(f, "fetch failed: network error: {e}"),
            FetchFailure::Status(code) => write!(f, "fetch failed: http status {code}"),
            FetchFailure::Parse(e) => write!(f, "fetch failed: malformed body: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Somewhere the company list can be loaded from.
pub trait CompanySource: Send + 'static {
    fn fetch(&self) -> FetchResult;
}

pub struct HttpSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl CompanySource for HttpSource {
    fn fetch(&self) -> FetchResult {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::new(FetchFailure::Network(e.to_string())))?;

        trace!("GET {}", self.endpoint);
        let response = client
            .get(&self.endpoint)
            .send()
            .map_err(|e| FetchError::new(FetchFailure::Network(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(FetchFailure::Status(status.as_u16())));
        }

        response
            .json::<Vec<Company>>()
            .map_err(|e| FetchError::new(FetchFailure::Parse(e.to_string())))
    }
}

/// Run a single fetch on a background thread. The receiver yields exactly one
/// result.
pub fn spawn_fetch<S: CompanySource>(source: S) -> Receiver<FetchResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let start_time = Instant::now();
        let result = source.fetch();
        info!(
            "Fetch finished in {}ms (ok: {})",
            start_time.elapsed().as_millis(),
            result.is_ok()
        );
        // The receiver is gone when the app quit before the fetch resolved.
        if tx.send(result).is_err() {
            trace!("Fetch result dropped, receiver closed");
        }
    });
    rx
}
