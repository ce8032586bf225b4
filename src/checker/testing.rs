// src/checker/testing.rs
// =============================================================================
// Test doubles for the fetch strategy traits.
//
// ScriptedSession answers fetches from a script (then from a fallback
// closure) and records everything that happened: which URLs were fetched,
// when, how many ran at once, and how often the session was closed.
// MockTransport hands out that session, so tests can inspect it afterwards.
// SharedBuf is a clonable in-memory writer for capturing output and logs.
// =============================================================================

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use super::fetch::{FetchError, Session, Transport};

type Responder = Box<dyn Fn(&str) -> Result<u16, FetchError> + Send + Sync>;

pub struct ScriptedSession {
    script: Mutex<VecDeque<Result<u16, FetchError>>>,
    respond: Responder,
    latency: Duration,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    closes: AtomicUsize,
}

impl ScriptedSession {
    /// Plays `script` in order, then fails every later fetch.
    pub fn new(script: Vec<Result<u16, FetchError>>) -> Self {
        let mut session =
            Self::with(|_| Err(FetchError::Transport("script exhausted".to_string())));
        session.script = Mutex::new(script.into());
        session
    }

    pub fn always(status: u16) -> Self {
        Self::with(move |_| Ok(status))
    }

    pub fn failing() -> Self {
        Self::with(|url| Err(FetchError::Transport(format!("dns error for {url}"))))
    }

    pub fn with(respond: impl Fn(&str) -> Result<u16, FetchError> + Send + Sync + 'static) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            respond: Box::new(respond),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    /// Highest number of fetches that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| (self.respond)(url))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for Arc<ScriptedSession> {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        (**self).fetch(url).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}

pub struct MockTransport {
    pub session: Arc<ScriptedSession>,
    launches: AtomicUsize,
    refuse_launch: bool,
}

impl MockTransport {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            session: Arc::new(session),
            launches: AtomicUsize::new(0),
            refuse_launch: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse_launch: true,
            ..Self::new(ScriptedSession::always(200))
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn launch(&self) -> Result<Box<dyn Session>, FetchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.refuse_launch {
            return Err(FetchError::Launch("no browser available".to_string()));
        }
        Ok(Box::new(self.session.clone()))
    }
}

/// A `Vec<u8>` that several writers can append to at once.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
