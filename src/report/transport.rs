use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;

/// Outcome of a dispatched notification, polled by the sender on later
/// ticks. Failures are terminal: notifications are fire-and-forget and
/// never retried; the next progress send carries newer data anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Still on the wire (or queued behind the worker).
    Pending,
    /// 2xx response received.
    Succeeded,
    /// Transport error or non-2xx response.
    Failed,
}

const STATE_PENDING: u8 = 0;
const STATE_SUCCEEDED: u8 = 1;
const STATE_FAILED: u8 = 2;

/// Pollable handle for one dispatched notification.
#[derive(Clone, Debug)]
pub struct RequestHandle {
    state: Arc<AtomicU8>,
}

/// Completer side of a [`RequestHandle`]; consumed exactly once by the
/// transport when the request settles.
#[derive(Debug)]
pub struct RequestCompletion {
    state: Arc<AtomicU8>,
}

impl RequestHandle {
    /// Create a handle/completion pair for a request about to start.
    pub fn new_pair() -> (RequestHandle, RequestCompletion) {
        let state = Arc::new(AtomicU8::new(STATE_PENDING));
        (
            RequestHandle {
                state: Arc::clone(&state),
            },
            RequestCompletion { state },
        )
    }

    /// Current request state.
    pub fn state(&self) -> RequestState {
        match self.state.load(Ordering::Acquire) {
            STATE_SUCCEEDED => RequestState::Succeeded,
            STATE_FAILED => RequestState::Failed,
            _ => RequestState::Pending,
        }
    }

    /// Whether the request has settled, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.state() != RequestState::Pending
    }
}

impl RequestCompletion {
    /// Mark the request settled.
    pub fn complete(self, success: bool) {
        let value = if success {
            STATE_SUCCEEDED
        } else {
            STATE_FAILED
        };
        self.state.store(value, Ordering::Release);
    }
}

/// Dispatch surface for coordinator notifications. `path` is appended to
/// the transport's base URL; the body is posted as JSON.
pub trait NotificationTransport {
    /// Start a POST and return a pollable handle. Must not block the
    /// calling tick.
    fn post_json(&self, path: &str, body: serde_json::Value) -> RequestHandle;
}

struct Outbound {
    url: String,
    body: serde_json::Value,
    completion: RequestCompletion,
}

/// HTTP notification transport backed by a single worker thread.
///
/// Requests are queued to the worker and posted with a blocking client,
/// so tick code never touches the network. Dropping (or [`flush`]ing) the
/// notifier closes the queue and joins the worker, which drains every
/// already-queued request first; that is the "flush outstanding requests
/// on shutdown" guarantee.
///
/// [`flush`]: HttpNotifier::flush
pub struct HttpNotifier {
    base_url: String,
    tx: Option<Sender<Outbound>>,
    worker: Option<JoinHandle<()>>,
}

impl HttpNotifier {
    /// Worker-side request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a notifier posting to `base_url` (scheme + authority, no
    /// trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Self {
        let (tx, rx) = channel::<Outbound>();
        let worker = std::thread::spawn(move || {
            let client = match reqwest::blocking::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
            {
                Ok(client) => client,
                Err(err) => {
                    tracing::error!(%err, "failed to build http client; notifications disabled");
                    for outbound in rx {
                        outbound.completion.complete(false);
                    }
                    return;
                }
            };

            for outbound in rx {
                let result = client.post(&outbound.url).json(&outbound.body).send();
                let success = match result {
                    Ok(response) if response.status().is_success() => true,
                    Ok(response) => {
                        tracing::warn!(
                            url = %outbound.url,
                            status = %response.status(),
                            "coordinator rejected notification"
                        );
                        false
                    }
                    Err(err) => {
                        tracing::warn!(url = %outbound.url, %err, "notification failed");
                        false
                    }
                };
                outbound.completion.complete(success);
            }
        });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Close the queue and wait for every outstanding request to settle.
    pub fn flush(mut self) {
        self.flush_inner();
    }

    fn flush_inner(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for HttpNotifier {
    fn drop(&mut self) {
        self.flush_inner();
    }
}

impl NotificationTransport for HttpNotifier {
    fn post_json(&self, path: &str, body: serde_json::Value) -> RequestHandle {
        let (handle, completion) = RequestHandle::new_pair();
        let outbound = Outbound {
            url: format!("{}{}", self.base_url, path),
            body,
            completion,
        };
        match &self.tx {
            Some(tx) => {
                if let Err(send_err) = tx.send(outbound) {
                    // Worker gone: settle the handle as failed so
                    // coalescing state machines do not wedge on it.
                    tracing::warn!("notification worker is gone; dropping notification");
                    send_err.0.completion.complete(false);
                }
            }
            None => outbound.completion.complete(false),
        }
        handle
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/transport.rs"]
mod tests;
