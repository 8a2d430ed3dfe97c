//! Live application log streaming
//!
//! Wraps the platform's raw log feed into an ordered, duplicate-free
//! sequence of events. The only state carried across reconnects is the
//! last delivered sequence token (the resume cursor) plus a reorder
//! buffer for entries that arrived ahead of a hole.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::CliError;
use crate::models::deployment::DeployState;
use crate::models::log::LogEntry;
use crate::platform::PlatformApi;
use crate::utils::{calc_exp_backoff, BackoffOptions};

/// An event delivered to the log consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// An ordinary log entry, in strictly increasing token order
    Entry(LogEntry),

    /// The platform could not honor resumption (retention expired);
    /// entries between `expected` and `resumed_at` are gone for good.
    /// Emitted instead of silently skipping records.
    Gap { expected: u64, resumed_at: u64 },
}

/// Streamer tuning knobs
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Backoff between reconnect attempts
    pub reconnect: BackoffOptions,
}

/// Orders, deduplicates and resumes the remote log feed
pub struct LogStreamer<P: PlatformApi + ?Sized> {
    platform: Arc<P>,
    app_id: String,
    cursor: Option<u64>,
    pending: BTreeMap<u64, LogEntry>,
    options: StreamOptions,
}

impl<P: PlatformApi + ?Sized> LogStreamer<P> {
    /// Create a streamer resuming after `since` (None = from the
    /// earliest entry the platform still retains)
    pub fn new(platform: Arc<P>, app_id: &str, since: Option<u64>, options: StreamOptions) -> Self {
        Self {
            platform,
            app_id: app_id.to_string(),
            cursor: since,
            pending: BTreeMap::new(),
            options,
        }
    }

    /// Last token delivered to the consumer
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Consume the feed, invoking `deliver` for every event.
    ///
    /// With a driver state receiver attached, the streamer completes
    /// once the driver reaches a terminal state, after flushing any
    /// buffered tail entries. Without one it reconnects forever and
    /// only stops when the caller drops the future (user interrupt).
    ///
    /// The sleep function is injected so tests can drive reconnects
    /// without wall-clock delays.
    pub async fn run<D, S, F>(
        &mut self,
        mut deliver: D,
        mut driver_state: Option<watch::Receiver<DeployState>>,
        sleep_fn: S,
    ) -> Result<(), CliError>
    where
        D: FnMut(LogEvent),
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let mut err_streak: u32 = 0;

        loop {
            if let Some(rx) = &driver_state {
                if rx.borrow().is_terminal() {
                    self.flush(&mut deliver);
                    return Ok(());
                }
            }

            let mut stream = match self.platform.stream_logs(&self.app_id, self.cursor).await {
                Ok(s) => s,
                Err(e) if e.is_transient() => {
                    err_streak += 1;
                    let delay = calc_exp_backoff(&self.options.reconnect, err_streak);
                    debug!(
                        "Cannot open log stream (attempt {}), retrying in {:?}: {}",
                        err_streak, delay, e
                    );
                    sleep_fn(delay).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            // First non-duplicate entry on a fresh connection defines
            // where the platform actually resumed; used for gap
            // detection.
            let mut fresh = true;

            loop {
                use futures::StreamExt;

                let item = match &mut driver_state {
                    Some(rx) => {
                        tokio::select! {
                            changed = rx.changed() => {
                                if changed.is_err() || rx.borrow_and_update().is_terminal() {
                                    self.flush(&mut deliver);
                                    return Ok(());
                                }
                                continue;
                            }
                            item = stream.next() => item,
                        }
                    }
                    None => stream.next().await,
                };

                match item {
                    Some(Ok(entry)) => {
                        err_streak = 0;
                        if self.accept(entry, fresh, &mut deliver) {
                            fresh = false;
                        }
                    }
                    Some(Err(e)) if e.is_transient() => {
                        warn!("Log stream interrupted: {}", e);
                        break;
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        debug!("Log stream closed by the platform");
                        break;
                    }
                }
            }

            err_streak += 1;
            let delay = calc_exp_backoff(&self.options.reconnect, err_streak);
            debug!("Reconnecting log stream in {:?}", delay);
            sleep_fn(delay).await;
        }
    }

    /// Process one raw entry. Returns whether the entry was new
    /// (duplicates of already-delivered tokens return false).
    fn accept<D: FnMut(LogEvent)>(&mut self, entry: LogEntry, fresh: bool, deliver: &mut D) -> bool {
        if let Some(c) = self.cursor {
            if entry.token <= c {
                debug!("Dropping duplicate log token {}", entry.token);
                return false;
            }
        }

        let expected = self.cursor.map(|c| c + 1);
        match expected {
            Some(exp) if entry.token > exp => {
                if fresh && self.pending.is_empty() {
                    // Retention expired between disconnect and resume
                    warn!(
                        "Log gap: expected token {}, stream resumed at {}",
                        exp, entry.token
                    );
                    deliver(LogEvent::Gap {
                        expected: exp,
                        resumed_at: entry.token,
                    });
                    self.cursor = Some(entry.token);
                    deliver(LogEvent::Entry(entry));
                } else {
                    // Out-of-order arrival: hold until the hole fills
                    self.pending.insert(entry.token, entry);
                }
            }
            _ => {
                // Next expected token, or the very first entry seen
                self.cursor = Some(entry.token);
                deliver(LogEvent::Entry(entry));
                self.drain_contiguous(deliver);
            }
        }
        true
    }

    fn drain_contiguous<D: FnMut(LogEvent)>(&mut self, deliver: &mut D) {
        while let Some(c) = self.cursor {
            match self.pending.remove(&(c + 1)) {
                Some(entry) => {
                    self.cursor = Some(entry.token);
                    deliver(LogEvent::Entry(entry));
                }
                None => break,
            }
        }
    }

    /// Deliver whatever is still buffered, in token order
    fn flush<D: FnMut(LogEvent)>(&mut self, deliver: &mut D) {
        for (token, entry) in std::mem::take(&mut self.pending) {
            self.cursor = Some(token);
            deliver(LogEvent::Entry(entry));
        }
    }
}
