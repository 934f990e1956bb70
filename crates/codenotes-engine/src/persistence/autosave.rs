//! Debounced saving with retries.
//!
//! [`SaveScheduler`] does no IO and owns no clock: the caller passes `now` in,
//! asks [`SaveScheduler::poll`] for the save that is due, performs it, and
//! reports the result through [`SaveScheduler::complete`]. An event loop can
//! sleep until [`SaveScheduler::next_deadline`].

use std::time::{Duration, Instant};

use uuid::Uuid;

use super::{NoteKey, NoteStore, SaveError};

/// Default quiet period after the last edit before saving.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Longest any save is held back, whatever the configured delays.
pub const MAX_SAVE_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

fn deadline(now: Instant, wait: Duration) -> Instant {
    now.checked_add(wait.min(MAX_SAVE_WAIT)).unwrap_or(now)
}

/// Retry configuration for transient save failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Exponential backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay_ms = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutosaveConfig {
    pub delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_AUTOSAVE_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

/// A save the caller should perform now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Identifies the document session the request belongs to.
    pub session: Uuid,
    pub key: NoteKey,
    pub content: String,
    /// 1 for the first attempt.
    pub attempt: u32,
}

/// What happened to a completed save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { attempts: u32 },
    /// Transient failure; the same content is retried at `at`.
    Retrying {
        attempt: u32,
        at: Instant,
        error: SaveError,
    },
    /// Transient failure, but newer content is already waiting to be saved.
    Superseded { error: SaveError },
    /// Permanent failure, or transient failures exhausted the attempts.
    Failed { attempts: u32, error: SaveError },
    /// The result belongs to a document that is no longer open.
    Stale,
}

#[derive(Debug, Clone)]
struct Queued {
    content: String,
    attempt: u32,
    due: Instant,
}

#[derive(Debug, Clone)]
struct Session {
    id: Uuid,
    key: NoteKey,
    /// Next save to perform: a debounced edit or a retry.
    queued: Option<Queued>,
    /// Attempt number of the save currently in flight.
    in_flight: Option<u32>,
}

/// Trailing-edge debounced saver for the open document.
///
/// - Each [`schedule`](Self::schedule) replaces the queued content and pushes
///   the deadline back; only the latest content is ever saved.
/// - At most one save is in flight.
/// - Transient failures are retried with exponential backoff; permanent ones
///   are reported at once.
/// - [`open`](Self::open) and [`close`](Self::close) cancel everything queued
///   and make results of earlier saves stale.
#[derive(Debug)]
pub struct SaveScheduler {
    config: AutosaveConfig,
    session: Option<Session>,
}

impl SaveScheduler {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Starts a session for `key`, dropping anything pending for the previous
    /// document. Returns the new session id.
    pub fn open(&mut self, key: NoteKey) -> Uuid {
        self.cancel_pending("document switched");
        let id = Uuid::new_v4();
        log::debug!("Opened save session {id} for {key}");
        self.session = Some(Session {
            id,
            key,
            queued: None,
            in_flight: None,
        });
        id
    }

    /// Ends the session without saving anything still queued.
    pub fn close(&mut self) {
        self.cancel_pending("document closed");
        self.session = None;
    }

    pub fn session(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Queues `content` to be saved once no newer edit arrives for the
    /// configured delay. Replaces queued content, including a pending retry.
    pub fn schedule(&mut self, content: String, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("Ignoring save with no open document");
            return;
        };
        session.queued = Some(Queued {
            content,
            attempt: 1,
            due: deadline(now, self.config.delay),
        });
    }

    /// Makes queued content due immediately (explicit save).
    pub fn flush(&mut self, now: Instant) {
        if let Some(queued) = self.session.as_mut().and_then(|s| s.queued.as_mut()) {
            queued.due = now;
        }
    }

    /// When the next queued save becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref()?.queued.as_ref().map(|q| q.due)
    }

    pub fn has_pending(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.queued.is_some() || s.in_flight.is_some())
    }

    /// Hands out the due save, if any. Nothing is handed out while another
    /// save is in flight.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        let session = self.session.as_mut()?;
        if session.in_flight.is_some() {
            return None;
        }
        if session.queued.as_ref().is_none_or(|q| q.due > now) {
            return None;
        }
        let queued = session.queued.take()?;
        session.in_flight = Some(queued.attempt);
        Some(SaveRequest {
            session: session.id,
            key: session.key.clone(),
            content: queued.content,
            attempt: queued.attempt,
        })
    }

    /// Records the result of a save handed out by [`poll`](Self::poll).
    pub fn complete(
        &mut self,
        request: SaveRequest,
        result: Result<(), SaveError>,
        now: Instant,
    ) -> SaveOutcome {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id == request.session)
        else {
            log::warn!("Discarding result of stale save for {}", request.key);
            return SaveOutcome::Stale;
        };
        session.in_flight = None;
        let attempt = request.attempt;

        let error = match result {
            Ok(()) => {
                log::info!("Saved {} (attempt {attempt})", request.key);
                return SaveOutcome::Saved { attempts: attempt };
            }
            Err(error) => error,
        };

        if !error.is_transient() || attempt >= self.config.retry.max_attempts {
            log::warn!("Giving up saving {} after {attempt} attempt(s): {error}", request.key);
            return SaveOutcome::Failed {
                attempts: attempt,
                error,
            };
        }
        if session.queued.is_some() {
            log::info!("Save of {} failed, newer content queued: {error}", request.key);
            return SaveOutcome::Superseded { error };
        }

        let at = deadline(now, self.config.retry.delay_after(attempt));
        log::info!(
            "Save of {} failed ({error}), retry {} at +{:?}",
            request.key,
            attempt + 1,
            at - now
        );
        session.queued = Some(Queued {
            content: request.content,
            attempt: attempt + 1,
            due: at,
        });
        SaveOutcome::Retrying {
            attempt: attempt + 1,
            at,
            error,
        }
    }

    /// Performs the due save, if any, synchronously against `store`.
    pub fn drive(&mut self, store: &mut dyn NoteStore, now: Instant) -> Option<SaveOutcome> {
        let request = self.poll(now)?;
        let result = store.save(&request.key, &request.content);
        Some(self.complete(request, result, now))
    }

    fn cancel_pending(&mut self, reason: &str) {
        if let Some(session) = self.session.as_mut()
            && session.queued.take().is_some()
        {
            log::info!("Cancelled pending save for {} ({reason})", session.key);
        }
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(AutosaveConfig::default())
    }
}
