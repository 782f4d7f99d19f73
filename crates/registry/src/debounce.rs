//! Debounced, sequence-tagged provider lookups for name-as-you-type input.
//!
//! Each [`DebouncedLookup::submit`] restarts a quiet-period timer. When the timer fires the
//! lookup is issued; the request itself is not cancelled by later input, but its result is only
//! delivered if no newer input has been submitted since. Stale responses are dropped.
//!
//! The staleness check and the send happen under the same lock that [`DebouncedLookup::submit`]
//! takes to bump the sequence, so a superseded result is never queued. An update can still become
//! stale while it waits in the channel; receivers compare it with
//! [`DebouncedLookup::is_current`] before showing it.
//!
//! Must be used from within a tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::candidate::RegistryCandidate;
use crate::lookup::CandidateSource;
use crate::name::is_too_short;

/// Quiet period after the last keystroke before a lookup is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_secs(1);

/// Candidates to show for the latest input. An empty list means "hide the suggestions".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupUpdate {
    pub sequence: u64,
    pub name: String,
    pub candidates: Vec<RegistryCandidate>,
}

pub struct DebouncedLookup {
    source: Arc<dyn CandidateSource>,
    delay: Duration,
    latest: Arc<Mutex<u64>>,
    timer: Option<JoinHandle<()>>,
    updates: mpsc::UnboundedSender<LookupUpdate>,
}

impl DebouncedLookup {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<LookupUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        (
            Self {
                source,
                delay,
                latest: Arc::new(Mutex::new(0)),
                timer: None,
                updates,
            },
            receiver,
        )
    }

    pub fn latest_sequence(&self) -> u64 {
        *lock(&self.latest)
    }

    /// True when `update` answers the most recent input.
    pub fn is_current(&self, update: &LookupUpdate) -> bool {
        update.sequence == self.latest_sequence()
    }

    /// Record new input and (re)start the quiet-period timer. Returns the input's sequence
    /// number.
    pub fn submit(&mut self, name: impl Into<String>) -> u64 {
        let name = name.into();
        let sequence = bump(&self.latest);
        self.cancel_timer();

        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.latest);
        let updates = self.updates.clone();
        let delay = self.delay;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so that new input after this point does not cancel the request.
            tokio::spawn(run_lookup(source, latest, updates, sequence, name));
        }));

        sequence
    }

    /// Drop any pending lookup and make every in-flight one stale.
    pub fn cancel(&mut self) {
        self.cancel_timer();
        bump(&self.latest);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for DebouncedLookup {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn lock(latest: &Mutex<u64>) -> MutexGuard<'_, u64> {
    match latest.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn bump(latest: &Mutex<u64>) -> u64 {
    let mut latest = lock(latest);
    *latest += 1;
    *latest
}

async fn run_lookup(
    source: Arc<dyn CandidateSource>,
    latest: Arc<Mutex<u64>>,
    updates: mpsc::UnboundedSender<LookupUpdate>,
    sequence: u64,
    name: String,
) {
    let candidates = if name.trim().is_empty() || is_too_short(&name) {
        Vec::new()
    } else {
        match source.candidates(&name).await {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => vec![RegistryCandidate::no_results(&name)],
            Err(e) => {
                tracing::warn!(error = %e, "provider lookup failed");
                vec![RegistryCandidate::lookup_failed(&name, &e.to_string())]
            }
        }
    };

    // Held across the send so no submit can slip in between check and delivery.
    let latest = lock(&latest);
    if *latest != sequence {
        tracing::debug!(sequence, "discarding stale lookup result");
        return;
    }

    // The receiver may already be gone; there is nobody left to show results to.
    let _ = updates.send(LookupUpdate {
        sequence,
        name,
        candidates,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::REGISTRY_SOURCE;
    use crate::{RegistryError, RegistryResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc::error::TryRecvError;

    /// Source answering with one candidate named after the input, after a per-name latency.
    #[derive(Default)]
    struct SlowSource {
        latency: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
        empty: bool,
        fail: bool,
    }

    impl SlowSource {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CandidateSource for SlowSource {
        async fn candidates(&self, name: &str) -> RegistryResult<Vec<RegistryCandidate>> {
            self.calls.lock().unwrap().push(name.to_string());
            if let Some(latency) = self.latency.get(name) {
                tokio::time::sleep(*latency).await;
            }
            if self.fail {
                return Err(RegistryError::Status {
                    status: 500,
                    body: "unavailable".into(),
                });
            }
            if self.empty {
                return Ok(Vec::new());
            }
            Ok(vec![RegistryCandidate {
                id: name.to_string(),
                name: format!("Dr. {name}"),
                address: String::new(),
                phone: String::new(),
                specialty: String::new(),
                npi: name.to_string(),
                source: REGISTRY_SOURCE.to_string(),
                credentials: String::new(),
                gender: String::new(),
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_input_issues_only_the_last_lookup() {
        let source = Arc::new(SlowSource::default());
        let (mut lookup, mut rx) = DebouncedLookup::new(source.clone(), DEBOUNCE_DELAY);

        lookup.submit("Sar");
        tokio::time::sleep(Duration::from_millis(500)).await;
        lookup.submit("Sarah");
        tokio::time::sleep(Duration::from_millis(500)).await;
        let last = lookup.submit("Sarah Smith");

        let update = rx.recv().await.expect("an update should arrive");
        assert_eq!(update.sequence, last);
        assert_eq!(update.name, "Sarah Smith");
        assert_eq!(update.candidates[0].name, "Dr. Sarah Smith");
        assert_eq!(source.calls(), vec!["Sarah Smith"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_is_discarded() {
        let mut latency = HashMap::new();
        latency.insert("Sarah".to_string(), Duration::from_secs(5));
        let source = Arc::new(SlowSource {
            latency,
            ..SlowSource::default()
        });
        let (mut lookup, mut rx) = DebouncedLookup::new(source.clone(), DEBOUNCE_DELAY);

        lookup.submit("Sarah");
        // Past the quiet period: the "Sarah" request is now in flight.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let latest = lookup.submit("Sarah Smith");

        let update = rx.recv().await.expect("an update should arrive");
        assert_eq!(update.sequence, latest);
        assert_eq!(update.name, "Sarah Smith");

        // Let the slow "Sarah" request finish; its result must not be delivered.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(source.calls(), vec!["Sarah", "Sarah Smith"]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_clears_without_lookup() {
        let source = Arc::new(SlowSource::default());
        let (mut lookup, mut rx) = DebouncedLookup::new(source.clone(), DEBOUNCE_DELAY);

        lookup.submit("Jo");
        let update = rx.recv().await.unwrap();
        assert!(update.candidates.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_and_failed_lookups_produce_placeholders() {
        let (mut lookup, mut rx) = DebouncedLookup::new(
            Arc::new(SlowSource {
                empty: true,
                ..SlowSource::default()
            }),
            DEBOUNCE_DELAY,
        );
        lookup.submit("Nobody Here");
        let update = rx.recv().await.unwrap();
        assert_eq!(update.candidates.len(), 1);
        assert_eq!(update.candidates[0].source, "No NPI Records");

        let (mut lookup, mut rx) = DebouncedLookup::new(
            Arc::new(SlowSource {
                fail: true,
                ..SlowSource::default()
            }),
            DEBOUNCE_DELAY,
        );
        lookup.submit("Sarah Smith");
        let update = rx.recv().await.unwrap();
        assert_eq!(update.candidates[0].source, "Backend Error");
        assert!(update.candidates[0].is_placeholder());
    }

    #[tokio::test(start_paused = true)]
    async fn queued_update_goes_stale_after_newer_input() {
        let source = Arc::new(SlowSource::default());
        let (mut lookup, mut rx) = DebouncedLookup::new(source.clone(), DEBOUNCE_DELAY);

        let first = lookup.submit("Sarah");
        tokio::time::sleep(Duration::from_secs(2)).await;
        // Delivered before the next keystroke, then overtaken by it while still queued.
        let newer = lookup.submit("Sarah Smith");

        let update = rx.recv().await.unwrap();
        assert_eq!(update.sequence, first);
        assert!(!lookup.is_current(&update));

        let update = rx.recv().await.unwrap();
        assert_eq!(update.sequence, newer);
        assert!(lookup.is_current(&update));
        assert_eq!(lookup.latest_sequence(), newer);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_pending_and_in_flight_results() {
        let mut latency = HashMap::new();
        latency.insert("Sarah Smith".to_string(), Duration::from_secs(3));
        let source = Arc::new(SlowSource {
            latency,
            ..SlowSource::default()
        });
        let (mut lookup, mut rx) = DebouncedLookup::new(source.clone(), DEBOUNCE_DELAY);

        lookup.submit("Sarah Smith");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        lookup.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(source.calls(), vec!["Sarah Smith"]);
    }
}
