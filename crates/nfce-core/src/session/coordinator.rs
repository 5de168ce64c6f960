//! Scan workflow coordinator.
//!
//! Serializes decode events into at-most-one concurrent submission and
//! paces re-arming so the user has time to read the outcome before the next
//! scan is accepted. Duplicate decodes that arrive while a submission (or
//! its cooldown) is in flight are dropped, never queued.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::api::ApiError;
use crate::event_bus::{AlertLevel, EventBus, UiEvent};
use crate::scanner::ScanEvent;
use crate::session::state::{Session, SessionId, SessionPhase};

/// How long the session stays busy after a successful submission.
const SUCCESS_COOLDOWN: Duration = Duration::from_millis(3000);

/// How long the session stays busy after a failed submission. Shorter than
/// the success window so a bad read can be retried quickly, while still
/// avoiding a tight failure loop against a saturated backend.
const FAILURE_COOLDOWN: Duration = Duration::from_millis(2000);

/// Submission seam between the coordinator and the processing backend.
///
/// The success value is the user-facing confirmation message. Implemented
/// by [`HttpSubmitter`](crate::api::HttpSubmitter) in production and by
/// scripted fakes in tests.
pub trait ReceiptSubmitter: Send + Sync {
    fn submit(&self, url: String) -> BoxFuture<'static, Result<String, ApiError>>;
}

/// Cooldown configuration for a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub success_cooldown: Duration,
    pub failure_cooldown: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            success_cooldown: SUCCESS_COOLDOWN,
            failure_cooldown: FAILURE_COOLDOWN,
        }
    }
}

/// Coordinates the decode -> submit -> cool down -> re-arm workflow.
///
/// Owns the [`Session`] exclusively. `processing` acts as a non-blocking
/// mutual-exclusion gate: decode callbacks arriving while it is set are
/// side-effect-free no-ops. There is no cancellation primitive; `stop`
/// deactivates the session but an in-flight submission runs to completion.
///
/// `on_decoded` spawns the submission task onto the ambient tokio runtime,
/// so it must be called from within one.
pub struct ScanCoordinator {
    session: Arc<Mutex<Session>>,
    submitter: Arc<dyn ReceiptSubmitter>,
    events: Arc<EventBus>,
    config: CoordinatorConfig,
}

impl ScanCoordinator {
    pub fn new(submitter: Arc<dyn ReceiptSubmitter>, events: Arc<EventBus>) -> Self {
        Self::with_config(submitter, events, CoordinatorConfig::default())
    }

    pub fn with_config(
        submitter: Arc<dyn ReceiptSubmitter>,
        events: Arc<EventBus>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            submitter,
            events,
            config,
        }
    }

    /// Session identifier, for log correlation.
    pub fn session_id(&self) -> SessionId {
        self.session.lock().unwrap().id.clone()
    }

    /// Snapshot of the derived session phase.
    pub fn phase(&self) -> SessionPhase {
        self.session.lock().unwrap().phase()
    }

    /// Whether a submission or its cooldown is still in flight. Remains
    /// true after `stop` until the in-flight work settles.
    pub fn is_processing(&self) -> bool {
        self.session.lock().unwrap().processing
    }

    /// Activate the session (Idle -> Armed). Idempotent.
    pub fn start(&self) {
        let was_active = {
            let mut session = self.session.lock().unwrap();
            std::mem::replace(&mut session.active, true)
        };
        if !was_active {
            self.events.emit(UiEvent::ScannerStarted);
        }
    }

    /// Deactivate the session (Armed/Busy -> Idle). Idempotent, and never
    /// touches the re-entrancy guard: an in-flight submission continues.
    pub fn stop(&self) {
        let was_active = {
            let mut session = self.session.lock().unwrap();
            std::mem::replace(&mut session.active, false)
        };
        if was_active {
            self.events.emit(UiEvent::ScannerStopped);
        }
    }

    /// Handle a decode event from the capture source.
    ///
    /// Returns `true` when the event was accepted and a submission started,
    /// `false` when it was dropped (session inactive, or a submission is
    /// already in flight). Dropped events are not buffered.
    pub fn on_decoded(&self, event: ScanEvent) -> bool {
        {
            let mut session = self.session.lock().unwrap();
            if !session.active {
                log::debug!(
                    "session {}: dropping decode while inactive: {}",
                    session.id,
                    event.payload
                );
                return false;
            }
            if session.processing {
                log::debug!(
                    "session {}: dropping decode while busy: {}",
                    session.id,
                    event.payload
                );
                return false;
            }
            session.processing = true;
        }

        // Surface the decoded value immediately, before the submission
        // outcome is known.
        self.events.emit(UiEvent::ScanAccepted {
            url: event.payload.clone(),
        });

        let session = Arc::clone(&self.session);
        let submitter = Arc::clone(&self.submitter);
        let events = Arc::clone(&self.events);
        let config = self.config.clone();

        tokio::spawn(async move {
            let cooldown = match submitter.submit(event.payload).await {
                Ok(message) => {
                    events.alert(AlertLevel::Success, message);
                    config.success_cooldown
                }
                Err(err) => {
                    log::warn!("submission failed: {}", err);
                    events.alert(AlertLevel::Error, err.to_string());
                    config.failure_cooldown
                }
            };

            tokio::time::sleep(cooldown).await;

            let rearmed = {
                let mut session = session.lock().unwrap();
                session.processing = false;
                session.active
            };
            // A session stopped mid-flight settles in Idle, not Armed.
            if rearmed {
                events.emit(UiEvent::Rearmed);
            }
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::broadcast::error::TryRecvError;

    #[derive(Clone)]
    enum Outcome {
        Ok(String),
        Err(String),
        /// Never resolves within any cooldown a test advances past.
        Pending,
    }

    /// Scripted submitter: pops one outcome per submission, records the
    /// submitted payloads.
    struct ScriptedSubmitter {
        outcomes: Mutex<VecDeque<Outcome>>,
        submitted: Mutex<Vec<String>>,
    }

    impl ScriptedSubmitter {
        fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                submitted: Mutex::new(Vec::new()),
            })
        }

        fn submitted(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }
    }

    impl ReceiptSubmitter for ScriptedSubmitter {
        fn submit(&self, url: String) -> BoxFuture<'static, Result<String, ApiError>> {
            self.submitted.lock().unwrap().push(url);
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Outcome::Ok("processed".to_string()));
            Box::pin(async move {
                match outcome {
                    Outcome::Ok(message) => Ok(message),
                    Outcome::Err(message) => Err(ApiError::Backend {
                        status: 500,
                        message,
                    }),
                    Outcome::Pending => {
                        tokio::time::sleep(Duration::from_secs(86400)).await;
                        Err(ApiError::Transport("never resolves".to_string()))
                    }
                }
            })
        }
    }

    fn armed_coordinator(
        outcomes: Vec<Outcome>,
    ) -> (ScanCoordinator, Arc<ScriptedSubmitter>, Arc<EventBus>) {
        let submitter = ScriptedSubmitter::new(outcomes);
        let events = Arc::new(EventBus::new());
        let coordinator = ScanCoordinator::new(
            Arc::clone(&submitter) as Arc<dyn ReceiptSubmitter>,
            Arc::clone(&events),
        );
        coordinator.start();
        (coordinator, submitter, events)
    }

    /// Let spawned submission tasks run up to their next await point.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<UiEvent>) -> Vec<UiEvent> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => out.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        out
    }

    mod lifecycle {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn starts_idle_and_arms_on_start() {
            let submitter = ScriptedSubmitter::new(vec![]);
            let events = Arc::new(EventBus::new());
            let coordinator =
                ScanCoordinator::new(submitter as Arc<dyn ReceiptSubmitter>, events);

            assert_eq!(coordinator.phase(), SessionPhase::Idle);
            coordinator.start();
            assert_eq!(coordinator.phase(), SessionPhase::Armed);
        }

        #[tokio::test(start_paused = true)]
        async fn start_and_stop_are_idempotent() {
            let (coordinator, _, events) = armed_coordinator(vec![]);
            let mut rx = events.subscribe();

            coordinator.start();
            coordinator.stop();
            coordinator.stop();

            assert_eq!(coordinator.phase(), SessionPhase::Idle);
            // One transition each way; repeats emitted nothing.
            let seen = drain(&mut rx);
            assert!(matches!(seen.as_slice(), [UiEvent::ScannerStopped]));
        }

        #[tokio::test(start_paused = true)]
        async fn decode_while_idle_is_dropped() {
            let submitter = ScriptedSubmitter::new(vec![]);
            let events = Arc::new(EventBus::new());
            let coordinator = ScanCoordinator::new(
                Arc::clone(&submitter) as Arc<dyn ReceiptSubmitter>,
                events,
            );

            assert!(!coordinator.on_decoded(ScanEvent::new("A")));
            settle().await;
            assert!(submitter.submitted().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn decode_after_stop_is_dropped() {
            let (coordinator, submitter, _) = armed_coordinator(vec![]);
            coordinator.stop();

            assert!(!coordinator.on_decoded(ScanEvent::new("A")));
            settle().await;
            assert!(submitter.submitted().is_empty());
        }
    }

    mod reentrancy {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn first_decode_is_submitted() {
            let (coordinator, submitter, _) = armed_coordinator(vec![Outcome::Pending]);

            assert!(coordinator.on_decoded(ScanEvent::new("A")));
            settle().await;

            assert_eq!(coordinator.phase(), SessionPhase::Busy);
            assert_eq!(submitter.submitted(), vec!["A"]);
        }

        #[tokio::test(start_paused = true)]
        async fn overlapping_decode_is_dropped_not_queued() {
            let (coordinator, submitter, _) = armed_coordinator(vec![Outcome::Pending]);

            assert!(coordinator.on_decoded(ScanEvent::new("A")));
            assert!(!coordinator.on_decoded(ScanEvent::new("B")));
            settle().await;

            // "B" was dropped outright; it never shows up later.
            assert_eq!(submitter.submitted(), vec!["A"]);
        }

        #[tokio::test(start_paused = true)]
        async fn only_first_of_a_burst_is_accepted() {
            let (coordinator, submitter, _) = armed_coordinator(vec![Outcome::Pending]);

            let accepted: Vec<bool> = ["A", "B", "C", "D"]
                .iter()
                .map(|payload| coordinator.on_decoded(ScanEvent::new(*payload)))
                .collect();
            settle().await;

            assert_eq!(accepted, vec![true, false, false, false]);
            assert_eq!(submitter.submitted(), vec!["A"]);
        }
    }

    mod cooldowns {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn success_holds_busy_for_three_seconds() {
            let (coordinator, submitter, _) =
                armed_coordinator(vec![Outcome::Ok("saved".to_string())]);

            assert!(coordinator.on_decoded(ScanEvent::new("A")));
            settle().await;

            tokio::time::advance(Duration::from_millis(2999)).await;
            settle().await;
            assert_eq!(coordinator.phase(), SessionPhase::Busy);
            assert!(!coordinator.on_decoded(ScanEvent::new("B")));

            tokio::time::advance(Duration::from_millis(1)).await;
            settle().await;
            assert_eq!(coordinator.phase(), SessionPhase::Armed);
            assert!(coordinator.on_decoded(ScanEvent::new("B")));
            settle().await;

            assert_eq!(submitter.submitted(), vec!["A", "B"]);
        }

        #[tokio::test(start_paused = true)]
        async fn failure_rearms_after_two_seconds() {
            let (coordinator, _, _) =
                armed_coordinator(vec![Outcome::Err("timeout".to_string())]);

            assert!(coordinator.on_decoded(ScanEvent::new("A")));
            settle().await;

            tokio::time::advance(Duration::from_millis(1999)).await;
            settle().await;
            assert!(!coordinator.on_decoded(ScanEvent::new("B")));

            tokio::time::advance(Duration::from_millis(1)).await;
            settle().await;
            assert_eq!(coordinator.phase(), SessionPhase::Armed);
            assert!(coordinator.on_decoded(ScanEvent::new("B")));
        }

        #[test]
        fn failure_window_is_shorter_than_success_window() {
            let config = CoordinatorConfig::default();
            assert!(config.failure_cooldown < config.success_cooldown);
            assert_eq!(config.success_cooldown, Duration::from_millis(3000));
            assert_eq!(config.failure_cooldown, Duration::from_millis(2000));
        }
    }

    mod feedback {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn accepted_scan_is_surfaced_before_the_outcome() {
            let (coordinator, _, events) = armed_coordinator(vec![Outcome::Pending]);
            let mut rx = events.subscribe();

            coordinator.on_decoded(ScanEvent::new("http://fazenda.example/nfce"));
            settle().await;

            let seen = drain(&mut rx);
            assert!(matches!(
                seen.first(),
                Some(UiEvent::ScanAccepted { url }) if url == "http://fazenda.example/nfce"
            ));
        }

        #[tokio::test(start_paused = true)]
        async fn failure_message_reaches_the_user() {
            let (coordinator, _, events) =
                armed_coordinator(vec![Outcome::Err("timeout".to_string())]);
            let mut rx = events.subscribe();

            coordinator.on_decoded(ScanEvent::new("A"));
            settle().await;

            let seen = drain(&mut rx);
            assert!(seen.iter().any(|event| matches!(
                event,
                UiEvent::Alert { level: AlertLevel::Error, message } if message == "timeout"
            )));
        }

        #[tokio::test(start_paused = true)]
        async fn rearm_is_announced_after_the_cooldown() {
            let (coordinator, _, events) =
                armed_coordinator(vec![Outcome::Ok("saved".to_string())]);
            let mut rx = events.subscribe();

            coordinator.on_decoded(ScanEvent::new("A"));
            settle().await;
            tokio::time::advance(Duration::from_millis(3000)).await;
            settle().await;

            let seen = drain(&mut rx);
            assert!(seen.iter().any(|event| matches!(event, UiEvent::Rearmed)));
        }
    }

    mod stop_mid_flight {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn inflight_submission_is_not_cancelled_by_stop() {
            let (coordinator, submitter, _) =
                armed_coordinator(vec![Outcome::Ok("saved".to_string())]);

            assert!(coordinator.on_decoded(ScanEvent::new("A")));
            coordinator.stop();
            settle().await;

            // The submission still ran to completion.
            assert_eq!(submitter.submitted(), vec!["A"]);
        }

        #[tokio::test(start_paused = true)]
        async fn session_stopped_mid_flight_settles_idle_not_armed() {
            let (coordinator, _, events) =
                armed_coordinator(vec![Outcome::Ok("saved".to_string())]);
            let mut rx = events.subscribe();

            coordinator.on_decoded(ScanEvent::new("A"));
            coordinator.stop();
            settle().await;
            tokio::time::advance(Duration::from_millis(3000)).await;
            settle().await;

            assert_eq!(coordinator.phase(), SessionPhase::Idle);
            assert!(!coordinator.on_decoded(ScanEvent::new("B")));

            // No re-arm announcement for a stopped session.
            let seen = drain(&mut rx);
            assert!(!seen.iter().any(|event| matches!(event, UiEvent::Rearmed)));
        }
    }
}
