//! Tests for the validation event system.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lintel_core::events::{
    CycleCompletedEvent, CycleStartedEvent, ErrorEvent, EventDispatcher, IssueDetectedEvent,
    ValidationEventHandler,
};
use lintel_core::model::{IssueType, Severity};

/// A test handler that counts events.
struct CountingHandler {
    cycle_started: AtomicUsize,
    cycle_completed: AtomicUsize,
    issue_detected: AtomicUsize,
    errors: AtomicUsize,
}

impl CountingHandler {
    fn new() -> Self {
        Self {
            cycle_started: AtomicUsize::new(0),
            cycle_completed: AtomicUsize::new(0),
            issue_detected: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }
}

impl ValidationEventHandler for CountingHandler {
    fn on_cycle_started(&self, _event: &CycleStartedEvent) {
        self.cycle_started.fetch_add(1, Ordering::Relaxed);
    }

    fn on_cycle_completed(&self, _event: &CycleCompletedEvent) {
        self.cycle_completed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_issue_detected(&self, _event: &IssueDetectedEvent) {
        self.issue_detected.fetch_add(1, Ordering::Relaxed);
    }

    fn on_error(&self, _event: &ErrorEvent) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

fn started_event() -> CycleStartedEvent {
    CycleStartedEvent {
        cycle_id: 1,
        tenant_id: "t1".into(),
        triggered_by: "system".into(),
    }
}

#[test]
fn handler_noop_defaults() {
    struct NoopHandler;
    impl ValidationEventHandler for NoopHandler {}

    let handler = NoopHandler;
    // All methods callable without implementing them.
    handler.on_cycle_started(&started_event());
    handler.on_issue_detected(&IssueDetectedEvent {
        tenant_id: "t1".into(),
        entity_id: "e1".into(),
        issue_type: IssueType::Orphaned,
        severity: Severity::High,
    });
    handler.on_error(&ErrorEvent {
        message: "test".into(),
        error_code: "TEST".into(),
    });
}

#[test]
fn dispatcher_zero_handlers() {
    let dispatcher = EventDispatcher::new();
    assert_eq!(dispatcher.handler_count(), 0);

    // Should not panic with zero handlers.
    dispatcher.emit_cycle_started(&started_event());
    dispatcher.emit_cycle_completed(&CycleCompletedEvent {
        cycle_id: 1,
        tenant_id: "t1".into(),
        total_issues_found: 0,
        maturity_score: 1.0,
        duration_ms: 5,
    });
}

#[test]
fn dispatcher_multiple_handlers() {
    let mut dispatcher = EventDispatcher::new();

    let handler1 = Arc::new(CountingHandler::new());
    let handler2 = Arc::new(CountingHandler::new());

    dispatcher.register(handler1.clone());
    dispatcher.register(handler2.clone());

    assert_eq!(dispatcher.handler_count(), 2);

    dispatcher.emit_cycle_started(&started_event());

    assert_eq!(handler1.cycle_started.load(Ordering::Relaxed), 1);
    assert_eq!(handler2.cycle_started.load(Ordering::Relaxed), 1);
}

#[test]
fn panicking_handler_does_not_crash() {
    struct PanickingHandler;
    impl ValidationEventHandler for PanickingHandler {
        fn on_cycle_started(&self, _event: &CycleStartedEvent) {
            panic!("intentional panic in handler");
        }
    }

    let mut dispatcher = EventDispatcher::new();
    let panicking = Arc::new(PanickingHandler);
    let counting = Arc::new(CountingHandler::new());

    dispatcher.register(panicking);
    dispatcher.register(counting.clone());

    // The panicking handler is caught; the counting handler still fires.
    dispatcher.emit_cycle_started(&started_event());
    assert_eq!(counting.cycle_started.load(Ordering::Relaxed), 1);
}

#[test]
fn event_payload_integrity() {
    struct CapturingHandler {
        captured_issues: AtomicUsize,
        captured_score_millis: AtomicUsize,
    }

    impl ValidationEventHandler for CapturingHandler {
        fn on_cycle_completed(&self, event: &CycleCompletedEvent) {
            self.captured_issues
                .store(event.total_issues_found as usize, Ordering::Relaxed);
            self.captured_score_millis
                .store((event.maturity_score * 1000.0) as usize, Ordering::Relaxed);
        }
    }

    let mut dispatcher = EventDispatcher::new();
    let handler = Arc::new(CapturingHandler {
        captured_issues: AtomicUsize::new(0),
        captured_score_millis: AtomicUsize::new(0),
    });
    dispatcher.register(handler.clone());

    dispatcher.emit_cycle_completed(&CycleCompletedEvent {
        cycle_id: 7,
        tenant_id: "t1".into(),
        total_issues_found: 42,
        maturity_score: 0.75,
        duration_ms: 10,
    });

    assert_eq!(handler.captured_issues.load(Ordering::Relaxed), 42);
    assert_eq!(handler.captured_score_millis.load(Ordering::Relaxed), 750);
}

#[test]
fn dispatcher_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EventDispatcher>();
}
