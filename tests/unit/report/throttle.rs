use super::*;

use std::cell::RefCell;

use crate::report::transport::RequestCompletion;

#[derive(Default)]
struct MockTransport {
    sent: RefCell<Vec<(String, serde_json::Value)>>,
    completions: RefCell<Vec<RequestCompletion>>,
}

impl MockTransport {
    fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    fn body(&self, index: usize) -> serde_json::Value {
        self.sent.borrow()[index].1.clone()
    }

    fn complete_next(&self, success: bool) {
        self.completions.borrow_mut().remove(0).complete(success);
    }
}

impl NotificationTransport for MockTransport {
    fn post_json(&self, path: &str, body: serde_json::Value) -> RequestHandle {
        let (handle, completion) = RequestHandle::new_pair();
        self.sent.borrow_mut().push((path.to_string(), body));
        self.completions.borrow_mut().push(completion);
        handle
    }
}

fn update(progress: f32) -> StatusUpdate {
    StatusUpdate {
        progress,
        status: RenderJobStatus::Rendering,
        eta_seconds: -1,
    }
}

fn sender() -> ThrottledSender {
    ThrottledSender::new("/p", ThrottleConfig::default())
}

#[test]
fn first_update_always_sends() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    assert!(sender.offer(now, update(0.0), false, &transport));
    assert_eq!(transport.sent_count(), 1);
}

#[test]
fn gated_duplicate_within_interval_makes_one_call() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(0.10), false, &transport);
    transport.complete_next(true);
    sender.poll(now + Duration::from_millis(5), &transport);

    // 5 ms later, 0.5% further: below both gates.
    let accepted = sender.offer(now + Duration::from_millis(5), update(0.105), false, &transport);
    assert!(!accepted);
    assert_eq!(transport.sent_count(), 1);
}

#[test]
fn reaching_one_always_sends() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(0.995), false, &transport);
    transport.complete_next(true);
    sender.poll(now + Duration::from_millis(5), &transport);

    // Interval and delta gates are both unsatisfied, but 1.0 goes out.
    assert!(sender.offer(now + Duration::from_millis(10), update(1.0), false, &transport));
    assert_eq!(transport.sent_count(), 2);
}

#[test]
fn sitting_on_a_boundary_respects_the_interval_gate() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(1.0), false, &transport);
    transport.complete_next(true);
    sender.poll(now + Duration::from_millis(5), &transport);

    // The same boundary value again, inside the interval: rejected.
    assert!(!sender.offer(now + Duration::from_millis(10), update(1.0), false, &transport));
    assert_eq!(transport.sent_count(), 1);

    // After the interval it flows again.
    assert!(sender.offer(now + Duration::from_secs(2), update(1.0), false, &transport));
    assert_eq!(transport.sent_count(), 2);
}

#[test]
fn in_flight_coalesces_to_the_latest_value() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(0.10), false, &transport);
    assert_eq!(transport.sent_count(), 1);
    assert!(sender.has_in_flight());

    // Two more updates land while the first request is on the wire.
    sender.offer(now + Duration::from_secs(2), update(0.40), false, &transport);
    sender.offer(now + Duration::from_secs(4), update(0.55), false, &transport);
    assert_eq!(transport.sent_count(), 1);

    transport.complete_next(true);
    sender.poll(now + Duration::from_secs(5), &transport);

    // Exactly one follow-up, carrying the newest value.
    assert_eq!(transport.sent_count(), 2);
    let body = transport.body(1);
    assert!((body["progress_percent"].as_f64().unwrap() - 0.55).abs() < 1e-6);
}

#[test]
fn pending_slot_fires_even_after_a_failed_request() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(0.10), false, &transport);
    sender.offer(now + Duration::from_secs(2), update(0.40), false, &transport);

    transport.complete_next(false);
    sender.poll(now + Duration::from_secs(3), &transport);
    assert_eq!(transport.sent_count(), 2);
}

#[test]
fn force_bypasses_interval_and_delta_gates() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(0.10), false, &transport);
    transport.complete_next(true);
    sender.poll(now + Duration::from_millis(5), &transport);

    assert!(sender.offer(now + Duration::from_millis(10), update(0.101), true, &transport));
    assert_eq!(transport.sent_count(), 2);
}

#[test]
fn payload_carries_status_and_eta() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(
        now,
        StatusUpdate {
            progress: 0.5,
            status: RenderJobStatus::Encoding,
            eta_seconds: 42,
        },
        false,
        &transport,
    );

    let body = transport.body(0);
    assert_eq!(body["status"], "encoding");
    assert_eq!(body["progress_eta_seconds"], 42);
    assert!((body["progress_percent"].as_f64().unwrap() - 0.5).abs() < 1e-6);
}

#[test]
fn progress_is_clamped_to_the_combined_scale() {
    let transport = MockTransport::default();
    let mut sender = sender();
    let now = Instant::now();

    sender.offer(now, update(3.5), false, &transport);
    let body = transport.body(0);
    assert!((body["progress_percent"].as_f64().unwrap() - 2.0).abs() < 1e-6);
}
