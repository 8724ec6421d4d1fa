use super::*;

use std::cell::Cell;

struct ToggleGate {
    ready: Cell<bool>,
}

impl ReadinessGate for ToggleGate {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

#[test]
fn open_gate_starts_immediately() {
    let now = Instant::now();
    let poller = GatePoller::new(now, Duration::from_secs(30));
    let gate = ToggleGate {
        ready: Cell::new(true),
    };
    assert_eq!(
        poller.poll(&gate, now),
        GateDecision::Start { timed_out: false }
    );
}

#[test]
fn closed_gate_waits_until_timeout() {
    let now = Instant::now();
    let poller = GatePoller::new(now, Duration::from_secs(30));
    let gate = ToggleGate {
        ready: Cell::new(false),
    };

    assert_eq!(poller.poll(&gate, now), GateDecision::Wait);
    assert_eq!(
        poller.poll(&gate, now + Duration::from_secs(29)),
        GateDecision::Wait
    );
    assert_eq!(
        poller.poll(&gate, now + Duration::from_secs(30)),
        GateDecision::Start { timed_out: true }
    );
}

#[test]
fn gate_opening_mid_wait_wins_over_timeout() {
    let now = Instant::now();
    let poller = GatePoller::new(now, Duration::from_secs(30));
    let gate = ToggleGate {
        ready: Cell::new(false),
    };

    assert_eq!(poller.poll(&gate, now), GateDecision::Wait);
    gate.ready.set(true);
    assert_eq!(
        poller.poll(&gate, now + Duration::from_secs(5)),
        GateDecision::Start { timed_out: false }
    );
}
