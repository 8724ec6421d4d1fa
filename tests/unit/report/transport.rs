use super::*;

#[test]
fn handle_pair_settles_once() {
    let (handle, completion) = RequestHandle::new_pair();
    assert_eq!(handle.state(), RequestState::Pending);
    assert!(!handle.is_finished());

    completion.complete(true);
    assert_eq!(handle.state(), RequestState::Succeeded);
    assert!(handle.is_finished());

    let (handle, completion) = RequestHandle::new_pair();
    completion.complete(false);
    assert_eq!(handle.state(), RequestState::Failed);
}

#[test]
fn notifier_settles_handles_for_unreachable_hosts() {
    // Nothing listens on port 9; the request fails fast and the handle
    // must still settle so coalescing cannot wedge.
    let notifier = HttpNotifier::new("http://127.0.0.1:9");
    let handle = notifier.post_json(
        "/ue-notifications/job/j1/progress",
        serde_json::json!({ "progress_percent": 0.5 }),
    );

    notifier.flush();
    assert_eq!(handle.state(), RequestState::Failed);
}

#[test]
fn base_url_trailing_slash_is_tolerated() {
    let notifier = HttpNotifier::new("http://127.0.0.1:9/");
    let handle = notifier.post_json("/x", serde_json::json!({}));
    notifier.flush();
    assert!(handle.is_finished());
}
