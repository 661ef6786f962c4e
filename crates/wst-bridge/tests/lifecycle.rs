//! Integration tests: install/uninstall, page unload and diagnostics (wst-bridge).

mod support;

use pretty_assertions::assert_eq;
use std::rc::Rc;
use support::*;
use wst_bridge::{Completion, Handlers, Token};

#[test]
fn install_watches_unload_and_creates_picker() {
    let (bridge, _log) = installed_bridge();
    assert!(bridge.is_installed());
    assert!(bridge.host().unload_watched);
    assert_eq!(bridge.host().live_pickers.len(), 1);
}

#[test]
fn uninstall_twice_is_harmless() {
    let (mut bridge, _log) = installed_bridge();

    bridge.uninstall();
    assert!(!bridge.is_installed());
    assert!(bridge.context().is_none());
    assert!(bridge.host().live_pickers.is_empty());

    bridge.uninstall();
    assert!(!bridge.is_installed());
    assert!(bridge.context().is_none());
    assert_eq!(
        bridge
            .host()
            .count(|call| matches!(call, HostCall::UnwatchUnload)),
        1
    );
}

#[test]
fn unload_after_uninstall_does_not_notify() {
    let (mut bridge, log) = installed_bridge();
    bridge.uninstall();

    assert!(!bridge.notify_before_unload());
    assert!(log.borrow().is_empty());
}

#[test]
fn unload_notifies_installed_handler() {
    let (mut bridge, log) = installed_bridge();
    assert!(bridge.notify_before_unload());
    assert_eq!(*log.borrow(), vec![Event::Unload]);
}

#[test]
fn reset_request_suppresses_unload() {
    let (mut bridge, log) = installed_bridge();
    bridge.request_reset();
    assert!(bridge.is_reset_requested());
    assert!(!bridge.notify_before_unload());
    assert!(log.borrow().is_empty());
}

#[test]
fn completions_after_uninstall_are_tolerated() {
    let (mut bridge, log) = installed_bridge();
    bridge.import_from_url(Token::new(1), "https://example.com/a.frag");
    bridge.open_file_dialog(Token::new(2)).unwrap();
    bridge.uninstall();

    // Both arrive after the registration is gone.
    server_responds(&bridge, 1, "https://example.com/a.frag", 200, "x");
    user_picks(&bridge, "b.frag", Ok("y"));
    bridge.completions().post(Completion::ClipboardRead {
        request: Token::new(3),
        read: Ok("z".into()),
    });

    assert_eq!(bridge.dispatch(), 0);
    assert!(log.borrow().is_empty());
    // The stale pick must not resurrect a picker.
    assert!(bridge.host().live_pickers.is_empty());
}

#[test]
fn uninstall_discards_queued_completions() {
    let (mut bridge, log) = installed_bridge();
    server_responds(&bridge, 1, "https://example.com/a.frag", 200, "x");
    assert_eq!(bridge.pending(), 1);

    bridge.uninstall();
    assert_eq!(bridge.pending(), 0);

    bridge.install(recording_handlers(), Rc::clone(&log));
    assert_eq!(bridge.dispatch(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn last_install_wins() {
    let (mut bridge, first_log) = installed_bridge();
    let second_log = Recorder::default();
    bridge.install(recording_handlers(), Rc::clone(&second_log));

    assert_eq!(bridge.host().live_pickers.len(), 1);
    assert_eq!(
        bridge
            .host()
            .count(|call| matches!(call, HostCall::WatchUnload)),
        1
    );

    bridge.notify_before_unload();
    assert!(first_log.borrow().is_empty());
    assert_eq!(*second_log.borrow(), vec![Event::Unload]);
}

#[test]
fn empty_slots_are_no_ops() {
    let mut bridge = make_bridge();
    bridge.install(Handlers::new(), Recorder::default());

    bridge.import_from_url(Token::new(1), "https://example.com/a.frag");
    server_responds(&bridge, 1, "https://example.com/a.frag", 200, "x");
    assert_eq!(bridge.dispatch(), 0);
    assert!(!bridge.notify_before_unload());
}

#[test]
fn context_is_reachable_while_installed() {
    let (mut bridge, log) = installed_bridge();
    bridge
        .context_mut()
        .unwrap()
        .borrow_mut()
        .push(Event::Unload);
    assert_eq!(log.borrow().len(), 1);
}

// ─── Diagnostics ────────────────────────────────────────────────────────

#[test]
fn abort_invokes_host_hook() {
    let (mut bridge, _log) = installed_bridge();
    bridge.abort(Some("CHECK FAILED: [device != null]"));
    assert_eq!(
        bridge.host().calls.last(),
        Some(&HostCall::Abort(Some("CHECK FAILED: [device != null]".into())))
    );
}

#[test]
fn abort_without_hook_only_logs() {
    let (mut bridge, _log) = installed_bridge();
    bridge.host_mut().has_abort_hook = false;
    bridge.abort(None);
    bridge.print_stack_trace(Some("frame"));
    assert!(bridge.is_installed());
}
