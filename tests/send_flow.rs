mod support;

use fimg::{run_send, FileOrder, FimgError, PreviewOptions, SendOutcome, SendRequest};
use support::{roster_dir, RecordingDelivery, ScriptedTerminal};

fn request<'a>(dir: &'a std::path::Path, targets: &'a str, message: &'a str) -> SendRequest<'a> {
    SendRequest {
        targets,
        message,
        lists_dir: dir,
        list: None,
        file_order: FileOrder::default(),
        preview: PreviewOptions::default(),
    }
}

#[test]
fn confirmed_send_delivers_once_per_resolved_handle_in_order() {
    let dir = roster_dir(&[("a.csv", "Bob Smith,+15550001111,bobby\n")]);
    let mut terminal = ScriptedTerminal::with_keys(b"\r");
    let delivery = RecordingDelivery::default();

    let outcome = run_send(
        &mut terminal,
        &delivery,
        &request(dir.path(), "bobby, +15559999999, Smith", "Hi\nthere"),
    )
    .expect("send should run");

    let report = match outcome {
        SendOutcome::Delivered(report) => report,
        other => panic!("expected delivery, got {other:?}"),
    };
    assert_eq!(report.sent, 2);
    assert!(report.is_success());
    assert_eq!(
        delivery.calls.borrow().as_slice(),
        &[
            ("+15550001111".to_string(), "Hi\nthere".to_string()),
            ("+15559999999".to_string(), "Hi\nthere".to_string()),
        ]
    );
    assert!(terminal.output.contains("send to:\nBob Smith +15559999999\n"));
    assert!(terminal.output.contains("✔ Bob Smith [iMessage]\n"));
    assert!(terminal.output.ends_with("All sent.\n"));
}

#[test]
fn declined_preview_delivers_nothing() {
    let dir = roster_dir(&[]);
    let mut terminal = ScriptedTerminal::with_keys(b"n");
    let delivery = RecordingDelivery::default();

    let outcome = run_send(&mut terminal, &delivery, &request(dir.path(), "alice", "hi"))
        .expect("send should run");

    assert_eq!(outcome, SendOutcome::Cancelled);
    assert!(delivery.calls.borrow().is_empty());
    assert!(terminal.output.starts_with("Unmatched (sent as typed): alice\n"));
    assert!(terminal.output.contains("[fimg] cancelled"));
}

#[test]
fn matched_targets_print_no_unmatched_line() {
    let dir = roster_dir(&[("a.csv", "Bob Smith,+15550001111,bobby\n")]);
    let mut terminal = ScriptedTerminal::with_keys(b"\r");
    let delivery = RecordingDelivery::default();

    run_send(&mut terminal, &delivery, &request(dir.path(), "bobby, +1999", "hi"))
        .expect("send should run");

    assert!(!terminal.output.contains("Unmatched"));
}

#[test]
fn named_roster_limits_resolution_and_all_expands_it() {
    let dir = roster_dir(&[
        ("family.csv", "Ann Lee,+15550000001,\nBo Lee,+15550000002,\n"),
        ("work.csv", "Cy Park,+15550000003,\n"),
    ]);
    let mut terminal = ScriptedTerminal::default();
    let delivery = RecordingDelivery::default();
    let mut req = request(dir.path(), "all, cy", "hi");
    req.list = Some("family");
    req.preview.skip_confirmation = true;

    run_send(&mut terminal, &delivery, &req).expect("send should run");

    let handles: Vec<String> = delivery.calls.borrow().iter().map(|(h, _)| h.clone()).collect();
    assert_eq!(handles, vec!["+15550000001", "+15550000002", "cy"]);
    assert!(terminal.output.contains("Unmatched (sent as typed): cy\n"));
}

#[test]
fn failures_are_reported_per_recipient_and_do_not_stop_the_loop() {
    let dir = roster_dir(&[]);
    let mut terminal = ScriptedTerminal::default();
    let delivery = RecordingDelivery {
        fail: vec!["+1111".to_string()],
        ..RecordingDelivery::default()
    };
    let mut req = request(dir.path(), "+1111, +2222", "hi");
    req.preview.skip_confirmation = true;

    let outcome = run_send(&mut terminal, &delivery, &req).expect("send should run");

    let report = match outcome {
        SendOutcome::Delivered(report) => report,
        other => panic!("expected delivery, got {other:?}"),
    };
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, vec!["+1111".to_string()]);
    assert_eq!(delivery.calls.borrow().len(), 2);
    assert!(terminal.output.contains("✖ +1111 [ERROR: not registered]\n"));
    assert!(terminal.output.ends_with("Done with 1 error(s).\n"));
}

#[test]
fn empty_targets_resolve_to_no_recipients() {
    let dir = roster_dir(&[]);
    let mut terminal = ScriptedTerminal::with_keys(b"\r");
    let delivery = RecordingDelivery::default();

    let err = run_send(&mut terminal, &delivery, &request(dir.path(), " , ,", "hi"))
        .expect_err("no recipients");

    assert!(matches!(err, FimgError::NoRecipients));
    assert_eq!(err.exit_code(), 3);
    assert!(terminal.output.is_empty());
}
