use fnwheel_core::{
    ClientSession, Rgb, SessionEffect, Status, SyncPhase, DRAG_DELAY, DRAG_STEP,
};

fn status(color: Rgb, users: u32) -> Status {
    Status {
        color,
        step: 25.0,
        delay: 10.0,
        count: 8,
        users,
    }
}

fn issued_epoch(effect: &SessionEffect) -> Option<u64> {
    match effect {
        SessionEffect::IssuePoll { epoch } => Some(*epoch),
        _ => None,
    }
}

#[test]
fn first_status_adopts_color_without_fading() {
    let mut session = ClientSession::new();
    let effect = session.begin().unwrap();
    let epoch = issued_epoch(&effect).unwrap();

    let effects = session.on_status(epoch, &status(Rgb::new(255.0, 0.0, 0.0), 1));
    assert!(effects
        .iter()
        .any(|e| matches!(e, SessionEffect::InitMask { count: 8 })));
    assert!(effects
        .iter()
        .any(|e| matches!(e, SessionEffect::Publish(_))));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, SessionEffect::StartFade { .. })));
    assert_eq!(session.color(), Rgb::new(255.0, 0.0, 0.0));
    assert_eq!(session.mask().len(), 8);
}

#[test]
fn later_status_starts_a_fade_and_reissues_the_poll() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));

    let target = Rgb::new(0.0, 0.0, 200.0);
    let effects = session.on_status(epoch, &status(target, 3));
    assert!(effects.iter().any(|e| matches!(
        e,
        SessionEffect::StartFade { target: t, .. } if *t == target
    )));
    assert!(effects
        .iter()
        .any(|e| matches!(e, SessionEffect::UpdateUsers { users: 3 })));
    assert_eq!(session.users(), 3);
    let last = effects.last().unwrap();
    assert_eq!(issued_epoch(last), Some(epoch));
    assert_eq!(session.phase(), SyncPhase::Polling);
}

#[test]
fn poll_loop_stays_live_across_responses() {
    // N responses (including converged no-change ones) produce N+1 issued
    // polls, one at a time.
    let mut session = ClientSession::new();
    let mut issued = 0;
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    issued += 1;
    for round in 0..5 {
        let effects = session.on_status(epoch, &status(Rgb::BLACK, round));
        let polls = effects
            .iter()
            .filter(|e| issued_epoch(e).is_some())
            .count();
        assert_eq!(polls, 1, "round {round}: exactly one reissued poll");
        issued += 1;
    }
    assert_eq!(issued, 6);
}

#[test]
fn poll_error_retries_immediately() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    let retry = session.on_poll_error(epoch).unwrap();
    assert_eq!(issued_epoch(&retry), Some(epoch));
}

#[test]
fn drag_discards_the_stale_response() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));

    let effects = session.begin_drag();
    assert!(effects.contains(&SessionEffect::AbortPoll));
    assert!(effects.contains(&SessionEffect::StopFade));
    assert_eq!(session.phase(), SyncPhase::Overridden);

    let drag_color = Rgb::new(10.0, 20.0, 30.0);
    session.drag_move(drag_color);

    // A response queued before the abort arrives late, tagged with the
    // old epoch. It must not touch the session color.
    let late = session.on_status(epoch, &status(Rgb::new(255.0, 255.0, 255.0), 9));
    assert!(late.is_empty());
    assert_eq!(session.color(), drag_color);

    // A response on the *current* epoch is also discarded while the drag
    // is active.
    let during = session.on_status(session.epoch(), &status(Rgb::new(1.0, 2.0, 3.0), 9));
    assert!(during.is_empty());
    assert_eq!(session.color(), drag_color);
}

#[test]
fn drag_moves_publish_and_follow_at_full_step() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));
    session.begin_drag();

    let color = Rgb::new(50.0, 60.0, 70.0);
    let effects = session.drag_move(color);
    assert_eq!(effects[0], SessionEffect::Publish(color));
    match &effects[1] {
        SessionEffect::SendFade { command, .. } => {
            assert_eq!(command.step, DRAG_STEP);
            assert_eq!(command.delay, DRAG_DELAY);
            assert_eq!(command.color, color);
        }
        other => panic!("expected SendFade, got {other:?}"),
    }

    // Unacknowledged command: further moves publish but do not send.
    let effects = session.drag_move(Rgb::new(51.0, 60.0, 70.0));
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], SessionEffect::Publish(_)));

    session.on_fade_ack();
    let effects = session.drag_move(Rgb::new(52.0, 60.0, 70.0));
    assert_eq!(effects.len(), 2);
}

#[test]
fn drag_end_resumes_polling_from_own_color() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));
    session.begin_drag();
    session.drag_move(Rgb::new(90.0, 0.0, 0.0));

    let effects = session.end_drag(true, Rgb::new(90.0, 0.0, 0.0));
    assert_eq!(effects.len(), 1);
    // The resumed poll runs under the post-drag epoch.
    assert_eq!(issued_epoch(&effects[0]), Some(session.epoch()));
    assert_eq!(session.phase(), SyncPhase::Polling);
    assert_eq!(session.color(), Rgb::new(90.0, 0.0, 0.0));
}

#[test]
fn click_commits_a_fade_command() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));
    session.tuning.step = 25;
    session.tuning.delay = 10;

    let picked = Rgb::new(0.0, 128.0, 255.0);
    let effects = session.end_drag(false, picked);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        SessionEffect::SendFade {
            command,
            stop_first,
        } => {
            assert_eq!(command.to_query(), "color=0080ff&step=25&delay=10");
            assert!(!stop_first);
        }
        other => panic!("expected SendFade, got {other:?}"),
    }
    // The click does not move the local color; the fade arrives via the
    // poll echo.
    assert_eq!(session.color(), Rgb::BLACK);

    // Second click before the ack is dropped, not queued.
    assert!(session.end_drag(false, picked).is_empty());
    session.on_fade_ack();
    assert_eq!(session.end_drag(false, picked).len(), 1);
}

#[test]
fn stop_on_fade_orders_the_stop_first() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));
    session.script.stop_on_fade = true;

    let effects = session.end_drag(false, Rgb::new(255.0, 255.0, 255.0));
    match &effects[0] {
        SessionEffect::SendFade { stop_first, .. } => assert!(stop_first),
        other => panic!("expected SendFade, got {other:?}"),
    }
}

#[test]
fn partial_mask_rides_along_on_commands() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));
    session.mask_mut().toggle(2);
    session.mask_mut().toggle(5);

    let effects = session.send_fade(Rgb::new(255.0, 0.0, 0.0));
    match effects.unwrap() {
        SessionEffect::SendFade { command, .. } => {
            assert_eq!(command.mask.as_deref(), Some("11011011"));
        }
        other => panic!("expected SendFade, got {other:?}"),
    }
}

#[test]
fn script_commands_forward_the_tuning() {
    let mut session = ClientSession::new();
    session.tuning.step = 1;
    session.tuning.delay = 2;
    session.script.sleep = 100;
    session.script.wait_for_fade = true;

    let effect = session.start_script(1);
    match effect {
        SessionEffect::SendScript(command) => {
            assert_eq!(command.script, 1);
            assert_eq!(command.sleep, 100);
            assert!(command.wait_for_fade);
        }
        other => panic!("expected SendScript, got {other:?}"),
    }
    assert_eq!(session.stop_script(), SessionEffect::SendStop);
}

#[test]
fn shutdown_releases_poll_and_timer() {
    let mut session = ClientSession::new();
    let epoch = issued_epoch(&session.begin().unwrap()).unwrap();
    session.on_status(epoch, &status(Rgb::BLACK, 1));

    let effects = session.shutdown();
    assert!(effects.contains(&SessionEffect::AbortPoll));
    assert!(effects.contains(&SessionEffect::StopFade));
    assert_eq!(session.phase(), SyncPhase::Idle);
    // The old epoch can no longer re-enter.
    assert!(session.on_status(epoch, &status(Rgb::BLACK, 1)).is_empty());
    assert!(session.on_poll_error(epoch).is_none());
}

#[test]
fn begin_twice_is_a_no_op() {
    let mut session = ClientSession::new();
    assert!(session.begin().is_some());
    assert!(session.begin().is_none());
}
