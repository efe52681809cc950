use std::cell::RefCell;

use gloo::console;
use gloo::net::http::Request;
use wasm_bindgen_futures::spawn_local;
use web_sys::AbortController;

use fnwheel_core::{
    ClientSession, FadeCommand, PollEpoch, Rgb, ScriptCommand, SessionEffect, Status,
    COMET_HOLD_SECS,
};

use crate::app_params;
use crate::fade_runtime;
use crate::wheel_view;

struct SyncRuntimeState {
    session: ClientSession,
    poll_abort: Option<AbortController>,
    bootstrapped: bool,
}

impl SyncRuntimeState {
    fn new() -> Self {
        Self {
            session: ClientSession::new(),
            poll_abort: None,
            bootstrapped: false,
        }
    }
}

thread_local! {
    static STATE: RefCell<SyncRuntimeState> = RefCell::new(SyncRuntimeState::new());
}

fn with_session<R>(f: impl FnOnce(&mut ClientSession) -> R) -> R {
    STATE.with(|slot| f(&mut slot.borrow_mut().session))
}

/// Value from one of the options inputs, keyed by element id as the
/// original page did.
pub(crate) enum OptionValue {
    Number(u32),
    Flag(bool),
}

pub(crate) fn boot() {
    let effect = with_session(|session| session.begin());
    if let Some(effect) = effect {
        run_effects(vec![effect]);
    }
}

pub(crate) fn shutdown() {
    let effects = with_session(|session| session.shutdown());
    run_effects(effects);
}

pub(crate) fn current_color() -> Rgb {
    with_session(|session| session.color())
}

fn run_effects(effects: Vec<SessionEffect>) {
    for effect in effects {
        match effect {
            SessionEffect::IssuePoll { epoch } => issue_poll(epoch),
            SessionEffect::AbortPoll => abort_poll(),
            SessionEffect::StartFade {
                target,
                step,
                delay,
            } => {
                let current = with_session(|session| session.color());
                fade_runtime::start(current, target, step, delay);
            }
            SessionEffect::StopFade => fade_runtime::stop(),
            SessionEffect::Publish(color) => wheel_view::publish(color),
            SessionEffect::SendFade {
                command,
                stop_first,
            } => send_fade(command, stop_first),
            SessionEffect::SendScript(command) => send_script(command),
            SessionEffect::SendStop => send_stop(),
            SessionEffect::InitMask { count } => wheel_view::build_mask(count),
            SessionEffect::UpdateUsers { users } => wheel_view::draw_users(users),
        }
    }
}

fn issue_poll(epoch: PollEpoch) {
    let controller = AbortController::new().ok();
    let signal = controller.as_ref().map(|controller| controller.signal());
    STATE.with(|slot| {
        slot.borrow_mut().poll_abort = controller;
    });

    spawn_local(async move {
        let comet = COMET_HOLD_SECS.to_string();
        let response = Request::get("status")
            .query([("comet", comet.as_str())])
            .abort_signal(signal.as_ref())
            .send()
            .await;

        let effects = match response {
            Ok(response) => match response.json::<Status>().await {
                Ok(status) => with_session(|session| session.on_status(epoch, &status)),
                Err(err) => {
                    console::warn!("bad status response", err.to_string());
                    retry_effects(epoch)
                }
            },
            // Aborted requests land here too; the epoch guard turns the
            // retry into a no-op for a poll that was deliberately killed.
            Err(_) => retry_effects(epoch),
        };
        run_effects(effects);
        run_bootstrap_once();
    });
}

fn retry_effects(epoch: PollEpoch) -> Vec<SessionEffect> {
    with_session(|session| session.on_poll_error(epoch))
        .into_iter()
        .collect()
}

fn abort_poll() {
    let controller = STATE.with(|slot| slot.borrow_mut().poll_abort.take());
    if let Some(controller) = controller {
        controller.abort();
    }
}

/// One-time URL-parameter bootstrap, run after the first status load.
fn run_bootstrap_once() {
    let ready = STATE.with(|slot| {
        let mut state = slot.borrow_mut();
        if state.bootstrapped || !state.session.is_initialized() {
            return false;
        }
        state.bootstrapped = true;
        true
    });
    if ready {
        app_params::apply();
    }
}

fn send_fade(command: FadeCommand, stop_first: bool) {
    spawn_local(async move {
        if stop_first {
            if let Err(err) = Request::post("stop").send().await {
                console::warn!("stop request failed", err.to_string());
            }
        }
        let url = format!("fade?{}", command.to_query());
        if let Err(err) = Request::post(&url).send().await {
            console::warn!("fade command failed", err.to_string());
        }
        // Any completion counts as the acknowledgment; the in-flight
        // guard must never stay stuck.
        with_session(|session| session.on_fade_ack());
    });
}

fn send_script(command: ScriptCommand) {
    spawn_local(async move {
        let url = format!("start?{}", command.to_query());
        if let Err(err) = Request::post(&url).send().await {
            console::warn!("start request failed", err.to_string());
        }
    });
}

fn send_stop() {
    spawn_local(async move {
        if let Err(err) = Request::post("stop").send().await {
            console::warn!("stop request failed", err.to_string());
        }
    });
}

/// Fade timer tick: track the color as the new baseline and show it.
pub(crate) fn publish_tick(color: Rgb) {
    with_session(|session| session.record_color(color));
    wheel_view::publish(color);
}

pub(crate) fn drag_started() {
    let effects = with_session(|session| session.begin_drag());
    run_effects(effects);
}

pub(crate) fn drag_moved(color: Rgb) {
    let effects = with_session(|session| session.drag_move(color));
    run_effects(effects);
}

pub(crate) fn drag_ended(was_drag: bool, color: Rgb) {
    let effects = with_session(|session| session.end_drag(was_drag, color));
    run_effects(effects);
}

/// Flips one mask flag; returns the flag's new state for the view.
pub(crate) fn toggle_mask(index: usize) -> bool {
    with_session(|session| {
        session.mask_mut().toggle(index);
        session.mask().is_enabled(index)
    })
}

pub(crate) fn set_option(key: &str, value: OptionValue) {
    with_session(|session| match (key, value) {
        ("step", OptionValue::Number(n)) => session.tuning.step = n,
        ("delay", OptionValue::Number(n)) => session.tuning.delay = n,
        ("sleep", OptionValue::Number(n)) => session.script.sleep = n,
        ("value", OptionValue::Number(n)) => session.script.value = n,
        ("saturation", OptionValue::Number(n)) => session.script.saturation = n,
        ("use_address", OptionValue::Flag(flag)) => session.script.use_address = flag,
        ("wait_for_fade", OptionValue::Flag(flag)) => session.script.wait_for_fade = flag,
        ("stop_fade", OptionValue::Flag(flag)) => session.script.stop_on_fade = flag,
        // The script selector is read directly when the start button fires.
        ("script", _) => {}
        _ => console::warn!("unknown option", key.to_string()),
    });
}

pub(crate) fn send_fade_command(color: Rgb) {
    let effect = with_session(|session| session.send_fade(color));
    if let Some(effect) = effect {
        run_effects(vec![effect]);
    }
}

pub(crate) fn start_script(script: u32) {
    let effect = with_session(|session| session.start_script(script));
    run_effects(vec![effect]);
}

pub(crate) fn stop_script() {
    let effect = with_session(|session| session.stop_script());
    run_effects(vec![effect]);
}
