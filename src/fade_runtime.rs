use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use gloo::timers::callback::Interval;

use fnwheel_core::{Fade, FadeTick, Rgb};

use crate::sync_runtime;

/// Tick period is the caller's delay scaled up for UI smoothness; the
/// device applies the same fade far faster than the eye needs.
pub(crate) const TICK_SCALE_MS: f64 = 10.0;

thread_local! {
    static TIMER: RefCell<Option<Interval>> = RefCell::new(None);
}

/// Starts a fade toward `target`. Any running fade is cancelled first, so
/// at most one timer ever mutates the displayed color.
pub(crate) fn start(current: Rgb, target: Rgb, step: f64, delay: f64) {
    stop();

    let fade = match Fade::start(current, target, step) {
        Ok(Some(fade)) => fade,
        Ok(None) => return,
        Err(err) => {
            console::warn!("refusing fade", err.to_string());
            return;
        }
    };

    let period = (delay.max(0.0) * TICK_SCALE_MS) as u32;
    let fade = Rc::new(RefCell::new(fade));
    let interval = Interval::new(period, move || {
        let tick = fade.borrow_mut().tick();
        match tick {
            FadeTick::Running(color) => sync_runtime::publish_tick(color),
            FadeTick::Done(color) => {
                sync_runtime::publish_tick(color);
                stop();
            }
        }
    });
    TIMER.with(|slot| {
        *slot.borrow_mut() = Some(interval);
    });
}

/// Dropping the interval clears it; this is the only way the timer is
/// ever released.
pub(crate) fn stop() {
    TIMER.with(|slot| {
        slot.borrow_mut().take();
    });
}

pub(crate) fn is_running() -> bool {
    TIMER.with(|slot| slot.borrow().is_some())
}
