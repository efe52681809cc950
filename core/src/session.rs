use crate::color::Rgb;
use crate::mask::ChannelMask;
use crate::protocol::{FadeCommand, ScriptCommand, Status};

/// Step/delay used for drag updates: the lamp should follow the pointer
/// without its own interpolation.
pub const DRAG_STEP: u32 = 255;
pub const DRAG_DELAY: u32 = 0;

/// How long a pointer must stay down before the gesture counts as a drag
/// rather than a click.
pub const DRAG_GRACE_MS: u32 = 200;

/// Long-poll phase. An explicit tagged state, so the stale-response and
/// single-timer invariants are checkable in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Polling,
    Applying,
    Overridden,
}

pub type PollEpoch = u64;

/// I/O the runtime must perform on behalf of the session. Transitions are
/// pure; the browser side executes these.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEffect {
    /// Issue the next long-poll request, tagged with the epoch it belongs
    /// to. Responses carrying an older epoch are stale and must be fed
    /// back with that epoch so the session can discard them.
    IssuePoll { epoch: PollEpoch },
    /// Abort the outstanding poll request.
    AbortPoll,
    /// Start (or restart) the fade timer toward `target`.
    StartFade { target: Rgb, step: f64, delay: f64 },
    /// Cancel the fade timer without starting a new one.
    StopFade,
    /// Push a color to the presentation layer.
    Publish(Rgb),
    /// Dispatch a fade command. When `stop_first` is set, the stop request
    /// must complete before the fade is sent.
    SendFade {
        command: FadeCommand,
        stop_first: bool,
    },
    SendScript(ScriptCommand),
    SendStop,
    /// First status received: build the per-device mask UI.
    InitMask { count: usize },
    UpdateUsers { users: u32 },
}

/// User-configurable fade parameters, fed from the options panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeTuning {
    pub step: u32,
    pub delay: u32,
}

impl Default for FadeTuning {
    fn default() -> Self {
        // Server defaults: jump straight to the target.
        Self { step: 255, delay: 0 }
    }
}

/// Script parameters forwarded opaquely to the start endpoint, plus the
/// local stop-on-fade toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptTuning {
    pub sleep: u32,
    pub value: u32,
    pub saturation: u32,
    pub use_address: bool,
    pub wait_for_fade: bool,
    pub stop_on_fade: bool,
}

impl Default for ScriptTuning {
    fn default() -> Self {
        Self {
            sleep: 0,
            value: 255,
            saturation: 255,
            use_address: false,
            wait_for_fade: true,
            stop_on_fade: false,
        }
    }
}

/// Per-tab session state: the authoritative color, the poll phase, the
/// poll epoch used to invalidate aborted requests, and the single
/// in-flight guard for outgoing fade commands.
#[derive(Clone, Debug)]
pub struct ClientSession {
    color: Rgb,
    phase: SyncPhase,
    epoch: PollEpoch,
    fade_in_flight: bool,
    mask: ChannelMask,
    users: u32,
    initialized: bool,
    pub tuning: FadeTuning,
    pub script: ScriptTuning,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            color: Rgb::BLACK,
            phase: SyncPhase::Idle,
            epoch: 0,
            fade_in_flight: false,
            mask: ChannelMask::new(0),
            users: 0,
            initialized: false,
            tuning: FadeTuning::default(),
            script: ScriptTuning::default(),
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn epoch(&self) -> PollEpoch {
        self.epoch
    }

    pub fn users(&self) -> u32 {
        self.users
    }

    pub fn mask(&self) -> &ChannelMask {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut ChannelMask {
        &mut self.mask
    }

    pub fn is_fade_in_flight(&self) -> bool {
        self.fade_in_flight
    }

    /// True once the first status response has been applied.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Starts the poll loop. Idle only; calling twice is a no-op.
    pub fn begin(&mut self) -> Option<SessionEffect> {
        if self.phase != SyncPhase::Idle {
            return None;
        }
        self.phase = SyncPhase::Polling;
        Some(SessionEffect::IssuePoll { epoch: self.epoch })
    }

    /// Applies a long-poll response. Stale responses (older epoch, or any
    /// response while a drag is in progress) are discarded entirely.
    pub fn on_status(&mut self, epoch: PollEpoch, status: &Status) -> Vec<SessionEffect> {
        if epoch != self.epoch || self.phase == SyncPhase::Overridden {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if !self.initialized {
            self.initialized = true;
            self.mask = ChannelMask::new(status.count);
            // Initial load: adopt the server color directly, no fade.
            self.color = status.color;
            effects.push(SessionEffect::InitMask {
                count: status.count,
            });
            effects.push(SessionEffect::Publish(self.color));
        } else if !self.color.approx_eq(status.color) {
            self.phase = SyncPhase::Applying;
            effects.push(SessionEffect::StartFade {
                target: status.color,
                step: status.step,
                delay: status.delay,
            });
        }

        self.users = status.users;
        effects.push(SessionEffect::UpdateUsers {
            users: status.users,
        });

        // Re-enter Polling immediately: the fade runs on its own timer and
        // never blocks the poll loop.
        self.phase = SyncPhase::Polling;
        effects.push(SessionEffect::IssuePoll { epoch: self.epoch });
        effects
    }

    /// A poll failed or timed out. The comet hold already bounds request
    /// duration, so the loop retries immediately with no backoff.
    pub fn on_poll_error(&mut self, epoch: PollEpoch) -> Option<SessionEffect> {
        if epoch != self.epoch || self.phase == SyncPhase::Overridden {
            return None;
        }
        self.phase = SyncPhase::Polling;
        Some(SessionEffect::IssuePoll { epoch: self.epoch })
    }

    /// The drag grace timeout fired: the gesture is a drag. Aborts the
    /// outstanding poll and invalidates its epoch so a late response can
    /// never clobber the gesture.
    pub fn begin_drag(&mut self) -> Vec<SessionEffect> {
        if self.phase == SyncPhase::Overridden {
            return Vec::new();
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = SyncPhase::Overridden;
        vec![SessionEffect::AbortPoll, SessionEffect::StopFade]
    }

    /// Pointer moved while dragging: the live position is authoritative.
    /// No interpolation; the lamp is told to follow at full step.
    pub fn drag_move(&mut self, color: Rgb) -> Vec<SessionEffect> {
        if self.phase != SyncPhase::Overridden {
            return Vec::new();
        }
        self.color = color;
        let mut effects = vec![SessionEffect::Publish(color)];
        if let Some(send) = self.dispatch_fade(color, DRAG_STEP, DRAG_DELAY) {
            effects.push(send);
        }
        effects
    }

    /// Gesture ended. After a drag, the poll resumes with the session's
    /// own color as the new baseline. A plain click instead commits a fade
    /// command; the color change arrives back through the poll echo.
    pub fn end_drag(&mut self, was_drag: bool, color: Rgb) -> Vec<SessionEffect> {
        if was_drag {
            if self.phase != SyncPhase::Overridden {
                return Vec::new();
            }
            self.phase = SyncPhase::Polling;
            return vec![SessionEffect::IssuePoll { epoch: self.epoch }];
        }
        self.dispatch_fade(color, self.tuning.step, self.tuning.delay)
            .into_iter()
            .collect()
    }

    /// Sends a fade command at the configured step/delay. Used by the URL
    /// bootstrap; clicks go through [`ClientSession::end_drag`].
    pub fn send_fade(&mut self, color: Rgb) -> Option<SessionEffect> {
        self.dispatch_fade(color, self.tuning.step, self.tuning.delay)
    }

    /// Guarded dispatch: while an earlier command is unacknowledged,
    /// further ones are dropped, not queued.
    fn dispatch_fade(&mut self, color: Rgb, step: u32, delay: u32) -> Option<SessionEffect> {
        if self.fade_in_flight {
            return None;
        }
        self.fade_in_flight = true;
        Some(SessionEffect::SendFade {
            command: FadeCommand::new(color, step, delay, &self.mask),
            stop_first: self.script.stop_on_fade,
        })
    }

    /// Clears the in-flight guard. Called on any acknowledgment, success
    /// or failure, so the client can never get stuck.
    pub fn on_fade_ack(&mut self) {
        self.fade_in_flight = false;
    }

    /// The fade timer published a tick (or settled); the session tracks
    /// the latest displayed color as its baseline.
    pub fn record_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn start_script(&mut self, script: u32) -> SessionEffect {
        SessionEffect::SendScript(ScriptCommand {
            script,
            step: self.tuning.step,
            delay: self.tuning.delay,
            sleep: self.script.sleep,
            value: self.script.value,
            saturation: self.script.saturation,
            use_address: self.script.use_address,
            wait_for_fade: self.script.wait_for_fade,
        })
    }

    pub fn stop_script(&mut self) -> SessionEffect {
        SessionEffect::SendStop
    }

    /// Tab teardown: invalidate the poll and release the timer.
    pub fn shutdown(&mut self) -> Vec<SessionEffect> {
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = SyncPhase::Idle;
        vec![SessionEffect::AbortPoll, SessionEffect::StopFade]
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}
