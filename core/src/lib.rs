pub mod color;
pub mod fade;
pub mod mask;
pub mod protocol;
pub mod session;

pub use color::{Channel, ColorParseError, Rgb, CHANNEL_COUNT};
pub use fade::{Fade, FadeError, FadePlan, FadeTick};
pub use mask::ChannelMask;
pub use protocol::{FadeCommand, ScriptCommand, Status, COMET_HOLD_SECS};
pub use session::{
    ClientSession, FadeTuning, PollEpoch, ScriptTuning, SessionEffect, SyncPhase, DRAG_DELAY,
    DRAG_GRACE_MS, DRAG_STEP,
};
