use serde::Deserialize;

use crate::color::Rgb;
use crate::mask::ChannelMask;

/// Hold hint sent with every status poll: the server may keep the request
/// open this long before answering with unchanged state.
pub const COMET_HOLD_SECS: u32 = 10;

/// Body of the long-poll status response.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Status {
    pub color: Rgb,
    pub step: f64,
    pub delay: f64,
    /// Number of physical devices; read once at session start to size the
    /// output mask.
    pub count: usize,
    /// Occupancy: how many other viewers are connected. Display only.
    pub users: u32,
}

/// Outgoing fade command. `mask` is omitted when every device is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeCommand {
    pub color: Rgb,
    pub step: u32,
    pub delay: u32,
    pub mask: Option<String>,
}

impl FadeCommand {
    pub fn new(color: Rgb, step: u32, delay: u32, mask: &ChannelMask) -> Self {
        Self {
            color,
            step,
            delay,
            mask: mask.as_param(),
        }
    }

    pub fn to_query(&self) -> String {
        let mut query = format!(
            "color={}&step={}&delay={}",
            self.color.hex_bare(),
            self.step,
            self.delay
        );
        if let Some(mask) = self.mask.as_ref() {
            query.push_str("&mask=");
            query.push_str(mask);
        }
        query
    }
}

/// Parameters for the server-side light-show scripts. The client forwards
/// these opaquely; only the wire shape is fixed here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptCommand {
    pub script: u32,
    pub step: u32,
    pub delay: u32,
    pub sleep: u32,
    pub value: u32,
    pub saturation: u32,
    pub use_address: bool,
    pub wait_for_fade: bool,
}

impl ScriptCommand {
    pub fn to_query(&self) -> String {
        format!(
            "script={}&step={}&delay={}&sleep={}&value={}&saturation={}&use_address={}&wait_for_fade={}",
            self.script,
            self.step,
            self.delay,
            self.sleep,
            self.value,
            self.saturation,
            self.use_address as u32,
            self.wait_for_fade as u32,
        )
    }
}
