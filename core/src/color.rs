use std::fmt;

use serde::{Deserialize, Serialize};

pub const CHANNEL_COUNT: usize = 3;

/// One of the three output channels, in fixed priority order. The order
/// decides ties when two channels are equally far from their targets, so
/// fade plans stay deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const PRIORITY: [Channel; CHANNEL_COUNT] = [Channel::Red, Channel::Green, Channel::Blue];

    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// An RGB color. Channels are `f64` because intermediate fade values are
/// fractional; display output quantizes to 0..=255.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

fn quantize(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channel(self, channel: Channel) -> f64 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    pub fn set_channel(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
        }
    }

    /// Per-channel absolute difference, indexed by [`Channel::index`].
    pub fn distance(self, other: Rgb) -> [f64; CHANNEL_COUNT] {
        let mut out = [0.0; CHANNEL_COUNT];
        for channel in Channel::PRIORITY {
            out[channel.index()] = (other.channel(channel) - self.channel(channel)).abs();
        }
        out
    }

    /// Equality at display resolution (after quantizing each channel).
    pub fn approx_eq(self, other: Rgb) -> bool {
        quantize(self.r) == quantize(other.r)
            && quantize(self.g) == quantize(other.g)
            && quantize(self.b) == quantize(other.b)
    }

    /// Display form, always derived from the channel values.
    pub fn hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            quantize(self.r),
            quantize(self.g),
            quantize(self.b)
        )
    }

    /// Wire form: six hex digits without the leading `#`.
    pub fn hex_bare(self) -> String {
        format!(
            "{:02x}{:02x}{:02x}",
            quantize(self.r),
            quantize(self.g),
            quantize(self.b)
        )
    }

    pub fn from_hex(value: &str) -> Result<Rgb, ColorParseError> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 {
            return Err(ColorParseError::InvalidLength {
                found: digits.len(),
            });
        }
        // Multibyte input can pass the byte-length check; reject it before
        // slicing into hex pairs.
        if !digits.is_ascii() {
            return Err(ColorParseError::InvalidDigit {
                pair: digits.to_string(),
            });
        }
        let mut channels = [0.0; CHANNEL_COUNT];
        for (slot, start) in channels.iter_mut().zip([0usize, 2, 4]) {
            let pair = &digits[start..start + 2];
            let parsed = u8::from_str_radix(pair, 16).map_err(|_| {
                ColorParseError::InvalidDigit {
                    pair: pair.to_string(),
                }
            })?;
            *slot = parsed as f64;
        }
        Ok(Rgb::new(channels[0], channels[1], channels[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    InvalidLength { found: usize },
    InvalidDigit { pair: String },
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::InvalidLength { found } => {
                write!(f, "color must be 6 hex digits, got {found}")
            }
            ColorParseError::InvalidDigit { pair } => {
                write!(f, "invalid hex pair '{pair}'")
            }
        }
    }
}

impl std::error::Error for ColorParseError {}
