use std::fmt;

use crate::color::{Channel, Rgb, CHANNEL_COUNT};

/// Per-channel step vector and tick count for one fade. All channels are
/// scaled to finish together: the dominant channel moves a full `step` per
/// tick, the others proportionally less.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadePlan {
    pub step: [f64; CHANNEL_COUNT],
    pub ticks: f64,
}

impl FadePlan {
    pub fn compute(current: Rgb, target: Rgb, step: f64) -> Result<FadePlan, FadeError> {
        if step <= 0.0 {
            return Err(FadeError::InvalidStep { step });
        }

        let distance = current.distance(target);
        let mut max_channel = Channel::Red;
        let mut max_distance = 0.0;
        for channel in Channel::PRIORITY {
            let d = distance[channel.index()];
            if d > max_distance {
                max_channel = channel;
                max_distance = d;
            }
        }

        let mut vector = [0.0; CHANNEL_COUNT];
        if max_distance == 0.0 {
            return Ok(FadePlan {
                step: vector,
                ticks: 0.0,
            });
        }

        for channel in Channel::PRIORITY {
            let delta = target.channel(channel) - current.channel(channel);
            vector[channel.index()] = if channel == max_channel {
                delta.signum() * step
            } else {
                step * delta / max_distance
            };
        }

        Ok(FadePlan {
            step: vector,
            ticks: max_distance / step,
        })
    }
}

/// Outcome of one timer tick. Both variants carry the color to publish;
/// the final tick always reports the exact target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeTick {
    Running(Rgb),
    Done(Rgb),
}

impl FadeTick {
    pub fn color(self) -> Rgb {
        match self {
            FadeTick::Running(color) | FadeTick::Done(color) => color,
        }
    }
}

/// One in-progress fade. The driver calls [`Fade::tick`] once per timer
/// fire until it reports [`FadeTick::Done`].
#[derive(Clone, Debug)]
pub struct Fade {
    current: Rgb,
    target: Rgb,
    plan: FadePlan,
    remaining: f64,
}

impl Fade {
    /// Plans a fade from `current` to `target`. Returns `Ok(None)` when the
    /// two are already equal at display resolution.
    pub fn start(current: Rgb, target: Rgb, step: f64) -> Result<Option<Fade>, FadeError> {
        if current.approx_eq(target) {
            return Ok(None);
        }
        let plan = FadePlan::compute(current, target, step)?;
        Ok(Some(Fade {
            current,
            target,
            remaining: plan.ticks,
            plan,
        }))
    }

    /// Advances one tick. `remaining` is fractional; the final tick snaps
    /// to the target exactly instead of requiring even divisibility.
    pub fn tick(&mut self) -> FadeTick {
        self.remaining -= 1.0;
        for channel in Channel::PRIORITY {
            let next = self.current.channel(channel) + self.plan.step[channel.index()];
            self.current.set_channel(channel, next);
        }
        if self.remaining <= 0.0 {
            self.current = self.target;
            FadeTick::Done(self.current)
        } else {
            FadeTick::Running(self.current)
        }
    }

    pub fn current(&self) -> Rgb {
        self.current
    }

    pub fn target(&self) -> Rgb {
        self.target
    }

    pub fn plan(&self) -> &FadePlan {
        &self.plan
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FadeError {
    InvalidStep { step: f64 },
}

impl fmt::Display for FadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FadeError::InvalidStep { step } => {
                write!(f, "fade step must be positive, got {step}")
            }
        }
    }
}

impl std::error::Error for FadeError {}
