//! Periodic regulation step.

use libm::fabsf;

use crate::config::PidGains;
use crate::motion::required_deceleration;

use super::state::Regulator;

/// Tracking error under which a stop sub-move counts as settled, in degrees.
const SETTLE_ERROR: f32 = 2.0;
/// Settling time after the ramp before a settled stop may end.
const SETTLE_MS: u32 = 100;
/// Time after the ramp after which a stop ends regardless of the error.
const SETTLE_TIMEOUT_MS: u32 = 500;

impl Regulator {
    /// Run one regulation step.
    ///
    /// `now` is the clock in milliseconds and `raw_count` the unmirrored
    /// encoder count. Returns the power to apply in the motor's own direction,
    /// or `None` when the channel is disabled.
    pub fn regulate(&mut self, now: u32, raw_count: i32) -> Option<i8> {
        if !self.enabled {
            return None;
        }

        let delta = now.wrapping_sub(self.now);
        self.now = now;
        let angle = self.mirror.count(raw_count).wrapping_sub(self.origin) as f32;

        if self.moving {
            Some(self.track(delta, angle, raw_count))
        } else if self.sub_move.hold {
            let error = self.position - angle;
            Some(self.drive(error, self.gains.holding))
        } else {
            self.power = 0;
            Some(0)
        }
    }

    /// Advance the profile, detect settling and stalls, and return the
    /// moving-gain power.
    fn track(&mut self, delta: u32, angle: f32, raw_count: i32) -> i8 {
        let elapsed = self.sub_move.elapsed(self.now);
        let ideal = self.sub_move.sample(elapsed);
        self.position = ideal.position;
        self.velocity = ideal.velocity;
        let error = self.position - angle;

        if !self.sub_move.is_ramping(elapsed)
            && self.sub_move.is_stop()
            && self.is_settled(elapsed, error)
        {
            self.end_move(false, raw_count);
        }

        if fabsf(error) > self.stall_threshold {
            // Freeze the profile while the motor lags.
            self.sub_move.freeze(delta);
            self.stall_count = self.stall_count.saturating_add(1);
            if self.stall_count > self.stall_ticks {
                self.end_move(true, raw_count);
            }
        } else {
            self.stall_count /= 2;
        }

        let power = self.drive(error, self.gains.moving);

        if let Some(limit) = self.sub_move.limit {
            let required = required_deceleration(self.velocity, self.position, Some(limit));
            if fabsf(required) >= fabsf(self.sub_move.acceleration) {
                debug!(
                    "channel {}: decelerating toward {}",
                    self.channel.value(),
                    limit
                );
                let hold = self.sub_move.hold;
                self.start_sub_move(0.0, required, None, hold);
            }
        }

        power
    }

    fn is_settled(&self, elapsed: u32, error: f32) -> bool {
        let ramp = self.sub_move.ramp_ms;
        self.pending.is_some()
            || (fabsf(error) < SETTLE_ERROR && elapsed > ramp.saturating_add(SETTLE_MS))
            || elapsed > ramp.saturating_add(SETTLE_TIMEOUT_MS)
    }

    fn drive(&mut self, error: f32, gains: PidGains) -> i8 {
        let power = self.mirror.power(self.filter.update(error, &gains));
        self.power = power;
        power
    }
}
