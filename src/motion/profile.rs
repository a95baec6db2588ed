//! Trapezoidal sub-move profile.
//!
//! A sub-move is one ramp at constant acceleration from the velocity the
//! motor had when the sub-move started, followed by an open-ended cruise at
//! the target velocity. Stopping at a limit is itself a sub-move (ramp to zero)
//! started at the right moment by the regulation tick.

use libm::{fabsf, roundf};

/// Current phase of a regulated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Not moving and not holding (free-wheel).
    Idle,
    /// Not moving, closed-loop position hold.
    Holding,
    /// Inside the acceleration or deceleration window.
    Ramping,
    /// Ramp complete, running at the target velocity (possibly zero, settling).
    Cruising,
}

/// Ideal position and velocity at a point of the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    /// Ideal position in degrees.
    pub position: f32,
    /// Ideal velocity in degrees per second.
    pub velocity: f32,
}

/// Parameters of the active sub-move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMove {
    /// Signed velocity reached at the end of the ramp.
    pub target_velocity: f32,
    /// Signed acceleration applied during the ramp.
    pub acceleration: f32,
    /// Ramp duration in milliseconds.
    pub ramp_ms: u32,
    /// Distance covered during the ramp (trapezoid area).
    pub ramp_displacement: f32,
    /// Position when the sub-move started.
    pub base_position: f32,
    /// Velocity when the sub-move started.
    pub base_velocity: f32,
    /// Clock value when the sub-move started; pushed forward while stalled.
    pub base_time: u32,
    /// Absolute angle to stop at, if any.
    pub limit: Option<i32>,
    /// Hold position once the sub-move ends.
    pub hold: bool,
}

impl SubMove {
    /// A sub-move that keeps the motor at rest at `position`.
    pub fn rest(position: f32, now: u32) -> Self {
        Self {
            target_velocity: 0.0,
            acceleration: 0.0,
            ramp_ms: 0,
            ramp_displacement: 0.0,
            base_position: position,
            base_velocity: 0.0,
            base_time: now,
            limit: None,
            hold: true,
        }
    }

    /// Plan a ramp from (`position`, `velocity`) toward `target_velocity`.
    ///
    /// Only the magnitude of `acceleration` is used; its sign follows the
    /// direction of the velocity change, a zero change counting as positive.
    pub fn plan(
        position: f32,
        velocity: f32,
        now: u32,
        target_velocity: f32,
        acceleration: f32,
        limit: Option<i32>,
        hold: bool,
    ) -> Self {
        let delta = target_velocity - velocity;
        let magnitude = fabsf(acceleration);
        let acceleration = if delta >= 0.0 { magnitude } else { -magnitude };

        // A zero acceleration with a non-zero delta never finishes the ramp:
        // the division gives +inf, which saturates to u32::MAX.
        let ramp_ms = if delta == 0.0 {
            0
        } else {
            roundf(delta / acceleration * 1000.0) as u32
        };
        let ramp_displacement = (velocity + target_velocity) * ramp_ms as f32 / 2000.0;

        Self {
            target_velocity,
            acceleration,
            ramp_ms,
            ramp_displacement,
            base_position: position,
            base_velocity: velocity,
            base_time: now,
            limit,
            hold,
        }
    }

    /// Milliseconds since the sub-move started, clamped at zero.
    #[inline]
    pub fn elapsed(&self, now: u32) -> u32 {
        (now.wrapping_sub(self.base_time) as i32).max(0) as u32
    }

    /// Check whether the ramp is still running after `elapsed` ms.
    #[inline]
    pub fn is_ramping(&self, elapsed: u32) -> bool {
        elapsed < self.ramp_ms
    }

    /// Check whether this sub-move brings the motor to rest.
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.target_velocity == 0.0
    }

    /// Ideal position and velocity `elapsed` ms into the sub-move.
    pub fn sample(&self, elapsed: u32) -> ProfileSample {
        if self.is_ramping(elapsed) {
            let t = elapsed as f32;
            let velocity = self.base_velocity + self.acceleration * t / 1000.0;
            let position = self.base_position + (self.base_velocity + velocity) * t / 2000.0;
            ProfileSample { position, velocity }
        } else {
            let cruise = (elapsed - self.ramp_ms) as f32;
            let velocity = self.target_velocity;
            let position =
                self.base_position + self.ramp_displacement + velocity * cruise / 1000.0;
            ProfileSample { position, velocity }
        }
    }

    /// Push the start time forward, freezing the profile for `delta` ms.
    #[inline]
    pub fn freeze(&mut self, delta: u32) {
        self.base_time = self.base_time.wrapping_add(delta);
    }
}

/// Deceleration needed to come to rest exactly at `limit`.
///
/// Uses `v² = 2·a·d`. The result is signed by the remaining distance, so a
/// limit already behind the motor yields a negative value. Zero velocity
/// needs no deceleration.
pub fn required_deceleration(velocity: f32, position: f32, limit: Option<i32>) -> f32 {
    match limit {
        Some(limit) if velocity != 0.0 => velocity * velocity / (2.0 * (limit as f32 - position)),
        _ => 0.0,
    }
}
