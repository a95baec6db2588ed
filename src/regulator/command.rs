//! Public command surface of a regulated channel.

use crate::hardware::PwmMode;

use super::channel::Channel;
use super::state::{MoveRequest, Regulator};

/// A command addressed to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the cruise speed magnitude in degrees per second.
    SetSpeed(i32),
    /// Set the acceleration magnitude in degrees per second squared.
    SetAcceleration(i32),
    /// Rotate by a relative angle.
    Rotate(i32),
    /// Rotate to an absolute angle.
    RotateTo(i32),
    /// Come to rest; `Brake` holds position, `Float` free-wheels.
    Stop(PwmMode),
    /// Come to rest and free-wheel.
    Float,
    /// Run forward without a limit.
    Forward,
    /// Run backward without a limit.
    Backward,
}

/// A [`Command`] together with its target channel, as carried by a command
/// queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCommand {
    /// Target channel.
    pub channel: Channel,
    /// Command to apply.
    pub command: Command,
}

impl ChannelCommand {
    /// Create a channel command.
    pub const fn new(channel: Channel, command: Command) -> Self {
        Self { channel, command }
    }
}

impl Regulator {
    /// Apply a queued command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetSpeed(speed) => self.set_speed(speed),
            Command::SetAcceleration(acceleration) => self.set_acceleration(acceleration),
            Command::Rotate(delta) => self.rotate(delta),
            Command::RotateTo(target) => self.rotate_to(target),
            Command::Stop(mode) => self.stop(mode),
            Command::Float => self.float(),
            Command::Forward => self.forward_unlimited(),
            Command::Backward => self.backward_unlimited(),
        }
    }

    /// Set the cruise speed; the magnitude is used.
    ///
    /// A running non-stop sub-move is re-planned at the new speed keeping its
    /// direction, and a pending move keeps its direction at the new speed.
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.saturating_abs();
        let speed = self.speed as f32;

        if !self.sub_move.is_stop() {
            let velocity = with_sign_of(speed, self.sub_move.target_velocity);
            let (acceleration, limit, hold) = (
                self.sub_move.acceleration,
                self.sub_move.limit,
                self.sub_move.hold,
            );
            self.start_sub_move(velocity, acceleration, limit, hold);
        }

        if let Some(pending) = self.pending.as_mut() {
            pending.velocity = with_sign_of(speed, pending.velocity);
        }
    }

    /// Set the acceleration; the magnitude is used.
    ///
    /// A running non-stop sub-move is re-planned with the new acceleration,
    /// and a pending move adopts it.
    pub fn set_acceleration(&mut self, acceleration: i32) {
        self.acceleration = acceleration.saturating_abs();
        let acceleration = self.acceleration as f32;

        if !self.sub_move.is_stop() {
            let (velocity, limit, hold) = (
                self.sub_move.target_velocity,
                self.sub_move.limit,
                self.sub_move.hold,
            );
            self.start_sub_move(velocity, acceleration, limit, hold);
        }

        if let Some(pending) = self.pending.as_mut() {
            pending.acceleration = acceleration;
        }
    }

    /// Rotate by `delta` degrees from the current estimated angle.
    pub fn rotate(&mut self, delta: i32) {
        self.rotate_to(self.angle().saturating_add(delta));
    }

    /// Rotate to the absolute angle `target` and hold there.
    ///
    /// Targeting the current angle, or repeating the active target, stops the
    /// channel with its current output mode instead.
    pub fn rotate_to(&mut self, target: i32) {
        let angle = self.angle();
        if target == angle || self.limit_angle == Some(target) {
            self.stop(self.pwm_mode);
            return;
        }

        self.limit_angle = Some(target);
        let speed = self.speed as f32;
        let velocity = if angle <= target { speed } else { -speed };
        self.new_move(MoveRequest::new(
            velocity,
            self.acceleration as f32,
            Some(target),
            true,
        ));
    }

    /// Decelerate to rest. `Brake` holds the final position, `Float` lets the
    /// motor free-wheel once stopped.
    pub fn stop(&mut self, mode: PwmMode) {
        self.pwm_mode = mode;
        self.limit_angle = None;
        self.new_move(MoveRequest::stop(
            self.acceleration as f32,
            mode == PwmMode::Brake,
        ));
    }

    /// Decelerate to rest and free-wheel.
    pub fn float(&mut self) {
        self.stop(PwmMode::Float);
    }

    /// Run forward at the cruise speed until told otherwise.
    pub fn forward_unlimited(&mut self) {
        self.run_unlimited(self.speed as f32);
    }

    /// Run backward at the cruise speed until told otherwise.
    pub fn backward_unlimited(&mut self) {
        self.run_unlimited(-(self.speed as f32));
    }

    fn run_unlimited(&mut self, velocity: f32) {
        self.limit_angle = None;
        self.new_move(MoveRequest::new(
            velocity,
            self.acceleration as f32,
            None,
            true,
        ));
    }
}

fn with_sign_of(magnitude: f32, sign: f32) -> f32 {
    if sign < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}
