//! Per-channel regulator record.

use libm::roundf;

use crate::config::{ChannelConfig, GainSchedule, MotorClass};
use crate::hardware::PwmMode;
use crate::motion::{MotionPhase, PowerFilter, SubMove};

use super::channel::{Channel, Mirror};

/// A motion request as seen by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Signed cruise velocity in degrees per second.
    pub velocity: f32,
    /// Acceleration magnitude in degrees per second squared.
    pub acceleration: f32,
    /// Absolute angle to stop at, if any.
    pub limit: Option<i32>,
    /// Hold position once the move ends.
    pub hold: bool,
}

impl MoveRequest {
    /// Create a request.
    pub const fn new(velocity: f32, acceleration: f32, limit: Option<i32>, hold: bool) -> Self {
        Self {
            velocity,
            acceleration,
            limit,
            hold,
        }
    }

    /// A request to come to rest.
    pub const fn stop(acceleration: f32, hold: bool) -> Self {
        Self::new(0.0, acceleration, None, hold)
    }
}

/// Copyable snapshot of a channel for telemetry and display consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStatus {
    /// Channel the snapshot belongs to.
    pub channel: Channel,
    /// Estimated angle in degrees.
    pub angle: i32,
    /// Estimated velocity in degrees per second.
    pub velocity: i32,
    /// Commanded limit angle.
    pub limit_angle: Option<i32>,
    /// Cruise speed magnitude.
    pub target_speed: i32,
    /// Target velocity of the active sub-move.
    pub intermediate_velocity: i32,
    /// Acceleration magnitude.
    pub acceleration: i32,
    /// Last power sent to the motor.
    pub power: i8,
    /// Current phase.
    pub phase: MotionPhase,
    /// A sub-move is active.
    pub moving: bool,
    /// The last move ended in a stall.
    pub stalled: bool,
    /// A command waits for the motor to stop.
    pub pending: bool,
}

/// Regulation state of one motor channel.
///
/// Commands mutate the targets and the active sub-move; only the regulation
/// tick writes the position and velocity estimates.
#[derive(Debug, Clone)]
pub struct Regulator {
    // Identity and configuration.
    pub(super) channel: Channel,
    pub(super) motor_class: MotorClass,
    pub(super) gains: GainSchedule,
    pub(super) mirror: Mirror,
    pub(super) pwm_mode: PwmMode,
    pub(super) stall_threshold: f32,
    pub(super) stall_ticks: u32,
    pub(super) enabled: bool,

    // Commanded targets.
    pub(super) speed: i32,
    pub(super) acceleration: i32,
    pub(super) limit_angle: Option<i32>,

    // Active sub-move.
    pub(super) sub_move: SubMove,

    // Live estimates.
    pub(super) position: f32,
    pub(super) velocity: f32,
    pub(super) filter: PowerFilter,
    pub(super) power: i8,

    // Status.
    pub(super) moving: bool,
    pub(super) stalled: bool,
    pub(super) stall_count: u32,
    pub(super) stall_events: u32,
    pub(super) pending: Option<MoveRequest>,

    /// Mirrored raw count used as the zero of `position`.
    pub(super) origin: i32,
    /// Clock value of the last tick.
    pub(super) now: u32,
}

impl Regulator {
    /// Create an enabled regulator with default speed, acceleration and stall
    /// settings, at rest and holding angle zero.
    pub fn new(channel: Channel, motor_class: MotorClass, mirror: Mirror, now: u32) -> Self {
        let mut config = ChannelConfig::new(channel.value(), motor_class);
        config.mirror = mirror == Mirror::Mirrored;
        Self::from_config(&config, now)
    }

    /// Create an enabled regulator from a channel configuration.
    pub fn from_config(config: &ChannelConfig, now: u32) -> Self {
        Self {
            channel: config.channel(),
            motor_class: config.motor_class,
            gains: config.gains(),
            mirror: config.mirror(),
            pwm_mode: config.pwm_mode,
            stall_threshold: config.stall_threshold,
            stall_ticks: config.stall_ticks,
            enabled: true,
            speed: config.speed.saturating_abs(),
            acceleration: config.acceleration.saturating_abs(),
            limit_angle: None,
            sub_move: SubMove::rest(0.0, now),
            position: 0.0,
            velocity: 0.0,
            filter: PowerFilter::new(),
            power: 0,
            moving: false,
            stalled: false,
            stall_count: 0,
            stall_events: 0,
            pending: None,
            origin: 0,
            now,
        }
    }

    /// Create a regulator that the tick skips until the channel is initialized.
    pub fn disabled(channel: Channel) -> Self {
        let mut regulator = Self::new(channel, MotorClass::default(), Mirror::Normal, 0);
        regulator.enabled = false;
        regulator
    }

    /// Mark the channel as no longer regulated.
    pub(crate) fn disable(&mut self) {
        self.enabled = false;
        self.moving = false;
        self.pending = None;
        self.power = 0;
    }

    /// Get the channel.
    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Get the motor class.
    #[inline]
    pub fn motor_class(&self) -> MotorClass {
        self.motor_class
    }

    /// Get the direction mirror.
    #[inline]
    pub fn mirror(&self) -> Mirror {
        self.mirror
    }

    /// Get the output behavior at zero power.
    #[inline]
    pub fn pwm_mode(&self) -> PwmMode {
        self.pwm_mode
    }

    /// Output mode to command with the current power: free-wheel when idle
    /// without hold, otherwise the channel's mode.
    pub fn output_mode(&self) -> PwmMode {
        if !self.moving && !self.sub_move.hold {
            PwmMode::Float
        } else {
            self.pwm_mode
        }
    }

    /// Get the active gain schedule.
    #[inline]
    pub fn gains(&self) -> &GainSchedule {
        &self.gains
    }

    /// Replace the gain schedule. Filter state is kept.
    pub fn set_gains(&mut self, gains: GainSchedule) {
        self.gains = gains;
    }

    /// Get the stall error threshold in degrees.
    #[inline]
    pub fn stall_threshold(&self) -> f32 {
        self.stall_threshold
    }

    /// Set the stall error threshold; the magnitude is used.
    pub fn set_stall_threshold(&mut self, threshold: f32) {
        self.stall_threshold = libm::fabsf(threshold);
    }

    /// Set how many consecutive over-threshold ticks make a stall.
    pub fn set_stall_ticks(&mut self, ticks: u32) {
        self.stall_ticks = ticks;
    }

    /// Estimated angle in degrees, rounded.
    ///
    /// Measured from the origin set at init. A stall moves the origin to the
    /// stalled position, so the angle reads 0 right after a stall; track
    /// [`origin`](Self::origin) to recover absolute joint angles.
    #[inline]
    pub fn angle(&self) -> i32 {
        roundf(self.position) as i32
    }

    /// Estimated angle in degrees, unrounded.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Estimated velocity in degrees per second, rounded.
    #[inline]
    pub fn velocity(&self) -> i32 {
        roundf(self.velocity) as i32
    }

    /// Angle the last `rotate`/`rotate_to` is heading for.
    #[inline]
    pub fn limit_angle(&self) -> Option<i32> {
        self.limit_angle
    }

    /// Cruise speed magnitude in degrees per second.
    #[inline]
    pub fn target_speed(&self) -> i32 {
        self.speed
    }

    /// Target velocity of the active sub-move.
    #[inline]
    pub fn intermediate_velocity(&self) -> i32 {
        roundf(self.sub_move.target_velocity) as i32
    }

    /// Acceleration magnitude in degrees per second squared.
    #[inline]
    pub fn acceleration(&self) -> i32 {
        self.acceleration
    }

    /// Last signed power sent to the motor, in the motor's own direction.
    #[inline]
    pub fn power(&self) -> i8 {
        self.power
    }

    /// The active sub-move.
    #[inline]
    pub fn sub_move(&self) -> &SubMove {
        &self.sub_move
    }

    /// The request waiting for the motor to stop, if any.
    #[inline]
    pub fn pending_move(&self) -> Option<&MoveRequest> {
        self.pending.as_ref()
    }

    /// Mirrored raw encoder count that corresponds to angle zero.
    #[inline]
    pub fn origin(&self) -> i32 {
        self.origin
    }

    /// Consecutive over-threshold tick counter (decays when tracking recovers).
    #[inline]
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// Number of stalls detected since init.
    #[inline]
    pub fn stall_events(&self) -> u32 {
        self.stall_events
    }

    /// Check if a sub-move is active.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Check if the last move ended in a stall.
    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Check if a command waits for the motor to stop.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Check if the tick regulates this channel.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current phase of the channel.
    pub fn phase(&self) -> MotionPhase {
        if self.moving {
            if self.sub_move.is_ramping(self.sub_move.elapsed(self.now)) {
                MotionPhase::Ramping
            } else {
                MotionPhase::Cruising
            }
        } else if self.sub_move.hold {
            MotionPhase::Holding
        } else {
            MotionPhase::Idle
        }
    }

    /// Snapshot of the channel state.
    pub fn status(&self) -> ChannelStatus {
        ChannelStatus {
            channel: self.channel,
            angle: self.angle(),
            velocity: self.velocity(),
            limit_angle: self.limit_angle,
            target_speed: self.speed,
            intermediate_velocity: self.intermediate_velocity(),
            acceleration: self.acceleration,
            power: self.power,
            phase: self.phase(),
            moving: self.moving,
            stalled: self.stalled,
            pending: self.is_pending(),
        }
    }
}
