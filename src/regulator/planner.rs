//! Move planning: starting sub-moves, blending or deferring new moves, and
//! ending moves.

use libm::fabsf;

use crate::motion::{required_deceleration, SubMove};

use super::state::{MoveRequest, Regulator};

impl Regulator {
    /// Replace the active sub-move with a ramp from the current estimate.
    ///
    /// The channel counts as moving unless both the current and the target
    /// velocity are zero.
    pub(crate) fn start_sub_move(
        &mut self,
        velocity: f32,
        acceleration: f32,
        limit: Option<i32>,
        hold: bool,
    ) {
        self.sub_move = SubMove::plan(
            self.position,
            self.velocity,
            self.now,
            velocity,
            acceleration,
            limit,
            hold,
        );
        self.moving = velocity != 0.0 || self.velocity != 0.0;
    }

    /// Start a move, blending it into the current motion when possible.
    ///
    /// Stops and moves from rest start at once. While moving, a request that
    /// keeps the direction of travel and can still brake onto its limit
    /// replaces the active sub-move; anything else decelerates to zero first
    /// and waits as the pending move. A later deferral replaces an earlier one.
    pub fn new_move(&mut self, request: MoveRequest) {
        self.pending = None;
        self.stalled = false;

        if request.velocity == 0.0 {
            self.start_sub_move(0.0, request.acceleration, None, request.hold);
        } else if !self.moving || self.can_blend(&request) {
            self.start_sub_move(
                request.velocity,
                request.acceleration,
                request.limit,
                request.hold,
            );
        } else {
            debug!(
                "channel {}: deferring move until stopped",
                self.channel.value()
            );
            self.pending = Some(request);
            self.start_sub_move(0.0, request.acceleration, None, true);
        }
    }

    fn can_blend(&self, request: &MoveRequest) -> bool {
        let required = required_deceleration(self.velocity, self.position, request.limit);
        request.velocity * self.velocity >= 0.0 && fabsf(required) <= fabsf(request.acceleration)
    }

    /// Finish the active move.
    ///
    /// On a stall the position frame is resynchronized to the encoder first,
    /// then any pending move is dispatched.
    pub(crate) fn end_move(&mut self, stalled: bool, raw_count: i32) {
        debug!("channel {}: move ended", self.channel.value());
        self.moving = self.pending.is_some();

        if stalled {
            self.resynchronize(raw_count);
        }

        if let Some(request) = self.pending.take() {
            self.start_sub_move(
                request.velocity,
                request.acceleration,
                request.limit,
                request.hold,
            );
        }
    }

    /// Make the current encoder reading the new angle zero and come to rest.
    fn resynchronize(&mut self, raw_count: i32) {
        self.stalled = true;
        self.stall_events = self.stall_events.saturating_add(1);
        self.origin = self.mirror.count(raw_count);
        self.position = 0.0;
        self.velocity = 0.0;
        self.stall_count = 0;

        warn!(
            "channel {}: stalled, origin moved to {}",
            self.channel.value(),
            self.origin
        );

        let hold = self.sub_move.hold;
        self.start_sub_move(0.0, 0.0, None, hold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorClass;
    use crate::regulator::{Channel, Mirror};

    fn regulator() -> Regulator {
        Regulator::new(Channel::A, MotorClass::Ev3Large, Mirror::Normal, 0)
    }

    fn cruising(velocity: f32) -> Regulator {
        let mut reg = regulator();
        reg.velocity = velocity;
        reg.start_sub_move(velocity, 2000.0, None, true);
        reg
    }

    #[test]
    fn test_start_from_rest() {
        let mut reg = regulator();
        reg.new_move(MoveRequest::new(720.0, 2000.0, Some(1000), true));

        assert!(reg.is_moving());
        assert!(!reg.is_pending());
        assert_eq!(reg.sub_move().ramp_ms, 360);
        assert_eq!(reg.sub_move().limit, Some(1000));
    }

    #[test]
    fn test_zero_move_at_rest_does_not_move() {
        let mut reg = regulator();
        reg.start_sub_move(0.0, 1000.0, None, true);

        assert!(!reg.is_moving());
    }

    #[test]
    fn test_same_direction_blends() {
        let mut reg = cruising(720.0);
        reg.new_move(MoveRequest::new(360.0, 1000.0, Some(3000), true));

        assert!(!reg.is_pending());
        assert_eq!(reg.sub_move().target_velocity, 360.0);
        assert_eq!(reg.sub_move().acceleration, -1000.0);
        assert_eq!(reg.sub_move().limit, Some(3000));
    }

    #[test]
    fn test_reversal_is_deferred() {
        let mut reg = cruising(720.0);
        let request = MoveRequest::new(-720.0, 2000.0, Some(-500), true);
        reg.new_move(request);

        assert_eq!(reg.pending_move(), Some(&request));
        assert!(reg.is_moving());
        assert!(reg.sub_move().is_stop());
        assert_eq!(reg.sub_move().limit, None);
    }

    #[test]
    fn test_limit_too_close_is_deferred() {
        let mut reg = cruising(720.0);
        reg.position = 500.0;
        // 720² / (2 * 20) far exceeds 2000.
        reg.new_move(MoveRequest::new(720.0, 2000.0, Some(520), true));

        assert!(reg.is_pending());
        assert!(reg.sub_move().is_stop());
    }

    #[test]
    fn test_stop_while_moving_is_immediate() {
        let mut reg = cruising(720.0);
        reg.new_move(MoveRequest::stop(2000.0, false));

        assert!(!reg.is_pending());
        assert!(reg.sub_move().is_stop());
        assert!(!reg.sub_move().hold);
    }

    #[test]
    fn test_later_deferral_replaces_earlier() {
        let mut reg = cruising(720.0);
        reg.new_move(MoveRequest::new(-720.0, 2000.0, Some(-500), true));
        reg.new_move(MoveRequest::new(-300.0, 2000.0, Some(-800), false));

        assert_eq!(reg.pending_move().map(|p| p.limit), Some(Some(-800)));
    }

    #[test]
    fn test_end_move_dispatches_pending() {
        let mut reg = cruising(720.0);
        reg.new_move(MoveRequest::new(-720.0, 2000.0, Some(-500), true));
        reg.velocity = 0.0;
        reg.end_move(false, 0);

        assert!(!reg.is_pending());
        assert!(reg.is_moving());
        assert_eq!(reg.sub_move().target_velocity, -720.0);
        assert!(!reg.is_stalled());
    }

    #[test]
    fn test_end_move_without_pending_stops() {
        let mut reg = regulator();
        reg.moving = true;
        reg.end_move(false, 0);

        assert!(!reg.is_moving());
    }

    #[test]
    fn test_stall_resynchronizes_before_dispatch() {
        let mut reg = Regulator::new(Channel::A, MotorClass::Ev3Large, Mirror::Mirrored, 0);
        reg.position = 250.0;
        reg.velocity = 300.0;
        reg.moving = true;
        reg.stall_count = 1001;
        reg.pending = Some(MoveRequest::new(-200.0, 1000.0, None, true));

        reg.end_move(true, -89);

        assert!(reg.is_stalled());
        assert_eq!(reg.origin(), 89);
        assert_eq!(reg.stall_count(), 0);
        assert_eq!(reg.stall_events(), 1);
        // Pending planned from the resynchronized frame.
        assert_eq!(reg.sub_move().base_position, 0.0);
        assert_eq!(reg.sub_move().base_velocity, 0.0);
        assert_eq!(reg.sub_move().target_velocity, -200.0);
        assert!(reg.is_moving());
    }

    #[test]
    fn test_new_move_clears_stalled() {
        let mut reg = regulator();
        reg.end_move(true, 10);
        assert!(reg.is_stalled());

        reg.new_move(MoveRequest::new(100.0, 1000.0, None, true));
        assert!(!reg.is_stalled());
    }

    #[test]
    fn test_filter_persists_across_transitions() {
        let mut reg = regulator();
        reg.new_move(MoveRequest::new(720.0, 2000.0, None, true));
        for t in 1..=20 {
            reg.regulate(t, 0);
        }
        let filter = reg.filter;
        assert_ne!(filter, crate::motion::PowerFilter::new());

        reg.new_move(MoveRequest::new(360.0, 1000.0, Some(5000), true));
        assert!(!reg.is_pending());
        assert_eq!(reg.filter, filter);

        reg.end_move(false, 0);
        assert_eq!(reg.filter, filter);
    }
}
