//! Simulated motors and clock shared by the integration tests.

#![allow(dead_code)]

use motor_regulator::{Channel, Clock, MotorHardware, PwmMode, RegulatorBank};

/// Speed gain of the simulated motor, degrees per second per percent power.
const SPEED_GAIN: f32 = 10.0;
/// Mechanical time constant in seconds.
const TIME_CONSTANT: f32 = 0.05;

/// First-order DC motor with an ideal encoder.
#[derive(Debug, Default, Clone)]
pub struct Plant {
    /// Shaft angle in degrees.
    pub x: f32,
    /// Shaft velocity in degrees per second.
    pub v: f32,
    /// Applied power in the motor's own direction.
    pub power: i8,
    /// Rest mode of the last command.
    pub mode: Option<PwmMode>,
    /// Shaft is blocked.
    pub jammed: bool,
    /// Constant opposing load in degrees per second.
    pub load: f32,
    /// Encoder zero.
    pub zero: f32,
}

impl Plant {
    fn step(&mut self, dt: f32) {
        if self.jammed {
            self.v = 0.0;
            return;
        }
        self.v += (SPEED_GAIN * self.power as f32 - self.load - self.v) * dt / TIME_CONSTANT;
        self.x += self.v * dt;
    }

    /// Encoder count, truncated toward zero.
    pub fn raw(&self) -> i32 {
        (self.x - self.zero) as i32
    }
}

/// Three simulated motor ports.
#[derive(Debug, Default)]
pub struct SimMotors {
    pub plants: [Plant; 3],
    /// Port wired in reverse: encoder and power signs flipped.
    pub reversed: [bool; 3],
}

impl SimMotors {
    pub fn step(&mut self) {
        for plant in self.plants.iter_mut() {
            plant.step(0.001);
        }
    }

    pub fn plant(&self, channel: Channel) -> &Plant {
        &self.plants[channel.index()]
    }

    pub fn plant_mut(&mut self, channel: Channel) -> &mut Plant {
        &mut self.plants[channel.index()]
    }

    fn sign(&self, channel: Channel) -> i32 {
        if self.reversed[channel.index()] {
            -1
        } else {
            1
        }
    }
}

impl MotorHardware for SimMotors {
    fn set_power(&mut self, channel: Channel, power: i8, mode: PwmMode) {
        let sign = self.sign(channel) as i8;
        let plant = self.plant_mut(channel);
        plant.power = power * sign;
        plant.mode = Some(mode);
    }

    fn encoder_count(&mut self, channel: Channel) -> i32 {
        self.plant(channel).raw() * self.sign(channel)
    }

    fn reset_encoder(&mut self, channel: Channel) {
        let plant = self.plant_mut(channel);
        plant.zero = plant.x;
    }
}

/// Manually advanced millisecond clock.
#[derive(Debug, Default)]
pub struct SimClock(pub u32);

impl Clock for SimClock {
    fn now_ms(&mut self) -> u32 {
        self.0
    }
}

pub type SimBank = RegulatorBank<SimMotors, SimClock>;

pub fn bank() -> SimBank {
    RegulatorBank::new(SimMotors::default(), SimClock::default())
}

/// Advance the simulation by one millisecond and run the regulation tick.
pub fn step(bank: &mut SimBank) {
    bank.clock_mut().0 += 1;
    bank.hardware_mut().step();
    bank.tick();
}

/// Step until `done` holds or `limit` ticks have passed. Returns the number
/// of ticks run.
pub fn run_until(bank: &mut SimBank, limit: u32, mut done: impl FnMut(&SimBank) -> bool) -> u32 {
    for n in 1..=limit {
        step(bank);
        if done(bank) {
            return n;
        }
    }
    limit
}

pub fn run(bank: &mut SimBank, ticks: u32) {
    for _ in 0..ticks {
        step(bank);
    }
}
