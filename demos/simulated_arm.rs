//! Example: Two-joint arm against simulated motors.
//!
//! This example demonstrates how to:
//! - Build a regulator bank from a TOML configuration
//! - Issue moves, a reversal and a stop through the command API
//! - Feed commands from another context through a command queue
//! - Watch channel status while the periodic tick runs
//!
//! Run with: `cargo run --example simulated_arm --features std`

use heapless::spsc::Queue;
use motor_regulator::{
    enqueue, parse_config, Channel, ChannelCommand, Clock, Command, MotorHardware, PwmMode,
    RegulatorBank, Result,
};

/// First-order motor model: speed follows power with a 50 ms lag.
#[derive(Default)]
struct Motor {
    angle: f32,
    speed: f32,
    power: i8,
}

#[derive(Default)]
struct Motors([Motor; 3]);

impl MotorHardware for Motors {
    fn set_power(&mut self, channel: Channel, power: i8, _mode: PwmMode) {
        self.0[channel.index()].power = power;
    }

    fn encoder_count(&mut self, channel: Channel) -> i32 {
        self.0[channel.index()].angle as i32
    }

    fn reset_encoder(&mut self, channel: Channel) {
        self.0[channel.index()].angle = 0.0;
    }
}

impl Motors {
    fn step(&mut self) {
        for motor in self.0.iter_mut() {
            motor.speed += (10.0 * motor.power as f32 - motor.speed) * 0.001 / 0.05;
            motor.angle += motor.speed * 0.001;
        }
    }
}

#[derive(Default)]
struct Millis(u32);

impl Clock for Millis {
    fn now_ms(&mut self) -> u32 {
        self.0
    }
}

fn main() -> Result<()> {
    println!("=== Simulated Arm Example ===\n");

    let config = parse_config(
        r#"
[channels.shoulder]
port = 0
motor_class = "ev3_large"
speed = 720
acceleration = 2000

[channels.wrist]
port = 1
motor_class = "ev3_medium"
speed = 360
"#,
    )?;

    for name in config.channel_names() {
        println!("Configured channel: {}", name);
    }

    let mut bank: RegulatorBank<Motors, Millis> =
        RegulatorBank::from_config(&config, Motors::default(), Millis::default())?;

    let mut queue: Queue<ChannelCommand, 8> = Queue::new();
    let (mut producer, mut consumer) = queue.split();

    bank.regulator_mut(Channel::A)?.rotate_to(1000);
    enqueue(&mut producer, Channel::B, Command::RotateTo(-90))?;

    for t in 1..=4000u32 {
        bank.clock_mut().0 = t;
        bank.hardware_mut().step();
        bank.tick_with_commands(&mut consumer);

        match t {
            // Reverse the shoulder halfway out: the new target waits until
            // the joint has stopped.
            400 => {
                let shoulder = bank.regulator_mut(Channel::A)?;
                shoulder.rotate_to(-200);
                println!("t={:4} shoulder reversal pending: {}", t, shoulder.is_pending());
            }
            2500 => enqueue(&mut producer, Channel::B, Command::Stop(PwmMode::Float))?,
            _ => {}
        }

        if t % 250 == 0 {
            for channel in [Channel::A, Channel::B] {
                let status = bank.regulator(channel)?.status();
                println!(
                    "t={:4} ch{} angle={:5} vel={:5} power={:4} phase={:?}",
                    t,
                    channel.value(),
                    status.angle,
                    status.velocity,
                    status.power,
                    status.phase
                );
            }
        }
    }

    let shoulder = bank.regulator(Channel::A)?;
    println!("\nShoulder settled at {} (target -200)", shoulder.angle());
    println!("Wrist settled at {} (target -90)", bank.regulator(Channel::B)?.angle());

    println!("\n=== Example Complete ===");
    Ok(())
}
