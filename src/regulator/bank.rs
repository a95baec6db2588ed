//! Owner of all regulated channels and the hardware they drive.

use heapless::spsc::{Consumer, Producer};

use crate::config::{validate_channel, validate_config, ChannelConfig, MotorClass, RegulatorConfig};
use crate::error::{Error, RegulatorError, Result};
use crate::hardware::{Clock, MotorHardware, PwmMode};

use super::channel::{Channel, Mirror};
use super::command::{ChannelCommand, Command};
use super::state::Regulator;

/// Number of channels of the default bank.
pub const DEFAULT_CHANNELS: usize = 3;

/// A fixed set of channel regulators sharing one hardware implementation and
/// one clock.
///
/// Commands and the periodic [`tick`](Self::tick) both need `&mut self`, so a
/// command is never applied halfway through a regulation step. Producers on
/// other contexts can hand commands over through a
/// [`heapless::spsc::Queue`] drained by
/// [`tick_with_commands`](Self::tick_with_commands).
///
/// # Example
///
/// ```rust,ignore
/// use motor_regulator::{Channel, Mirror, MotorClass, RegulatorBank};
///
/// let mut bank: RegulatorBank<_, _> = RegulatorBank::new(motors, clock);
/// bank.init(Channel::A, MotorClass::Ev3Large, Mirror::Normal)?;
/// bank.regulator_mut(Channel::A)?.rotate_to(360);
///
/// loop {
///     bank.tick();
///     // wait 1 ms
/// }
/// ```
pub struct RegulatorBank<H, C, const N: usize = DEFAULT_CHANNELS>
where
    H: MotorHardware,
    C: Clock,
{
    hardware: H,
    clock: C,
    regulators: [Regulator; N],
    task_duration_ms: u32,
}

impl<H, C, const N: usize> RegulatorBank<H, C, N>
where
    H: MotorHardware,
    C: Clock,
{
    /// Create a bank with every channel disabled.
    pub fn new(hardware: H, clock: C) -> Self {
        Self {
            hardware,
            clock,
            regulators: core::array::from_fn(|i| Regulator::disabled(Channel::new(i as u8))),
            task_duration_ms: 0,
        }
    }

    /// Create a bank and initialize every configured channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names a port
    /// outside the bank.
    pub fn from_config(config: &RegulatorConfig, hardware: H, clock: C) -> Result<Self> {
        validate_config(config)?;

        let mut bank = Self::new(hardware, clock);
        for channel in config.channels.values() {
            bank.init_from_config(channel)?;
        }
        Ok(bank)
    }

    /// Initialize a channel with default settings.
    ///
    /// The motor is braked, its encoder zeroed, and the regulator starts
    /// holding angle zero.
    pub fn init(&mut self, channel: Channel, motor_class: MotorClass, mirror: Mirror) -> Result<()> {
        let mut config = ChannelConfig::new(channel.value(), motor_class);
        config.mirror = mirror == Mirror::Mirrored;
        self.init_from_config(&config)
    }

    /// Initialize a channel from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the port is outside
    /// the bank.
    pub fn init_from_config(&mut self, config: &ChannelConfig) -> Result<()> {
        validate_channel(config)?;
        let channel = config.channel();
        let index = Self::index(channel)?;

        self.hardware.set_power(channel, 0, PwmMode::Brake);
        self.hardware.reset_encoder(channel);
        let now = self.clock.now_ms();
        self.regulators[index] = Regulator::from_config(config, now);

        info!("channel {} initialized", channel.value());
        Ok(())
    }

    /// Stop regulating a channel and command zero power.
    pub fn terminate(&mut self, channel: Channel) -> Result<()> {
        let index = Self::index(channel)?;
        let regulator = &mut self.regulators[index];
        regulator.disable();
        self.hardware.set_power(channel, 0, regulator.pwm_mode());

        info!("channel {} terminated", channel.value());
        Ok(())
    }

    /// Get a channel's regulator.
    pub fn regulator(&self, channel: Channel) -> Result<&Regulator> {
        Ok(&self.regulators[Self::index(channel)?])
    }

    /// Get a channel's regulator for issuing commands.
    pub fn regulator_mut(&mut self, channel: Channel) -> Result<&mut Regulator> {
        Ok(&mut self.regulators[Self::index(channel)?])
    }

    /// Iterate over all regulators, enabled or not.
    pub fn regulators(&self) -> impl Iterator<Item = &Regulator> {
        self.regulators.iter()
    }

    /// Apply a command to its channel.
    pub fn apply(&mut self, command: ChannelCommand) -> Result<()> {
        self.regulator_mut(command.channel)?.apply(command.command);
        Ok(())
    }

    /// Run one regulation step on every enabled channel.
    pub fn tick(&mut self) {
        let start = self.clock.now_ms();

        for regulator in self.regulators.iter_mut() {
            if !regulator.is_enabled() {
                continue;
            }
            let channel = regulator.channel();
            let now = self.clock.now_ms();
            let raw = self.hardware.encoder_count(channel);
            if let Some(power) = regulator.regulate(now, raw) {
                self.hardware.set_power(channel, power, regulator.output_mode());
            }
        }

        self.task_duration_ms = self.clock.now_ms().wrapping_sub(start);
    }

    /// Apply every queued command, then run one regulation step.
    ///
    /// Commands for channels outside the bank are dropped. Returns the number
    /// of commands applied.
    pub fn tick_with_commands<const Q: usize>(
        &mut self,
        commands: &mut Consumer<'_, ChannelCommand, Q>,
    ) -> usize {
        let mut applied = 0;
        while let Some(command) = commands.dequeue() {
            match self.apply(command) {
                Ok(()) => applied += 1,
                Err(_) => warn!(
                    "dropping command for channel {}",
                    command.channel.value()
                ),
            }
        }

        self.tick();
        applied
    }

    /// Duration of the last [`tick`](Self::tick) in milliseconds.
    #[inline]
    pub fn task_duration_ms(&self) -> u32 {
        self.task_duration_ms
    }

    /// Get the hardware.
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Get the hardware mutably.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Get the clock mutably.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Take the hardware and clock back.
    pub fn release(self) -> (H, C) {
        (self.hardware, self.clock)
    }

    fn index(channel: Channel) -> Result<usize> {
        if channel.index() < N {
            Ok(channel.index())
        } else {
            Err(Error::Regulator(RegulatorError::InvalidChannel(
                channel.value(),
            )))
        }
    }
}

/// Queue a command for a bank drained with
/// [`RegulatorBank::tick_with_commands`].
///
/// # Errors
///
/// Returns [`RegulatorError::QueueFull`] if the queue has no free slot.
pub fn enqueue<const Q: usize>(
    producer: &mut Producer<'_, ChannelCommand, Q>,
    channel: Channel,
    command: Command,
) -> Result<()> {
    producer
        .enqueue(ChannelCommand::new(channel, command))
        .map_err(|_| Error::Regulator(RegulatorError::QueueFull))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::spsc::Queue;

    #[derive(Default)]
    struct Recorder {
        powers: [(i8, Option<PwmMode>); 3],
        counts: [i32; 3],
        resets: u32,
    }

    impl MotorHardware for Recorder {
        fn set_power(&mut self, channel: Channel, power: i8, mode: PwmMode) {
            self.powers[channel.index()] = (power, Some(mode));
        }

        fn encoder_count(&mut self, channel: Channel) -> i32 {
            self.counts[channel.index()]
        }

        fn reset_encoder(&mut self, channel: Channel) {
            self.counts[channel.index()] = 0;
            self.resets += 1;
        }
    }

    #[derive(Default)]
    struct Ticks(u32);

    impl Clock for Ticks {
        fn now_ms(&mut self) -> u32 {
            self.0
        }
    }

    fn bank() -> RegulatorBank<Recorder, Ticks> {
        RegulatorBank::new(Recorder::default(), Ticks::default())
    }

    #[test]
    fn test_new_bank_is_disabled() {
        let mut bank = bank();
        bank.tick();

        assert!(bank.regulators().all(|r| !r.is_enabled()));
        assert_eq!(bank.hardware().powers[0].1, None);
    }

    #[test]
    fn test_init_brakes_and_resets() {
        let mut bank = bank();
        bank.hardware_mut().counts[1] = 77;
        bank.init(Channel::B, MotorClass::Ev3Medium, Mirror::Normal)
            .unwrap();

        assert_eq!(bank.hardware().powers[1], (0, Some(PwmMode::Brake)));
        assert_eq!(bank.hardware().counts[1], 0);
        assert_eq!(bank.hardware().resets, 1);
        assert!(bank.regulator(Channel::B).unwrap().is_enabled());
    }

    #[test]
    fn test_invalid_channel() {
        let mut bank = bank();
        let result = bank.init(Channel::new(3), MotorClass::Ev3Large, Mirror::Normal);

        assert!(matches!(
            result,
            Err(Error::Regulator(RegulatorError::InvalidChannel(3)))
        ));
        assert!(bank.regulator(Channel::new(7)).is_err());
    }

    #[test]
    fn test_tick_drives_enabled_channels() {
        let mut bank = bank();
        bank.init(Channel::A, MotorClass::Ev3Large, Mirror::Normal)
            .unwrap();
        bank.hardware_mut().counts[0] = 20;
        bank.clock_mut().0 = 1;
        bank.tick();

        // Holding at zero pushes back against the displacement.
        assert!(bank.hardware().powers[0].0 < 0);
        assert_eq!(bank.hardware().powers[2].1, None);
    }

    #[test]
    fn test_terminate_commands_zero() {
        let mut bank = bank();
        bank.init(Channel::C, MotorClass::NxtLarge, Mirror::Normal)
            .unwrap();
        bank.hardware_mut().counts[2] = 50;
        bank.tick();
        bank.terminate(Channel::C).unwrap();

        assert_eq!(bank.hardware().powers[2].0, 0);
        assert!(!bank.regulator(Channel::C).unwrap().is_enabled());

        // Disabled channels are left alone by later ticks.
        bank.tick();
        assert_eq!(bank.hardware().powers[2].0, 0);
    }

    #[test]
    fn test_command_queue() {
        let mut queue: Queue<ChannelCommand, 4> = Queue::new();
        let (mut producer, mut consumer) = queue.split();

        let mut bank = bank();
        bank.init(Channel::A, MotorClass::Ev3Large, Mirror::Normal)
            .unwrap();

        enqueue(&mut producer, Channel::A, Command::SetSpeed(360)).unwrap();
        enqueue(&mut producer, Channel::A, Command::RotateTo(90)).unwrap();
        enqueue(&mut producer, Channel::new(9), Command::Float).unwrap();
        // Capacity is Q - 1.
        assert!(matches!(
            enqueue(&mut producer, Channel::A, Command::Float),
            Err(Error::Regulator(RegulatorError::QueueFull))
        ));

        let applied = bank.tick_with_commands(&mut consumer);

        assert_eq!(applied, 2);
        let reg = bank.regulator(Channel::A).unwrap();
        assert_eq!(reg.target_speed(), 360);
        assert_eq!(reg.limit_angle(), Some(90));
        assert!(reg.is_moving());
    }
}
