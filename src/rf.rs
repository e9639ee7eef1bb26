//! RF test commands
//!
//! Factory and certification tests: tone generation, packet error rate runs,
//! frequency hopping and continuous wave. They share the command channel with
//! the point-to-point driver and are reached through
//! [`P2pDevice::rf_test`](crate::device::P2pDevice::rf_test).

use crate::at::command::Command;
use crate::channel::CommandChannel;
use crate::config::p2p::Bandwidth;
use crate::device::{send, DeviceError};

/// Parameters of `AT+TCONF`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestConfig {
    /// Frequency in Hz
    pub frequency: u32,
    /// Output power in dBm
    pub tx_power: u8,
    /// Bandwidth
    pub bandwidth: Bandwidth,
    /// Spreading factor
    pub spreading_factor: u8,
    /// Coding rate index
    pub coding_rate: u8,
    /// Modulation selector as defined by the firmware
    pub modulation: u8,
    /// Preamble length in symbols
    pub preamble_length: u16,
    /// FSK frequency deviation in Hz, unused for LoRa
    pub fsk_deviation: u16,
}

/// Frequency sweep of `AT+TTH` / `AT+TRTH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hopping {
    /// First frequency in Hz
    pub start: u32,
    /// Last frequency in Hz
    pub stop: u32,
    /// Step between frequencies in Hz
    pub step: u16,
    /// Number of packets per frequency
    pub count: u16,
}

/// Borrowed access to the RF test command set
pub struct RadioTest<'a, C: CommandChannel> {
    channel: &'a mut C,
}

impl<'a, C: CommandChannel> RadioTest<'a, C> {
    pub(crate) fn new(channel: &'a mut C) -> Self {
        Self { channel }
    }

    fn run(&mut self, command: Command) -> Result<(), DeviceError<C::Error>> {
        send(&mut *self.channel, &command)
    }

    /// Start the RSSI tone test
    pub fn start_rssi(&mut self) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::RssiTest)
    }

    /// Emit an unmodulated tone
    pub fn start_tone(&mut self) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::ToneTest)
    }

    /// Transmit `packets` test packets
    pub fn start_send(&mut self, packets: u16) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::TxTest(packets))
    }

    /// Receive `packets` test packets
    pub fn start_receive(&mut self, packets: u16) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::RxTest(packets))
    }

    /// Configure the test radio parameters
    pub fn configure(&mut self, config: &TestConfig) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::TestConfig(*config))
    }

    /// Sweep frequencies in order
    pub fn frequency_hopping(&mut self, hopping: &Hopping) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::FrequencyHopping(*hopping))
    }

    /// Sweep frequencies in random order
    pub fn random_frequency_hopping(
        &mut self,
        hopping: &Hopping,
    ) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::RandomFrequencyHopping(*hopping))
    }

    /// Stop the running test
    pub fn stop(&mut self) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::TestOff)
    }

    /// Enter certification mode
    pub fn certification(&mut self) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::Certification)
    }

    /// Transmit a continuous wave for `duration` seconds
    pub fn continuous_wave(
        &mut self,
        frequency: u32,
        tx_power: u8,
        duration: u16,
    ) -> Result<(), DeviceError<C::Error>> {
        self.run(Command::ContinuousWave {
            frequency,
            tx_power,
            duration,
        })
    }
}
