//! High-level point-to-point device interface
//!
//! This module provides the driver the application talks to. It validates
//! parameters, issues AT commands through a [`CommandChannel`], tracks the
//! transmit/receive mode and turns receive events into queued [`Frame`]s.

use embedded_hal::blocking::delay::DelayMs;

use crate::{
    at::{
        command::{Command, Parameter, NETWORK_MODE_P2P},
        event::{self, Event, ParseError},
    },
    channel::{CommandChannel, Line, Response},
    codec::MAX_PAYLOAD_SIZE,
    config::{
        device::DeviceConfig,
        p2p::{self, Bandwidth, P2pConfig},
    },
    frame::{Frame, FrameQueue, PushOutcome, DEFAULT_QUEUE_DEPTH},
    mode::{Mode, ModeState},
    rf::RadioTest,
};

/// Time the module needs after `ATZ` before it accepts commands
const RESTART_DELAY_MS: u32 = 100;

/// Device error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError<E> {
    /// Transport failure or command refused by the module
    Channel(E),
    /// Key or IV has the wrong length or is not hex; nothing was sent
    InvalidKey {
        /// Required number of hex digits
        expected: usize,
        /// Length of the rejected key
        actual: usize,
    },
    /// Parameter outside its accepted range; nothing was sent
    OutOfRange,
    /// Payload longer than [`MAX_PAYLOAD_SIZE`]; nothing was sent
    PayloadTooLarge,
    /// Command line does not fit the command buffer
    CommandOverflow,
}

/// Outcome of one [`P2pDevice::update`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Update {
    /// Line was not a known event
    Ignored,
    /// A frame was queued
    Queued,
    /// A frame was queued after the oldest queued frame was evicted
    Evicted,
    /// A frame was received but the full queue rejected it
    Overflow,
    /// The module reported a receive error
    ReceiveError,
    /// The receive window elapsed without a packet
    ReceiveTimeout,
    /// A transmission completed
    TransmitDone,
    /// A receive event could not be decoded and was dropped
    Malformed(ParseError),
}

/// Counters of link activity seen by [`P2pDevice::update`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames queued
    pub frames: u32,
    /// Frames lost to queue overflow, evicted or rejected
    pub dropped: u32,
    /// Receive events that failed to decode
    pub malformed: u32,
    /// Receive errors reported by the module
    pub rx_errors: u32,
    /// Receive windows that elapsed
    pub rx_timeouts: u32,
    /// Completed transmissions
    pub tx_done: u32,
    /// Lines that were not events
    pub ignored: u32,
}

/// Build `command` and send it, waiting for the module's status
pub(crate) fn send<C: CommandChannel>(
    channel: &mut C,
    command: &Command,
) -> Result<(), DeviceError<C::Error>> {
    let line = command
        .build()
        .map_err(|_| DeviceError::CommandOverflow)?;
    debug!("send {}", line.as_str());
    channel.send_command(&line).map_err(DeviceError::Channel)
}

fn check_key<E>(key: &str, len: usize) -> Result<(), DeviceError<E>> {
    if p2p::is_valid_key(key, len) {
        Ok(())
    } else {
        Err(DeviceError::InvalidKey {
            expected: len,
            actual: key.len(),
        })
    }
}

/// RAK3172 in point-to-point mode
///
/// `N` is the number of received frames buffered until the application
/// consumes them.
pub struct P2pDevice<C: CommandChannel, const N: usize = DEFAULT_QUEUE_DEPTH> {
    channel: C,
    config: DeviceConfig,
    mode: ModeState,
    frames: FrameQueue<N>,
    stats: LinkStats,
    line: Line,
}

impl<C: CommandChannel, const N: usize> P2pDevice<C, N> {
    /// Create a device with default settings
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, DeviceConfig::default())
    }

    /// Create a device with explicit settings
    pub fn with_config(channel: C, config: DeviceConfig) -> Self {
        Self {
            channel,
            config,
            mode: ModeState::new(),
            frames: FrameQueue::new(config.overflow),
            stats: LinkStats::default(),
            line: Line::new(),
        }
    }

    /// Driver settings in use
    pub fn config(&self) -> DeviceConfig {
        self.config
    }

    /// Mutable access to the command channel
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Release the command channel
    pub fn release(self) -> C {
        self.channel
    }

    fn send(&mut self, command: Command) -> Result<(), DeviceError<C::Error>> {
        send(&mut self.channel, &command)
    }

    fn query(&mut self, parameter: Parameter) -> Result<Response, DeviceError<C::Error>> {
        let line = parameter.query();
        debug!("query {}", line.as_str());
        self.channel.get_command(&line).map_err(DeviceError::Channel)
    }

    /// Reboot the module
    ///
    /// The module does not answer `ATZ`; the command is written and not awaited.
    pub fn restart(&mut self) -> Result<(), DeviceError<C::Error>> {
        let line = Command::Reset
            .build()
            .map_err(|_| DeviceError::CommandOverflow)?;
        self.channel.transmit(&line).map_err(DeviceError::Channel)
    }

    /// Reboot the module and switch it to point-to-point mode
    pub fn init<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<(), DeviceError<C::Error>> {
        self.restart()?;
        delay.delay_ms(RESTART_DELAY_MS);
        // Boot banner
        self.channel.flush().map_err(DeviceError::Channel)?;
        self.send(Command::Attention)?;
        self.send(Command::NetworkMode(NETWORK_MODE_P2P))?;
        info!("module ready in P2P mode");
        Ok(())
    }

    /// Send all radio parameters at once with `AT+P2P`
    ///
    /// Spreading factor and coding rate are clamped; an out-of-range power or
    /// preamble length fails with [`DeviceError::OutOfRange`].
    pub fn configure(&mut self, config: &P2pConfig) -> Result<(), DeviceError<C::Error>> {
        let config = config.normalized().ok_or(DeviceError::OutOfRange)?;
        self.send(Command::P2p(config))
    }

    /// Enter `mode`, using the configured receive window for [`Mode::Receive`]
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), DeviceError<C::Error>> {
        self.set_mode_with_timeout(mode, self.config.receive_timeout)
    }

    /// Enter `mode`; `timeout` is the receive window for [`Mode::Receive`]
    ///
    /// A zero timeout closes the receiver, but the recorded mode is still
    /// [`Mode::Receive`]. The mode is only recorded once the module accepted
    /// the command.
    pub fn set_mode_with_timeout(
        &mut self,
        mode: Mode,
        timeout: u16,
    ) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::ReceiveWindow(mode.receive_window(timeout)))?;
        self.mode.commit(mode);
        info!("mode {}", mode);
        Ok(())
    }

    /// Mode last acknowledged by the module, `None` before the first `set_mode`
    pub fn mode(&self) -> Option<Mode> {
        self.mode.current()
    }

    /// Set the frequency in Hz
    pub fn set_frequency(&mut self, frequency: u32) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::Frequency(frequency))
    }

    /// Set the spreading factor, clamped to 6-12
    pub fn set_spreading_factor(&mut self, sf: u8) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::SpreadingFactor(p2p::clamp_spreading_factor(sf)))
    }

    /// Set the bandwidth in kHz, snapped to 125, 250 or 500
    pub fn set_bandwidth(&mut self, khz: u16) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::Bandwidth(Bandwidth::from_khz(khz)))
    }

    /// Set the coding rate index, clamped to 0-3
    pub fn set_coding_rate(&mut self, cr: u8) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::CodingRate(p2p::clamp_coding_rate(cr)))
    }

    /// Set the output power, 5-22 dBm
    pub fn set_tx_power(&mut self, power: u8) -> Result<(), DeviceError<C::Error>> {
        if !p2p::TX_POWER_RANGE.contains(&power) {
            return Err(DeviceError::OutOfRange);
        }
        self.send(Command::TxPower(power))
    }

    /// Set the preamble length, at least 2 symbols
    pub fn set_preamble_length(&mut self, len: u16) -> Result<(), DeviceError<C::Error>> {
        if !p2p::PREAMBLE_LENGTH_RANGE.contains(&len) {
            return Err(DeviceError::OutOfRange);
        }
        self.send(Command::PreambleLength(len))
    }

    /// Set the sync word
    pub fn set_sync_word(&mut self, word: u16) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::SyncWord(word))
    }

    /// Enable or disable payload encryption
    pub fn set_encryption(&mut self, enabled: bool) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::Encryption(enabled))
    }

    /// Set the 16 hex digit encryption key
    pub fn set_encryption_key(&mut self, key: &str) -> Result<(), DeviceError<C::Error>> {
        check_key(key, p2p::ENCRYPTION_KEY_LEN)?;
        self.send(Command::EncryptionKey(key))
    }

    /// Enable or disable P2P crypto
    pub fn set_crypto(&mut self, enabled: bool) -> Result<(), DeviceError<C::Error>> {
        self.send(Command::Crypto(enabled))
    }

    /// Set the 8 hex digit P2P crypto key
    pub fn set_crypto_key(&mut self, key: &str) -> Result<(), DeviceError<C::Error>> {
        check_key(key, p2p::CRYPTO_KEY_LEN)?;
        self.send(Command::CryptoKey(key))
    }

    /// Set the 16 hex digit crypto IV
    pub fn set_crypto_iv(&mut self, iv: &str) -> Result<(), DeviceError<C::Error>> {
        check_key(iv, p2p::ENCRYPTION_KEY_LEN)?;
        self.send(Command::CryptoIv(iv))
    }

    /// Set the FSK bit rate, 600-300000 bit/s
    pub fn set_fsk_bit_rate(&mut self, rate: u32) -> Result<(), DeviceError<C::Error>> {
        if !p2p::FSK_BIT_RATE_RANGE.contains(&rate) {
            return Err(DeviceError::OutOfRange);
        }
        self.send(Command::FskBitRate(rate))
    }

    /// Set the FSK frequency deviation, 600-200000 Hz
    pub fn set_fsk_deviation(&mut self, deviation: u32) -> Result<(), DeviceError<C::Error>> {
        if !p2p::FSK_DEVIATION_RANGE.contains(&deviation) {
            return Err(DeviceError::OutOfRange);
        }
        self.send(Command::FskDeviation(deviation))
    }

    /// Frequency as reported by the module
    pub fn get_frequency(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::Frequency)
    }

    /// Spreading factor as reported by the module
    pub fn get_spreading_factor(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::SpreadingFactor)
    }

    /// Bandwidth in kHz, or [`UNMAPPED_CODE`](p2p::UNMAPPED_CODE) for an unknown code
    pub fn get_bandwidth(&mut self) -> Result<&'static str, DeviceError<C::Error>> {
        let code = self.query(Parameter::Bandwidth)?;
        Ok(p2p::bandwidth_label(&code))
    }

    /// Coding rate as a ratio, or [`UNMAPPED_CODE`](p2p::UNMAPPED_CODE) for an unknown code
    pub fn get_coding_rate(&mut self) -> Result<&'static str, DeviceError<C::Error>> {
        let code = self.query(Parameter::CodingRate)?;
        Ok(p2p::coding_rate_label(&code))
    }

    /// Output power as reported by the module
    pub fn get_tx_power(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::TxPower)
    }

    /// Preamble length as reported by the module
    pub fn get_preamble_length(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::PreambleLength)
    }

    /// Sync word as reported by the module
    pub fn get_sync_word(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::SyncWord)
    }

    /// Encryption state as reported by the module
    pub fn get_encryption(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::Encryption)
    }

    /// Encryption key as reported by the module
    pub fn get_encryption_key(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::EncryptionKey)
    }

    /// P2P crypto state as reported by the module
    pub fn get_crypto(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::Crypto)
    }

    /// P2P crypto key as reported by the module
    pub fn get_crypto_key(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::CryptoKey)
    }

    /// Crypto IV as reported by the module
    pub fn get_crypto_iv(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::CryptoIv)
    }

    /// FSK bit rate as reported by the module
    pub fn get_fsk_bit_rate(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::FskBitRate)
    }

    /// FSK frequency deviation as reported by the module
    pub fn get_fsk_deviation(&mut self) -> Result<Response, DeviceError<C::Error>> {
        self.query(Parameter::FskDeviation)
    }

    /// Transmit `payload`, returning the number of payload bytes sent
    pub fn write(&mut self, payload: &[u8]) -> Result<usize, DeviceError<C::Error>> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(DeviceError::PayloadTooLarge);
        }
        self.send(Command::Send(payload))?;
        Ok(payload.len())
    }

    /// Transmit the bytes of `text`, returning its length
    pub fn print(&mut self, text: &str) -> Result<usize, DeviceError<C::Error>> {
        self.write(text.as_bytes())
    }

    /// Read one line from the module and process it
    ///
    /// Blocks until a line arrives. Received packets are queued; other
    /// events are reported in the returned [`Update`] and counted in
    /// [`stats`](Self::stats). A channel error such as an overlong line is
    /// returned as is; the next call reads the following line.
    pub fn update(&mut self) -> Result<Update, DeviceError<C::Error>> {
        self.channel
            .read_line(&mut self.line)
            .map_err(DeviceError::Channel)?;
        debug!("< {}", self.line.as_str());

        let update = match event::parse(&self.line) {
            Ok(Event::Frame(frame)) => self.enqueue(frame),
            Ok(Event::ReceiveError) => {
                self.stats.rx_errors = self.stats.rx_errors.wrapping_add(1);
                Update::ReceiveError
            }
            Ok(Event::ReceiveTimeout) => {
                self.stats.rx_timeouts = self.stats.rx_timeouts.wrapping_add(1);
                Update::ReceiveTimeout
            }
            Ok(Event::TransmitDone) => {
                self.stats.tx_done = self.stats.tx_done.wrapping_add(1);
                Update::TransmitDone
            }
            Ok(Event::Unrecognized) => {
                self.stats.ignored = self.stats.ignored.wrapping_add(1);
                Update::Ignored
            }
            Err(error) => {
                warn!("malformed receive event dropped: {}", error);
                self.stats.malformed = self.stats.malformed.wrapping_add(1);
                Update::Malformed(error)
            }
        };
        Ok(update)
    }

    fn enqueue(&mut self, frame: Frame) -> Update {
        trace!("received {}", frame);
        match self.frames.push(frame) {
            PushOutcome::Queued => {
                self.stats.frames = self.stats.frames.wrapping_add(1);
                Update::Queued
            }
            PushOutcome::Evicted => {
                warn!("frame queue full, oldest frame evicted");
                self.stats.frames = self.stats.frames.wrapping_add(1);
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                Update::Evicted
            }
            PushOutcome::Rejected => {
                warn!("frame queue full, frame discarded");
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                Update::Overflow
            }
        }
    }

    /// Number of queued frames
    pub fn available(&self) -> usize {
        self.frames.len()
    }

    /// Copy of the queued frames, oldest first; the queue is not emptied
    pub fn read(&self) -> heapless::Vec<Frame, N> {
        self.frames.read()
    }

    /// Iterate over the queued frames, oldest first
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Remove and return the oldest queued frame
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Remove queued frames oldest first as the iterator is consumed
    pub fn drain(&mut self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.drain()
    }

    /// Drop every queued frame and flush the channel
    pub fn flush(&mut self) -> Result<(), DeviceError<C::Error>> {
        self.frames.clear();
        self.channel.flush().map_err(DeviceError::Channel)
    }

    /// Link activity counters
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Access the RF test commands
    pub fn rf_test(&mut self) -> RadioTest<'_, C> {
        RadioTest::new(&mut self.channel)
    }
}
