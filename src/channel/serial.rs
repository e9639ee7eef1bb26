//! [`CommandChannel`] over an `embedded-hal` serial port
//!
//! Commands are written as `\r\n` terminated lines. The module answers with
//! zero or more data lines followed by `OK` or one of its `AT_*` error codes.
//! Unsolicited `+EVT:` lines may be interleaved with an answer; they are held
//! back and handed out by [`read_line`](CommandChannel::read_line) before any
//! new input.

use embedded_hal::serial::{Read, Write};
use heapless::Deque;
use nb::block;

use super::{CommandChannel, Line, Response};
use crate::at::response::{ModuleError, Status};

/// Event lines held while commands are in flight
pub const PENDING_EVENTS: usize = 4;

/// Serial channel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Lines read while waiting for `OK` or an error before giving up
    pub max_response_lines: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_response_lines: 16,
        }
    }
}

/// Serial channel error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError<E> {
    /// Serial peripheral error
    Serial(E),
    /// The module refused the command
    Module(ModuleError),
    /// A line did not fit its buffer; it was discarded
    LineTooLong,
    /// No terminal status within the configured number of lines
    NoResponse,
}

/// Line-oriented AT transport on top of a serial port
pub struct SerialChannel<S> {
    serial: S,
    config: ChannelConfig,
    scratch: Line,
    pending: Deque<Line, PENDING_EVENTS>,
    lost_events: u32,
    // The status of an abandoned command is still to come
    stale: bool,
}

impl<S> SerialChannel<S> {
    /// Create a channel with default settings
    pub fn new(serial: S) -> Self {
        Self::with_config(serial, ChannelConfig::default())
    }

    /// Create a channel with explicit settings
    pub fn with_config(serial: S, config: ChannelConfig) -> Self {
        Self {
            serial,
            config,
            scratch: Line::new(),
            pending: Deque::new(),
            lost_events: 0,
            stale: false,
        }
    }

    /// Settings in use
    pub fn config(&self) -> ChannelConfig {
        self.config
    }

    /// Event lines held back and not yet returned by `read_line`
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Event lines evicted because more than [`PENDING_EVENTS`] arrived
    /// during commands
    pub fn lost_events(&self) -> u32 {
        self.lost_events
    }

    /// Release the serial port
    pub fn release(self) -> S {
        self.serial
    }

    fn hold_event(&mut self) {
        if self.pending.is_full() {
            self.pending.pop_front();
            self.lost_events = self.lost_events.wrapping_add(1);
            warn!("pending event buffer full, oldest event dropped");
        }
        debug!("event held: {}", self.scratch.as_str());
        // Room was made above.
        let _ = self.pending.push_back(self.scratch.clone());
    }
}

impl<S, E> SerialChannel<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    fn write_line(&mut self, line: &str) -> Result<(), ChannelError<E>> {
        trace!("> {}", line);
        for &byte in line.as_bytes().iter().chain(b"\r\n") {
            block!(self.serial.write(byte)).map_err(ChannelError::Serial)?;
        }
        block!(Write::flush(&mut self.serial)).map_err(ChannelError::Serial)
    }

    /// Read the next line of an answer into the scratch buffer
    ///
    /// Overlong lines are skipped here; they can only be stray events.
    fn next_answer_line(&mut self) -> Result<Status, ChannelError<E>> {
        loop {
            match read_line_from(&mut self.serial, &mut self.scratch) {
                Ok(()) => return Ok(Status::of(&self.scratch)),
                Err(ChannelError::LineTooLong) => warn!("overlong line skipped"),
                Err(error) => return Err(error),
            }
        }
    }

    /// Consume the status of a command that was given up on
    fn resync(&mut self) -> Result<(), ChannelError<E>> {
        if !self.stale {
            return Ok(());
        }
        debug!("waiting for the status of an abandoned command");
        loop {
            match self.next_answer_line()? {
                Status::Ok | Status::Failed(_) => break,
                Status::Event => self.hold_event(),
                Status::Other => {}
            }
        }
        self.stale = false;
        Ok(())
    }

    /// Read the answer to `command` up to its terminal status
    ///
    /// Data lines are passed to `on_data`; events are held for `read_line`.
    fn finish<F>(&mut self, command: &str, mut on_data: F) -> Result<(), ChannelError<E>>
    where
        F: FnMut(&str),
    {
        for _ in 0..self.config.max_response_lines {
            let status = match self.next_answer_line() {
                Ok(status) => status,
                Err(error) => {
                    self.stale = true;
                    return Err(error);
                }
            };
            match status {
                Status::Ok => return Ok(()),
                Status::Failed(error) => {
                    warn!("{} refused: {}", command, error);
                    return Err(ChannelError::Module(error));
                }
                Status::Event => self.hold_event(),
                Status::Other => on_data(&self.scratch),
            }
        }
        self.stale = true;
        Err(ChannelError::NoResponse)
    }
}

impl<S, E> CommandChannel for SerialChannel<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    type Error = ChannelError<E>;

    fn send_command(&mut self, command: &str) -> Result<(), Self::Error> {
        self.resync()?;
        self.write_line(command)?;
        self.finish(command, |line| trace!("< {}", line))
    }

    fn get_command(&mut self, query: &str) -> Result<Response, Self::Error> {
        self.resync()?;
        self.write_line(query)?;
        // Answers may repeat the command: `AT+PSF=?` -> `AT+PSF=7`
        let echo = query.strip_suffix('?').unwrap_or(query);
        let mut data = Response::new();
        let mut overflow = false;
        self.finish(query, |line| {
            if line.is_empty() || line == query {
                return;
            }
            let value = line.strip_prefix(echo).unwrap_or(line);
            data.clear();
            if data.push_str(value).is_err() {
                overflow = true;
            }
        })?;
        if overflow {
            warn!("{} answer too long", query);
            return Err(ChannelError::LineTooLong);
        }
        Ok(data)
    }

    fn transmit(&mut self, command: &str) -> Result<(), Self::Error> {
        self.write_line(command)
    }

    fn read_line(&mut self, line: &mut Line) -> Result<(), Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            *line = event;
            return Ok(());
        }
        read_line_from(&mut self.serial, line)
    }

    /// Also forgets held events and any status still owed by the module
    fn flush(&mut self) -> Result<(), Self::Error> {
        block!(Write::flush(&mut self.serial)).map_err(ChannelError::Serial)?;
        let mut discarded = 0usize;
        loop {
            match self.serial.read() {
                Ok(_) => discarded += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(error)) => return Err(ChannelError::Serial(error)),
            }
        }
        if discarded > 0 {
            debug!("flush discarded {} bytes", discarded);
        }
        self.pending.clear();
        self.stale = false;
        Ok(())
    }
}

/// Blocking read of one `\n` terminated line
///
/// On overflow the rest of the line is consumed so the next read starts on a
/// line boundary.
fn read_line_from<S, E>(serial: &mut S, line: &mut Line) -> Result<(), ChannelError<E>>
where
    S: Read<u8, Error = E>,
{
    line.clear();
    let mut overflow = false;
    loop {
        let byte = block!(serial.read()).map_err(ChannelError::Serial)?;
        if byte == b'\n' {
            break;
        }
        if !overflow && line.push(char::from(byte)).is_err() {
            overflow = true;
        }
    }
    if overflow {
        line.clear();
        return Err(ChannelError::LineTooLong);
    }

    let trimmed = line.trim();
    if trimmed.len() != line.len() {
        let mut copy = Line::new();
        // Trimmed text is a slice of the line, so it fits.
        let _ = copy.push_str(trimmed);
        *line = copy;
    }
    Ok(())
}
