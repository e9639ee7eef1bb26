#![allow(dead_code)]

use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial::{Read, Write};
use rak3172::channel::{CommandChannel, Line, Response};

/// Mock channel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Scripted transport failure
    Transport,
    /// Query issued with no scripted answer
    NoResponse,
    /// No scripted line left to read
    Eof,
}

/// Mock command channel for testing
///
/// Commands are recorded and answered from scripts; an empty send script
/// acknowledges every command.
#[derive(Default)]
pub struct MockChannel {
    sent: Vec<String>,
    transmitted: Vec<String>,
    queries: Vec<String>,
    send_results: VecDeque<Result<(), MockError>>,
    responses: VecDeque<String>,
    lines: VecDeque<String>,
    flushes: usize,
}

impl MockChannel {
    /// Create new mock channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `send_command` fail
    pub fn fail_next(&mut self, error: MockError) {
        self.send_results.push_back(Err(error));
    }

    /// Queue the data answered to the next query
    pub fn push_response(&mut self, response: &str) {
        self.responses.push_back(response.to_string());
    }

    /// Queue a line returned by `read_line`
    pub fn push_line(&mut self, line: &str) {
        self.lines.push_back(line.to_string());
    }

    /// Commands sent with `send_command`, in order
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Last command sent with `send_command`
    pub fn last_sent(&self) -> Option<&str> {
        self.sent.last().map(|s| s.as_str())
    }

    /// Lines written with `transmit`
    pub fn transmitted(&self) -> &[String] {
        &self.transmitted
    }

    /// Queries issued with `get_command`
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Number of `flush` calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Forget recorded commands
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl CommandChannel for MockChannel {
    type Error = MockError;

    fn send_command(&mut self, command: &str) -> Result<(), Self::Error> {
        self.sent.push(command.to_string());
        self.send_results.pop_front().unwrap_or(Ok(()))
    }

    fn get_command(&mut self, query: &str) -> Result<Response, Self::Error> {
        self.queries.push(query.to_string());
        let answer = self.responses.pop_front().ok_or(MockError::NoResponse)?;
        let mut response = Response::new();
        response.push_str(&answer).unwrap();
        Ok(response)
    }

    fn transmit(&mut self, command: &str) -> Result<(), Self::Error> {
        self.transmitted.push(command.to_string());
        Ok(())
    }

    fn read_line(&mut self, line: &mut Line) -> Result<(), Self::Error> {
        let next = self.lines.pop_front().ok_or(MockError::Eof)?;
        line.clear();
        line.push_str(&next).unwrap();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Delay that only records the requested time
#[derive(Default)]
pub struct MockDelay {
    /// Total milliseconds requested
    pub elapsed_ms: u32,
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += ms;
    }
}

/// Mock serial port replaying scripted input
#[derive(Default)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl MockSerial {
    /// Create a port that will return `input` byte by byte
    pub fn with_input(input: &str) -> Self {
        Self {
            rx: input.bytes().collect(),
            tx: Vec::new(),
        }
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }
}

impl Read<u8> for MockSerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl Write<u8> for MockSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
