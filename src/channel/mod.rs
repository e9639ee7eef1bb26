//! Line transport between the host and the module

pub mod serial;

pub use serial::{ChannelConfig, ChannelError, SerialChannel, PENDING_EVENTS};

use heapless::String;

use crate::codec::MAX_ENCODED_SIZE;

/// Longest line read from the module: a receive event with a maximum payload
pub const LINE_CAPACITY: usize = MAX_ENCODED_SIZE + 32;

/// Longest data response returned by a query
pub const RESPONSE_CAPACITY: usize = 64;

/// One line read from the module, without terminator
pub type Line = String<LINE_CAPACITY>;

/// Data returned by a query
pub type Response = String<RESPONSE_CAPACITY>;

/// Command transport used by the driver
///
/// At most one command is in flight: every method blocks until the module
/// has answered or the transport gives up.
pub trait CommandChannel {
    /// Error type for transport operations, including refused commands
    type Error;

    /// Send a command and wait for its terminal status
    ///
    /// `Ok` iff the module reported success.
    fn send_command(&mut self, command: &str) -> Result<(), Self::Error>;

    /// Send a query and return the data line of the answer
    fn get_command(&mut self, query: &str) -> Result<Response, Self::Error>;

    /// Send a line without waiting for any answer
    fn transmit(&mut self, command: &str) -> Result<(), Self::Error>;

    /// Block until one line has been read into `line`
    ///
    /// The line is trimmed of its terminator and surrounding whitespace.
    fn read_line(&mut self, line: &mut Line) -> Result<(), Self::Error>;

    /// Drain pending output and discard buffered input
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: CommandChannel + ?Sized> CommandChannel for &mut T {
    type Error = T::Error;

    fn send_command(&mut self, command: &str) -> Result<(), Self::Error> {
        (**self).send_command(command)
    }

    fn get_command(&mut self, query: &str) -> Result<Response, Self::Error> {
        (**self).get_command(query)
    }

    fn transmit(&mut self, command: &str) -> Result<(), Self::Error> {
        (**self).transmit(command)
    }

    fn read_line(&mut self, line: &mut Line) -> Result<(), Self::Error> {
        (**self).read_line(line)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}
