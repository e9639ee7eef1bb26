//! AT protocol layer
//!
//! This module contains the text protocol spoken by the module:
//! - Command lines sent by the host (`AT+<KEYWORD>=<args>`)
//! - Terminal status lines answering a command (`OK`, `AT_ERROR`, ...)
//! - Unsolicited event lines (`+EVT:RXP2P:...`, `+EVT:TXP2P DONE`)

/// Command line construction
pub mod command;

/// Unsolicited event parsing
pub mod event;

/// Command status classification
pub mod response;

pub use command::{Command, CommandLine, Parameter};
pub use event::{Event, ParseError};
pub use response::{ModuleError, Status};
