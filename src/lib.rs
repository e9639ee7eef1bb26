//! RAK3172 LoRa point-to-point driver in Rust
//!
//! This crate drives a RAK3172 module over its UART AT command interface in
//! LoRa point-to-point (P2P) mode. It configures the radio, transmits
//! payloads and turns the module's receive events into a bounded queue of
//! frames. The module runs the radio stack and payload encryption itself.
//!
//! # Features
//! - Radio parameters with per-parameter range checks
//! - Transmit, receive and transmit-receive modes
//! - Bounded received frame queue with a selectable overflow policy
//! - RF test and certification commands
//! - Generic over any `embedded-hal` serial port
//! - Optional `defmt` logging
//! - No unsafe code
//!
//! # Example
//! ```no_run
//! use embedded_hal::blocking::delay::DelayMs;
//! use embedded_hal::serial::{Read, Write};
//! use rak3172::{
//!     channel::{ChannelError, SerialChannel},
//!     config::P2pConfig,
//!     device::{DeviceError, P2pDevice, Update},
//!     mode::Mode,
//! };
//!
//! fn run<S, E, D>(serial: S, delay: &mut D) -> Result<(), DeviceError<ChannelError<E>>>
//! where
//!     S: Read<u8, Error = E> + Write<u8, Error = E>,
//!     D: DelayMs<u32>,
//! {
//!     let mut device: P2pDevice<_> = P2pDevice::new(SerialChannel::new(serial));
//!     device.init(delay)?;
//!
//!     // 868 MHz, SF9
//!     device.configure(&P2pConfig::new(868_000_000).with_spreading_factor(9))?;
//!     device.set_mode(Mode::TransmitReceive)?;
//!     device.write(b"Hello")?;
//!
//!     loop {
//!         if matches!(device.update()?, Update::Queued | Update::Evicted) {
//!             while let Some(frame) = device.pop() {
//!                 let _ = (frame.rssi(), frame.payload());
//!             }
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

/// AT command set
pub mod at;

/// Transport to the module
pub mod channel;

/// Hex payload encoding
pub mod codec;

/// Driver and radio configuration
pub mod config;

/// High-level device interface
pub mod device;

/// Received frames and their queue
pub mod frame;

/// Transmit/receive mode
pub mod mode;

/// RF test commands
pub mod rf;

pub use device::{DeviceError, P2pDevice};
