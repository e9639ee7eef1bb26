//! Driver and radio configuration
//!
//! This module contains:
//! - Driver settings (frame queue overflow, default receive window)
//! - Radio parameters and the range policy applied to each of them

/// Driver settings
pub mod device;

/// Radio parameters and range policies
pub mod p2p;

pub use device::DeviceConfig;
pub use p2p::{Bandwidth, P2pConfig};
