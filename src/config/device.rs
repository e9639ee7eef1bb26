use crate::frame::OverflowPolicy;
use crate::mode::RECEIVE_CONTINUOUS;

/// Driver-side settings; nothing here is sent to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// What happens to a received frame when the queue is full
    pub overflow: OverflowPolicy,
    /// Receive window used by [`set_mode`](crate::device::P2pDevice::set_mode)
    pub receive_timeout: u16,
}

impl DeviceConfig {
    /// Create a configuration with an explicit overflow policy
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self {
            overflow,
            ..Self::default()
        }
    }

    /// Set the default receive window
    pub fn with_receive_timeout(mut self, timeout: u16) -> Self {
        self.receive_timeout = timeout;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::DropOldest,
            receive_timeout: RECEIVE_CONTINUOUS,
        }
    }
}
