//! Transmit/receive mode bookkeeping
//!
//! The module's receive window is driven by `AT+PRECV=<value>`. Three values
//! are reserved by the firmware; every other value is a window length in
//! milliseconds.

/// `PRECV` value that closes the receive window
pub const RECEIVE_STOP: u16 = 0;
/// `PRECV` value that keeps receiving while still allowing transmissions
pub const RECEIVE_WITH_TRANSMIT: u16 = 65533;
/// `PRECV` value that receives until the first packet arrives
pub const RECEIVE_UNTIL_PACKET: u16 = 65534;
/// `PRECV` value for continuous reception
pub const RECEIVE_CONTINUOUS: u16 = 65535;

/// Point-to-point operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Transmit only, receiver off
    Transmit,
    /// Receive only
    Receive,
    /// Receiver on, transmissions allowed
    TransmitReceive,
}

impl Mode {
    /// `PRECV` argument that enters this mode
    ///
    /// `timeout` only applies to [`Mode::Receive`]. A zero timeout stops the
    /// receiver at protocol level.
    pub fn receive_window(self, timeout: u16) -> u16 {
        match self {
            Mode::Transmit => RECEIVE_STOP,
            Mode::Receive => timeout,
            Mode::TransmitReceive => RECEIVE_WITH_TRANSMIT,
        }
    }
}

/// Current mode as last acknowledged by the module
///
/// Undefined until the first successful transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeState {
    current: Option<Mode>,
}

impl ModeState {
    /// Create a state with no mode established
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Last acknowledged mode
    pub fn current(&self) -> Option<Mode> {
        self.current
    }

    /// Record a transition the module has acknowledged
    pub fn commit(&mut self, mode: Mode) {
        self.current = Some(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_windows() {
        assert_eq!(Mode::Transmit.receive_window(1234), RECEIVE_STOP);
        assert_eq!(Mode::Receive.receive_window(1234), 1234);
        assert_eq!(Mode::Receive.receive_window(0), RECEIVE_STOP);
        assert_eq!(
            Mode::TransmitReceive.receive_window(0),
            RECEIVE_WITH_TRANSMIT
        );
    }

    #[test]
    fn test_state_starts_undefined() {
        let mut state = ModeState::new();
        assert_eq!(state.current(), None);
        state.commit(Mode::Receive);
        assert_eq!(state.current(), Some(Mode::Receive));
    }
}
