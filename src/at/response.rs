/// Line that terminates a successful command
pub const OK: &str = "OK";

/// Error codes reported by the module in place of `OK`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleError {
    /// Generic error (`AT_ERROR`)
    Error,
    /// Parameter rejected (`AT_PARAM_ERROR`)
    ParamError,
    /// Module busy (`AT_BUSY_ERROR`)
    Busy,
    /// Test parameter overflow (`AT_TEST_PARAM_OVERFLOW`)
    TestParamOverflow,
    /// Class B not enabled (`AT_NO_CLASSB_ENABLE`)
    NoClassB,
    /// Network not joined (`AT_NO_NETWORK_JOINED`)
    NoNetworkJoined,
    /// Receive error (`AT_RX_ERROR`)
    RxError,
    /// Command not supported in the current work mode (`AT_MODE_NO_SUPPORT`)
    ModeNotSupported,
}

impl ModuleError {
    /// Parse an error status line
    pub fn from_line(line: &str) -> Option<Self> {
        match line {
            "AT_ERROR" => Some(ModuleError::Error),
            "AT_PARAM_ERROR" => Some(ModuleError::ParamError),
            "AT_BUSY_ERROR" => Some(ModuleError::Busy),
            "AT_TEST_PARAM_OVERFLOW" => Some(ModuleError::TestParamOverflow),
            "AT_NO_CLASSB_ENABLE" => Some(ModuleError::NoClassB),
            "AT_NO_NETWORK_JOINED" => Some(ModuleError::NoNetworkJoined),
            "AT_RX_ERROR" => Some(ModuleError::RxError),
            "AT_MODE_NO_SUPPORT" => Some(ModuleError::ModeNotSupported),
            _ => None,
        }
    }
}

/// Classification of one line read while a command is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Command accepted
    Ok,
    /// Command refused
    Failed(ModuleError),
    /// Unsolicited event interleaved with the response
    Event,
    /// Anything else: data, echo, blank line
    Other,
}

impl Status {
    /// Classify a trimmed line
    pub fn of(line: &str) -> Self {
        if line == OK {
            Status::Ok
        } else if let Some(error) = ModuleError::from_line(line) {
            Status::Failed(error)
        } else if line.starts_with("+EVT:") {
            Status::Event
        } else {
            Status::Other
        }
    }
}
