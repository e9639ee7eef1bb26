use core::ops::RangeInclusive;

/// Spreading factors accepted by the module (SF6-SF12)
pub const SPREADING_FACTOR_RANGE: RangeInclusive<u8> = 6..=12;
/// Coding rate indices (0 = 4/5 ... 3 = 4/8)
pub const CODING_RATE_RANGE: RangeInclusive<u8> = 0..=3;
/// Output power in dBm
pub const TX_POWER_RANGE: RangeInclusive<u8> = 5..=22;
/// Preamble length in symbols
pub const PREAMBLE_LENGTH_RANGE: RangeInclusive<u16> = 2..=u16::MAX;
/// FSK bit rate in bit/s
pub const FSK_BIT_RATE_RANGE: RangeInclusive<u32> = 600..=300_000;
/// FSK frequency deviation in Hz
pub const FSK_DEVIATION_RANGE: RangeInclusive<u32> = 600..=200_000;

/// Length of the `ENCKEY` encryption key and the `CRYPIV` vector
pub const ENCRYPTION_KEY_LEN: usize = 16;
/// Length of the `PKEY` P2P crypto key
pub const CRYPTO_KEY_LEN: usize = 8;

/// Returned by the code tables when the module reports an unknown code
pub const UNMAPPED_CODE: &str = "error";

/// LoRa bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    /// 125 kHz
    Khz125,
    /// 250 kHz
    Khz250,
    /// 500 kHz
    Khz500,
}

impl Bandwidth {
    /// Snap an arbitrary kHz value to the nearest supported bandwidth
    pub fn from_khz(khz: u16) -> Self {
        match khz {
            0..=187 => Bandwidth::Khz125,
            188..=375 => Bandwidth::Khz250,
            _ => Bandwidth::Khz500,
        }
    }

    /// Bandwidth in kHz, as sent on the wire
    pub fn khz(self) -> u16 {
        match self {
            Bandwidth::Khz125 => 125,
            Bandwidth::Khz250 => 250,
            Bandwidth::Khz500 => 500,
        }
    }

    /// Look up the module's bandwidth code (`0`, `1`, `2`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Bandwidth::Khz125),
            "1" => Some(Bandwidth::Khz250),
            "2" => Some(Bandwidth::Khz500),
            _ => None,
        }
    }

    /// Human readable kHz value
    pub fn label(self) -> &'static str {
        match self {
            Bandwidth::Khz125 => "125",
            Bandwidth::Khz250 => "250",
            Bandwidth::Khz500 => "500",
        }
    }
}

/// Clamp a spreading factor into [`SPREADING_FACTOR_RANGE`]
pub fn clamp_spreading_factor(sf: u8) -> u8 {
    sf.clamp(*SPREADING_FACTOR_RANGE.start(), *SPREADING_FACTOR_RANGE.end())
}

/// Clamp a coding rate index into [`CODING_RATE_RANGE`]
pub fn clamp_coding_rate(cr: u8) -> u8 {
    cr.clamp(*CODING_RATE_RANGE.start(), *CODING_RATE_RANGE.end())
}

/// Map a bandwidth code to its kHz label, or [`UNMAPPED_CODE`]
pub fn bandwidth_label(code: &str) -> &'static str {
    Bandwidth::from_code(code.trim()).map_or(UNMAPPED_CODE, Bandwidth::label)
}

/// Map a coding rate code to its ratio label, or [`UNMAPPED_CODE`]
pub fn coding_rate_label(code: &str) -> &'static str {
    match code.trim() {
        "0" => "4/5",
        "1" => "4/6",
        "2" => "4/7",
        "3" => "4/8",
        _ => UNMAPPED_CODE,
    }
}

/// Key material must have the exact length and consist of hex digits
pub fn is_valid_key(key: &str, len: usize) -> bool {
    key.len() == len && key.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Radio parameters sent together with `AT+P2P`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct P2pConfig {
    /// Carrier frequency in Hz
    pub frequency: u32,
    /// Spreading factor (6-12)
    pub spreading_factor: u8,
    /// Bandwidth
    pub bandwidth: Bandwidth,
    /// Coding rate index (0-3)
    pub coding_rate: u8,
    /// Preamble length in symbols
    pub preamble_length: u16,
    /// Output power in dBm
    pub tx_power: u8,
}

impl P2pConfig {
    /// Create a configuration with the module defaults for everything but the frequency
    pub fn new(frequency: u32) -> Self {
        Self {
            frequency,
            spreading_factor: 7,
            bandwidth: Bandwidth::Khz125,
            coding_rate: 0,
            preamble_length: 8,
            tx_power: 14,
        }
    }

    /// Set the spreading factor
    pub fn with_spreading_factor(mut self, sf: u8) -> Self {
        self.spreading_factor = sf;
        self
    }

    /// Set the bandwidth
    pub fn with_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Set the coding rate index
    pub fn with_coding_rate(mut self, cr: u8) -> Self {
        self.coding_rate = cr;
        self
    }

    /// Set the preamble length
    pub fn with_preamble_length(mut self, len: u16) -> Self {
        self.preamble_length = len;
        self
    }

    /// Set the output power
    pub fn with_tx_power(mut self, power: u8) -> Self {
        self.tx_power = power;
        self
    }

    /// Apply the range policy of each field
    ///
    /// Spreading factor and coding rate are clamped. Returns `None` when the
    /// power or preamble length is out of range.
    pub fn normalized(&self) -> Option<Self> {
        if !TX_POWER_RANGE.contains(&self.tx_power)
            || !PREAMBLE_LENGTH_RANGE.contains(&self.preamble_length)
        {
            return None;
        }
        Some(Self {
            spreading_factor: clamp_spreading_factor(self.spreading_factor),
            coding_rate: clamp_coding_rate(self.coding_rate),
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandwidth_snaps_to_nearest() {
        assert_eq!(Bandwidth::from_khz(0), Bandwidth::Khz125);
        assert_eq!(Bandwidth::from_khz(125), Bandwidth::Khz125);
        assert_eq!(Bandwidth::from_khz(200), Bandwidth::Khz250);
        assert_eq!(Bandwidth::from_khz(300), Bandwidth::Khz250);
        assert_eq!(Bandwidth::from_khz(400), Bandwidth::Khz500);
        assert_eq!(Bandwidth::from_khz(u16::MAX), Bandwidth::Khz500);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_spreading_factor(0), 6);
        assert_eq!(clamp_spreading_factor(9), 9);
        assert_eq!(clamp_spreading_factor(20), 12);
        assert_eq!(clamp_coding_rate(7), 3);
    }

    #[test]
    fn test_code_tables() {
        assert_eq!(bandwidth_label("0"), "125");
        assert_eq!(bandwidth_label("1"), "250");
        assert_eq!(bandwidth_label("2"), "500");
        assert_eq!(bandwidth_label("3"), UNMAPPED_CODE);
        assert_eq!(coding_rate_label("0"), "4/5");
        assert_eq!(coding_rate_label("3"), "4/8");
        assert_eq!(coding_rate_label(""), UNMAPPED_CODE);
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid_key("0123456789ABCDEF", ENCRYPTION_KEY_LEN));
        assert!(is_valid_key("0a1b2c3d", CRYPTO_KEY_LEN));
        assert!(!is_valid_key("short", ENCRYPTION_KEY_LEN));
        assert!(!is_valid_key("0123456789ABCDEFG", ENCRYPTION_KEY_LEN));
        assert!(!is_valid_key("0123456789ABCDEZ", ENCRYPTION_KEY_LEN));
    }

    #[test]
    fn test_normalized_config() {
        let config = P2pConfig::new(868_000_000)
            .with_spreading_factor(15)
            .with_coding_rate(9);
        let normalized = config.normalized().unwrap();
        assert_eq!(normalized.spreading_factor, 12);
        assert_eq!(normalized.coding_rate, 3);
        assert_eq!(normalized.frequency, 868_000_000);

        assert!(config.with_tx_power(30).normalized().is_none());
        assert!(config.with_preamble_length(1).normalized().is_none());
    }
}
