use core::fmt::{self, Display, Write};

use heapless::String;

use crate::codec::{self, MAX_ENCODED_SIZE};
use crate::config::p2p::{Bandwidth, P2pConfig};
use crate::rf::{Hopping, TestConfig};

/// Longest command line the driver builds: a maximum-size `AT+PSEND`
pub const MAX_COMMAND_LEN: usize = "AT+PSEND=".len() + MAX_ENCODED_SIZE;

/// Buffer holding one command line, without terminator
pub type CommandLine = String<MAX_COMMAND_LEN>;

/// `AT+NWM` argument selecting point-to-point mode
pub const NETWORK_MODE_P2P: u8 = 0;

/// Configurable module parameters and their AT keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    /// `PFREQ`, frequency in Hz
    Frequency,
    /// `PSF`, spreading factor
    SpreadingFactor,
    /// `PBW`, bandwidth
    Bandwidth,
    /// `PCR`, coding rate
    CodingRate,
    /// `PTP`, output power
    TxPower,
    /// `PPL`, preamble length
    PreambleLength,
    /// `SYNCWORD`
    SyncWord,
    /// `ENCRY`, encryption enable
    Encryption,
    /// `ENCKEY`, encryption key
    EncryptionKey,
    /// `PCRYPT`, P2P crypto enable
    Crypto,
    /// `PKEY`, P2P crypto key
    CryptoKey,
    /// `CRYPIV`, crypto initialisation vector
    CryptoIv,
    /// `PBR`, FSK bit rate
    FskBitRate,
    /// `PFDEV`, FSK frequency deviation
    FskDeviation,
    /// `NWM`, network work mode
    NetworkMode,
    /// `P2P`, combined radio parameters
    P2p,
    /// `PRECV`, receive window
    ReceiveWindow,
    /// `PSEND`, payload transmission
    Send,
}

impl Parameter {
    /// Keyword following `AT+`
    pub const fn keyword(self) -> &'static str {
        match self {
            Parameter::Frequency => "PFREQ",
            Parameter::SpreadingFactor => "PSF",
            Parameter::Bandwidth => "PBW",
            Parameter::CodingRate => "PCR",
            Parameter::TxPower => "PTP",
            Parameter::PreambleLength => "PPL",
            Parameter::SyncWord => "SYNCWORD",
            Parameter::Encryption => "ENCRY",
            Parameter::EncryptionKey => "ENCKEY",
            Parameter::Crypto => "PCRYPT",
            Parameter::CryptoKey => "PKEY",
            Parameter::CryptoIv => "CRYPIV",
            Parameter::FskBitRate => "PBR",
            Parameter::FskDeviation => "PFDEV",
            Parameter::NetworkMode => "NWM",
            Parameter::P2p => "P2P",
            Parameter::ReceiveWindow => "PRECV",
            Parameter::Send => "PSEND",
        }
    }

    /// Query line `AT+<KEYWORD>=?`
    pub fn query(self) -> CommandLine {
        let mut line = CommandLine::new();
        // Longest keyword plus framing is far below the capacity.
        let _ = write!(line, "AT+{}=?", self.keyword());
        line
    }
}

/// Host to module command
///
/// Values are rendered as given; range policies are applied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AT`, liveness check
    Attention,
    /// `ATZ`, reboot
    Reset,
    /// `AT+NWM=<mode>`
    NetworkMode(u8),
    /// `AT+P2P=<freq>:<sf>:<bw>:<cr>:<preamble>:<power>`
    P2p(P2pConfig),
    /// `AT+PRECV=<window>`
    ReceiveWindow(u16),
    /// `AT+PFREQ=<hz>`
    Frequency(u32),
    /// `AT+PSF=<sf>`
    SpreadingFactor(u8),
    /// `AT+PBW=<khz>`
    Bandwidth(Bandwidth),
    /// `AT+PCR=<cr>`
    CodingRate(u8),
    /// `AT+PTP=<dbm>`
    TxPower(u8),
    /// `AT+PPL=<symbols>`
    PreambleLength(u16),
    /// `AT+SYNCWORD=<4 hex digits>`
    SyncWord(u16),
    /// `AT+ENCRY=<0|1>`
    Encryption(bool),
    /// `AT+ENCKEY=<key>`
    EncryptionKey(&'a str),
    /// `AT+PCRYPT=<0|1>`
    Crypto(bool),
    /// `AT+PKEY=<key>`
    CryptoKey(&'a str),
    /// `AT+CRYPIV=<iv>`
    CryptoIv(&'a str),
    /// `AT+PBR=<bit/s>`
    FskBitRate(u32),
    /// `AT+PFDEV=<hz>`
    FskDeviation(u32),
    /// `AT+PSEND=<hex payload>`
    Send(&'a [u8]),
    /// `AT+TRSSI?`
    RssiTest,
    /// `AT+TTONE`
    ToneTest,
    /// `AT+TTX=<packets>`
    TxTest(u16),
    /// `AT+TRX=<packets>`
    RxTest(u16),
    /// `AT+TCONF=...`
    TestConfig(TestConfig),
    /// `AT+TTH=<start>:<stop>:<step>:<count>`
    FrequencyHopping(Hopping),
    /// `AT+TRTH=<start>:<stop>:<step>:<count>`
    RandomFrequencyHopping(Hopping),
    /// `AT+TOFF?`
    TestOff,
    /// `AT+CERTIF?`
    Certification,
    /// `AT+CW=<freq>:<power>:<duration>`
    ContinuousWave {
        /// Frequency in Hz
        frequency: u32,
        /// Output power in dBm
        tx_power: u8,
        /// Duration in seconds
        duration: u16,
    },
}

impl<'a> Command<'a> {
    /// Render the command line into `out`
    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        match *self {
            Command::Attention => out.write_str("AT"),
            Command::Reset => out.write_str("ATZ"),
            Command::NetworkMode(mode) => set(out, Parameter::NetworkMode, mode),
            Command::P2p(config) => write!(
                out,
                "AT+{}={}:{}:{}:{}:{}:{}",
                Parameter::P2p.keyword(),
                config.frequency,
                config.spreading_factor,
                config.bandwidth.khz(),
                config.coding_rate,
                config.preamble_length,
                config.tx_power
            ),
            Command::ReceiveWindow(window) => set(out, Parameter::ReceiveWindow, window),
            Command::Frequency(hz) => set(out, Parameter::Frequency, hz),
            Command::SpreadingFactor(sf) => set(out, Parameter::SpreadingFactor, sf),
            Command::Bandwidth(bw) => set(out, Parameter::Bandwidth, bw.khz()),
            Command::CodingRate(cr) => set(out, Parameter::CodingRate, cr),
            Command::TxPower(power) => set(out, Parameter::TxPower, power),
            Command::PreambleLength(len) => set(out, Parameter::PreambleLength, len),
            Command::SyncWord(word) => {
                write!(out, "AT+{}={:04X}", Parameter::SyncWord.keyword(), word)
            }
            Command::Encryption(enabled) => set(out, Parameter::Encryption, u8::from(enabled)),
            Command::EncryptionKey(key) => set(out, Parameter::EncryptionKey, key),
            Command::Crypto(enabled) => set(out, Parameter::Crypto, u8::from(enabled)),
            Command::CryptoKey(key) => set(out, Parameter::CryptoKey, key),
            Command::CryptoIv(iv) => set(out, Parameter::CryptoIv, iv),
            Command::FskBitRate(rate) => set(out, Parameter::FskBitRate, rate),
            Command::FskDeviation(hz) => set(out, Parameter::FskDeviation, hz),
            Command::Send(payload) => {
                write!(out, "AT+{}=", Parameter::Send.keyword())?;
                codec::encode_into(payload, out)
            }
            Command::RssiTest => out.write_str("AT+TRSSI?"),
            Command::ToneTest => out.write_str("AT+TTONE"),
            Command::TxTest(packets) => write!(out, "AT+TTX={}", packets),
            Command::RxTest(packets) => write!(out, "AT+TRX={}", packets),
            Command::TestConfig(config) => write!(
                out,
                "AT+TCONF={}:{}:{}:{}:{}:0:0:{}:{}:{}:0:0",
                config.frequency,
                config.tx_power,
                config.bandwidth.khz(),
                config.spreading_factor,
                config.coding_rate,
                config.modulation,
                config.preamble_length,
                config.fsk_deviation
            ),
            Command::FrequencyHopping(hop) => hopping(out, "TTH", &hop),
            Command::RandomFrequencyHopping(hop) => hopping(out, "TRTH", &hop),
            Command::TestOff => out.write_str("AT+TOFF?"),
            Command::Certification => out.write_str("AT+CERTIF?"),
            Command::ContinuousWave {
                frequency,
                tx_power,
                duration,
            } => write!(out, "AT+CW={}:{}:{}", frequency, tx_power, duration),
        }
    }

    /// Render the command into a fresh line buffer
    pub fn build(&self) -> Result<CommandLine, fmt::Error> {
        let mut line = CommandLine::new();
        self.write_to(&mut line)?;
        Ok(line)
    }
}

fn set<W: Write, V: Display>(out: &mut W, parameter: Parameter, value: V) -> fmt::Result {
    write!(out, "AT+{}={}", parameter.keyword(), value)
}

fn hopping<W: Write>(out: &mut W, keyword: &str, hop: &Hopping) -> fmt::Result {
    write!(
        out,
        "AT+{}={}:{}:{}:{}",
        keyword, hop.start, hop.stop, hop.step, hop.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_PAYLOAD_SIZE;

    fn line(command: Command) -> CommandLine {
        command.build().unwrap()
    }

    #[test]
    fn test_setters() {
        assert_eq!(line(Command::Frequency(868_000_000)), "AT+PFREQ=868000000");
        assert_eq!(line(Command::SpreadingFactor(12)), "AT+PSF=12");
        assert_eq!(line(Command::Bandwidth(Bandwidth::Khz250)), "AT+PBW=250");
        assert_eq!(line(Command::CodingRate(1)), "AT+PCR=1");
        assert_eq!(line(Command::TxPower(22)), "AT+PTP=22");
        assert_eq!(line(Command::PreambleLength(65535)), "AT+PPL=65535");
        assert_eq!(line(Command::FskBitRate(300_000)), "AT+PBR=300000");
        assert_eq!(line(Command::FskDeviation(600)), "AT+PFDEV=600");
        assert_eq!(line(Command::ReceiveWindow(65533)), "AT+PRECV=65533");
        assert_eq!(line(Command::NetworkMode(NETWORK_MODE_P2P)), "AT+NWM=0");
    }

    #[test]
    fn test_sync_word_is_four_hex_digits() {
        assert_eq!(line(Command::SyncWord(0x12)), "AT+SYNCWORD=0012");
        assert_eq!(line(Command::SyncWord(0)), "AT+SYNCWORD=0000");
        assert_eq!(line(Command::SyncWord(0xFFFF)), "AT+SYNCWORD=FFFF");
    }

    #[test]
    fn test_flags_and_keys() {
        assert_eq!(line(Command::Encryption(true)), "AT+ENCRY=1");
        assert_eq!(line(Command::Crypto(false)), "AT+PCRYPT=0");
        assert_eq!(
            line(Command::EncryptionKey("0123456789ABCDEF")),
            "AT+ENCKEY=0123456789ABCDEF"
        );
        assert_eq!(line(Command::CryptoKey("01234567")), "AT+PKEY=01234567");
        assert_eq!(
            line(Command::CryptoIv("FEDCBA9876543210")),
            "AT+CRYPIV=FEDCBA9876543210"
        );
    }

    #[test]
    fn test_p2p_config_line() {
        let config = P2pConfig::new(915_000_000)
            .with_spreading_factor(9)
            .with_bandwidth(Bandwidth::Khz500)
            .with_coding_rate(2)
            .with_preamble_length(12)
            .with_tx_power(20);
        assert_eq!(
            line(Command::P2p(config)),
            "AT+P2P=915000000:9:500:2:12:20"
        );
    }

    #[test]
    fn test_send_encodes_payload() {
        assert_eq!(line(Command::Send(b"Hello")), "AT+PSEND=48656C6C6F");
        assert_eq!(line(Command::Send(&[])), "AT+PSEND=");
    }

    #[test]
    fn test_max_payload_fits() {
        let payload = [0xABu8; MAX_PAYLOAD_SIZE];
        let built = line(Command::Send(&payload));
        assert_eq!(built.len(), MAX_COMMAND_LEN);
        assert!(built.ends_with("ABAB"));
    }

    #[test]
    fn test_queries() {
        assert_eq!(Parameter::SpreadingFactor.query(), "AT+PSF=?");
        assert_eq!(Parameter::SyncWord.query(), "AT+SYNCWORD=?");
        assert_eq!(Parameter::CryptoIv.query(), "AT+CRYPIV=?");
    }

    #[test]
    fn test_rf_test_lines() {
        let config = TestConfig {
            frequency: 868_000_000,
            tx_power: 14,
            bandwidth: Bandwidth::Khz125,
            spreading_factor: 7,
            coding_rate: 0,
            modulation: 1,
            preamble_length: 8,
            fsk_deviation: 0,
        };
        assert_eq!(
            line(Command::TestConfig(config)),
            "AT+TCONF=868000000:14:125:7:0:0:0:1:8:0:0:0"
        );
        let hop = Hopping {
            start: 863_000_000,
            stop: 870_000_000,
            step: 300,
            count: 10,
        };
        assert_eq!(
            line(Command::FrequencyHopping(hop)),
            "AT+TTH=863000000:870000000:300:10"
        );
        assert_eq!(
            line(Command::RandomFrequencyHopping(hop)),
            "AT+TRTH=863000000:870000000:300:10"
        );
        assert_eq!(
            line(Command::ContinuousWave {
                frequency: 868_000_000,
                tx_power: 14,
                duration: 5
            }),
            "AT+CW=868000000:14:5"
        );
        assert_eq!(line(Command::TxTest(3)), "AT+TTX=3");
        assert_eq!(line(Command::TestOff), "AT+TOFF?");
    }
}
