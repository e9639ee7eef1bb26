use crate::codec::CodecError;
use crate::frame::Frame;

/// Prefix shared by every receive event
pub const RX_EVENT: &str = "+EVT:RXP2P";
/// Marker of a received packet; fields follow, colon separated
pub const RX_PACKET: &str = "+EVT:RXP2P:";
/// Receive window closed without a packet
pub const RX_TIMEOUT: &str = "+EVT:RXP2P RECEIVE TIMEOUT";
/// Transmission finished
pub const TX_DONE: &str = "+EVT:TXP2P DONE";

const ERROR_TOKEN: &str = "ERROR";

/// Unsolicited event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A packet was received
    Frame(Frame),
    /// The module reported a receive error
    ReceiveError,
    /// The receive window elapsed
    ReceiveTimeout,
    /// A `PSEND` transmission completed
    TransmitDone,
    /// Not an event this driver knows
    Unrecognized,
}

/// Receive event that could not be turned into a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Fewer than three fields after the marker
    MissingField,
    /// RSSI field is not a signed integer
    InvalidRssi,
    /// SNR field is not a signed integer
    InvalidSnr,
    /// Payload field is not valid hex or too long
    Payload(CodecError),
}

impl From<CodecError> for ParseError {
    fn from(error: CodecError) -> Self {
        ParseError::Payload(error)
    }
}

/// Classify one trimmed line read from the module
///
/// `+EVT:RXP2P:<rssi>:<snr>:<hex>` becomes [`Event::Frame`]. Any receive event
/// carrying `ERROR` is reported as [`Event::ReceiveError`] before field
/// extraction is attempted.
pub fn parse(line: &str) -> Result<Event, ParseError> {
    if line.contains(RX_EVENT) {
        if line.contains(ERROR_TOKEN) {
            return Ok(Event::ReceiveError);
        }
        if let Some(start) = line.find(RX_PACKET) {
            return parse_packet(&line[start + RX_PACKET.len()..]).map(Event::Frame);
        }
        if line.contains(RX_TIMEOUT) {
            return Ok(Event::ReceiveTimeout);
        }
        return Ok(Event::Unrecognized);
    }
    if line.contains(TX_DONE) {
        return Ok(Event::TransmitDone);
    }
    Ok(Event::Unrecognized)
}

fn parse_packet(fields: &str) -> Result<Frame, ParseError> {
    let mut fields = fields.splitn(3, ':');
    let rssi = fields.next().ok_or(ParseError::MissingField)?;
    let snr = fields.next().ok_or(ParseError::MissingField)?;
    let payload = fields.next().ok_or(ParseError::MissingField)?;

    let rssi = rssi.trim().parse::<i16>().map_err(|_| ParseError::InvalidRssi)?;
    let snr = snr.trim().parse::<i8>().map_err(|_| ParseError::InvalidSnr)?;
    Ok(Frame::from_hex(rssi, snr, payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_PAYLOAD_SIZE;

    fn frame(line: &str) -> Frame {
        match parse(line) {
            Ok(Event::Frame(frame)) => frame,
            other => panic!("expected a frame, got {:?}", other),
        }
    }

    #[test]
    fn test_received_packet() {
        let frame = frame("+EVT:RXP2P:-42:9:48656C6C6F");
        assert_eq!(frame.rssi(), -42);
        assert_eq!(frame.snr(), 9);
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.payload(), b"Hello");
    }

    #[test]
    fn test_negative_snr_and_empty_payload() {
        let frame = frame("+EVT:RXP2P:-120:-7:");
        assert_eq!(frame.rssi(), -120);
        assert_eq!(frame.snr(), -7);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_marker_inside_line() {
        let frame = frame("noise+EVT:RXP2P:-1:0:00FF");
        assert_eq!(frame.payload(), &[0x00u8, 0xFF][..]);
    }

    #[test]
    fn test_receive_error() {
        assert_eq!(parse("+EVT:RXP2P:ERROR"), Ok(Event::ReceiveError));
        assert_eq!(parse("+EVT:RXP2P RECEIVE ERROR"), Ok(Event::ReceiveError));
    }

    #[test]
    fn test_timeout_and_tx_done() {
        assert_eq!(parse("+EVT:RXP2P RECEIVE TIMEOUT"), Ok(Event::ReceiveTimeout));
        assert_eq!(parse("+EVT:TXP2P DONE"), Ok(Event::TransmitDone));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(parse("OK"), Ok(Event::Unrecognized));
        assert_eq!(parse(""), Ok(Event::Unrecognized));
        assert_eq!(parse("+EVT:JOINED"), Ok(Event::Unrecognized));
    }

    #[test]
    fn test_malformed_packets() {
        assert_eq!(parse("+EVT:RXP2P:-42"), Err(ParseError::MissingField));
        assert_eq!(parse("+EVT:RXP2P:-42:9"), Err(ParseError::MissingField));
        assert_eq!(parse("+EVT:RXP2P:abc:9:00"), Err(ParseError::InvalidRssi));
        assert_eq!(parse("+EVT:RXP2P:-42:x:00"), Err(ParseError::InvalidSnr));
        assert_eq!(
            parse("+EVT:RXP2P:-42:9:486"),
            Err(ParseError::Payload(CodecError::MalformedEncoding))
        );
        assert_eq!(
            parse("+EVT:RXP2P:-42:9:4G"),
            Err(ParseError::Payload(CodecError::MalformedEncoding))
        );
    }

    #[test]
    fn test_oversized_payload() {
        let mut line: heapless::String<1100> = heapless::String::new();
        line.push_str("+EVT:RXP2P:-42:9:").unwrap();
        for _ in 0..=MAX_PAYLOAD_SIZE {
            line.push_str("00").unwrap();
        }
        assert_eq!(
            parse(&line),
            Err(ParseError::Payload(CodecError::BufferTooSmall))
        );
    }
}
