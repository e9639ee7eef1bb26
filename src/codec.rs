//! Hex payload codec
//!
//! The module's AT interface is text only, so binary payloads travel as
//! uppercase hexadecimal: `AT+PSEND=<hex>` on the way out and the last field
//! of `+EVT:RXP2P:` on the way in. Every byte becomes exactly two digits,
//! most significant nibble first.

use core::fmt::Write;

use heapless::{String, Vec};

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 500;

/// Hex length of a maximum-size payload
pub const MAX_ENCODED_SIZE: usize = 2 * MAX_PAYLOAD_SIZE;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Odd number of digits or a character outside `0-9A-Fa-f`
    MalformedEncoding,
    /// Output buffer cannot hold the result
    BufferTooSmall,
}

/// Write the hex encoding of `bytes` into `out`
pub fn encode_into<W: Write>(bytes: &[u8], out: &mut W) -> core::fmt::Result {
    for &byte in bytes {
        out.write_char(DIGITS[(byte >> 4) as usize] as char)?;
        out.write_char(DIGITS[(byte & 0x0F) as usize] as char)?;
    }
    Ok(())
}

/// Hex-encode `bytes` into an owned string of capacity `N`
pub fn encode<const N: usize>(bytes: &[u8]) -> Result<String<N>, CodecError> {
    if bytes.len() * 2 > N {
        return Err(CodecError::BufferTooSmall);
    }
    let mut out = String::new();
    encode_into(bytes, &mut out).map_err(|_| CodecError::BufferTooSmall)?;
    Ok(out)
}

/// Decode `hex` into `out`, returning the number of bytes written
///
/// Nothing is written unless the whole input is well formed.
pub fn decode_into(hex: &str, out: &mut [u8]) -> Result<usize, CodecError> {
    let len = decoded_len(hex)?;
    if len > out.len() {
        return Err(CodecError::BufferTooSmall);
    }
    for (slot, pair) in out.iter_mut().zip(hex.as_bytes().chunks_exact(2)) {
        *slot = byte(pair);
    }
    Ok(len)
}

/// Decode `hex` into an owned buffer of capacity `N`
pub fn decode<const N: usize>(hex: &str) -> Result<Vec<u8, N>, CodecError> {
    if decoded_len(hex)? > N {
        return Err(CodecError::BufferTooSmall);
    }
    let mut out = Vec::new();
    for pair in hex.as_bytes().chunks_exact(2) {
        out.push(byte(pair)).map_err(|_| CodecError::BufferTooSmall)?;
    }
    Ok(out)
}

fn decoded_len(hex: &str) -> Result<usize, CodecError> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(CodecError::MalformedEncoding);
    }
    Ok(digits.len() / 2)
}

fn byte(pair: &[u8]) -> u8 {
    (nibble(pair[0]) << 4) | nibble(pair[1])
}

// Caller guarantees an ASCII hex digit.
fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uppercase_msb_first() {
        let hex: String<16> = encode(&[0x00, 0x0F, 0xA5, 0xFF]).unwrap();
        assert_eq!(hex.as_str(), "000FA5FF");
    }

    #[test]
    fn test_encode_empty() {
        let hex: String<4> = encode(&[]).unwrap();
        assert!(hex.is_empty());
    }

    #[test]
    fn test_encode_buffer_too_small() {
        assert_eq!(encode::<3>(&[1, 2]), Err(CodecError::BufferTooSmall));
    }

    #[test]
    fn test_decode_hello() {
        let bytes: Vec<u8, 8> = decode("48656C6C6F").unwrap();
        assert_eq!(&bytes[..], &b"Hello"[..]);
    }

    #[test]
    fn test_decode_accepts_lowercase() {
        let bytes: Vec<u8, 4> = decode("a5fF").unwrap();
        assert_eq!(&bytes[..], &[0xA5u8, 0xFF][..]);
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert_eq!(decode::<4>("1"), Err(CodecError::MalformedEncoding));
        assert_eq!(decode::<4>("ABC"), Err(CodecError::MalformedEncoding));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert_eq!(decode::<4>("1G"), Err(CodecError::MalformedEncoding));
        assert_eq!(decode::<4>("0x"), Err(CodecError::MalformedEncoding));
        assert_eq!(decode::<4>("4 "), Err(CodecError::MalformedEncoding));
    }

    #[test]
    fn test_decode_into_leaves_output_untouched_on_error() {
        let mut out = [0xEEu8; 4];
        assert!(decode_into("00112G", &mut out).is_err());
        assert_eq!(out, [0xEEu8; 4]);
    }

    #[test]
    fn test_round_trip_every_length() {
        let mut source = [0u8; MAX_PAYLOAD_SIZE];
        for (i, byte) in source.iter_mut().enumerate() {
            *byte = (i * 7 + 3) as u8;
        }
        for len in [0, 1, 2, 17, 255, 256, MAX_PAYLOAD_SIZE] {
            let hex: String<MAX_ENCODED_SIZE> = encode(&source[..len]).unwrap();
            assert_eq!(hex.len(), 2 * len);
            let back: Vec<u8, MAX_PAYLOAD_SIZE> = decode(&hex).unwrap();
            assert_eq!(&back[..], &source[..len]);
        }
    }

    #[test]
    fn test_reencode_normalises_case() {
        let bytes: Vec<u8, 8> = decode("deadBEEF0a").unwrap();
        let hex: String<16> = encode(&bytes).unwrap();
        assert_eq!(hex.as_str(), "DEADBEEF0A");
    }
}
