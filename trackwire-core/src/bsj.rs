//! BSJ binary frame encoding and decoding
//!
//! # Frame structure
//!
//! ```text
//! ┌──────┬────────────┬────────────┬──────────┬──────────┬──────┬──────────┬──────┐
//! │ Flag │ Message ID │ Body props │ Phone    │ Serial   │ Body │ Checksum │ Flag │
//! │ 0x7E │  2 bytes   │  2 bytes   │ BCD[6]   │ 2 bytes  │  N   │  1 byte  │ 0x7E │
//! │      │  (BE u16)  │  (BE u16)  │          │ (BE u16) │      │  (XOR)   │      │
//! └──────┴────────────┴────────────┴──────────┴──────────┴──────┴──────────┴──────┘
//! ```
//!
//! The checksum is the XOR of header+body, computed before escaping.
//! Escaping applies to everything between the flag bytes: 0x7E becomes
//! {0x7D, 0x02} and 0x7D becomes {0x7D, 0x01}. The flags themselves are
//! never escaped and never appear inside a well-formed frame.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{
    checksum,
    constants::{
        BSJ_HEADER_SIZE, ESCAPE_BYTE, ESCAPED_ESCAPE_MARKER, ESCAPED_FLAG_MARKER, FRAME_FLAG,
        MAX_BSJ_BODY_LEN, MSG_TEXT_COMMAND, priority,
    },
    error::{Error, Result},
};

/// Apply the BSJ byte-stuffing transform
///
/// 0x7E → {0x7D, 0x02}, 0x7D → {0x7D, 0x01}, everything else passes
/// through unchanged.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    for &byte in data {
        match byte {
            FRAME_FLAG => out.extend_from_slice(&[ESCAPE_BYTE, ESCAPED_FLAG_MARKER]),
            ESCAPE_BYTE => out.extend_from_slice(&[ESCAPE_BYTE, ESCAPED_ESCAPE_MARKER]),
            other => out.push(other),
        }
    }
    out
}

/// Reverse the BSJ byte-stuffing transform
///
/// # Errors
///
/// Returns [`Error::UnescapedControlByte`] when a 0x7D is followed by
/// neither 0x01 nor 0x02, or dangles at the end of input.
pub fn unescape(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().enumerate();
    while let Some((offset, &byte)) = iter.next() {
        if byte != ESCAPE_BYTE {
            out.push(byte);
            continue;
        }
        match iter.next() {
            Some((_, &ESCAPED_FLAG_MARKER)) => out.push(FRAME_FLAG),
            Some((_, &ESCAPED_ESCAPE_MARKER)) => out.push(ESCAPE_BYTE),
            _ => return Err(Error::UnescapedControlByte { offset }),
        }
    }
    Ok(out)
}

/// Derive a terminal phone number from an IMEI: the last 12 digits,
/// zero-left-padded when the IMEI is shorter
pub fn phone_from_imei(imei: &str) -> String {
    if imei.len() >= 12 {
        imei[imei.len() - 12..].to_string()
    } else {
        format!("{imei:0>12}")
    }
}

/// Normalize a phone number string to exactly 12 BCD digits
fn normalize_phone(phone: &str) -> Result<String> {
    if phone.len() > 12 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidPhoneNumber(phone.to_string()));
    }
    Ok(format!("{phone:0>12}"))
}

/// Pack 12 decimal digits into 6 BCD bytes
fn pack_bcd(digits: &str) -> [u8; 6] {
    let mut out = [0u8; 6];
    for (i, pair) in digits.as_bytes().chunks(2).enumerate() {
        out[i] = ((pair[0] - b'0') << 4) | (pair[1] - b'0');
    }
    out
}

/// Unpack 6 BCD bytes into 12 decimal digits
fn unpack_bcd(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from_digit((b >> 4) as u32, 16).unwrap_or('?'));
        out.push(char::from_digit((b & 0x0F) as u32, 16).unwrap_or('?'));
    }
    out
}

/// BSJ protocol frame
///
/// # Examples
///
/// ```
/// use trackwire_core::BsjFrame;
///
/// let frame = BsjFrame::text_command("<SPBSJ*P:BSJGPS*C:30>", "013800138000", 1).unwrap();
/// let encoded = frame.encode().unwrap();
/// assert_eq!(encoded.first(), Some(&0x7E));
/// assert_eq!(encoded.last(), Some(&0x7E));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BsjFrame {
    /// Message ID (0x8300 = text-command delivery)
    pub message_id: u16,

    /// Terminal phone number, 12 BCD digits
    pub phone: String,

    /// Message serial number
    pub serial: u16,

    /// Message body: one priority flag byte followed by the payload
    pub body: Bytes,
}

/// A decoded BSJ frame plus its checksum verdict
///
/// A checksum mismatch is recoverable: the frame still decodes and the
/// mismatch is flagged, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBsj {
    pub frame: BsjFrame,
    pub checksum_valid: bool,
}

impl BsjFrame {
    /// Build a text-command frame (message ID 0x8300)
    ///
    /// The body is one normal-priority flag byte followed by the command
    /// text. The command must be ASCII: the device codepage (GBK) is an
    /// ASCII superset and the command vocabulary never leaves that range.
    ///
    /// # Errors
    ///
    /// - [`Error::UnencodableCommand`] for non-ASCII command text
    /// - [`Error::InvalidPhoneNumber`] when the phone number is not 1-12
    ///   decimal digits
    /// - [`Error::BodyTooLarge`] when the body exceeds the 10-bit length
    ///   field
    pub fn text_command(command: &str, phone: &str, serial: u16) -> Result<Self> {
        if let Some(offset) = command.bytes().position(|b| !b.is_ascii()) {
            return Err(Error::UnencodableCommand { offset });
        }

        let mut body = BytesMut::with_capacity(1 + command.len());
        body.put_u8(priority::NORMAL);
        body.put_slice(command.as_bytes());

        if body.len() > MAX_BSJ_BODY_LEN {
            return Err(Error::BodyTooLarge {
                size: body.len(),
                max: MAX_BSJ_BODY_LEN,
            });
        }

        Ok(Self {
            message_id: MSG_TEXT_COMMAND,
            phone: normalize_phone(phone)?,
            serial,
            body: body.freeze(),
        })
    }

    /// Calculate the XOR checksum over header+body (pre-escape)
    pub fn checksum(&self) -> Result<u8> {
        Ok(checksum::xor(&self.raw_bytes()?))
    }

    /// Header+body concatenation before checksum append and escaping
    fn raw_bytes(&self) -> Result<Vec<u8>> {
        if self.body.len() > MAX_BSJ_BODY_LEN {
            return Err(Error::BodyTooLarge {
                size: self.body.len(),
                max: MAX_BSJ_BODY_LEN,
            });
        }
        let phone = normalize_phone(&self.phone)?;

        let mut buf = BytesMut::with_capacity(BSJ_HEADER_SIZE + self.body.len());
        buf.put_u16(self.message_id);
        buf.put_u16(self.body.len() as u16);
        buf.put_slice(&pack_bcd(&phone));
        buf.put_u16(self.serial);
        buf.put_slice(&self.body);
        Ok(buf.to_vec())
    }

    /// Encode to the complete escaped wire frame
    pub fn encode(&self) -> Result<Bytes> {
        let mut raw = self.raw_bytes()?;
        raw.push(checksum::xor(&raw));

        let escaped = escape(&raw);
        let mut frame = BytesMut::with_capacity(escaped.len() + 2);
        frame.put_u8(FRAME_FLAG);
        frame.put_slice(&escaped);
        frame.put_u8(FRAME_FLAG);

        trace!(
            message_id = format!("0x{:04X}", self.message_id),
            serial = self.serial,
            len = frame.len(),
            "Encoded BSJ frame"
        );

        Ok(frame.freeze())
    }

    /// Encode to the hexadecimal string representation
    pub fn encode_hex(&self) -> Result<String> {
        Ok(hex::encode(self.encode()?))
    }

    /// Decode a received wire frame
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFrameFlag`] when the frame does not start and end
    ///   with 0x7E
    /// - [`Error::UnescapedControlByte`] on a malformed escape sequence
    /// - [`Error::FrameTooShort`] when the unescaped content cannot hold
    ///   header and checksum
    pub fn decode(frame: &[u8]) -> Result<DecodedBsj> {
        if frame.len() < 2 || frame[0] != FRAME_FLAG || frame[frame.len() - 1] != FRAME_FLAG {
            return Err(Error::MissingFrameFlag);
        }

        let raw = unescape(&frame[1..frame.len() - 1])?;
        if raw.len() < BSJ_HEADER_SIZE + 1 {
            return Err(Error::FrameTooShort {
                expected: BSJ_HEADER_SIZE + 1,
                actual: raw.len(),
            });
        }

        let (checksummed, received) = raw.split_at(raw.len() - 1);
        let checksum_valid = checksum::xor(checksummed) == received[0];

        let mut buf = checksummed;
        let message_id = buf.get_u16();
        let _body_props = buf.get_u16();
        let phone = unpack_bcd(&buf[..6]);
        buf.advance(6);
        let serial = buf.get_u16();
        let body = Bytes::copy_from_slice(buf);

        Ok(DecodedBsj {
            frame: Self {
                message_id,
                phone,
                serial,
                body,
            },
            checksum_valid,
        })
    }

    /// Priority flag byte, when the body is non-empty
    pub fn priority_flag(&self) -> Option<u8> {
        self.body.first().copied()
    }

    /// Lossy ASCII view of the command text past the flag byte
    pub fn text(&self) -> String {
        self.body
            .get(1..)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Debug for BsjFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BsjFrame")
            .field("message_id", &format!("0x{:04X}", self.message_id))
            .field("phone", &self.phone)
            .field("serial", &self.serial)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl fmt::Display for BsjFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BsjFrame[0x{:04X}](phone={}, serial={}, len={})",
            self.message_id,
            self.phone,
            self.serial,
            self.body.len()
        )
    }
}
