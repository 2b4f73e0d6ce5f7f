//! ASCII tracker frame encoding and decoding
//!
//! # Frame structure
//!
//! ```text
//! $$<id><len>,<imei>,<cmd>,<event>,<lat>,<lon>,<yymmddHHMMSS>,<status>,
//! <sats>,<gsm>,<speed>,<dir>,<hdop>,<alt>,<mileage>,<runtime>,
//! <mcc>|<mnc>|<lac>|<cellId>,<portStatus>,<AD1>|<AD2>|<AD3>|<battery>|<AD5>,
//! <eventInfo>,*<CC>\r\n
//! ```
//!
//! `<id>` is one sequencer byte, `<len>` is decimal digits, `<CC>` is two
//! uppercase hex digits. The same comma-delimited layout is shared by the
//! Meitrack MVT380 family and the MVT366/SkyWave emulation; the two differ
//! only in the length accounting and checksum formula, selected through
//! [`AsciiVariant`].

use std::fmt;

use tracing::trace;
use trackwire_types::{AdReadings, CellInfo, FrameTimestamp, PositionReport};

use crate::{
    checksum,
    constants::{ASCII_HEADER, MIN_ASCII_FIELDS},
    error::{Error, Result},
    identifier::IdentifierSequencer,
};

/// Protocol variant selector
///
/// One codec, variant parameters: the comma-delimited field layout is
/// identical across device families, only the frame accounting differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiVariant {
    /// Meitrack MVT380 family: length = body + 4, modulo-256 byte sum over
    /// header through the terminating `*`
    Mvt380,

    /// MVT366/SkyWave emulation: length = payload + 5, length-based
    /// checksum formula
    Mvt366,
}

/// Checksum verdict attached to a decoded frame
///
/// A mismatch is reported, never silently corrected, and never aborts the
/// decode: all fields still parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// Received checksum matches the recomputed one
    Valid,

    /// Received checksum differs from the recomputed one
    Mismatch {
        expected: String,
        received: String,
    },

    /// Frame carried no `*<CC>` terminator
    Missing,
}

impl ChecksumStatus {
    /// Whether the frame arrived with a matching checksum
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// One decoded ASCII frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    /// Data identifier byte from the header (`?` when the header is short)
    pub identifier: u8,

    /// Length declared in the header, when it parsed as a number
    pub declared_len: Option<u16>,

    /// Decoded field values
    pub report: PositionReport,

    /// Fields past the event info slot, preserved verbatim (protocol
    /// version, fuel, temperature tail on newer firmware)
    pub trailing: Vec<String>,

    /// Checksum verdict
    pub checksum: ChecksumStatus,
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AsciiFrame[{}]({}, checksum {})",
            self.identifier as char,
            self.report,
            match &self.checksum {
                ChecksumStatus::Valid => "ok",
                ChecksumStatus::Mismatch { .. } => "MISMATCH",
                ChecksumStatus::Missing => "missing",
            }
        )
    }
}

/// ASCII frame codec
///
/// # Examples
///
/// ```
/// use trackwire_core::{AsciiCodec, IdentifierSequencer};
/// use trackwire_types::PositionReport;
///
/// let codec = AsciiCodec::mvt380();
/// let seq = IdentifierSequencer::new();
///
/// let report = PositionReport::new("864352045580768", "35");
/// let frame = codec.encode(&report, &seq);
/// assert!(frame.starts_with("$$A"));
///
/// let decoded = codec.decode(&frame).unwrap();
/// assert!(decoded.checksum.is_valid());
/// assert_eq!(decoded.report, report);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AsciiCodec {
    variant: AsciiVariant,
}

impl AsciiCodec {
    /// Create a codec for the given variant
    pub fn new(variant: AsciiVariant) -> Self {
        Self { variant }
    }

    /// Codec for the Meitrack MVT380 family
    pub fn mvt380() -> Self {
        Self::new(AsciiVariant::Mvt380)
    }

    /// Codec for the MVT366/SkyWave emulation
    pub fn mvt366() -> Self {
        Self::new(AsciiVariant::Mvt366)
    }

    /// Encode a report into a complete wire frame
    ///
    /// Pure structural concatenation: no field is validated for semantic
    /// range, mirroring the protocol's permissive wire format. Absent
    /// optional groups render as empty fields. The sequencer is advanced
    /// exactly once.
    pub fn encode(&self, report: &PositionReport, seq: &IdentifierSequencer) -> String {
        let fields = wire_fields(report).join(",");
        let id = seq.next() as char;

        let frame = match self.variant {
            AsciiVariant::Mvt380 => {
                let body = format!(",{fields},*");
                // Length field covers the body plus header/terminator
                // accounting
                let declared = body.len() + 4;
                let header = format!("{ASCII_HEADER}{id}{declared}");
                let pre = format!("{header}{body}");
                // Checksum range runs through the `*` inclusive
                let cc = checksum::byte_sum_hex(pre.as_bytes());
                format!("{pre}{cc}\r\n")
            }
            AsciiVariant::Mvt366 => {
                let declared = fields.len() + 5;
                let header = format!("{ASCII_HEADER}{id}{declared}");
                let cc = checksum::length_based(header.len(), fields.len());
                format!("{header},{fields}*{cc:02X}\r\n")
            }
        };

        trace!(
            variant = ?self.variant,
            identifier = %id,
            len = frame.len(),
            "Encoded ASCII frame"
        );

        frame
    }

    /// Decode and validate a received frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewFields`] when fewer than 16 comma-separated
    /// parts are present. Checksum mismatches and malformed timestamps are
    /// recoverable: they are flagged on the returned frame, never raised.
    pub fn decode(&self, raw: &str) -> Result<AsciiFrame> {
        let trimmed = raw.trim();

        // Split the checksum off after the last `*`; a frame without a
        // terminator is still decodable, the checksum is just unverifiable
        let (main, received_checksum) = match trimmed.rfind('*') {
            Some(pos) => (&trimmed[..pos], Some(trimmed[pos + 1..].to_string())),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = main.split(',').collect();
        if parts.len() < MIN_ASCII_FIELDS {
            return Err(Error::TooFewFields {
                expected: MIN_ASCII_FIELDS,
                actual: parts.len(),
            });
        }

        // Header `$$<id><len>`, extracted leniently
        let header = parts[0];
        let identifier = *header.as_bytes().get(2).unwrap_or(&b'?');
        let declared_len = header.get(3..).and_then(|s| s.parse().ok());

        let report = PositionReport {
            imei: parts[1].to_string(),
            command: parts[2].to_string(),
            event_code: parts[3].to_string(),
            latitude: parts[4].to_string(),
            longitude: parts[5].to_string(),
            timestamp: FrameTimestamp::parse(parts[6]),
            status: parts[7].to_string(),
            satellites: parts[8].to_string(),
            gsm_signal: parts[9].to_string(),
            speed: parts[10].to_string(),
            direction: parts[11].to_string(),
            hdop: parts[12].to_string(),
            altitude: parts[13].to_string(),
            mileage: parts[14].to_string(),
            runtime: parts[15].to_string(),
            cell: parts.get(16).and_then(|s| CellInfo::from_composite(s)),
            port_status: parts.get(17).and_then(|s| non_empty(s)),
            adc: parts.get(18).and_then(|s| AdReadings::from_composite(s)),
            event_info: parts.get(19).and_then(|s| non_empty(s)),
        };

        let trailing = parts
            .get(20..)
            .unwrap_or_default()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let checksum = match received_checksum {
            None => ChecksumStatus::Missing,
            Some(received) => {
                let expected = self.expected_checksum(main, header.len());
                if expected.eq_ignore_ascii_case(&received) {
                    ChecksumStatus::Valid
                } else {
                    trace!(%expected, %received, "ASCII checksum mismatch");
                    ChecksumStatus::Mismatch { expected, received }
                }
            }
        };

        Ok(AsciiFrame {
            identifier,
            declared_len,
            report,
            trailing,
            checksum,
        })
    }

    /// Recompute the checksum for the pre-`*` portion of a frame
    fn expected_checksum(&self, main: &str, header_len: usize) -> String {
        match self.variant {
            // Checksum range includes the terminating `*` the split removed
            AsciiVariant::Mvt380 => {
                format!("{:02X}", checksum::byte_sum(main.as_bytes()).wrapping_add(b'*'))
            }
            AsciiVariant::Mvt366 => {
                let payload_len = main.len().saturating_sub(header_len + 1);
                format!("{:02X}", checksum::length_based(header_len, payload_len))
            }
        }
    }
}

/// Assemble the ordered wire field list for a report
fn wire_fields(report: &PositionReport) -> Vec<String> {
    vec![
        report.imei.trim().to_string(),
        report.command.clone(),
        report.event_code.clone(),
        report.latitude.clone(),
        report.longitude.clone(),
        report.timestamp.to_wire(),
        report.status.clone(),
        report.satellites.clone(),
        report.gsm_signal.clone(),
        report.speed.clone(),
        report.direction.clone(),
        report.hdop.clone(),
        report.altitude.clone(),
        report.mileage.clone(),
        report.runtime.clone(),
        report.cell.as_ref().map(CellInfo::to_string).unwrap_or_default(),
        report.port_status.clone().unwrap_or_default(),
        report.adc.as_ref().map(AdReadings::to_string).unwrap_or_default(),
        report.event_info.clone().unwrap_or_default(),
    ]
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Field set matching the warmup frames the periodic test sender emits
    fn sample_report() -> PositionReport {
        PositionReport {
            imei: "864352045580768".to_string(),
            command: "AAA".to_string(),
            event_code: "35".to_string(),
            latitude: "19.611106".to_string(),
            longitude: "-99.028335".to_string(),
            timestamp: FrameTimestamp::parse("250101120000"),
            status: "A".to_string(),
            satellites: "9".to_string(),
            gsm_signal: "12".to_string(),
            speed: "98".to_string(),
            direction: "76".to_string(),
            hdop: "1".to_string(),
            altitude: "2239".to_string(),
            mileage: "0".to_string(),
            runtime: "1348".to_string(),
            cell: CellInfo::from_composite("0|0|0000|0000"),
            port_status: Some("0000".to_string()),
            adc: AdReadings::from_composite("0000|0000|0000|80|0000"),
            event_info: Some("00000000".to_string()),
        }
    }

    const SAMPLE_FRAME: &str = "$$A141,864352045580768,AAA,35,19.611106,-99.028335,\
250101120000,A,9,12,98,76,1,2239,0,1348,0|0|0000|0000,0000,\
0000|0000|0000|80|0000,00000000,*B8\r\n";

    /// Frame captured from a real MVT380 (carries a trailing
    /// protocol-version tail past the event info slot)
    const CAPTURED_FRAME: &str = "$$B153,867630074536695,AAA,35,19.521142,-99.211361,\
250311222802,V,12,4,0,0,0.0,0,0,0,334|50|2550|000000,00000000,\
0000|0000|0000|12.0|0000,00000000,,1,0000*E5\r\n";

    #[test]
    fn test_encode_mvt380_golden() {
        let codec = AsciiCodec::mvt380();
        let seq = IdentifierSequencer::new();

        let frame = codec.encode(&sample_report(), &seq);
        assert_eq!(frame, SAMPLE_FRAME);
    }

    #[test]
    fn test_encode_advances_sequencer() {
        let codec = AsciiCodec::mvt380();
        let seq = IdentifierSequencer::new();
        let report = sample_report();

        assert!(codec.encode(&report, &seq).starts_with("$$A"));
        assert!(codec.encode(&report, &seq).starts_with("$$B"));
        assert!(codec.encode(&report, &seq).starts_with("$$C"));
    }

    #[test]
    fn test_decode_round_trip() {
        let codec = AsciiCodec::mvt380();
        let seq = IdentifierSequencer::new();
        let report = sample_report();

        let decoded = codec.decode(&codec.encode(&report, &seq)).unwrap();

        assert_eq!(decoded.report, report);
        assert_eq!(decoded.identifier, b'A');
        assert_eq!(decoded.declared_len, Some(141));
        assert_eq!(decoded.checksum, ChecksumStatus::Valid);
    }

    #[test]
    fn test_decode_captured_frame() {
        let codec = AsciiCodec::mvt380();
        let frame = codec.decode(CAPTURED_FRAME).unwrap();

        assert_eq!(frame.identifier, b'B');
        assert_eq!(frame.declared_len, Some(153));
        assert_eq!(frame.checksum, ChecksumStatus::Valid);

        assert_eq!(frame.report.imei, "867630074536695");
        assert_eq!(frame.report.status, "V");
        assert_eq!(frame.report.satellites, "12");
        assert!(frame.report.timestamp.is_parsed());

        let cell = frame.report.cell.as_ref().unwrap();
        assert_eq!(cell.mcc, "334");
        assert_eq!(cell.cell_id, "000000");

        let adc = frame.report.adc.as_ref().unwrap();
        assert_eq!(adc.battery, "12.0");

        assert_eq!(frame.trailing, vec!["", "1", "0000"]);
    }

    #[test]
    fn test_decode_too_few_fields() {
        let codec = AsciiCodec::mvt380();
        let result = codec.decode("$$A20,862,AAA,35,1,2,3,4,5,6*00");

        assert!(matches!(
            result,
            Err(Error::TooFewFields {
                expected: 16,
                actual: 10,
            })
        ));
    }

    #[test]
    fn test_decode_corrupted_field_flags_mismatch() {
        let codec = AsciiCodec::mvt380();
        let corrupted = SAMPLE_FRAME.replace("19.611106", "19.611107");

        let frame = codec.decode(&corrupted).unwrap();

        // The mismatch is flagged, all other fields still parse
        assert!(matches!(frame.checksum, ChecksumStatus::Mismatch { .. }));
        assert_eq!(frame.report.latitude, "19.611107");
        assert_eq!(frame.report.imei, "864352045580768");
    }

    #[test]
    fn test_decode_missing_checksum() {
        let codec = AsciiCodec::mvt380();
        let frame = codec
            .decode("$$A141,864352045580768,AAA,35,19.611106,-99.028335,250101120000,\
A,9,12,98,76,1,2239,0,1348,0|0|0000|0000,0000,0000|0000|0000|80|0000,00000000,")
            .unwrap();

        assert_eq!(frame.checksum, ChecksumStatus::Missing);
        assert!(!frame.checksum.is_valid());
        assert_eq!(frame.report, sample_report());
    }

    #[test]
    fn test_decode_malformed_timestamp_preserved() {
        let codec = AsciiCodec::mvt380();
        let frame = codec
            .decode(&SAMPLE_FRAME.replace("250101120000", "BADTIME"))
            .unwrap();

        assert_eq!(
            frame.report.timestamp,
            FrameTimestamp::Unparsed("BADTIME".to_string())
        );
    }

    #[test]
    fn test_decode_short_composites_all_or_nothing() {
        let codec = AsciiCodec::mvt380();
        let frame = codec
            .decode(&SAMPLE_FRAME.replace("0|0|0000|0000", "334|50"))
            .unwrap();

        assert_eq!(frame.report.cell, None);
        // The other group is unaffected
        assert!(frame.report.adc.is_some());
    }

    #[test]
    fn test_decode_absent_optional_groups() {
        let codec = AsciiCodec::mvt380();
        let seq = IdentifierSequencer::new();

        let mut report = sample_report();
        report.cell = None;
        report.port_status = None;
        report.adc = None;
        report.event_info = None;

        let decoded = codec.decode(&codec.encode(&report, &seq)).unwrap();
        assert_eq!(decoded.report, report);
        assert_eq!(decoded.checksum, ChecksumStatus::Valid);
    }

    #[test]
    fn test_encode_mvt366_golden() {
        let codec = AsciiCodec::mvt366();
        let seq = IdentifierSequencer::new();

        let report = PositionReport {
            imei: "02092248SKYEE75".to_string(),
            command: "AAA".to_string(),
            event_code: "1".to_string(),
            latitude: "19.521100".to_string(),
            longitude: "-99.211500".to_string(),
            timestamp: FrameTimestamp::parse("251002193123"),
            status: "A".to_string(),
            satellites: "0".to_string(),
            gsm_signal: "31".to_string(),
            speed: "0".to_string(),
            direction: "361".to_string(),
            hdop: "0".to_string(),
            altitude: "21".to_string(),
            mileage: "0".to_string(),
            runtime: "0".to_string(),
            cell: CellInfo::from_composite("334|50|0030|0030"),
            port_status: Some("0000".to_string()),
            adc: AdReadings::from_composite("0|0|0|0|0"),
            event_info: Some("00000000".to_string()),
        };

        let frame = codec.encode(&report, &seq);
        assert_eq!(
            frame,
            "$$A123,02092248SKYEE75,AAA,1,19.521100,-99.211500,251002193123,\
A,0,31,0,361,0,21,0,0,334|50|0030|0030,0000,0|0|0|0|0,00000000*7E\r\n"
        );

        let decoded = codec.decode(&frame).unwrap();
        assert_eq!(decoded.checksum, ChecksumStatus::Valid);
        assert_eq!(decoded.report, report);
        assert_eq!(decoded.declared_len, Some(123));
    }

    #[test]
    fn test_mvt366_checksum_is_length_based() {
        // The MVT366 formula depends only on lengths: swapping same-length
        // field content must not change the checksum
        let codec = AsciiCodec::mvt366();
        let seq = IdentifierSequencer::new();

        let mut report = sample_report();
        let a = codec.encode(&report, &seq);
        report.latitude = "91.611106".to_string();
        let b = codec.encode(&report, &seq);

        assert_eq!(a[a.len() - 4..], b[b.len() - 4..]);
    }
}
