//! Position report structures
//!
//! The ASCII tracker protocols carry every field as free-form text; the
//! wire format is deliberately permissive (a device with a cold GPS fix
//! will happily report latitude `0.000000`). Fields are therefore kept as
//! strings and no semantic range checks are applied.

use std::fmt;

use crate::timestamp::FrameTimestamp;

/// Cell tower information, carried as the `mcc|mnc|lac|cellId` composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    /// Mobile country code
    pub mcc: String,

    /// Mobile network code
    pub mnc: String,

    /// Location area code
    pub lac: String,

    /// Cell tower identifier
    pub cell_id: String,
}

impl CellInfo {
    /// Decode the `|`-joined composite field
    ///
    /// Returns `None` unless at least four sub-parts are present. The
    /// group decodes all-or-nothing: a short composite never yields a
    /// partially populated value.
    pub fn from_composite(composite: &str) -> Option<Self> {
        let mut parts = composite.split('|');
        let mcc = parts.next()?.to_string();
        let mnc = parts.next()?.to_string();
        let lac = parts.next()?.to_string();
        let cell_id = parts.next()?.to_string();
        Some(Self {
            mcc,
            mnc,
            lac,
            cell_id,
        })
    }
}

impl fmt::Display for CellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}|{}", self.mcc, self.mnc, self.lac, self.cell_id)
    }
}

/// Analog input readings, carried as the `AD1|AD2|AD3|battery|AD5` composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdReadings {
    pub ad1: String,
    pub ad2: String,
    pub ad3: String,

    /// Battery voltage channel (AD4 on the device)
    pub battery: String,

    pub ad5: String,
}

impl AdReadings {
    /// Decode the `|`-joined composite field
    ///
    /// Returns `None` unless all five sub-parts are present (all-or-nothing,
    /// same policy as [`CellInfo::from_composite`]).
    pub fn from_composite(composite: &str) -> Option<Self> {
        let mut parts = composite.split('|');
        let ad1 = parts.next()?.to_string();
        let ad2 = parts.next()?.to_string();
        let ad3 = parts.next()?.to_string();
        let battery = parts.next()?.to_string();
        let ad5 = parts.next()?.to_string();
        Some(Self {
            ad1,
            ad2,
            ad3,
            battery,
            ad5,
        })
    }
}

impl fmt::Display for AdReadings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.ad1, self.ad2, self.ad3, self.battery, self.ad5
        )
    }
}

/// One decoded (or to-be-encoded) position report
///
/// Field order matches the ASCII wire form: IMEI through runtime are always
/// present; the composite and trailing groups are optional and render as
/// empty fields when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    /// Device hardware identifier (opaque to the codec)
    pub imei: String,

    /// Protocol command, `AAA` for position reports
    pub command: String,

    /// Numeric event code (e.g. `35` = track by time interval)
    pub event_code: String,

    /// Latitude, 6-decimal fixed string
    pub latitude: String,

    /// Longitude, 6-decimal fixed string
    pub longitude: String,

    /// UTC timestamp (`yymmddHHMMSS` on the wire)
    pub timestamp: FrameTimestamp,

    /// Positioning status: `A` = valid fix, `V` = invalid
    pub status: String,

    /// Number of satellites in view
    pub satellites: String,

    /// GSM signal strength
    pub gsm_signal: String,

    /// Speed in km/h
    pub speed: String,

    /// Heading in degrees
    pub direction: String,

    /// Horizontal dilution of precision
    pub hdop: String,

    /// Altitude in meters
    pub altitude: String,

    /// Total mileage in meters
    pub mileage: String,

    /// Device runtime in seconds
    pub runtime: String,

    /// Cell tower composite, absent on frames without GSM lock
    pub cell: Option<CellInfo>,

    /// I/O port status bitmap, hex string
    pub port_status: Option<String>,

    /// Analog input composite
    pub adc: Option<AdReadings>,

    /// Event-specific info, hex string
    pub event_info: Option<String>,
}

impl PositionReport {
    /// Create a report with the defaults the field senders use
    pub fn new(imei: impl Into<String>, event_code: impl Into<String>) -> Self {
        Self {
            imei: imei.into(),
            command: "AAA".to_string(),
            event_code: event_code.into(),
            latitude: "0.000000".to_string(),
            longitude: "0.000000".to_string(),
            timestamp: FrameTimestamp::Unparsed(String::new()),
            status: "A".to_string(),
            satellites: "0".to_string(),
            gsm_signal: "0".to_string(),
            speed: "0".to_string(),
            direction: "0".to_string(),
            hdop: "0".to_string(),
            altitude: "0".to_string(),
            mileage: "0".to_string(),
            runtime: "0".to_string(),
            cell: None,
            port_status: None,
            adc: None,
            event_info: None,
        }
    }

    /// Whether the device reported a valid GPS fix
    pub fn has_fix(&self) -> bool {
        self.status == "A"
    }
}

impl fmt::Display for PositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Report[{} ev={} {},{} @ {}]",
            self.imei, self.event_code, self.latitude, self.longitude, self.timestamp
        )
    }
}
