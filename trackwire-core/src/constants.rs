//! Protocol constants

/// ASCII frame header marker
pub const ASCII_HEADER: &str = "$$";

/// Minimum comma-separated parts for a decodable ASCII frame
/// (header through runtime)
pub const MIN_ASCII_FIELDS: usize = 16;

/// BSJ frame delimiter flag byte
pub const FRAME_FLAG: u8 = 0x7E;

/// BSJ escape byte
pub const ESCAPE_BYTE: u8 = 0x7D;

/// Escape marker for a literal 0x7E inside a frame body
pub const ESCAPED_FLAG_MARKER: u8 = 0x02;

/// Escape marker for a literal 0x7D inside a frame body
pub const ESCAPED_ESCAPE_MARKER: u8 = 0x01;

/// BSJ message ID for text-command delivery (server to terminal)
pub const MSG_TEXT_COMMAND: u16 = 0x8300;

/// BSJ header size in bytes: message ID + body properties + BCD[6] phone
/// + serial number
pub const BSJ_HEADER_SIZE: usize = 12;

/// Maximum BSJ body length (10-bit field in the body properties word)
pub const MAX_BSJ_BODY_LEN: usize = 0x03FF;

/// Message priority flags (first byte of a BSJ text-command body)
pub mod priority {
    /// Normal delivery
    pub const NORMAL: u8 = 0x00;

    /// Emergency delivery
    pub const EMERGENCY: u8 = 0x01;
}

/// Meitrack event codes seen in the field
pub mod events {
    /// SOS button pressed
    pub const SOS_PRESSED: &str = "1";

    /// Input 2 active
    pub const INPUT_2_ACTIVE: &str = "2";

    /// Low device battery
    pub const LOW_BATTERY: &str = "17";

    /// Low external battery
    pub const LOW_EXTERNAL_BATTERY: &str = "18";

    /// Speeding
    pub const SPEEDING: &str = "19";

    /// Track by time interval
    pub const TRACK_BY_INTERVAL: &str = "35";
}
