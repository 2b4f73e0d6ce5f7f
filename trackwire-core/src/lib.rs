//! # trackwire-core
//!
//! Wire-level codecs for GPS tracker protocols.
//!
//! This crate provides the low-level codec primitives:
//! - ASCII frame encoding/decoding (Meitrack MVT380 family, MVT366)
//! - BSJ binary frame encoding/decoding with byte-stuffing
//! - Checksum calculation
//! - Frame identifier sequencing
//!
//! All operations are synchronous, pure transformations over in-memory
//! buffers; transport and persistence belong to the caller.

pub mod ascii;
pub mod bsj;
pub mod checksum;
pub mod constants;
pub mod error;
pub mod identifier;

pub use ascii::{AsciiCodec, AsciiFrame, AsciiVariant, ChecksumStatus};
pub use bsj::{BsjFrame, DecodedBsj};
pub use error::{Error, Result};
pub use identifier::IdentifierSequencer;
