//! Compress and decompress SEGA's PRS data
//!
//! PRS is the LZ77-style compression wrapped around much of the game data
//! shipped with *Phantasy Star Online* and *PSO2*. A stream mixes literal
//! bytes with short and long back-references, steered by single-bit control
//! codes packed into control bytes; the exact layout is documented in the
//! [`format`] module.
//!
//! Compressed PRS data does not record the size it decodes to. Whatever
//! container the stream came from (an ICE archive, a script, a caller) is
//! expected to supply it, so every decompression entry point takes the
//! declared size alongside the input.
//!
//! ## Quick start
//! ```
//! let data = b"sam I am I am sam";
//!
//! let packed = prs::compress_bytes(data)?;
//! let unpacked = prs::decompress_bytes(&packed, data.len())?;
//!
//! assert_eq!(&unpacked[..], &data[..]);
//! # Ok::<(), prs::PrsError>(())
//! ```
//!
//! The [`compress`], [`compress_bytes`], and [`compress_file`] functions
//! cover the common case; [`EncoderBuilder`] additionally exposes the
//! back-reference search knobs ([`SearchSettings`]) and per-token
//! diagnostic logging. [`decompress`], [`decompress_bytes`],
//! [`decompress_file`], and [`DecoderBuilder`] mirror that split on the
//! other side.
//!
//! Inputs shorter than two bytes cannot be represented (the stream opens
//! with two verbatim bytes) and fail to compress. Malformed or truncated
//! streams fail to decompress with a [`PrsError`] describing what went
//! wrong.

mod decode;
mod encode;
mod errors;
pub mod format;

pub use crate::{
    decode::{decompress, decompress_bytes, decompress_file, DecoderBuilder},
    encode::{compress, compress_bytes, compress_file, EncoderBuilder, SearchSettings},
    errors::PrsError,
};
