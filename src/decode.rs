use crate::{
    errors::PrsError,
    format::{ControlReader, Token},
};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Write},
    path::Path,
};

/// Specify the decompression input, declared size, and output
///
/// PRS streams do not carry the size of the data they decode to; the caller
/// that produced or stored the stream is expected to know it. Every
/// constructor therefore takes the declared decompressed size alongside the
/// input.
///
/// ```
/// # use prs::DecoderBuilder;
/// let stream = [0x2B, 0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00];
/// let data = DecoderBuilder::for_bytes(&stream, 10).decode_to_vec();
/// assert_eq!(data.unwrap(), vec![0u8; 10]);
/// ```
pub struct DecoderBuilder<R> {
    rdr: R,
    size: usize,
}

impl<R: Read> DecoderBuilder<R> {
    /// Create a new `DecoderBuilder` for the compressed data in `rdr`,
    /// which decodes to `decompressed_size` bytes.
    #[inline]
    pub fn for_reader(rdr: R, decompressed_size: usize) -> Self {
        Self {
            rdr,
            size: decompressed_size,
        }
    }

    /// Decompress and return the data in a `Vec<u8>`.
    ///
    /// The result is exactly `decompressed_size` bytes, unless the stream
    /// reached its terminator early, in which case it is shorter. Callers
    /// that require exact-size output should compare the returned length.
    #[inline]
    pub fn decode_to_vec(&mut self) -> Result<Vec<u8>, PrsError> {
        let mut input = Vec::new();
        self.rdr.read_to_end(&mut input)?;

        decompress_buf(&input, self.size)
    }

    /// Decompress and write the data out to `wtr`.
    #[inline]
    pub fn decode_to_writer<W: Write>(&mut self, mut wtr: W) -> Result<(), PrsError> {
        let data = self.decode_to_vec()?;
        wtr.write_all(&data)?;

        Ok(())
    }

    /// Decompress and write the data out to the newly created `File` `f`.
    #[inline]
    pub fn decode_to_file<P: AsRef<Path>>(&mut self, f: P) -> Result<(), PrsError> {
        let wtr = BufWriter::new(File::create(f)?);
        self.decode_to_writer(wtr)
    }
}

impl DecoderBuilder<BufReader<File>> {
    /// Create a new `DecoderBuilder` for the compressed file at `p`.
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P, decompressed_size: usize) -> Result<Self, PrsError> {
        let rdr = BufReader::new(File::open(p)?);
        Ok(Self::for_reader(rdr, decompressed_size))
    }
}

impl<'a> DecoderBuilder<Cursor<&'a [u8]>> {
    /// Create a new `DecoderBuilder` for the compressed data in the `bytes` slice.
    #[inline]
    pub fn for_bytes(bytes: &'a [u8], decompressed_size: usize) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr, decompressed_size)
    }
}

/// Decompress PRS data from a `Read`er into a `Vec<u8>`
///
/// This is a convenience function to decompress without having to import
/// and set up a [`DecoderBuilder`]. `decompressed_size` is the size the
/// caller expects the data to decode to.
pub fn decompress<R: Read>(rdr: R, decompressed_size: usize) -> Result<Vec<u8>, PrsError> {
    DecoderBuilder::for_reader(rdr, decompressed_size).decode_to_vec()
}

/// Decompress a PRS byte slice into a `Vec<u8>`.
pub fn decompress_bytes(bytes: &[u8], decompressed_size: usize) -> Result<Vec<u8>, PrsError> {
    DecoderBuilder::for_bytes(bytes, decompressed_size).decode_to_vec()
}

/// Decompress the PRS file at `p` into a `Vec<u8>`.
pub fn decompress_file<P: AsRef<Path>>(
    p: P,
    decompressed_size: usize,
) -> Result<Vec<u8>, PrsError> {
    DecoderBuilder::for_file(p, decompressed_size)?.decode_to_vec()
}

/// The decompression pass: read tokens until the output holds `target`
/// bytes or the stream terminates.
pub(crate) fn decompress_buf(input: &[u8], target: usize) -> Result<Vec<u8>, PrsError> {
    let mut rdr = ControlReader::new(input);
    let mut out = Vec::with_capacity(target);

    while out.len() < target {
        match Token::read(&mut rdr)? {
            Token::Literal(byte) => out.push(byte),
            Token::ShortRef { size, offset } | Token::LongRef { size, offset } => {
                copy_back(&mut out, size, offset, target)?
            }
            Token::End => break,
        }
    }

    Ok(out)
}

/// Append `size` bytes copied from `offset` (negative) bytes behind the end
/// of `out`.
fn copy_back(out: &mut Vec<u8>, size: usize, offset: isize, target: usize) -> Result<(), PrsError> {
    let moveback = -offset as usize;
    let src = out
        .len()
        .checked_sub(moveback)
        .ok_or_else(|| PrsError::BadLookBack(moveback, out.len()))?;

    if out.len() + size > target {
        return Err(PrsError::OutputOverflow(out.len() + size, target));
    }

    // the source range may overlap the bytes being written; copying from
    // the front one byte at a time expands runs correctly
    for i in src..src + size {
        let byte = out[i];
        out.push(byte);
    }

    Ok(())
}
