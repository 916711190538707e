use crate::{
    errors::PrsError,
    format::{ControlWriter, Token, MAX_SHORT_SIZE, SHORT_OFFSET_LIMIT},
};
use std::{
    convert::TryFrom,
    fs::File,
    io::Write,
    io::{BufReader, BufWriter, Cursor, Read},
    path::Path,
};

mod matcher;

use self::matcher::{find_match, BackRef, MatchIndex};
pub use self::matcher::SearchSettings;

type LogWtr<'a> = &'a mut dyn Write;

/// Specify the compression settings, such as search window, logging, input, and output
///
/// To create a new `EncoderBuilder`, use [`for_reader()`], [`for_file()`], or [`for_bytes()`].
/// Then, change any of the search settings with `EncoderBuilder`'s helper methods.
/// Finally, compress the input data with [`encode_to_writer()`], [`encode_to_file()`], or [`encode_to_vec()`].
/// ```
/// # use prs::EncoderBuilder;
/// let input = b"ABBACABBCADFEGABA";
/// let compressed = EncoderBuilder::for_bytes(input)
///     .max_match(265)
///     .encode_to_vec();
/// ```
///
/// The default settings reproduce SEGA's encoder: an 8176-byte window floor
/// and a 256-byte match cap (see [`SearchSettings`]). No logging.
///
/// [`for_reader()`]: EncoderBuilder::for_reader
/// [`for_file()`]: EncoderBuilder::for_file
/// [`for_bytes()`]: EncoderBuilder::for_bytes
/// [`encode_to_writer()`]: EncoderBuilder::encode_to_writer
/// [`encode_to_file()`]: EncoderBuilder::encode_to_file
/// [`encode_to_vec()`]: EncoderBuilder::encode_to_vec
pub struct EncoderBuilder<'a, R> {
    rdr: R,
    settings: SearchSettings,
    log: Option<LogWtr<'a>>,
}

impl<'a, R: Read> EncoderBuilder<'a, R> {
    /// Create a new `EncoderBuilder` for the data in `rdr`.
    ///
    /// The reader is pulled into memory in full before compression starts;
    /// PRS operates on whole buffers.
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            rdr,
            settings: SearchSettings::default(),
            log: None,
        }
    }

    /// Set the settings used for the back-reference search. See [`SearchSettings`] for more details.
    #[inline]
    pub fn with_settings(&mut self, settings: SearchSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Convenience method to set how far back references may reach without
    /// building a [`SearchSettings`].
    #[inline]
    pub fn window_floor(&mut self, floor: usize) -> &mut Self {
        self.settings.window_floor = floor;
        self
    }

    /// Convenience method to set the match-length cap without building a
    /// [`SearchSettings`].
    #[inline]
    pub fn max_match(&mut self, cap: usize) -> &mut Self {
        self.settings.max_match = cap;
        self
    }

    /// Write diagnostic information about every emitted token to `log`
    /// while the input is being compressed.
    #[inline]
    pub fn with_logging<L: Write>(&mut self, log: &'a mut L) -> &mut Self {
        let log = Some(log as &'a mut dyn Write);
        self.log = log;
        self
    }

    /// Start the compression and write the compressed data out to `wtr`
    #[inline]
    pub fn encode_to_writer<W: Write>(&mut self, wtr: W) -> Result<(), PrsError> {
        do_encode(self, wtr)
    }

    /// Start the compression and write the compressed data out to the newly
    /// created `File` `f`
    #[inline]
    pub fn encode_to_file<P: AsRef<Path>>(&mut self, f: P) -> Result<(), PrsError> {
        let wtr = BufWriter::new(File::create(f)?);
        self.encode_to_writer(wtr)
    }

    /// Start the compression and return the compressed data in a `Vec<u8>`.
    #[inline]
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>, PrsError> {
        let data = Vec::new();
        let mut csr = Cursor::new(data);
        self.encode_to_writer(&mut csr).map(|_| csr.into_inner())
    }
}

impl<'a> EncoderBuilder<'a, BufReader<File>> {
    /// Create a new `EncoderBuilder` for the file at `p`.
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, PrsError> {
        let rdr = BufReader::new(File::open(p)?);
        Ok(Self::for_reader(rdr))
    }
}

impl<'a> EncoderBuilder<'a, Cursor<&'a [u8]>> {
    /// Create a new `EncoderBuilder` for the data in the `bytes` slice.
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr)
    }
}

/// Compress data into a PRS `Vec<u8>`
///
/// This is a convenience function to compress a `Read`er without having to
/// import and set up an [`EncoderBuilder`].
pub fn compress<R: Read>(rdr: R) -> Result<Vec<u8>, PrsError> {
    EncoderBuilder::for_reader(rdr).encode_to_vec()
}

/// Compress a byte slice into a PRS `Vec<u8>`.
pub fn compress_bytes(bytes: &[u8]) -> Result<Vec<u8>, PrsError> {
    EncoderBuilder::for_bytes(bytes).encode_to_vec()
}

/// Compress the file at `p` into a PRS `Vec<u8>`.
pub fn compress_file<P: AsRef<Path>>(p: P) -> Result<Vec<u8>, PrsError> {
    EncoderBuilder::for_file(p)?.encode_to_vec()
}

fn do_encode<R: Read, W: Write>(
    opts: &mut EncoderBuilder<'_, R>,
    mut wtr: W,
) -> Result<(), PrsError> {
    let EncoderBuilder {
        rdr,
        settings,
        ref mut log,
    } = opts;

    let mut input = Vec::new();
    rdr.read_to_end(&mut input)?;

    let compressed = compress_buf(&input, *settings, log)?;
    wtr.write_all(&compressed)?;

    Ok(())
}

/// The compression pass: prologue, one token per step, terminator.
///
/// At each position the index is asked for the best permitted match. A
/// usable match inside short-reference reach and size goes out as the
/// one-byte short form; anything longer or farther takes the long form.
/// No match (or a bare 2-byte match that drifted out of short reach)
/// falls back to a literal.
pub(crate) fn compress_buf(
    input: &[u8],
    settings: SearchSettings,
    log: &mut Option<&mut dyn Write>,
) -> Result<Vec<u8>, PrsError> {
    if input.len() < 2 {
        return Err(PrsError::InputTooShort(input.len()));
    }
    // the match index tracks positions as 32-bit values
    u32::try_from(input.len())?;

    let mut index = MatchIndex::new(input);
    let mut out = ControlWriter::begin(input.len(), input[0], input[1]);

    let mut pos = 2;
    while pos < input.len() {
        let token = match find_match(input, pos, &mut index, &settings) {
            None => Token::Literal(input[pos]),
            Some(BackRef { size, src }) if pos - src > SHORT_OFFSET_LIMIT && size < 3 => {
                Token::Literal(input[pos])
            }
            Some(BackRef { size, src })
                if size <= MAX_SHORT_SIZE && pos - src < SHORT_OFFSET_LIMIT =>
            {
                Token::ShortRef {
                    size,
                    offset: src as isize - pos as isize,
                }
            }
            Some(BackRef { size, src }) => Token::LongRef {
                size,
                offset: src as isize - pos as isize,
            },
        };

        if let Some(wtr) = log.as_mut() {
            log_token(wtr, pos, &token)?;
        }

        token.write(&mut out)?;
        pos += token.decoded_size();
    }

    Token::End.write(&mut out)?;

    if let Some(wtr) = log.as_mut() {
        writeln!(wtr, "packed {} bytes into {}", input.len(), out.len())?;
    }

    Ok(out.into_vec())
}

fn log_token(wtr: &mut dyn Write, pos: usize, token: &Token) -> Result<(), PrsError> {
    match *token {
        Token::Literal(byte) => writeln!(wtr, "{:06x} - literal: {:02x}", pos, byte)?,
        Token::ShortRef { size, offset } => {
            writeln!(wtr, "{:06x} - short copy: size: {} mb: {}", pos, size, -offset)?
        }
        Token::LongRef { size, offset } => {
            writeln!(wtr, "{:06x} - long copy: size: {} mb: {}", pos, size, -offset)?
        }
        Token::End => {}
    }

    Ok(())
}
