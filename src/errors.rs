use std::{error::Error, fmt, io, num::TryFromIntError};

/// Possible errors that arise from compressing or decompressing PRS data
#[derive(Debug)]
#[non_exhaustive]
pub enum PrsError {
    InputTooShort(usize),
    InputTooBig(TryFromIntError),
    ShortRefSize(usize),
    ShortRefOffset(isize),
    LongRefSize(usize),
    LongRefOffset(isize),
    UnexpectedEof,
    BadLookBack(usize, usize),
    OutputOverflow(usize, usize),
    Io(io::Error),
}

impl fmt::Display for PrsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrsError::InputTooShort(n) => {
                write!(f, "Input is {} bytes but at least 2 are needed", n)
            }
            PrsError::InputTooBig(_) => write!(f, "Input size too big to fit in 32-bit word"),
            PrsError::ShortRefSize(s) => {
                write!(f, "Short reference size is {} but expected 2 to 5", s)
            }
            PrsError::ShortRefOffset(o) => {
                write!(f, "Short reference offset is {} but expected -256 to -1", o)
            }
            PrsError::LongRefSize(s) => {
                write!(f, "Long reference size is {} but expected 3 to 265", s)
            }
            PrsError::LongRefOffset(o) => {
                write!(f, "Long reference offset is {} but expected -8192 to -1", o)
            }
            PrsError::UnexpectedEof => write!(f, "Read past end of input"),
            PrsError::BadLookBack(mb, written) => write!(
                f,
                "Bad input: asked to move back {} bytes in buffer of only {} bytes",
                mb, written
            ),
            PrsError::OutputOverflow(needed, declared) => write!(
                f,
                "Bad input: token grows output to {} bytes but only {} were declared",
                needed, declared
            ),
            PrsError::Io(_) => write!(f, "IO issue"),
        }
    }
}

impl Error for PrsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PrsError::InputTooBig(e) => Some(e as &dyn Error),
            PrsError::Io(e) => Some(e as &dyn Error),
            _ => None,
        }
    }
}

impl From<io::Error> for PrsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<TryFromIntError> for PrsError {
    fn from(e: TryFromIntError) -> Self {
        Self::InputTooBig(e)
    }
}
