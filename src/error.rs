use crate::stream::ByteError;
use snafu::Snafu;

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::ReadSnafu { site: site!() }
    };
}

macro_rules! wr {
    () => {
        crate::error::WriteSnafu { site: site!() }
    };
}

macro_rules! invalid_file_s {
    () => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: "[no description]",
        }
    };
    ($msg:expr) => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: $msg,
        }
    };
    ($fmt:expr, $($arg:expr),+) => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: format!($fmt, $($arg),+),
        }
    };
}

macro_rules! invalid_file_e {
    () => {
        invalid_file_s!().build()
    };
    ($msg:expr) => {
        invalid_file_s!($msg).build()
    };
    ($fmt:expr, $($arg:expr),+) => {
        invalid_file_s!($fmt, $($arg),+).build()
    };
}

macro_rules! invalid_file_r {
    () => {
        Err(invalid_file_e!())
    };
    ($msg:expr) => {
        Err(invalid_file_e!($msg))
    };
    ($fmt:expr, $($arg:expr),+) => {
        Err(invalid_file_e!($fmt, $($arg),+))
    };
}

macro_rules! invalid_file {
    () => {
        return invalid_file_r!();
    };
    ($msg:expr) => {
        return invalid_file_r!($msg)
    };
    ($fmt:expr, $($arg:expr),+) => {
        return invalid_file_r!($fmt, $($arg),+)
    };
}

/// Same as `invalid_file!` but for mistakes in how a schema or record was put together.
macro_rules! invalid_schema {
    ($msg:expr) => {
        return crate::error::InvalidSchemaSnafu {
            site: site!(),
            description: $msg,
        }
        .fail()
    };
    ($fmt:expr, $($arg:expr),+) => {
        return crate::error::InvalidSchemaSnafu {
            site: site!(),
            description: format!($fmt, $($arg),+),
        }
        .fail()
    };
}

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// A stable classification of [`Error`], for callers that need to react to a particular failure.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum ErrorKind {
    /// Fewer bytes were available than a fixed-width read required.
    EndOfStream,
    /// The underlying reader or writer failed, or a file could not be opened.
    Io,
    /// An expected chunk identifier (`MThd`, `MTrk`) was not found.
    BadChunkId,
    /// The declared track chunk size does not equal the sum of the decoded event lengths.
    SizeMismatch,
    /// The header uses SMPTE frames-per-second time division.
    UnsupportedTimeDivision,
    /// A meta event subtype that this library does not decode.
    UnknownMetaEventType(u8),
    /// The byte length of a variable-width field was requested before it was read.
    LengthUnavailable,
    /// A keyed nested block has no schema for the key that was decoded.
    UnmatchedKey(u32),
    /// A discriminated payload has no arm for the key that was decoded.
    UnknownVariant(u32),
    /// The data is malformed in some other way.
    InvalidFile,
    /// A schema could not be built, or a record does not fit its schema.
    InvalidSchema,
    /// A value does not have the shape its field expects.
    ValueType,
    /// A value does not fit in the width it is written with.
    OutOfRange,
    /// A [`crate::sink::NoteSink`] could not deliver a message.
    Sink,
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    /// For [`crate::sink::NoteSink`] implementations to report a delivery failure.
    pub fn sink<S: Into<String>>(description: S) -> Self {
        Error(LibError::Sink {
            site: site!(),
            description: description.into(),
        })
    }
}

impl From<Error> for LibError {
    fn from(e: Error) -> Self {
        e.0
    }
}

/// The internal Error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(display("{} Error while reading data: {}", site, source))]
    Read { site: String, source: ByteError },

    #[snafu(display("{} Error while writing data: {}", site, source))]
    Write { site: String, source: ByteError },

    #[snafu(display("{} expected chunk id '{}' but found '{}'", site, expected, found))]
    BadChunkId {
        site: String,
        expected: String,
        found: String,
    },

    #[snafu(display(
        "{} track chunk declares {} bytes but its events add up to {}",
        site,
        declared,
        consumed
    ))]
    SizeMismatch {
        site: String,
        declared: u32,
        consumed: u64,
    },

    #[snafu(display("{} SMPTE time division {:#06X} is not supported", site, division))]
    UnsupportedTimeDivision { site: String, division: u16 },

    #[snafu(display("{} unknown meta event type {}", site, subtype))]
    UnknownMetaEventType { site: String, subtype: u8 },

    #[snafu(display("{} length of {} is unknown until it has been read", site, field))]
    LengthUnavailable { site: String, field: String },

    #[snafu(display("{} no block is declared for key {} of field '{}'", site, key, field))]
    UnmatchedKey {
        site: String,
        field: String,
        key: u32,
    },

    #[snafu(display("{} no payload is declared for key {} of field '{}'", site, key, field))]
    UnknownVariant {
        site: String,
        field: String,
        key: u32,
    },

    #[snafu(display("{}: The MIDI file is invalid: {}", site, description))]
    InvalidFile { site: String, description: String },

    #[snafu(display("{}: invalid schema: {}", site, description))]
    InvalidSchema { site: String, description: String },

    #[snafu(display("{} expected a {} value but found {}", site, expected, found))]
    ValueType {
        site: String,
        expected: String,
        found: String,
    },

    #[snafu(display("{} note sink failed: {}", site, description))]
    Sink { site: String, description: String },
}

impl LibError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            LibError::Read { source, .. } | LibError::Write { source, .. } => source.kind(),
            LibError::BadChunkId { .. } => ErrorKind::BadChunkId,
            LibError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            LibError::UnsupportedTimeDivision { .. } => ErrorKind::UnsupportedTimeDivision,
            LibError::UnknownMetaEventType { subtype, .. } => {
                ErrorKind::UnknownMetaEventType(*subtype)
            }
            LibError::LengthUnavailable { .. } => ErrorKind::LengthUnavailable,
            LibError::UnmatchedKey { key, .. } => ErrorKind::UnmatchedKey(*key),
            LibError::UnknownVariant { key, .. } => ErrorKind::UnknownVariant(*key),
            LibError::InvalidFile { .. } => ErrorKind::InvalidFile,
            LibError::InvalidSchema { .. } => ErrorKind::InvalidSchema,
            LibError::ValueType { .. } => ErrorKind::ValueType,
            LibError::Sink { .. } => ErrorKind::Sink,
        }
    }
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn invalid_file_macros_test_no_message() {
    fn foo() -> LibResult<u64> {
        invalid_file!();
    }
    let result = foo();
    assert!(result.is_err());
    let message = format!("{}", result.err().unwrap());
    assert!(message.as_str().contains("The MIDI file is invalid"));
}

#[test]
fn invalid_file_macros_test_fmt() {
    fn foo() -> LibResult<u64> {
        invalid_file!("hello {}, {}", "world", String::from("foo"));
    }
    let result = foo();
    let e = result.err().unwrap();
    assert_eq!(ErrorKind::InvalidFile, e.kind());
    assert!(format!("{}", e).contains("hello world, foo"));
}

#[test]
fn invalid_schema_macro_test() {
    fn foo() -> LibResult<u64> {
        invalid_schema!("field '{}' is declared twice", "status");
    }
    let e = foo().err().unwrap();
    assert_eq!(ErrorKind::InvalidSchema, e.kind());
    assert!(format!("{}", e).contains("field 'status' is declared twice"));
}

#[test]
fn public_error_kind_test() {
    let inner = UnknownMetaEventTypeSnafu {
        site: site!(),
        subtype: 99u8,
    }
    .build();
    let e = Error::from(inner);
    assert_eq!(ErrorKind::UnknownMetaEventType(99), e.kind());
}
