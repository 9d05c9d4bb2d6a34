use base64::DecodeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("der: unexpected end of input")]
    Truncated,
    #[error("der: parser error {0:?}")]
    Parser(nom::error::ErrorKind),
    #[error("der: expected tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },
    #[error("der: indefinite length is not allowed")]
    IndefiniteLength,
    #[error("der: length is not minimally encoded")]
    NonMinimalLength,
    #[error("der: length does not fit in memory")]
    LengthOverflow,
    #[error("der: integer is not minimally encoded")]
    NonMinimalInteger,
    #[error("der: negative integer")]
    NegativeInteger,
    #[error("der: invalid {0} value")]
    InvalidValue(&'static str),
    #[error("der: {0} trailing bytes")]
    TrailingData(usize),

    #[error("pem: missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,
    #[error("pem: missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,
    #[error("pem: invalid label `{0}`")]
    InvalidLabel(String),
    #[error("pem: label `{begin}` doesn't match `{end}`")]
    LabelMismatch { begin: String, end: String },
    #[error("pem: missing data")]
    MissingData,
    #[error("pem: base64 decode: {0}")]
    Base64Decode(DecodeError),
}

impl<'a> nom::error::ParseError<&'a [u8]> for EncodeError {
    fn from_error_kind(_input: &'a [u8], kind: nom::error::ErrorKind) -> Self {
        match kind {
            nom::error::ErrorKind::Eof => EncodeError::Truncated,
            kind => EncodeError::Parser(kind),
        }
    }

    fn append(_input: &'a [u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<EncodeError>> for EncodeError {
    fn from(value: nom::Err<EncodeError>) -> Self {
        match value {
            nom::Err::Incomplete(_) => EncodeError::Truncated,
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}
