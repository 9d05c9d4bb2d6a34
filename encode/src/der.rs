//! Distinguished Encoding Rules, limited to what RSA key documents use.
//!
//! Parsing is strict: definite minimal lengths, minimal non-negative INTEGERs, no trailing bytes
//! once a reader is finished. Anything else is rejected rather than repaired.

use crate::EncodeError;
use nom::{IResult, Parser};

type DerResult<'a, T> = IResult<&'a [u8], T, EncodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Sequence,
    Other(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Tag::Integer,
            0x03 => Tag::BitString,
            0x04 => Tag::OctetString,
            0x05 => Tag::Null,
            0x06 => Tag::ObjectIdentifier,
            0x30 => Tag::Sequence,
            x => Tag::Other(x),
        }
    }
}

impl From<Tag> for u8 {
    fn from(value: Tag) -> Self {
        match value {
            Tag::Integer => 0x02,
            Tag::BitString => 0x03,
            Tag::OctetString => 0x04,
            Tag::Null => 0x05,
            Tag::ObjectIdentifier => 0x06,
            Tag::Sequence => 0x30,
            Tag::Other(x) => x,
        }
    }
}

/// one TLV, the value borrows from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub tag: Tag,
    pub value: &'a [u8],
}

pub fn parse_tag(input: &[u8]) -> DerResult<'_, Tag> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    Ok((input, Tag::from(n)))
}

pub fn parse_length(input: &[u8]) -> DerResult<'_, usize> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0 {
        // short form: 0-127
        return Ok((input, n as usize));
    }

    // long form, the low 7 bits count the length octets that follow
    let count = (n & 0x7f) as usize;
    if count == 0 {
        return Err(nom::Err::Error(EncodeError::IndefiniteLength));
    }
    if count > std::mem::size_of::<usize>() {
        return Err(nom::Err::Error(EncodeError::LengthOverflow));
    }

    let (input, bs) = nom::bytes::complete::take(count).parse(input)?;
    if bs[0] == 0 {
        return Err(nom::Err::Error(EncodeError::NonMinimalLength));
    }

    let len = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
    if len < 0x80 {
        return Err(nom::Err::Error(EncodeError::NonMinimalLength));
    }

    Ok((input, len))
}

pub fn parse_tlv(input: &[u8]) -> DerResult<'_, Tlv<'_>> {
    let (input, tag) = parse_tag(input)?;
    let (input, length) = parse_length(input)?;
    let (input, value) = nom::bytes::complete::take(length).parse(input)?;
    Ok((input, Tlv { tag, value }))
}

/// Sequential reader over the contents of one constructed value.
#[derive(Debug, Clone, Copy)]
pub struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn peek_tag(&self) -> Option<Tag> {
        self.input.first().map(|&x| Tag::from(x))
    }

    pub fn read_any(&mut self) -> Result<Tlv<'a>, EncodeError> {
        let (rest, tlv) = parse_tlv(self.input)?;
        self.input = rest;
        Ok(tlv)
    }

    fn read_expected(&mut self, expected: Tag) -> Result<&'a [u8], EncodeError> {
        let tlv = self.read_any()?;
        if tlv.tag != expected {
            return Err(EncodeError::UnexpectedTag {
                expected: expected.into(),
                found: tlv.tag.into(),
            });
        }
        Ok(tlv.value)
    }

    pub fn read_sequence(&mut self) -> Result<DerReader<'a>, EncodeError> {
        self.read_expected(Tag::Sequence).map(DerReader::new)
    }

    /// magnitude of a non-negative INTEGER, big-endian without the sign octet; zero is `[0]`
    pub fn read_uint(&mut self) -> Result<&'a [u8], EncodeError> {
        let c = self.read_expected(Tag::Integer)?;
        match c {
            [] => Err(EncodeError::InvalidValue("integer")),
            [0x00, b, ..] if b & 0x80 == 0 => Err(EncodeError::NonMinimalInteger),
            [0xff, b, ..] if b & 0x80 != 0 => Err(EncodeError::NonMinimalInteger),
            [a, ..] if a & 0x80 != 0 => Err(EncodeError::NegativeInteger),
            [0x00, rest @ ..] if !rest.is_empty() => Ok(rest),
            _ => Ok(c),
        }
    }

    /// small INTEGER such as a version field
    pub fn read_u64(&mut self) -> Result<u64, EncodeError> {
        let c = self.read_uint()?;
        if c.len() > 8 {
            return Err(EncodeError::InvalidValue("small integer"));
        }
        Ok(c.iter().fold(0u64, |n, &b| (n << 8) | b as u64))
    }

    pub fn read_null(&mut self) -> Result<(), EncodeError> {
        let c = self.read_expected(Tag::Null)?;
        if !c.is_empty() {
            return Err(EncodeError::InvalidValue("null"));
        }
        Ok(())
    }

    /// content octets of an OBJECT IDENTIFIER
    pub fn read_oid(&mut self) -> Result<&'a [u8], EncodeError> {
        let c = self.read_expected(Tag::ObjectIdentifier)?;
        if c.is_empty() || c.last().is_some_and(|&x| x & 0x80 != 0) {
            return Err(EncodeError::InvalidValue("object identifier"));
        }
        Ok(c)
    }

    /// BIT STRING holding whole octets (no unused bits)
    pub fn read_bit_string(&mut self) -> Result<&'a [u8], EncodeError> {
        match self.read_expected(Tag::BitString)? {
            [0x00, rest @ ..] => Ok(rest),
            _ => Err(EncodeError::InvalidValue("bit string")),
        }
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8], EncodeError> {
        self.read_expected(Tag::OctetString)
    }

    pub fn finish(self) -> Result<(), EncodeError> {
        match self.input.len() {
            0 => Ok(()),
            n => Err(EncodeError::TrailingData(n)),
        }
    }
}

/// dotted form of OBJECT IDENTIFIER content octets, for diagnostics
pub fn oid_to_string(content: &[u8]) -> String {
    let mut arcs = Vec::new();
    let mut cur = 0u128;
    for &b in content {
        cur = (cur << 7) | (b & 0x7f) as u128;
        if b & 0x80 == 0 {
            arcs.push(cur);
            cur = 0;
        }
    }

    let mut s = String::new();
    for (i, arc) in arcs.into_iter().enumerate() {
        if i == 0 {
            let first = (arc / 40).min(2);
            s.push_str(&format!("{}.{}", first, arc - first * 40));
        } else {
            s.push_str(&format!(".{}", arc));
        }
    }
    s
}

#[derive(Debug, Default, Clone)]
pub struct DerWriter {
    buf: Vec<u8>,
}

impl DerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_tlv(&mut self, tag: Tag, content: &[u8]) -> &mut Self {
        self.buf.push(tag.into());
        encode_length(content.len(), &mut self.buf);
        self.buf.extend_from_slice(content);
        self
    }

    /// non-negative INTEGER from its big-endian magnitude
    pub fn write_uint(&mut self, magnitude: &[u8]) -> &mut Self {
        let start = magnitude
            .iter()
            .position(|&x| x != 0)
            .unwrap_or(magnitude.len());
        let m = &magnitude[start..];

        match m.first() {
            None => self.write_tlv(Tag::Integer, &[0]),
            Some(&x) if x & 0x80 != 0 => {
                let mut content = Vec::with_capacity(m.len() + 1);
                content.push(0);
                content.extend_from_slice(m);
                self.write_tlv(Tag::Integer, &content)
            }
            Some(_) => self.write_tlv(Tag::Integer, m),
        }
    }

    pub fn write_u64(&mut self, x: u64) -> &mut Self {
        self.write_uint(&x.to_be_bytes())
    }

    pub fn write_null(&mut self) -> &mut Self {
        self.write_tlv(Tag::Null, &[])
    }

    pub fn write_oid(&mut self, content: &[u8]) -> &mut Self {
        self.write_tlv(Tag::ObjectIdentifier, content)
    }

    pub fn write_bit_string(&mut self, bytes: &[u8]) -> &mut Self {
        let mut content = Vec::with_capacity(bytes.len() + 1);
        content.push(0);
        content.extend_from_slice(bytes);
        self.write_tlv(Tag::BitString, &content)
    }

    pub fn write_octet_string(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_tlv(Tag::OctetString, bytes)
    }

    pub fn write_sequence<F: FnOnce(&mut DerWriter)>(&mut self, f: F) -> &mut Self {
        let mut inner = DerWriter::new();
        f(&mut inner);
        self.write_tlv(Tag::Sequence, &inner.buf)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

fn encode_length(len: usize, buf: &mut Vec<u8>) {
    if len < 0x80 {
        buf.push(len as u8);
        return;
    }

    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&x| x != 0).unwrap_or(bytes.len() - 1);
    buf.push(0x80 | (bytes.len() - start) as u8);
    buf.extend_from_slice(&bytes[start..]);
}
