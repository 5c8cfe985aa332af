//! Store file format parser using nom
//!
//! File format:
//! ```text
//! ASSETS1\n
//! [version: u32]
//! [record_count: u32]
//! ...records...
//! ```
//!
//! Record format:
//! ```text
//! [key_len: u32][value_len: u32][key bytes][value bytes]
//! ```
//!
//! All integers are little-endian. A key may appear more than once; the
//! last record wins on replay.

use nom::{
    bytes::complete::{tag, take},
    number::complete::le_u32,
    sequence::tuple,
    IResult,
};

use crate::error::{Error, Result};

/// Magic header for store files
pub const STORE_MAGIC: &[u8] = b"ASSETS1\n";

/// Total header length in bytes
pub const HEADER_LEN: usize = STORE_MAGIC.len() + 8;

/// Current file format version
pub const FORMAT_VERSION: u32 = 1;

/// Store file header
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHeader {
    /// File format version
    pub version: u32,
    /// Number of records as of the last clean close
    pub record_count: u32,
}

/// A single key/value record borrowed from the file contents
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    /// Raw key bytes
    pub key: &'a [u8],
    /// Raw value bytes
    pub value: &'a [u8],
}

fn header(input: &[u8]) -> IResult<&[u8], StoreHeader> {
    let (input, _) = tag(STORE_MAGIC)(input)?;
    let (input, (version, record_count)) = tuple((le_u32, le_u32))(input)?;
    Ok((input, StoreHeader { version, record_count }))
}

/// Parse the store file header
pub fn parse_header(input: &[u8]) -> Result<StoreHeader> {
    if input.len() < HEADER_LEN {
        return Err(Error::Parse("Input too short for header".to_string()));
    }

    if !input.starts_with(STORE_MAGIC) {
        return Err(Error::Parse("Invalid store magic header".to_string()));
    }

    let (_, header) = header(input)?;
    Ok(header)
}

/// Create a store file header
pub fn create_header(version: u32, record_count: u32) -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(STORE_MAGIC);
    header.extend_from_slice(&version.to_le_bytes());
    header.extend_from_slice(&record_count.to_le_bytes());
    header
}

/// Parse one length-prefixed record
pub fn parse_record(input: &[u8]) -> IResult<&[u8], Record<'_>> {
    let (input, (key_len, value_len)) = tuple((le_u32, le_u32))(input)?;
    let (input, key) = take(key_len)(input)?;
    let (input, value) = take(value_len)(input)?;
    Ok((input, Record { key, value }))
}

/// Encode a record for appending to the data file
pub fn encode_record(key: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    let key_len = u32::try_from(key.len()).map_err(|_| Error::RecordTooLarge(key.len()))?;
    let value_len = u32::try_from(value.len()).map_err(|_| Error::RecordTooLarge(value.len()))?;

    let mut buf = Vec::with_capacity(8 + key.len() + value.len());
    buf.extend_from_slice(&key_len.to_le_bytes());
    buf.extend_from_slice(&value_len.to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    Ok(buf)
}

/// Parse every complete record in `body`.
///
/// Returns the records and the number of bytes they span. Anything past
/// that point is a torn trailing write.
pub fn parse_records(body: &[u8]) -> (Vec<Record<'_>>, usize) {
    let mut records = Vec::new();
    let mut rest = body;

    while !rest.is_empty() {
        match parse_record(rest) {
            Ok((remaining, record)) => {
                records.push(record);
                rest = remaining;
            }
            Err(_) => break,
        }
    }

    (records, body.len() - rest.len())
}
