//! Conversions between variable length big integer encodings and the fixed
//! width unsigned buffers a [`CurveEngine`](crate::CurveEngine) consumes.
//!
//! Big integer encodings are minimal two's complement: a non-negative value
//! may carry one leading `0x00` sign byte, or be shorter than the field width
//! once leading zeros are dropped. Nothing here ever truncates.

use std::borrow::Cow;

use crate::{Error, Result};

/// Normalize a scalar to exactly `width` bytes.
///
/// - `width` bytes: returned unchanged
/// - `width + 1` bytes with a leading zero: sign byte stripped
/// - fewer than `width` bytes: left padded with zeros
///
/// Anything else is an encoding error.
pub fn pad_scalar(bytes: &[u8], width: usize) -> Result<Cow<'_, [u8]>> {
    match bytes.len() {
        len if len == width => Ok(Cow::Borrowed(bytes)),
        len if len == width + 1 && bytes[0] == 0 => Ok(Cow::Borrowed(&bytes[1..])),
        len if len < width => {
            let mut padded = vec![0u8; width];
            padded[width - len..].copy_from_slice(bytes);
            Ok(Cow::Owned(padded))
        }
        _ => Err(Error::InvalidKey("scalar does not fit the curve width")),
    }
}

/// Normalize the coordinate pair following `offset` so each coordinate
/// occupies exactly `width` bytes. The `offset` prefix (usually the SEC1 tag
/// byte) is kept as is.
///
/// The remainder must split into two equal halves of at most `width` bytes;
/// an odd or oversized remainder is an encoding error.
pub fn pad_point_pair(bytes: &[u8], offset: usize, width: usize) -> Result<Cow<'_, [u8]>> {
    let (prefix, pair) = bytes
        .split_at_checked(offset)
        .ok_or(Error::InvalidKey("point shorter than its prefix"))?;

    if pair.len() == 2 * width {
        return Ok(Cow::Borrowed(bytes));
    }

    if pair.len() % 2 != 0 || pair.len() > 2 * width {
        return Err(Error::InvalidKey("point coordinates do not fit the curve width"));
    }

    let (x, y) = pair.split_at(pair.len() / 2);
    let pad = width - x.len();
    let mut out = Vec::with_capacity(offset + 2 * width);
    out.extend_from_slice(prefix);
    out.resize(offset + pad, 0);
    out.extend_from_slice(x);
    out.resize(offset + width + pad, 0);
    out.extend_from_slice(y);
    Ok(Cow::Owned(out))
}

/// Fit a message digest into a `width` byte buffer: shorter digests are
/// right aligned, longer digests keep their leftmost `width` bytes.
pub fn align_digest(digest: &[u8], width: usize) -> Vec<u8> {
    let len = digest.len().min(width);
    let mut aligned = vec![0u8; width];
    aligned[width - len..].copy_from_slice(&digest[..len]);
    aligned
}

/// Minimal two's complement encoding of the non-negative big endian integer
/// `unsigned`: leading zeros are dropped and a `0x00` sign byte is added when
/// the top bit is set. Zero encodes as a single `0x00`.
pub fn to_signed_bytes(unsigned: &[u8]) -> Vec<u8> {
    let start = unsigned
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(unsigned.len());
    let digits = &unsigned[start..];

    match digits.first() {
        None => vec![0],
        Some(&b) if b & 0x80 != 0 => {
            let mut out = Vec::with_capacity(digits.len() + 1);
            out.push(0);
            out.extend_from_slice(digits);
            out
        }
        Some(_) => digits.to_vec(),
    }
}
