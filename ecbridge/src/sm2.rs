//! SM2 public key protocols as defined in GM/T 0003-2012.
//!
//! The engines in this module handle key normalization, identity defaulting
//! and protocol state; the curve arithmetic is delegated to a
//! [`Gateway`](crate::Gateway).

pub mod cipher;
pub mod key_agreement;
pub mod signature;

use core::cmp::min;

use elliptic_curve::bigint::{ArrayEncoding, U256};
use sm3::{Digest, Sm3};

use crate::{Error, Result};

/// Identity used when the caller does not provide one: the ASCII string
/// `1234567812345678`.
pub const DEFAULT_ID: &[u8; 16] = b"1234567812345678";

/// Scalar and coordinate width of the SM2 curve.
pub const WIDTH: usize = 32;

/// Length of an uncompressed SM2 point.
pub const POINT_LEN: usize = 2 * WIDTH + 1;

/// Length of an SM3 digest.
pub const DIGEST_LEN: usize = 32;

/// Largest identity whose bit length fits the 16-bit `ENTL` field.
pub const MAX_ID_LEN: usize = 0xffff / 8;

/// Exclusive upper bound on a derived key length in bytes, set by the 32-bit
/// KDF counter.
pub const KDF_LEN_LIMIT: u64 = u32::MAX as u64 * DIGEST_LEN as u64;

/// Order of the SM2 group.
pub(crate) const ORDER: U256 =
    U256::from_be_hex("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123");

const EQUATION_A: U256 =
    U256::from_be_hex("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC");
const EQUATION_B: U256 =
    U256::from_be_hex("28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93");
const GENERATOR_X: U256 =
    U256::from_be_hex("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7");
const GENERATOR_Y: U256 =
    U256::from_be_hex("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0");

/// Ciphertext component ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// `C1 || C2 || C3`, the layout of the 2010 draft.
    C1C2C3,
    /// `C1 || C3 || C2`, the layout of GM/T 0003-2012.
    #[default]
    C1C3C2,
}

/// Compute the user information hash
///
/// ```text
/// Z = SM3(ENTL || ID || a || b || xG || yG || xA || yA)
/// ```
///
/// over an uncompressed public key.
pub fn hash_z(id: &[u8], public_key: &[u8]) -> Result<[u8; DIGEST_LEN]> {
    let entl: u16 = id
        .len()
        .checked_mul(8)
        .and_then(|l| l.try_into().ok())
        .ok_or(Error::InvalidParameter("identity too long"))?;

    let coordinates = match public_key.split_first() {
        Some((&0x04, xy)) if xy.len() == 2 * WIDTH => xy,
        _ => return Err(Error::InvalidKey("public key is not an uncompressed point")),
    };

    let mut sm3 = Sm3::new();
    sm3.update(entl.to_be_bytes());
    sm3.update(id);
    sm3.update(EQUATION_A.to_be_byte_array());
    sm3.update(EQUATION_B.to_be_byte_array());
    sm3.update(GENERATOR_X.to_be_byte_array());
    sm3.update(GENERATOR_Y.to_be_byte_array());
    sm3.update(coordinates);
    Ok(sm3.finalize().into())
}

/// SM3 based key derivation: fill `out` with
/// `SM3(z || 1) || SM3(z || 2) || ...` truncated to its length.
///
/// Callers keep `out` shorter than [`KDF_LEN_LIMIT`].
pub fn kdf(z: &[&[u8]], out: &mut [u8]) {
    let mut ct: u32 = 1;
    let mut offset = 0;
    let mut hasher = Sm3::new();

    while offset < out.len() {
        for part in z {
            hasher.update(part);
        }
        hasher.update(ct.to_be_bytes());
        let ha = hasher.finalize_reset();

        let len = min(DIGEST_LEN, out.len() - offset);
        out[offset..offset + len].copy_from_slice(&ha[..len]);
        offset += len;
        ct = ct.wrapping_add(1);
    }
}

/// Check that a fixed width scalar lies in `[1, n - 2]`, the range required
/// of SM2 signing keys.
pub fn check_signing_scalar(scalar: &[u8]) -> Result<()> {
    check_scalar(scalar, ORDER.wrapping_sub(&U256::from_u8(2)))
}

/// Check that a fixed width scalar lies in `[1, n - 1]`.
pub fn check_private_scalar(scalar: &[u8]) -> Result<()> {
    check_scalar(scalar, ORDER.wrapping_sub(&U256::ONE))
}

fn check_scalar(scalar: &[u8], max: U256) -> Result<()> {
    if scalar.len() != WIDTH {
        return Err(Error::InvalidKey("private key length does not match curve"));
    }

    let value = U256::from_be_slice(scalar);
    if value == U256::ZERO || value > max {
        return Err(Error::InvalidKey("private scalar out of range"));
    }
    Ok(())
}
