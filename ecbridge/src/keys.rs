//! High level key objects.
//!
//! Keys hold their material in the variable length form key APIs hand out
//! (signed big endian scalars, points whose coordinates may be shorter than
//! the field) and convert to the fixed width engine form on demand.

use core::fmt;
use std::borrow::Cow;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    curve::{CurveDescriptor, CurveId, CurveKind},
    normalize::{pad_point_pair, pad_scalar, to_signed_bytes},
    Error, Gateway, Result,
};

/// SEC1 tag of an uncompressed point.
pub(crate) const UNCOMPRESSED_TAG: u8 = 0x04;

/// Private key.
///
/// For Weierstrass curves the scalar is a signed big endian integer. For
/// Montgomery curves it is the raw little endian secret as defined by
/// RFC 7748.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EcPrivateKey {
    #[zeroize(skip)]
    curve: CurveId,
    encoded: Vec<u8>,
}

impl EcPrivateKey {
    /// Wrap an encoded private key for `curve`.
    pub fn new(curve: CurveId, encoded: impl Into<Vec<u8>>) -> Self {
        Self {
            curve,
            encoded: encoded.into(),
        }
    }

    /// Wrap the fixed width engine form of a private key.
    pub fn from_native(curve: CurveId, native: &[u8]) -> Result<Self> {
        let descriptor = curve.require()?;
        if native.len() != descriptor.width {
            return Err(Error::InvalidKey("private key length does not match curve"));
        }

        let encoded = match descriptor.kind {
            CurveKind::Weierstrass => to_signed_bytes(native),
            CurveKind::Montgomery => native.to_vec(),
        };
        Ok(Self { curve, encoded })
    }

    /// Curve this key belongs to.
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// Encoded form as it was supplied.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    pub fn as_encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Fixed width engine form of this key.
    pub fn to_native(&self) -> Result<Zeroizing<Vec<u8>>> {
        let descriptor = self.curve.require()?;
        self.to_native_for(descriptor)
    }

    pub(crate) fn to_native_for(&self, curve: &CurveDescriptor) -> Result<Zeroizing<Vec<u8>>> {
        match curve.kind {
            CurveKind::Weierstrass => {
                if self.encoded.first().map_or(true, |b| b & 0x80 != 0) {
                    return Err(Error::InvalidKey("private scalar is negative or empty"));
                }
                Ok(Zeroizing::new(pad_scalar(&self.encoded, curve.width)?.into_owned()))
            }
            CurveKind::Montgomery if self.encoded.len() == curve.width => {
                Ok(Zeroizing::new(self.encoded.clone()))
            }
            CurveKind::Montgomery => Err(Error::InvalidKey(
                "private key length does not match curve",
            )),
        }
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

/// Public key.
///
/// Weierstrass points are SEC1 uncompressed (`0x04 || x || y`) with two
/// equal length coordinates that may be shorter than the field width.
/// Montgomery keys are the raw u-coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcPublicKey {
    curve: CurveId,
    encoded: Vec<u8>,
}

impl EcPublicKey {
    /// Wrap an encoded public key for `curve`.
    pub fn new(curve: CurveId, encoded: impl Into<Vec<u8>>) -> Self {
        Self {
            curve,
            encoded: encoded.into(),
        }
    }

    /// Build an uncompressed point from two big endian affine coordinates,
    /// either of which may carry a sign byte or be missing leading zeros.
    pub fn from_affine_coordinates(curve: CurveId, x: &[u8], y: &[u8]) -> Self {
        let x = strip_leading_zeros(x);
        let y = strip_leading_zeros(y);
        let len = x.len().max(y.len());

        let mut encoded = vec![0u8; 1 + 2 * len];
        encoded[0] = UNCOMPRESSED_TAG;
        encoded[1 + len - x.len()..1 + len].copy_from_slice(x);
        encoded[1 + 2 * len - y.len()..].copy_from_slice(y);
        Self { curve, encoded }
    }

    /// Curve this key belongs to.
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// Encoded form as it was supplied.
    pub fn as_encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Fixed width engine form of this key.
    pub fn to_native(&self) -> Result<Cow<'_, [u8]>> {
        let descriptor = self.curve.require()?;
        self.to_native_for(descriptor)
    }

    pub(crate) fn to_native_for(&self, curve: &CurveDescriptor) -> Result<Cow<'_, [u8]>> {
        let native = match curve.kind {
            CurveKind::Weierstrass => {
                if self.encoded.first() != Some(&UNCOMPRESSED_TAG) {
                    return Err(Error::InvalidKey("public key is not an uncompressed point"));
                }
                pad_point_pair(&self.encoded, 1, curve.width)?
            }
            CurveKind::Montgomery => Cow::Borrowed(self.encoded.as_slice()),
        };

        if native.len() != curve.public_key_len() {
            return Err(Error::InvalidKey("public key length does not match curve"));
        }
        Ok(native)
    }
}

/// Private key together with its public key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// Private half.
    pub private_key: EcPrivateKey,
    /// Public half.
    pub public_key: EcPublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair on `curve`. A `seed` makes generation
    /// reproducible.
    pub fn generate(gateway: &Gateway, curve: CurveId, seed: Option<&[u8]>) -> Result<Self> {
        let descriptor = curve.require()?;
        let mut private = Zeroizing::new(vec![0u8; descriptor.width]);
        let mut public = vec![0u8; descriptor.public_key_len()];
        gateway.generate_key_pair(curve, seed, &mut private, &mut public)?;

        Ok(Self {
            private_key: EcPrivateKey::from_native(curve, &private)?,
            public_key: EcPublicKey::new(curve, public),
        })
    }

    /// Derive the public half of `private_key`.
    pub fn from_private_key(gateway: &Gateway, private_key: EcPrivateKey) -> Result<Self> {
        let descriptor = private_key.curve().require()?;
        let native = private_key.to_native_for(descriptor)?;
        let mut public = vec![0u8; descriptor.public_key_len()];
        gateway.compute_public_key(private_key.curve(), &native, &mut public)?;

        Ok(Self {
            public_key: EcPublicKey::new(private_key.curve(), public),
            private_key,
        })
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_scalar_normalizes() {
        let mut encoded = vec![0u8];
        encoded.extend_from_slice(&[0x80; 32]);
        let key = EcPrivateKey::new(CurveId::SM2, encoded);
        assert_eq!(key.to_native().unwrap().as_slice(), &[0x80; 32]);

        let key = EcPrivateKey::new(CurveId::P384, vec![1, 2]);
        let native = key.to_native().unwrap();
        assert_eq!(native.len(), 48);
        assert_eq!(&native[46..], &[1, 2]);
    }

    #[test]
    fn negative_scalar_is_rejected() {
        let key = EcPrivateKey::new(CurveId::P256, vec![0xff; 32]);
        assert!(matches!(key.to_native(), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn native_round_trip() {
        let native = [0xc4; 32];
        let key = EcPrivateKey::from_native(CurveId::P256, &native).unwrap();
        assert_eq!(key.as_encoded().len(), 33);
        assert_eq!(key.to_native().unwrap().as_slice(), &native);

        let key = EcPrivateKey::from_native(CurveId::X25519, &native).unwrap();
        assert_eq!(key.as_encoded(), &native);
    }

    #[test]
    fn private_key_debug_is_redacted() {
        let key = EcPrivateKey::new(CurveId::SM2, vec![0x42; 32]);
        assert_eq!(format!("{key:?}"), "EcPrivateKey { curve: CurveId(1172), .. }");
    }

    #[test]
    fn short_coordinates_are_padded() {
        let key = EcPublicKey::from_affine_coordinates(CurveId::P256, &[0, 0x81, 1], &[0x11; 31]);
        assert_eq!(key.as_encoded().len(), 63);

        let native = key.to_native().unwrap();
        assert_eq!(native.len(), 65);
        assert_eq!(native[0], UNCOMPRESSED_TAG);
        assert_eq!(&native[31..33], &[0x81, 1]);
        assert_eq!(native[33], 0);
        assert_eq!(&native[34..], &[0x11; 31]);
    }

    #[test]
    fn compressed_point_is_rejected() {
        let key = EcPublicKey::new(CurveId::P256, vec![0x02; 33]);
        assert!(key.to_native().is_err());
    }

    #[test]
    fn montgomery_keys_need_exact_width() {
        let key = EcPublicKey::new(CurveId::X25519, vec![9; 56]);
        assert!(key.to_native().is_err());
        let key = EcPrivateKey::new(CurveId::X448, vec![9; 32]);
        assert!(key.to_native().is_err());
    }
}
