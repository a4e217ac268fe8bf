//! Curve registry.
//!
//! Maps curve names and DER encoded object identifiers onto a [`CurveId`]
//! and records the fixed field width every buffer handed to a
//! [`CurveEngine`](crate::CurveEngine) must have.
//!
//! Identifiers reuse the OpenSSL NID numbering so they can be passed to a
//! native backend unchanged.

use core::fmt;

use crate::{Error, Result};

/// Numeric curve identifier. [`CurveId::UNSUPPORTED`] is the sentinel for
/// anything the registry does not know.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveId(i32);

/// Shape of the curve equation, which decides the public key encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    /// Short Weierstrass curve. Public keys are uncompressed SEC1 points.
    Weierstrass,
    /// Montgomery curve used for X25519/X448. Public keys are u-coordinates.
    Montgomery,
}

/// Static description of a supported curve.
#[derive(Debug)]
pub struct CurveDescriptor {
    /// Canonical name.
    pub name: &'static str,
    /// Alternate names accepted by [`CurveId::from_name`].
    pub aliases: &'static [&'static str],
    /// DER encoding of the curve OID, including tag and length.
    pub oid: &'static [u8],
    /// Identifier passed to the engine.
    pub id: CurveId,
    /// Scalar and coordinate width in bytes.
    pub width: usize,
    /// Curve shape.
    pub kind: CurveKind,
    /// Whether the engine's digest signing primitive supports this curve.
    pub signature: bool,
}

impl CurveDescriptor {
    /// Length of an encoded public key: `2 * width + 1` for Weierstrass
    /// curves, `width` for Montgomery curves.
    pub const fn public_key_len(&self) -> usize {
        match self.kind {
            CurveKind::Weierstrass => 2 * self.width + 1,
            CurveKind::Montgomery => self.width,
        }
    }

    /// Length of a raw `r || s` signature.
    pub const fn signature_len(&self) -> usize {
        2 * self.width
    }

    /// Fail with [`Error::UnsupportedCurve`] unless the curve can sign.
    pub fn require_signature(&self) -> Result<()> {
        if self.signature {
            Ok(())
        } else {
            Err(Error::UnsupportedCurve(self.name))
        }
    }
}

impl CurveId {
    /// Sentinel for curves the registry does not know.
    pub const UNSUPPORTED: Self = Self(-1);
    /// NIST P-256 (secp256r1).
    pub const P256: Self = Self(415);
    /// NIST P-384 (secp384r1).
    pub const P384: Self = Self(715);
    /// NIST P-521 (secp521r1).
    pub const P521: Self = Self(716);
    /// SM2 curve from GM/T 0003-2012.
    pub const SM2: Self = Self(1172);
    /// Curve25519 in Montgomery form, used for X25519.
    pub const X25519: Self = Self(1034);
    /// Curve448 in Montgomery form, used for X448.
    pub const X448: Self = Self(1035);

    /// Construct from a raw identifier. Unknown values map to
    /// [`CurveId::UNSUPPORTED`].
    pub fn from_raw(raw: i32) -> Self {
        CURVES
            .iter()
            .find(|c| c.id.0 == raw)
            .map_or(Self::UNSUPPORTED, |c| c.id)
    }

    /// Resolve a curve by case-insensitive name.
    pub fn from_name(name: &str) -> Self {
        match CURVES.iter().find(|c| {
            c.name.eq_ignore_ascii_case(name)
                || c.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        }) {
            Some(c) => c.id,
            None => {
                tracing::debug!(name, "unknown curve name");
                Self::UNSUPPORTED
            }
        }
    }

    /// Resolve a curve by its DER encoded OID (tag `0x06`, length, value).
    pub fn from_oid(der: &[u8]) -> Self {
        match CURVES.iter().find(|c| c.oid == der) {
            Some(c) => c.id,
            None => {
                tracing::debug!(len = der.len(), "unknown curve OID");
                Self::UNSUPPORTED
            }
        }
    }

    /// Raw identifier value.
    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Is this the [`CurveId::UNSUPPORTED`] sentinel?
    pub const fn is_unsupported(self) -> bool {
        self.0 == Self::UNSUPPORTED.0
    }

    /// Look up the descriptor for this identifier.
    pub fn descriptor(self) -> Option<&'static CurveDescriptor> {
        CURVES.iter().find(|c| c.id == self)
    }

    /// Look up the descriptor, failing with [`Error::UnsupportedCurve`].
    pub fn require(self) -> Result<&'static CurveDescriptor> {
        self.descriptor()
            .ok_or(Error::UnsupportedCurve("unknown curve identifier"))
    }

    /// Scalar width in bytes, if the curve is known.
    pub fn width(self) -> Option<usize> {
        self.descriptor().map(|c| c.width)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.descriptor() {
            Some(c) => f.write_str(c.name),
            None => f.write_str("unsupported"),
        }
    }
}

/// Is `oid` a Weierstrass curve handled by the engine?
pub fn is_ec_curve_oid(oid: &[u8]) -> bool {
    CurveId::from_oid(oid)
        .descriptor()
        .is_some_and(|c| c.kind == CurveKind::Weierstrass)
}

/// Is `oid` a curve the engine's digest signing primitive supports?
pub fn is_ecdsa_curve_oid(oid: &[u8]) -> bool {
    CurveId::from_oid(oid)
        .descriptor()
        .is_some_and(|c| c.signature)
}

/// Is `name` one of the Montgomery curves used for XDH?
pub fn is_xdh_curve_name(name: &str) -> bool {
    CurveId::from_name(name)
        .descriptor()
        .is_some_and(|c| c.kind == CurveKind::Montgomery)
}

/// Every curve known to the registry.
pub static CURVES: &[CurveDescriptor] = &[
    CurveDescriptor {
        name: "secp256r1",
        aliases: &["P-256", "prime256v1", "NIST P-256"],
        oid: &[0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07],
        id: CurveId::P256,
        width: 32,
        kind: CurveKind::Weierstrass,
        signature: true,
    },
    CurveDescriptor {
        name: "secp384r1",
        aliases: &["P-384", "NIST P-384"],
        oid: &[0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x22],
        id: CurveId::P384,
        width: 48,
        kind: CurveKind::Weierstrass,
        signature: true,
    },
    CurveDescriptor {
        name: "secp521r1",
        aliases: &["P-521", "NIST P-521"],
        oid: &[0x06, 0x05, 0x2b, 0x81, 0x04, 0x00, 0x23],
        id: CurveId::P521,
        width: 66,
        kind: CurveKind::Weierstrass,
        signature: false,
    },
    CurveDescriptor {
        name: "curveSM2",
        aliases: &["SM2", "sm2p256v1"],
        oid: &[0x06, 0x08, 0x2a, 0x81, 0x1c, 0xcf, 0x55, 0x01, 0x82, 0x2d],
        id: CurveId::SM2,
        width: 32,
        kind: CurveKind::Weierstrass,
        signature: true,
    },
    CurveDescriptor {
        name: "X25519",
        aliases: &[],
        oid: &[0x06, 0x03, 0x2b, 0x65, 0x6e],
        id: CurveId::X25519,
        width: 32,
        kind: CurveKind::Montgomery,
        signature: false,
    },
    CurveDescriptor {
        name: "X448",
        aliases: &[],
        oid: &[0x06, 0x03, 0x2b, 0x65, 0x6f],
        id: CurveId::X448,
        width: 56,
        kind: CurveKind::Montgomery,
        signature: false,
    },
];
