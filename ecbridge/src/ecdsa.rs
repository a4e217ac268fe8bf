//! ECDSA over the NIST curves supported by the signing primitive.

use core::mem;

use sha2::{Digest, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::{
    curve::{CurveDescriptor, CurveId, CurveKind},
    keys::{EcPrivateKey, EcPublicKey},
    normalize::align_digest,
    Error, Gateway, Result,
};

/// Message digest applied before signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

enum State {
    Uninitialized,
    Sign {
        curve: &'static CurveDescriptor,
        private_key: Zeroizing<Vec<u8>>,
    },
    Verify {
        curve: &'static CurveDescriptor,
        public_key: Vec<u8>,
    },
}

/// Message level ECDSA: buffers the message, hashes it and signs the digest
/// aligned to the curve width. Signatures are raw `r || s`.
pub struct EcdsaSignature {
    gateway: Gateway,
    algorithm: DigestAlgorithm,
    state: State,
    seed: Option<Vec<u8>>,
    message: Vec<u8>,
}

impl EcdsaSignature {
    /// Create an uninitialized context.
    pub fn new(gateway: Gateway, algorithm: DigestAlgorithm) -> Self {
        Self {
            gateway,
            algorithm,
            state: State::Uninitialized,
            seed: None,
            message: Vec::new(),
        }
    }

    /// Hedge signing nonces with a seed. Without one, signing is
    /// deterministic (RFC 6979).
    pub fn set_seed(&mut self, seed: Option<&[u8]>) {
        self.seed = seed.map(<[u8]>::to_vec);
    }

    /// Prepare for signing.
    pub fn init_sign(&mut self, private_key: &EcPrivateKey) -> Result<()> {
        let curve = ecdsa_curve(private_key.curve())?;
        self.state = State::Sign {
            curve,
            private_key: private_key.to_native_for(curve)?,
        };
        self.message.clear();
        Ok(())
    }

    /// Prepare for verification.
    pub fn init_verify(&mut self, public_key: &EcPublicKey) -> Result<()> {
        let curve = ecdsa_curve(public_key.curve())?;
        self.state = State::Verify {
            curve,
            public_key: public_key.to_native_for(curve)?.into_owned(),
        };
        self.message.clear();
        Ok(())
    }

    /// Append message bytes.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        match self.state {
            State::Uninitialized => Err(Error::InvalidState("signature not initialized")),
            _ => {
                self.message.extend_from_slice(data);
                Ok(())
            }
        }
    }

    /// Sign the buffered message.
    pub fn sign(&mut self) -> Result<Vec<u8>> {
        let message = mem::take(&mut self.message);
        let State::Sign { curve, private_key } = &self.state else {
            return Err(Error::InvalidState("signature not initialized for signing"));
        };

        let digest = align_digest(&self.algorithm.digest(&message), curve.width);
        let mut signature = vec![0u8; curve.signature_len()];
        self.gateway.sign_digest(
            curve.id,
            self.seed.as_deref(),
            private_key,
            &digest,
            &mut signature,
        )?;
        Ok(signature)
    }

    /// Verify `signature` over the buffered message.
    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let message = mem::take(&mut self.message);
        let State::Verify { curve, public_key } = &self.state else {
            return Err(Error::InvalidState("signature not initialized for verification"));
        };

        let digest = align_digest(&self.algorithm.digest(&message), curve.width);
        self.gateway
            .verify_signed_digest(curve.id, public_key, &digest, signature)
    }
}

fn ecdsa_curve(curve: CurveId) -> Result<&'static CurveDescriptor> {
    let descriptor = curve.require()?;
    descriptor.require_signature()?;
    if descriptor.kind != CurveKind::Weierstrass || curve == CurveId::SM2 {
        return Err(Error::UnsupportedCurve(descriptor.name));
    }
    Ok(descriptor)
}
