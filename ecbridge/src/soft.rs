//! Pure Rust [`CurveEngine`] built on the RustCrypto curve crates.

mod sm2;
mod weierstrass;
mod xdh;

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, OsRng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};

use crate::{
    curve::{CurveDescriptor, CurveId},
    engine::{CurveEngine, Sm2KeyExchange},
    sm2::Mode,
    Error, Result,
};

/// Software curve engine.
///
/// Supports every curve in the registry. Key generation draws from the OS
/// RNG unless a seed is given, in which case a ChaCha20 stream keyed with
/// `SHA-256(seed)` is used. Signing without a seed is deterministic
/// (RFC 6979).
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftEngine;

impl CurveEngine for SoftEngine {
    fn generate_key_pair(
        &self,
        curve: &CurveDescriptor,
        seed: Option<&[u8]>,
        private_out: &mut [u8],
        public_out: &mut [u8],
    ) -> Result<()> {
        let mut rng = EntropySource::new(seed);
        match curve.id {
            CurveId::P256 => {
                weierstrass::generate_key_pair::<p256::NistP256>(&mut rng, private_out, public_out)
            }
            CurveId::P384 => {
                weierstrass::generate_key_pair::<p384::NistP384>(&mut rng, private_out, public_out)
            }
            CurveId::P521 => {
                weierstrass::generate_key_pair::<p521::NistP521>(&mut rng, private_out, public_out)
            }
            CurveId::SM2 => {
                weierstrass::generate_key_pair::<::sm2::Sm2>(&mut rng, private_out, public_out)
            }
            CurveId::X25519 => xdh::x25519_generate_key_pair(&mut rng, private_out, public_out),
            CurveId::X448 => xdh::x448_generate_key_pair(&mut rng, private_out, public_out),
            _ => Err(Error::UnsupportedCurve(curve.name)),
        }
    }

    fn compute_public_key(
        &self,
        curve: &CurveDescriptor,
        private: &[u8],
        public_out: &mut [u8],
    ) -> Result<()> {
        match curve.id {
            CurveId::P256 => weierstrass::public_key::<p256::NistP256>(private, public_out),
            CurveId::P384 => weierstrass::public_key::<p384::NistP384>(private, public_out),
            CurveId::P521 => weierstrass::public_key::<p521::NistP521>(private, public_out),
            CurveId::SM2 => weierstrass::public_key::<::sm2::Sm2>(private, public_out),
            CurveId::X25519 => xdh::x25519_public_key(private, public_out),
            CurveId::X448 => xdh::x448_public_key(private, public_out),
            _ => Err(Error::UnsupportedCurve(curve.name)),
        }
    }

    fn derive_key(
        &self,
        curve: &CurveDescriptor,
        private: &[u8],
        peer_public: &[u8],
        shared_out: &mut [u8],
    ) -> Result<()> {
        match curve.id {
            CurveId::P256 => {
                weierstrass::diffie_hellman::<p256::NistP256>(private, peer_public, shared_out)
            }
            CurveId::P384 => {
                weierstrass::diffie_hellman::<p384::NistP384>(private, peer_public, shared_out)
            }
            CurveId::P521 => {
                weierstrass::diffie_hellman::<p521::NistP521>(private, peer_public, shared_out)
            }
            CurveId::SM2 => {
                weierstrass::diffie_hellman::<::sm2::Sm2>(private, peer_public, shared_out)
            }
            CurveId::X25519 => xdh::x25519(private, peer_public, shared_out),
            CurveId::X448 => xdh::x448(private, peer_public, shared_out),
            _ => Err(Error::UnsupportedCurve(curve.name)),
        }
    }

    fn sign_digest(
        &self,
        curve: &CurveDescriptor,
        seed: Option<&[u8]>,
        private: &[u8],
        digest: &[u8],
        signature_out: &mut [u8],
    ) -> Result<()> {
        let mut rng = seed.map(|seed| EntropySource::new(Some(seed)));
        match curve.id {
            CurveId::P256 => {
                weierstrass::nistp256::sign_digest(rng.as_mut(), private, digest, signature_out)
            }
            CurveId::P384 => {
                weierstrass::nistp384::sign_digest(rng.as_mut(), private, digest, signature_out)
            }
            CurveId::SM2 => sm2::sign_digest(rng.as_mut(), private, digest, signature_out),
            _ => Err(Error::UnsupportedCurve(curve.name)),
        }
    }

    fn verify_signed_digest(
        &self,
        curve: &CurveDescriptor,
        public: &[u8],
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        match curve.id {
            CurveId::P256 => weierstrass::nistp256::verify_digest(public, digest, signature),
            CurveId::P384 => weierstrass::nistp384::verify_digest(public, digest, signature),
            CurveId::SM2 => sm2::verify_digest(public, digest, signature),
            _ => Err(Error::UnsupportedCurve(curve.name)),
        }
    }

    fn sm2_encrypt(&self, public: &[u8], plaintext: &[u8], mode: Mode) -> Result<Vec<u8>> {
        sm2::encrypt(&mut OsRng, public, plaintext, mode)
    }

    fn sm2_decrypt(&self, private: &[u8], ciphertext: &[u8], mode: Mode) -> Result<Vec<u8>> {
        sm2::decrypt(private, ciphertext, mode)
    }

    fn sm2_derive_key(&self, exchange: &Sm2KeyExchange<'_>, shared_out: &mut [u8]) -> Result<()> {
        sm2::derive_key(exchange, shared_out)
    }
}

/// Randomness for key generation and nonce hedging.
pub(crate) enum EntropySource {
    /// Operating system RNG.
    System(OsRng),
    /// Reproducible stream derived from a caller supplied seed.
    Seeded(ChaCha20Rng),
}

impl EntropySource {
    pub(crate) fn new(seed: Option<&[u8]>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(ChaCha20Rng::from_seed(Sha256::digest(seed).into())),
            None => Self::System(OsRng),
        }
    }
}

impl RngCore for EntropySource {
    fn next_u32(&mut self) -> u32 {
        match self {
            Self::System(rng) => rng.next_u32(),
            Self::Seeded(rng) => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            Self::System(rng) => rng.next_u64(),
            Self::Seeded(rng) => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Self::System(rng) => rng.fill_bytes(dest),
            Self::Seeded(rng) => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        match self {
            Self::System(rng) => rng.try_fill_bytes(dest),
            Self::Seeded(rng) => rng.try_fill_bytes(dest),
        }
    }
}

impl CryptoRng for EntropySource {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_entropy_is_reproducible() {
        let mut a = [0u8; 48];
        let mut b = [0u8; 48];
        EntropySource::new(Some(b"seed")).fill_bytes(&mut a);
        EntropySource::new(Some(b"seed")).fill_bytes(&mut b);
        assert_eq!(a, b);

        EntropySource::new(Some(b"other seed")).fill_bytes(&mut b);
        assert_ne!(a, b);
    }
}
