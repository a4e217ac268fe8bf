//! X25519 and X448 (RFC 7748).

use rand_core::CryptoRngCore;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::{Error, Result};

const X25519_LEN: usize = 32;
const X448_LEN: usize = 56;

pub(super) fn x25519_generate_key_pair(
    rng: &mut impl CryptoRngCore,
    private_out: &mut [u8],
    public_out: &mut [u8],
) -> Result<()> {
    let secret = StaticSecret::random_from_rng(rng);
    Error::check_output(X25519_LEN, private_out)?;
    private_out.copy_from_slice(secret.as_bytes());
    write(x25519_dalek::PublicKey::from(&secret).as_bytes(), public_out)
}

pub(super) fn x25519_public_key(private: &[u8], public_out: &mut [u8]) -> Result<()> {
    let secret = x25519_secret(private)?;
    write(x25519_dalek::PublicKey::from(&secret).as_bytes(), public_out)
}

pub(super) fn x25519(private: &[u8], peer_public: &[u8], shared_out: &mut [u8]) -> Result<()> {
    let secret = x25519_secret(private)?;
    let peer: [u8; X25519_LEN] = peer_public
        .try_into()
        .map_err(|_| Error::InvalidKey("public key length does not match curve"))?;

    let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
    if !shared.was_contributory() {
        return Err(Error::InvalidKey("peer public key has small order"));
    }
    write(shared.as_bytes(), shared_out)
}

fn x25519_secret(private: &[u8]) -> Result<StaticSecret> {
    let bytes: Zeroizing<[u8; X25519_LEN]> = Zeroizing::new(
        private
            .try_into()
            .map_err(|_| Error::InvalidKey("private key length does not match curve"))?,
    );
    Ok(StaticSecret::from(*bytes))
}

pub(super) fn x448_generate_key_pair(
    rng: &mut impl CryptoRngCore,
    private_out: &mut [u8],
    public_out: &mut [u8],
) -> Result<()> {
    let mut bytes = Zeroizing::new([0u8; X448_LEN]);
    rng.fill_bytes(&mut bytes[..]);
    let secret = x448::Secret::from(*bytes);

    write(secret.as_bytes(), private_out)?;
    write(x448::PublicKey::from(&secret).as_bytes(), public_out)
}

pub(super) fn x448_public_key(private: &[u8], public_out: &mut [u8]) -> Result<()> {
    let secret = x448_secret(private)?;
    write(x448::PublicKey::from(&secret).as_bytes(), public_out)
}

pub(super) fn x448(private: &[u8], peer_public: &[u8], shared_out: &mut [u8]) -> Result<()> {
    let secret = x448_secret(private)?;
    let peer = x448::PublicKey::from_bytes(peer_public)
        .ok_or(Error::InvalidKey("peer public key has small order"))?;

    let shared = secret
        .as_diffie_hellman(&peer)
        .ok_or(Error::InvalidKey("peer public key has small order"))?;
    write(shared.as_bytes(), shared_out)
}

fn x448_secret(private: &[u8]) -> Result<x448::Secret> {
    x448::Secret::from_bytes(private)
        .ok_or(Error::InvalidKey("private key length does not match curve"))
}

fn write(value: &[u8], out: &mut [u8]) -> Result<()> {
    Error::check_output(value.len(), out)?;
    out.copy_from_slice(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn x25519_low_order_point_is_rejected() {
        let private = [0x77; 32];
        let mut shared = [0u8; 32];
        assert!(matches!(
            x25519(&private, &[0; 32], &mut shared),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn x448_public_key_matches_rfc7748() {
        let private = hex!(
            "9a8f4925d1519f5775cf46b04b5800d4ee9ee8bae8bc5565d498c28dd9c9baf5"
            "74a9419744897391006382a6f127ab1d9ac2d8c0a598726b"
        );
        let mut public = [0u8; 56];
        x448_public_key(&private, &mut public).unwrap();
        assert_eq!(
            public,
            hex!(
                "9b08f7cc31b7e3e67d22d5aea121074a273bd2b83de09c63faa73d2c22c5d9bb"
                "c836647241d953d40c5b12da88120d53177f80e532c41fa0"
            )
        );
    }
}
