//! Key generation, ECDH and ECDSA over short Weierstrass curves.

use elliptic_curve::{
    ecdh,
    rand_core::CryptoRngCore,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey, SecretKey,
};

use crate::{Error, Result};

pub(super) fn generate_key_pair<C>(
    rng: &mut impl CryptoRngCore,
    private_out: &mut [u8],
    public_out: &mut [u8],
) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = SecretKey::<C>::random(rng);
    let scalar = secret.to_bytes();
    Error::check_output(scalar.len(), private_out)?;
    private_out.copy_from_slice(&scalar);
    write_public_key(&secret.public_key(), public_out)
}

pub(super) fn public_key<C>(private: &[u8], public_out: &mut [u8]) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = secret_key::<C>(private)?;
    write_public_key(&secret.public_key(), public_out)
}

pub(super) fn diffie_hellman<C>(
    private: &[u8],
    peer_public: &[u8],
    shared_out: &mut [u8],
) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = secret_key::<C>(private)?;
    let peer = PublicKey::<C>::from_sec1_bytes(peer_public)
        .map_err(|_| Error::InvalidKey("peer public key is not a point on the curve"))?;

    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    Error::check_output(shared.raw_secret_bytes().len(), shared_out)?;
    shared_out.copy_from_slice(shared.raw_secret_bytes());
    Ok(())
}

fn secret_key<C: CurveArithmetic>(private: &[u8]) -> Result<SecretKey<C>> {
    SecretKey::<C>::from_slice(private)
        .map_err(|_| Error::InvalidKey("private scalar out of range"))
}

fn write_public_key<C>(public: &PublicKey<C>, public_out: &mut [u8]) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let encoded = public.to_encoded_point(false);
    Error::check_output(encoded.len(), public_out)?;
    public_out.copy_from_slice(encoded.as_bytes());
    Ok(())
}

/// Implement prehash ECDSA for a NIST curve crate.
macro_rules! impl_ecdsa {
    ($module:ident, $curve:ident) => {
        pub(super) mod $module {
            use $curve::ecdsa::{Signature, SigningKey, VerifyingKey};
            use signature::hazmat::{PrehashSigner, PrehashVerifier, RandomizedPrehashSigner};

            use crate::{soft::EntropySource, Error, Result};

            pub(in crate::soft) fn sign_digest(
                rng: Option<&mut EntropySource>,
                private: &[u8],
                digest: &[u8],
                signature_out: &mut [u8],
            ) -> Result<()> {
                let signing_key = SigningKey::from_slice(private)
                    .map_err(|_| Error::InvalidKey("private scalar out of range"))?;

                let signature: Signature = match rng {
                    Some(rng) => signing_key.sign_prehash_with_rng(rng, digest),
                    None => signing_key.sign_prehash(digest),
                }
                .map_err(|_| Error::InvalidParameter("digest rejected by signer"))?;

                let signature = signature.to_bytes();
                Error::check_output(signature.len(), signature_out)?;
                signature_out.copy_from_slice(&signature);
                Ok(())
            }

            pub(in crate::soft) fn verify_digest(
                public: &[u8],
                digest: &[u8],
                signature: &[u8],
            ) -> Result<bool> {
                let verifying_key = VerifyingKey::from_sec1_bytes(public)
                    .map_err(|_| Error::InvalidKey("public key is not a point on the curve"))?;
                let signature = Signature::from_slice(signature)
                    .map_err(|_| Error::BadSignature("signature scalars out of range"))?;

                Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
            }
        }
    };
}

impl_ecdsa!(nistp256, p256);
impl_ecdsa!(nistp384, p384);
