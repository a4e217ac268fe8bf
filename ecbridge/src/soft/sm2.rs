//! SM2 digital signatures over precomputed digests, plus the public key
//! encryption and key exchange arithmetic (GM/T 0003-2012 parts 2, 3 and 4).
//!
//! The cofactor of the SM2 curve is 1, so the `[h]P` checks of the standard
//! reduce to rejecting the identity, which SEC1 parsing already does.

use ::sm2::{
    dsa::{Signature, SigningKey, VerifyingKey},
    elliptic_curve::{
        bigint::U256,
        group::{Curve as _, Group},
        ops::Reduce,
        point::AffineCoordinates,
        rand_core::CryptoRngCore,
        sec1::ToEncodedPoint,
        PrimeField,
    },
    AffinePoint, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar,
};
use signature::hazmat::{PrehashSigner, PrehashVerifier, RandomizedPrehashSigner};
use sm3::{Digest, Sm3};

use crate::{
    engine::Sm2KeyExchange,
    normalize::align_digest,
    sm2::{self, hash_z, kdf, Mode, DIGEST_LEN, POINT_LEN, WIDTH},
    soft::EntropySource,
    Error, Result,
};

/// `Z` is hashed into the digest by the caller, so the distinguishing
/// identifier carried by the `sm2` keys never enters the computation.
const DIST_ID: &str = "";

pub(super) fn sign_digest(
    rng: Option<&mut EntropySource>,
    private: &[u8],
    digest: &[u8],
    signature_out: &mut [u8],
) -> Result<()> {
    Error::check_output(2 * WIDTH, signature_out)?;
    sm2::check_signing_scalar(private)?;
    let signing_key = SigningKey::from_slice(DIST_ID, private)
        .map_err(|_| Error::InvalidKey("private scalar out of range"))?;

    // e = Hv(M~) arrives precomputed; k is derived per RFC 6979, hedged
    // with seeded entropy when a seed is given
    let prehash = align_digest(digest, WIDTH);
    let signature: Signature = match rng {
        Some(rng) => signing_key.sign_prehash_with_rng(rng, &prehash),
        None => signing_key.sign_prehash(&prehash),
    }
    .map_err(|_| Error::InvalidParameter("degenerate signature nonce"))?;

    signature_out.copy_from_slice(&signature.to_bytes());
    Ok(())
}

pub(super) fn verify_digest(public: &[u8], digest: &[u8], signature: &[u8]) -> Result<bool> {
    let verifying_key = VerifyingKey::from_sec1_bytes(DIST_ID, public)
        .map_err(|_| Error::InvalidKey("public key is not a point on the curve"))?;
    if signature.len() != 2 * WIDTH {
        return Err(Error::BadSignature("signature length does not match curve"));
    }

    // r' and s' must lie in [1, n - 1]
    let signature = Signature::from_slice(signature)
        .map_err(|_| Error::BadSignature("signature scalars out of range"))?;

    let prehash = align_digest(digest, WIDTH);
    Ok(verifying_key.verify_prehash(&prehash, &signature).is_ok())
}

pub(super) fn encrypt(
    rng: &mut impl CryptoRngCore,
    public: &[u8],
    msg: &[u8],
    mode: Mode,
) -> Result<Vec<u8>> {
    let public_key = public_key(public)?;
    let mut c2 = vec![0u8; msg.len()];

    loop {
        // A1: k in [1, n-1]
        let k = NonZeroScalar::random(&mut *rng);

        // A2: C1 = [k]G = (x1, y1)
        let c1 = (ProjectivePoint::generator() * *k)
            .to_affine()
            .to_encoded_point(false);

        // A4: [k]PB = (x2, y2)
        let shared = (public_key.to_projective() * *k)
            .to_affine()
            .to_encoded_point(false);
        let (x2, y2) = coordinates(&shared)?;

        // A5: t = KDF(x2 || y2, klen), retry if t is all zero
        kdf(&[x2, y2], &mut c2);
        if !msg.is_empty() && c2.iter().all(|&b| b == 0) {
            continue;
        }

        // A6: C2 = M xor t
        c2.iter_mut().zip(msg).for_each(|(t, m)| *t ^= m);

        // A7: C3 = Hash(x2 || M || y2)
        let c3 = Sm3::new()
            .chain_update(x2)
            .chain_update(msg)
            .chain_update(y2)
            .finalize();

        // A8: output the ciphertext
        return Ok(match mode {
            Mode::C1C2C3 => [c1.as_bytes(), &c2, &c3].concat(),
            Mode::C1C3C2 => [c1.as_bytes(), &c3, &c2].concat(),
        });
    }
}

pub(super) fn decrypt(private: &[u8], ciphertext: &[u8], mode: Mode) -> Result<Vec<u8>> {
    let secret_scalar = scalar(private)?;

    // B1: take C1 from C and check that it lies on the curve
    if ciphertext.len() < POINT_LEN + DIGEST_LEN {
        return Err(Error::BadPadding);
    }
    let (c1, c) = ciphertext.split_at(POINT_LEN);
    if c1[0] != 0x04 {
        return Err(Error::BadPadding);
    }
    let c1 = PublicKey::from_sec1_bytes(c1).map_err(|_| Error::BadPadding)?;

    // B3: [dB]C1 = (x2, y2)
    let shared = (c1.to_projective() * secret_scalar)
        .to_affine()
        .to_encoded_point(false);
    let (x2, y2) = coordinates(&shared).map_err(|_| Error::BadPadding)?;

    let (c2, c3) = match mode {
        Mode::C1C3C2 => {
            let (c3, c2) = c.split_at(DIGEST_LEN);
            (c2, c3)
        }
        Mode::C1C2C3 => c.split_at(c.len() - DIGEST_LEN),
    };

    // B4: t = KDF(x2 || y2, klen)
    // B5: M' = C2 xor t
    let mut plaintext = vec![0u8; c2.len()];
    kdf(&[x2, y2], &mut plaintext);
    plaintext.iter_mut().zip(c2).for_each(|(t, c)| *t ^= c);

    // B6: u = Hash(x2 || M' || y2), fail if u != C3
    let u = Sm3::new()
        .chain_update(x2)
        .chain_update(&plaintext)
        .chain_update(y2)
        .finalize();
    let checked = u
        .iter()
        .zip(c3)
        .fold(0, |check, (&u_byte, &c3_byte)| check | (u_byte ^ c3_byte));
    if checked != 0 {
        return Err(Error::BadPadding);
    }

    // B7: output M'
    Ok(plaintext)
}

pub(super) fn derive_key(exchange: &Sm2KeyExchange<'_>, shared_out: &mut [u8]) -> Result<()> {
    let d = scalar(exchange.private_key)?;
    let r = scalar(exchange.ephemeral_private_key)?;
    let peer_public = public_key(exchange.peer_public_key)?;
    let peer_ephemeral = public_key(exchange.peer_ephemeral_public_key)?;

    // A2, A3: R = [r]G
    let ephemeral = (ProjectivePoint::generator() * r).to_affine();

    // A4, A5: t = (d + x̄1 * r) mod n
    let t = d + x_bar(&ephemeral) * r;

    // A6, A7: U = [h * t](P + [x̄2]R), fail if U is the identity
    let x2 = x_bar(peer_ephemeral.as_affine());
    let u = (peer_public.to_projective() + peer_ephemeral.to_projective() * x2) * t;
    if bool::from(u.is_identity()) {
        return Err(Error::InvalidKey("shared point is the identity"));
    }
    let u = u.to_affine().to_encoded_point(false);
    let (xu, yu) = coordinates(&u)?;

    // A8: K = KDF(xU || yU || ZA || ZB, klen), ZA belonging to the initiator
    let own_z = hash_z(exchange.id, exchange.public_key)?;
    let peer_z = hash_z(exchange.peer_id, exchange.peer_public_key)?;
    let (za, zb) = if exchange.initiator {
        (&own_z, &peer_z)
    } else {
        (&peer_z, &own_z)
    };
    kdf(&[xu, yu, &za[..], &zb[..]], shared_out);
    Ok(())
}

/// `x̄ = 2^w + (x & (2^w - 1))` with `w = 127`.
fn x_bar(point: &AffinePoint) -> Scalar {
    let mut x = point.x();
    x[..WIDTH / 2].fill(0);
    x[WIDTH / 2] |= 0x80;
    <Scalar as Reduce<U256>>::reduce_bytes(&x)
}

fn scalar(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() != WIDTH {
        return Err(Error::InvalidKey("private key length does not match curve"));
    }
    Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(*FieldBytes::from_slice(bytes)))
        .map(|s| *s)
        .ok_or(Error::InvalidKey("private scalar out of range"))
}

fn public_key(bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidKey("public key is not a point on the curve"))
}

fn coordinates(point: &::sm2::EncodedPoint) -> Result<(&[u8], &[u8])> {
    match (point.x(), point.y()) {
        (Some(x), Some(y)) => Ok((x.as_slice(), y.as_slice())),
        _ => Err(Error::InvalidKey("shared point is the identity")),
    }
}
