//! SM2 signature engine tests.

use ecbridge::{
    keys::{EcPrivateKey, EcPublicKey},
    sm2::signature::Sm2Signature,
    CurveId, Error, Gateway, KeyPair,
};
use hex_literal::hex;
use proptest::prelude::*;

const PUBLIC_KEY: [u8; 65] = hex!(
    "0408D77AE04C01CC4C1104360DD8AF6B6F7DF334283D7C1A6AFD5652407B87BEE5014E2A57C36C150D16324DC664E31E6432359609C4E79847A5B161C8C7364C8A"
);
const IDENTITY: &[u8] = b"example@rustcrypto.org";
const MSG: &[u8] = b"testing";

// Created using:
// $ openssl pkeyutl -sign -in - -inkey pkcs8-private-key.pem -out sig -digest sm3 -pkeyopt distid:example@rustcrypto.org
const SIG: [u8; 64] = hex!(
    "d1dcccedd9fb785e0f67c16b7c52901625c0b69de9bca2144acc7be713cad2fc" // r
    "f7d1eae6e3a157b36c65f672f738ca8b46298bf149a6510072c431b49cd88b1c" // s
);

fn verifier() -> Sm2Signature {
    let public_key = EcPublicKey::new(CurveId::SM2, PUBLIC_KEY);
    let mut verifier = Sm2Signature::new(Gateway::software());
    verifier.init_verify(&public_key).unwrap();
    verifier.set_identity_parameters(&public_key, IDENTITY).unwrap();
    verifier
}

#[test]
fn verify_test_vector() {
    let mut verifier = verifier();
    verifier.update(MSG).unwrap();
    assert!(verifier.verify(&SIG).unwrap());
}

#[test]
fn verify_test_vector_with_default_identity_fails() {
    let mut verifier = Sm2Signature::new(Gateway::software());
    verifier
        .init_verify(&EcPublicKey::new(CurveId::SM2, PUBLIC_KEY))
        .unwrap();
    verifier.update(MSG).unwrap();
    assert!(!verifier.verify(&SIG).unwrap());
}

#[test]
fn buffer_is_cleared_after_verify() {
    let mut verifier = verifier();
    verifier.update(b"garbage").unwrap();
    assert!(!verifier.verify(&SIG).unwrap());

    verifier.update(MSG).unwrap();
    assert!(verifier.verify(&SIG).unwrap());

    // and after a failed verification too
    verifier.update(MSG).unwrap();
    assert!(matches!(verifier.verify(&SIG[..63]), Err(Error::BadSignature(_))));
    verifier.update(MSG).unwrap();
    assert!(verifier.verify(&SIG).unwrap());
}

#[test]
fn sign_and_verify_with_default_identity() {
    let gateway = Gateway::software();
    let pair = KeyPair::generate(&gateway, CurveId::SM2, None).unwrap();

    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&pair.private_key).unwrap();
    signer.update(b"split ").unwrap();
    signer.update(b"message").unwrap();
    let signature = signer.sign().unwrap();
    assert_eq!(signature.len(), 64);

    let mut verifier = Sm2Signature::new(gateway);
    verifier.init_verify(&pair.public_key).unwrap();
    verifier.update(b"split message").unwrap();
    assert!(verifier.verify(&signature).unwrap());

    verifier.update(b"split messagE").unwrap();
    assert!(!verifier.verify(&signature).unwrap());
}

#[test]
fn signing_is_deterministic_without_seed() {
    let gateway = Gateway::software();
    let pair = KeyPair::generate(&gateway, CurveId::SM2, Some(b"deterministic")).unwrap();
    let mut signer = Sm2Signature::new(gateway);
    signer.init_sign(&pair.private_key).unwrap();

    signer.update(MSG).unwrap();
    let first = signer.sign().unwrap();
    signer.update(MSG).unwrap();
    let second = signer.sign().unwrap();
    assert_eq!(first, second);

    signer.set_seed(Some(b"hedge"));
    signer.update(MSG).unwrap();
    assert_ne!(signer.sign().unwrap(), first);
}

#[test]
fn identity_binds_the_signature() {
    let gateway = Gateway::software();
    let pair = KeyPair::generate(&gateway, CurveId::SM2, None).unwrap();

    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&pair.private_key).unwrap();
    signer
        .set_identity_parameters(&pair.public_key, b"alice@example.com")
        .unwrap();
    signer.update(MSG).unwrap();
    let signature = signer.sign().unwrap();

    let mut verifier = Sm2Signature::new(gateway);
    verifier.init_verify(&pair.public_key).unwrap();
    verifier
        .set_identity_parameters(&pair.public_key, b"alice@example.com")
        .unwrap();
    verifier.update(MSG).unwrap();
    assert!(verifier.verify(&signature).unwrap());

    verifier
        .set_identity_parameters(&pair.public_key, b"mallory@example.com")
        .unwrap();
    verifier.update(MSG).unwrap();
    assert!(!verifier.verify(&signature).unwrap());
}

#[test]
fn committing_to_another_public_key() {
    let gateway = Gateway::software();
    let signer_pair = KeyPair::generate(&gateway, CurveId::SM2, None).unwrap();
    let other = KeyPair::generate(&gateway, CurveId::SM2, None).unwrap();

    // Z is computed over `other`'s key, but the signature is made with
    // `signer_pair`'s private key, so neither verifies normally.
    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&signer_pair.private_key).unwrap();
    signer
        .set_identity_parameters(&other.public_key, b"1234567812345678")
        .unwrap();
    signer.update(MSG).unwrap();
    let signature = signer.sign().unwrap();

    let mut verifier = Sm2Signature::new(gateway);
    verifier.init_verify(&signer_pair.public_key).unwrap();
    verifier.update(MSG).unwrap();
    assert!(!verifier.verify(&signature).unwrap());
}

#[test]
fn identity_parameters_survive_init_sign() {
    let gateway = Gateway::software();
    let signer_pair = KeyPair::generate(&gateway, CurveId::SM2, Some(b"signer")).unwrap();
    let other = KeyPair::generate(&gateway, CurveId::SM2, Some(b"other")).unwrap();

    let sign = |install_first: bool, install_after: bool| {
        let mut signer = Sm2Signature::new(gateway.clone());
        if install_first {
            signer
                .set_identity_parameters(&other.public_key, IDENTITY)
                .unwrap();
        }
        signer.init_sign(&signer_pair.private_key).unwrap();
        if install_after {
            signer
                .set_identity_parameters(&other.public_key, IDENTITY)
                .unwrap();
        }
        signer.update(MSG).unwrap();
        signer.sign().unwrap()
    };

    let before = sign(true, false);
    let after = sign(false, true);
    assert_eq!(before, after);

    let mut plain = Sm2Signature::new(gateway.clone());
    plain.init_sign(&signer_pair.private_key).unwrap();
    plain
        .set_identity_parameters(&signer_pair.public_key, IDENTITY)
        .unwrap();
    plain.update(MSG).unwrap();
    assert_ne!(before, plain.sign().unwrap());
}

#[test]
fn sign_in_verify_mode_is_a_state_error() {
    let mut verifier = verifier();
    verifier.update(MSG).unwrap();
    assert!(matches!(verifier.sign(), Err(Error::InvalidState(_))));
}

#[test]
fn verify_with_p256_key_is_a_key_error() {
    let gateway = Gateway::software();
    let pair = KeyPair::generate(&gateway, CurveId::SM2, None).unwrap();
    let p256 = KeyPair::generate(&gateway, CurveId::P256, None).unwrap();

    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&pair.private_key).unwrap();
    signer.update(MSG).unwrap();
    let signature = signer.sign().unwrap();

    // relabelled as an SM2 key, same length
    let foreign = EcPublicKey::new(CurveId::SM2, p256.public_key.as_encoded());
    let mut verifier = Sm2Signature::new(gateway);
    verifier.init_verify(&foreign).unwrap();
    verifier.update(MSG).unwrap();
    assert!(matches!(verifier.verify(&signature), Err(Error::InvalidKey(_))));

    assert!(matches!(
        verifier.init_verify(&p256.public_key),
        Err(Error::InvalidKey(_))
    ));
}

#[test]
fn signing_key_upper_bound() {
    let mut signer = Sm2Signature::new(Gateway::software());
    let n_minus_2 = EcPrivateKey::new(
        CurveId::SM2,
        hex!("00FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54121"),
    );
    signer.init_sign(&n_minus_2).unwrap();
    signer.update(MSG).unwrap();
    assert_eq!(signer.sign().unwrap().len(), 64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reject_invalid_signature(byte in 0usize..64, bit in 0usize..8) {
        let gateway = Gateway::software();
        let pair = KeyPair::generate(&gateway, CurveId::SM2, Some(b"proptest")).unwrap();
        let mut signer = Sm2Signature::new(gateway.clone());
        signer.init_sign(&pair.private_key).unwrap();
        signer.update(MSG).unwrap();
        let mut signature = signer.sign().unwrap();

        // tweak signature to make it invalid
        signature[byte] ^= 1 << bit;

        let mut verifier = Sm2Signature::new(gateway);
        verifier.init_verify(&pair.public_key).unwrap();
        verifier.update(MSG).unwrap();
        prop_assert!(!matches!(verifier.verify(&signature), Ok(true)));
    }
}
