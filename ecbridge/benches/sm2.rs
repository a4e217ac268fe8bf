//! SM2 protocol benchmarks

use core::hint::black_box;
use criterion::{
    criterion_group, criterion_main, measurement::Measurement, BenchmarkGroup, Criterion,
};
use ecbridge::{
    keys::EcPrivateKey,
    sm2::{
        cipher::Sm2Cipher,
        key_agreement::{Sm2KeyAgreement, Sm2KeyAgreementParams},
        signature::Sm2Signature,
    },
    CurveId, Gateway, KeyPair,
};
use hex_literal::hex;

const PRIVATE_KEY_BYTES: [u8; 32] =
    hex!("1cf6bc6c7f642a84994119e206c9f0753ff100709f4fd12f2338c1be60bf4175");

fn key_pair(gateway: &Gateway) -> KeyPair {
    let private_key = EcPrivateKey::from_native(CurveId::SM2, &PRIVATE_KEY_BYTES).unwrap();
    KeyPair::from_private_key(gateway, private_key).unwrap()
}

fn bench_sign<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let gateway = Gateway::software();
    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&key_pair(&gateway).private_key).unwrap();
    let msg = black_box(b"example message");
    group.bench_function("sign", |b| {
        b.iter(|| {
            signer.update(msg).unwrap();
            black_box(signer.sign().unwrap())
        })
    });
}

fn bench_verify<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let gateway = Gateway::software();
    let pair = key_pair(&gateway);
    let msg = black_box(b"example message");

    let mut signer = Sm2Signature::new(gateway.clone());
    signer.init_sign(&pair.private_key).unwrap();
    signer.update(msg).unwrap();
    let sig = black_box(signer.sign().unwrap());

    let mut verifier = Sm2Signature::new(gateway);
    verifier.init_verify(&pair.public_key).unwrap();
    group.bench_function("verify", |b| {
        b.iter(|| {
            verifier.update(msg).unwrap();
            verifier.verify(&sig)
        })
    });
}

fn bench_dsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("SM2DSA");
    bench_sign(&mut group);
    bench_verify(&mut group);
    group.finish();
}

fn bench_pke(c: &mut Criterion) {
    let gateway = Gateway::software();
    let pair = key_pair(&gateway);
    let encrypting = Sm2Cipher::new(gateway.clone(), pair.public_key).unwrap();
    let decrypting = Sm2Cipher::new(gateway, pair.private_key).unwrap();
    let msg = black_box([0x5a; 256]);
    let ciphertext = encrypting.process(&msg).unwrap();

    let mut group = c.benchmark_group("SM2PKE");
    group.bench_function("encrypt", |b| b.iter(|| encrypting.process(&msg)));
    group.bench_function("decrypt", |b| b.iter(|| decrypting.process(&ciphertext)));
    group.finish();
}

fn bench_key_agreement(c: &mut Criterion) {
    let gateway = Gateway::software();
    let alice = key_pair(&gateway);
    let bob = KeyPair::generate(&gateway, CurveId::SM2, Some(b"bob")).unwrap();
    let alice_ephemeral = KeyPair::generate(&gateway, CurveId::SM2, Some(b"alice eph")).unwrap();
    let bob_ephemeral = KeyPair::generate(&gateway, CurveId::SM2, Some(b"bob eph")).unwrap();
    let params = Sm2KeyAgreementParams::new(
        alice.private_key,
        alice.public_key,
        bob.public_key,
        true,
        32,
    );

    let mut group = c.benchmark_group("SM2KEP");
    group.bench_function("generate_secret", |b| {
        b.iter(|| {
            let mut agreement = Sm2KeyAgreement::new(gateway.clone());
            agreement
                .init(&alice_ephemeral.private_key, &params)
                .unwrap();
            agreement
                .do_phase(&bob_ephemeral.public_key, true)
                .unwrap();
            black_box(agreement.generate_secret().unwrap())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_dsa, bench_pke, bench_key_agreement);
criterion_main!(benches);
