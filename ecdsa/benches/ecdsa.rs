//! ECDSA signing, verification, and recovery benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use ecsig_ecdsa::{
    nistp256, secp256k1,
    signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner},
};
use hex_literal::hex;
use rand_core::OsRng;

const SIGNING_KEY_BYTES: [u8; 32] =
    hex!("1cf6bc6c7f642a84994119e206c9f0753ff100709f4fd12f2338c1be60bf4175");

const PREHASH: [u8; 32] =
    hex!("af2bdbe1aa9b6ec1e2ade1d694f41fc71a831d0268e9891562113d8a62add1bf");

fn bench_secp256k1(c: &mut Criterion) {
    let mut group = c.benchmark_group("ECDSA/secp256k1 (SHA-256)");

    let signing_key = secp256k1::SigningKey::from_bytes(&SIGNING_KEY_BYTES.into()).unwrap();
    let verifying_key = *signing_key.verifying_key();
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable_with_rng(&mut OsRng, &PREHASH)
        .unwrap();

    group.bench_function("sign_prehash", |b| {
        b.iter(|| {
            let signature: secp256k1::Signature = signing_key
                .sign_prehash_with_rng(&mut OsRng, &PREHASH)
                .unwrap();
            signature
        })
    });

    group.bench_function("verify_prehash", |b| {
        b.iter(|| verifying_key.verify_prehash(&PREHASH, &signature).unwrap())
    });

    group.bench_function("recover_from_prehash", |b| {
        b.iter(|| {
            secp256k1::VerifyingKey::recover_from_prehash(&PREHASH, &signature, recovery_id)
                .unwrap()
        })
    });

    group.finish();
}

fn bench_nistp256(c: &mut Criterion) {
    let mut group = c.benchmark_group("ECDSA/P-256 (SHA-256)");

    let signing_key = nistp256::SigningKey::from_bytes(&SIGNING_KEY_BYTES.into()).unwrap();
    let verifying_key = *signing_key.verifying_key();
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable_with_rng(&mut OsRng, &PREHASH)
        .unwrap();

    group.bench_function("sign_prehash", |b| {
        b.iter(|| {
            let signature: nistp256::Signature = signing_key
                .sign_prehash_with_rng(&mut OsRng, &PREHASH)
                .unwrap();
            signature
        })
    });

    group.bench_function("verify_prehash", |b| {
        b.iter(|| verifying_key.verify_prehash(&PREHASH, &signature).unwrap())
    });

    group.bench_function("recover_from_prehash", |b| {
        b.iter(|| {
            nistp256::VerifyingKey::recover_from_prehash(&PREHASH, &signature, recovery_id)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_secp256k1, bench_nistp256);
criterion_main!(benches);
