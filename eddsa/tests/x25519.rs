//! X25519 tests against the RFC 7748 test vectors.

use ecsig_eddsa::{
    x25519::{self, X25519_BASEPOINT_BYTES},
    Error, MontgomeryPoint, SigningKey,
};
use hex_literal::hex;
use rand_core::OsRng;

#[test]
fn rfc7748_scalar_mult_vectors() {
    // RFC 7748 § 5.2
    let scalar = hex!("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
    let u = hex!("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
    let expected = hex!("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552");
    assert_eq!(x25519::x25519(scalar, u), expected);

    let scalar = hex!("4b66e9d4d1b4673c5ad22691957d6af5c11b6421e0ea01d42ca4169e7918ba0d");
    let u = hex!("e5210f12786811d3f4b7959d0538ae2c31dbe7106fc03c3efc4cd549c715a493");
    let expected = hex!("95cbde9476e8907d7aade45cb4b873f88b595a68799fa152e6f8f7647aac7957");
    assert_eq!(x25519::x25519(scalar, u), expected);
}

#[test]
fn rfc7748_diffie_hellman() {
    // RFC 7748 § 6.1
    let alice_secret = hex!("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
    let alice_public = hex!("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a");
    let bob_secret = hex!("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");
    let bob_public = hex!("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f");
    let expected = hex!("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");

    assert_eq!(
        x25519::x25519(alice_secret, X25519_BASEPOINT_BYTES),
        alice_public
    );
    assert_eq!(
        x25519::x25519(bob_secret, X25519_BASEPOINT_BYTES),
        bob_public
    );

    let alice_shared =
        x25519::diffie_hellman(&alice_secret, &MontgomeryPoint(bob_public)).unwrap();
    let bob_shared = x25519::diffie_hellman(&bob_secret, &MontgomeryPoint(alice_public)).unwrap();

    assert_eq!(alice_shared.to_bytes(), expected);
    assert_eq!(bob_shared.as_bytes(), &expected);
}

/// RFC 7748 § 5.2 iteration: each round feeds the output back as the
/// scalar and the previous scalar as the coordinate.
fn iterate(count: usize) -> [u8; 32] {
    let mut k = X25519_BASEPOINT_BYTES;
    let mut u = X25519_BASEPOINT_BYTES;

    for _ in 0..count {
        let next = x25519::x25519(k, u);
        u = k;
        k = next;
    }

    k
}

#[test]
fn rfc7748_iterated_once() {
    assert_eq!(
        iterate(1),
        hex!("422c8e7a6227d7bca1350b3e2bb7279f7897b87bb6854b783c60e80311ae3079")
    );
}

#[test]
fn rfc7748_iterated_thousand() {
    assert_eq!(
        iterate(1000),
        hex!("684cf59ba83309552800ef566f2f4d3c1c3887c49360e3875f2eb94d99532c51")
    );
}

/// Takes minutes; run with `cargo test -- --ignored` when touching the
/// exchange paths.
#[test]
#[ignore]
fn rfc7748_iterated_million() {
    assert_eq!(
        iterate(1_000_000),
        hex!("7c3911e0ab2586fd864497297e575e6f3bc601c0883c30df5f4dd2d24f665424")
    );
}

#[test]
fn small_order_points_rejected() {
    let scalar = [0x40; 32];
    let mut one = [0u8; 32];
    one[0] = 1;

    for u in [[0u8; 32], one] {
        assert_eq!(
            x25519::diffie_hellman(&scalar, &MontgomeryPoint(u)).err(),
            Some(Error::SmallOrderPoint)
        );

        // the unchecked function maps small-order inputs to all zeroes
        assert_eq!(x25519::x25519(scalar, u), [0; 32]);
    }
}

#[test]
fn signing_key_exchange_agrees() {
    let alice = SigningKey::generate(&mut OsRng);
    let bob = SigningKey::generate(&mut OsRng);

    let alice_shared = alice
        .diffie_hellman(&bob.verifying_key().to_montgomery())
        .unwrap();
    let bob_shared = bob
        .diffie_hellman(&alice.verifying_key().to_montgomery())
        .unwrap();
    assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());

    // the Edwards-form exchange lands on the same u-coordinate
    let edwards_shared = alice
        .to_expanded()
        .derive_edwards(&bob.verifying_key())
        .unwrap();
    assert_eq!(
        edwards_shared.to_montgomery().to_bytes(),
        alice_shared.to_bytes()
    );
}

#[test]
fn public_keys_match_edwards_form() {
    let signing_key = SigningKey::generate(&mut OsRng);

    assert_eq!(
        signing_key.verifying_key().to_montgomery().to_bytes(),
        x25519::x25519(signing_key.to_scalar_bytes(), X25519_BASEPOINT_BYTES)
    );
}
