//! ECDSA/secp256k1 tests.

#![cfg(feature = "k256")]

use ecsig_ecdsa::{
    elliptic_curve::{
        bigint::U256,
        ops::{Invert, MulByGenerator, Reduce},
        point::AffineCoordinates,
        AffinePoint, NonZeroScalar, ProjectivePoint, Scalar,
    },
    secp256k1::{Secp256k1, Signature, SigningKey, VerifyingKey},
    signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner},
    Error, RecoveryId,
};
use hex_literal::hex;
use proptest::prelude::*;
use rand_core::OsRng;
use sha2::{Digest, Sha256};

/// secp256k1 group order, big endian.
const ORDER: [u8; 32] = hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");

/// Signature recovery test vectors.
struct RecoveryTestVector {
    pk: [u8; 33],
    sig: [u8; 64],
    recid: u8,
    msg: &'static [u8],
}

const RECOVERY_TEST_VECTORS: &[RecoveryTestVector] = &[
    RecoveryTestVector {
        pk: hex!("021a7a569e91dbf60581509c7fc946d1003b60c7dee85299538db6353538d59574"),
        sig: hex!(
            "ce53abb3721bafc561408ce8ff99c909f7f0b18a2f788649d6470162ab1aa032
             3971edc523a6d6453f3fb6128d318d9db1a5ff3386feb1047d9816e780039d52"
        ),
        recid: 0,
        msg: b"example message",
    },
    RecoveryTestVector {
        pk: hex!("036d6caac248af96f6afa7f904f550253a0f3ef3f5aa2fe6838a95b216691468e2"),
        sig: hex!(
            "46c05b6368a44b8810d79859441d819b8e7cdc8bfd371e35c53196f4bcacdb51
             35c7facce2a97b95eacba8a586d87b7958aaf8368ab29cee481f76e871dbd9cb"
        ),
        recid: 1,
        msg: b"example message",
    },
];

#[test]
fn public_key_recovery() {
    for vector in RECOVERY_TEST_VECTORS {
        let signature = Signature::from_slice(&vector.sig).unwrap();
        let recovery_id = RecoveryId::from_byte(vector.recid).unwrap();
        let recovered =
            VerifyingKey::recover_from_msg(vector.msg, &signature, recovery_id).unwrap();

        assert_eq!(&vector.pk[..], recovered.to_encoded_point(true).as_bytes());
    }
}

#[test]
fn zero_secret_key_rejected() {
    assert_eq!(
        SigningKey::from_bytes(&[0; 32].into()).unwrap_err(),
        Error::InvalidSecretKey
    );
}

#[test]
fn order_secret_key_rejected() {
    assert_eq!(
        SigningKey::from_bytes(&ORDER.into()).unwrap_err(),
        Error::InvalidSecretKey
    );
}

#[test]
fn truncated_secret_key_rejected() {
    assert_eq!(
        SigningKey::from_slice(&[1; 31]).unwrap_err(),
        Error::InvalidSecretKey
    );
}

#[test]
fn out_of_range_tweak_rejected() {
    let signing_key = SigningKey::from_slice(&[1; 32]).unwrap();

    assert_eq!(
        signing_key.tweak_add(&ORDER.into()).unwrap_err(),
        Error::InvalidScalar
    );
    assert_eq!(
        signing_key.tweak_mul(&ORDER.into()).unwrap_err(),
        Error::InvalidScalar
    );
}

#[test]
fn prehash_length_window() {
    let signing_key = SigningKey::from_slice(&[1; 32]).unwrap();

    assert!(signing_key
        .sign_prehash_with_rng(&mut OsRng, &[0xab; 19])
        .is_err());
    assert!(signing_key
        .sign_prehash_with_rng(&mut OsRng, &[0xab; 129])
        .is_err());

    for len in [20, 32, 64, 128] {
        let prehash = vec![0xab; len];
        let signature: Signature = signing_key
            .sign_prehash_with_rng(&mut OsRng, &prehash)
            .unwrap();

        assert!(signing_key
            .verifying_key()
            .verify_prehash(&prehash, &signature)
            .is_ok());
    }
}

#[test]
fn zero_scalar_signature_rejected() {
    assert!(Signature::from_slice(&[0; 64]).is_err());

    let mut r_only = [0; 64];
    r_only[..32].copy_from_slice(&hex!(
        "ce53abb3721bafc561408ce8ff99c909f7f0b18a2f788649d6470162ab1aa032"
    ));
    assert!(Signature::from_slice(&r_only).is_err());
}

/// The combined linear-combination evaluation inside verification must
/// agree with computing u1*G + u2*A as two separate multiplications.
#[test]
fn verification_matches_naive_equation() {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = signing_key.verifying_key();

    let messages: [&[u8]; 3] = [b"naive", b"two multiplications", b"agreement"];
    for message in messages {
        let prehash = Sha256::digest(message);
        let signature: Signature = signing_key
            .sign_prehash_with_rng(&mut OsRng, &prehash)
            .unwrap();

        let z = <Scalar<Secp256k1> as Reduce<U256>>::reduce_bytes(&prehash);
        let (r, s) = signature.split_scalars();
        let s_inv = *s.invert();
        let u1 = z * s_inv;
        let u2 = *r * s_inv;

        let naive = ProjectivePoint::<Secp256k1>::mul_by_generator(&u1)
            + ProjectivePoint::<Secp256k1>::from(*verifying_key.as_affine()) * u2;
        let affine: AffinePoint<Secp256k1> = naive.into();

        assert_eq!(
            *r,
            <Scalar<Secp256k1> as Reduce<U256>>::reduce_bytes(&affine.x())
        );
        assert!(verifying_key.verify_prehash(&prehash, &signature).is_ok());
    }
}

#[cfg(feature = "der")]
#[test]
fn der_strictness() {
    use ecsig_ecdsa::secp256k1::DerSignature;

    let signing_key = SigningKey::from_slice(&[1; 32]).unwrap();
    let prehash = Sha256::digest(b"der strictness");
    let signature: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, &prehash)
        .unwrap();

    let der = signature.to_der();
    let der_bytes = der.to_bytes();

    // canonical roundtrip
    let reparsed = DerSignature::from_bytes(&der_bytes).unwrap();
    assert_eq!(Signature::try_from(reparsed).unwrap(), signature);

    // trailing garbage
    let mut trailing = der_bytes.to_vec();
    trailing.push(0x00);
    assert!(DerSignature::from_bytes(&trailing).is_err());

    // truncation
    assert!(DerSignature::from_bytes(&der_bytes[..der_bytes.len() - 1]).is_err());

    // scalar bytes carry no sign padding
    assert!(!der.r().is_empty() && der.r()[0] != 0x00);
    assert!(!der.s().is_empty() && der.s()[0] != 0x00);
}

#[test]
#[cfg(feature = "ecdh")]
fn ecdh_shared_secrets_match() {
    let alice = SigningKey::random(&mut OsRng);
    let bob = SigningKey::random(&mut OsRng);

    let alice_shared = alice.diffie_hellman(bob.verifying_key());
    let bob_shared = bob.diffie_hellman(alice.verifying_key());

    assert_eq!(
        alice_shared.raw_secret_bytes(),
        bob_shared.raw_secret_bytes()
    );
}

#[test]
fn concurrent_signing_agrees() {
    let signing_key = SigningKey::from_slice(&[1; 32]).unwrap();
    let prehash = Sha256::digest(b"concurrent");
    let expected: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, &prehash)
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let signature: Signature = signing_key
                    .sign_prehash_with_rng(&mut OsRng, &prehash)
                    .unwrap();
                assert_eq!(signature, expected);
            });
        }
    });
}

prop_compose! {
    fn signing_key()(bytes in any::<[u8; 32]>()) -> SigningKey {
        let scalar = <Scalar<Secp256k1> as Reduce<U256>>::reduce_bytes(&bytes.into());

        match Option::from(NonZeroScalar::new(scalar)) {
            Some(scalar) => SigningKey::from_nonzero_scalar(scalar),
            None => SigningKey::from_slice(&[1; 32]).unwrap(),
        }
    }
}

prop_compose! {
    fn tweak()(bytes in any::<[u8; 32]>()) -> [u8; 32] {
        <Scalar<Secp256k1> as Reduce<U256>>::reduce_bytes(&bytes.into())
            .to_bytes()
            .into()
    }
}

proptest! {
    #[test]
    fn sign_and_verify(sk in signing_key()) {
        let prehash = Sha256::digest(b"testing");
        let signature: Signature = sk.sign_prehash_with_rng(&mut OsRng, &prehash).unwrap();
        prop_assert!(sk.verifying_key().verify_prehash(&prehash, &signature).is_ok());
    }

    #[test]
    fn signatures_always_low_s(sk in signing_key(), msg in any::<[u8; 24]>()) {
        let prehash = Sha256::digest(msg);
        let signature: Signature = sk.sign_prehash_with_rng(&mut OsRng, &prehash).unwrap();
        prop_assert!(signature.is_low_s());
        prop_assert!(signature.normalize_s().is_none());
    }

    #[test]
    fn recover_from_msg(sk in signing_key()) {
        let msg = b"example";
        let (signature, recovery_id) =
            sk.sign_recoverable_with_rng(&mut OsRng, msg).unwrap();
        let recovered = VerifyingKey::recover_from_msg(msg, &signature, recovery_id).unwrap();
        prop_assert_eq!(sk.verifying_key(), &recovered);
    }

    #[test]
    fn reject_invalid_signature(sk in signing_key(), byte in 0usize..64, bit in 0usize..8) {
        let prehash = Sha256::digest(b"testing");
        let signature: Signature = sk.sign_prehash_with_rng(&mut OsRng, &prehash).unwrap();

        let mut signature_bytes = signature.to_bytes();
        signature_bytes[byte] ^= 1 << bit;

        // either rejected outright at parse time or fails verification
        if let Ok(tampered) = Signature::from_slice(&signature_bytes) {
            prop_assert!(sk
                .verifying_key()
                .verify_prehash(&prehash, &tampered)
                .is_err());
        }
    }

    #[test]
    fn tweak_add_commutes(sk in signing_key(), tweak in tweak()) {
        match (sk.tweak_add(&tweak.into()), sk.verifying_key().tweak_add(&tweak.into())) {
            (Ok(tweaked_sk), Ok(tweaked_vk)) => {
                prop_assert_eq!(tweaked_sk.verifying_key(), &tweaked_vk);
            }
            (Err(_), Err(_)) => (),
            _ => prop_assert!(false, "secret/public tweak results disagree"),
        }
    }

    #[test]
    fn tweak_mul_commutes(sk in signing_key(), tweak in tweak()) {
        match (sk.tweak_mul(&tweak.into()), sk.verifying_key().tweak_mul(&tweak.into())) {
            (Ok(tweaked_sk), Ok(tweaked_vk)) => {
                prop_assert_eq!(tweaked_sk.verifying_key(), &tweaked_vk);
            }
            (Err(_), Err(_)) => (),
            _ => prop_assert!(false, "secret/public tweak results disagree"),
        }
    }

    #[cfg(feature = "der")]
    #[test]
    fn der_roundtrip(sk in signing_key()) {
        let prehash = Sha256::digest(b"testing");
        let signature: Signature = sk.sign_prehash_with_rng(&mut OsRng, &prehash).unwrap();

        let der_bytes = signature.to_der().to_bytes();
        let reparsed = Signature::from_der(&der_bytes).unwrap();
        prop_assert_eq!(reparsed, signature);
    }
}
