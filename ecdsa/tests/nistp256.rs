//! ECDSA/P-256 tests.

#![cfg(feature = "p256")]

use ecsig_ecdsa::{
    nistp256::{Signature, SigningKey, VerifyingKey},
    signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner},
    RecoveryId,
};
use hex_literal::hex;
use rand_core::OsRng;
use sha2::{Digest, Sha256};

/// RFC 6979 Appendix A.2.5 secret key.
const SECRET_KEY: [u8; 32] =
    hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");

/// RFC 6979 Appendix A.2.5 public key (SEC1 uncompressed).
const PUBLIC_KEY: [u8; 65] = hex!(
    "0460FED4BA255A9D31C961EB74C6356D68C049B8923B61FA6CE669622E60F29FB6
     7903FE1008B8BC99A41AE9E95628BC64F2F1B20C2D7E9F5177A3C294D4462299"
);

/// RFC 6979 Appendix A.2.5 deterministic signatures over SHA-256, with the
/// `s` component normalized to the low half of the scalar range.
const RFC6979_VECTORS: &[(&[u8], [u8; 64])] = &[
    (
        b"sample",
        hex!(
            "EFD48B2AACB6A8FD1140DD9CD45E81D69D2C877B56AAF991C34D0EA84EAF3716
             0834E36AD29A83BF2BC9385E491D6099C8FDF9D1ED67AA7EA5F51F93782857A9"
        ),
    ),
    (
        b"test",
        hex!(
            "F1ABB023518351CD71D881567B1EA663ED3EFCF6C5132B354F28D3B0B7D38367
             019F4113742A2B14BD25926B49C649155F267E60D3814B4C0CC84250E46F0083"
        ),
    ),
];

#[test]
fn deterministic_vectors() {
    let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();

    for (msg, expected) in RFC6979_VECTORS {
        let prehash = Sha256::digest(msg);
        let signature: Signature = signing_key
            .sign_prehash_with_rng(&mut OsRng, &prehash)
            .unwrap();

        assert_eq!(signature.to_bytes().as_slice(), &expected[..]);
    }
}

#[test]
fn verify_vectors() {
    let verifying_key = VerifyingKey::from_sec1_bytes(&PUBLIC_KEY).unwrap();

    for (msg, sig_bytes) in RFC6979_VECTORS {
        let prehash = Sha256::digest(msg);
        let signature = Signature::from_slice(&sig_bytes[..]).unwrap();

        assert!(verifying_key.verify_prehash(&prehash, &signature).is_ok());
    }
}

#[test]
fn sec1_bytes_roundtrip() {
    let verifying_key = VerifyingKey::from_sec1_bytes(&PUBLIC_KEY).unwrap();

    // P-256 points serialize uncompressed by default.
    let sec1 = verifying_key.to_sec1_bytes();
    assert_eq!(&sec1[..], &PUBLIC_KEY[..]);
    assert_eq!(VerifyingKey::from_sec1_bytes(&sec1).unwrap(), verifying_key);
}

/// The RNG only drives blinding, so signatures can't depend on it.
#[test]
fn signatures_reproducible_across_rng_draws() {
    let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
    let prehash = Sha256::digest(b"reproducible");

    let first: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, &prehash)
        .unwrap();
    let second: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, &prehash)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn recovery_roundtrip() {
    let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
    let prehash = Sha256::digest(b"recoverable message");

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable_with_rng(&mut OsRng, &prehash)
        .unwrap();
    let recovered = VerifyingKey::recover_from_prehash(&prehash, &signature, recovery_id).unwrap();

    assert_eq!(signing_key.verifying_key(), &recovered);
}

/// Verification and recovery run the same group equation, so they must
/// agree on whether a (possibly corrupted) signature matches a key.
#[test]
fn verify_and_recovery_agree() {
    let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
    let verifying_key = *signing_key.verifying_key();
    let prehash = Sha256::digest(b"agreement");

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable_with_rng(&mut OsRng, &prehash)
        .unwrap();

    for byte in [0, 17, 63] {
        let mut bytes = signature.to_bytes();
        bytes[byte] ^= 0x40;

        let Ok(corrupted) = Signature::from_slice(&bytes) else {
            continue;
        };

        let verified = verifying_key.verify_prehash(&prehash, &corrupted).is_ok();
        let recovered = VerifyingKey::recover_from_prehash(&prehash, &corrupted, recovery_id)
            .map(|recovered| recovered == verifying_key)
            .unwrap_or(false);

        assert_eq!(verified, recovered);
    }
}

#[test]
fn recovery_id_from_byte_roundtrip() {
    let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
    let prehash = Sha256::digest(b"recovery id");

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable_with_rng(&mut OsRng, &prehash)
        .unwrap();

    let roundtripped = RecoveryId::from_byte(recovery_id.to_byte()).unwrap();
    let recovered =
        VerifyingKey::recover_from_prehash(&prehash, &signature, roundtripped).unwrap();

    assert_eq!(signing_key.verifying_key(), &recovered);
}

#[cfg(feature = "pkcs8")]
mod pkcs8_encoding {
    use super::*;
    use ecsig_ecdsa::elliptic_curve::pkcs8::{
        DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey,
    };

    /// PKCS#8 document for `SECRET_KEY` with the public key embedded.
    const PRIVATE_KEY_DER: [u8; 138] = hex!(
        "308187020100301306072a8648ce3d020106082a8648ce3d030107046d306b02
         01010420c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b
         120f6721a1440342000460fed4ba255a9d31c961eb74c6356d68c049b8923b61
         fa6ce669622e60f29fb67903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e
         9f5177a3c294d4462299"
    );

    /// SPKI document for `PUBLIC_KEY`.
    const PUBLIC_KEY_DER: [u8; 91] = hex!(
        "3059301306072a8648ce3d020106082a8648ce3d0301070342000460fed4ba25
         5a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb67903fe1008
         b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299"
    );

    #[test]
    fn decode_private_key() {
        let signing_key = SigningKey::from_pkcs8_der(&PRIVATE_KEY_DER).unwrap();
        assert_eq!(signing_key.to_bytes().as_slice(), &SECRET_KEY);
    }

    #[test]
    fn encode_private_key() {
        let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
        let der = signing_key.to_pkcs8_der().unwrap();
        assert_eq!(der.as_bytes(), PRIVATE_KEY_DER);
    }

    #[test]
    fn public_key_der() {
        let verifying_key = VerifyingKey::from_sec1_bytes(&PUBLIC_KEY).unwrap();
        let der = verifying_key.to_public_key_der().unwrap();
        assert_eq!(der.as_bytes(), PUBLIC_KEY_DER);

        let decoded = VerifyingKey::from_public_key_der(der.as_bytes()).unwrap();
        assert_eq!(decoded, verifying_key);
    }
}

#[cfg(feature = "jwk")]
mod jwk_encoding {
    use super::*;

    /// `SECRET_KEY` as a JWK, coordinates base64url encoded.
    const PRIVATE_JWK: &str = concat!(
        r#"{"kty":"EC","crv":"P-256","#,
        r#""x":"YP7UuiVanTHJYet0xjVtaMBJuJI7Yfps5mliLmDyn7Y","#,
        r#""y":"eQP-EAi4vJmkGunpVii8ZPLxsgwtfp9Rd6PClNRGIpk","#,
        r#""d":"ya-p2EW6dRZrXCFXZ7HWk05Qw9s26JsSe4piKxIPZyE"}"#
    );

    const PUBLIC_JWK: &str = concat!(
        r#"{"kty":"EC","crv":"P-256","#,
        r#""x":"YP7UuiVanTHJYet0xjVtaMBJuJI7Yfps5mliLmDyn7Y","#,
        r#""y":"eQP-EAi4vJmkGunpVii8ZPLxsgwtfp9Rd6PClNRGIpk"}"#
    );

    #[test]
    fn decode_private_jwk() {
        let signing_key = SigningKey::from_jwk_str(PRIVATE_JWK).unwrap();
        assert_eq!(signing_key.to_bytes().as_slice(), &SECRET_KEY);
    }

    #[test]
    fn decode_public_jwk() {
        let verifying_key = VerifyingKey::from_jwk_str(PUBLIC_JWK).unwrap();
        assert_eq!(
            verifying_key,
            VerifyingKey::from_sec1_bytes(&PUBLIC_KEY).unwrap()
        );
    }

    #[test]
    fn jwk_roundtrip() {
        let signing_key = SigningKey::from_bytes(&SECRET_KEY.into()).unwrap();
        let jwk = signing_key.to_jwk_string();
        assert_eq!(
            SigningKey::from_jwk_str(&jwk).unwrap().to_bytes(),
            signing_key.to_bytes()
        );

        let verifying_key = signing_key.verifying_key();
        let jwk = verifying_key.to_jwk_string();
        assert_eq!(&VerifyingKey::from_jwk_str(&jwk).unwrap(), verifying_key);
    }
}
