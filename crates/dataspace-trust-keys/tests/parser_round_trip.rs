//! Parser round-trip tests
//!
//! Generated EC and RSA keys encoded as PEM or base64 DER decode to
//! cryptographically equal key material through the default registry.

use dataspace_trust_keys::test_utils;
use dataspace_trust_keys::{KeyMaterial, KeyParserRegistry, PrivateKey, PublicKey};

#[test]
fn test_ec_round_trip() {
    let registry = KeyParserRegistry::with_default_parsers();
    let secret = test_utils::ec_private_key();
    let public = secret.public_key();

    let der_private = test_utils::ec_private_der_b64(&secret);
    let der_public = test_utils::ec_public_der_b64(&public);
    let jwk_public = test_utils::ec_public_jwk(&public);

    for encoded in [test_utils::ec_private_pem(&secret), der_private] {
        let material = registry.parse(&encoded).unwrap();
        assert_eq!(material.into_private(), Some(PrivateKey::EcP256(secret.clone())));
    }
    for encoded in [test_utils::ec_public_pem(&public), der_public, jwk_public] {
        let material = registry.parse(&encoded).unwrap();
        assert_eq!(material.into_public(), Some(PublicKey::EcP256(public)));
    }
}

#[test]
fn test_rsa_round_trip() {
    let registry = KeyParserRegistry::with_default_parsers();
    let private = test_utils::rsa_private_key();
    let public = private.to_public_key();

    let der_private = test_utils::rsa_private_der_b64(&private);
    let der_public = test_utils::rsa_public_der_b64(&public);

    for encoded in [test_utils::rsa_private_pem(&private), der_private] {
        let material = registry.parse(&encoded).unwrap();
        assert_eq!(material.into_private(), Some(PrivateKey::from(private.clone())));
    }
    for encoded in [test_utils::rsa_public_pem(&public), der_public] {
        match registry.parse(&encoded).unwrap() {
            KeyMaterial::Public(key) => assert_eq!(key, PublicKey::Rsa(public.clone())),
            other => panic!("Expected public key, got {other:?}"),
        }
    }
}

#[test]
fn test_pem_body_without_armour_parses_as_der() {
    let registry = KeyParserRegistry::with_default_parsers();
    let public = test_utils::ec_private_key().public_key();

    let pem = test_utils::ec_public_pem(&public);
    let body: String = pem.lines().filter(|line| !line.starts_with("-----")).collect::<Vec<_>>().join("\n");

    assert_eq!(registry.parse(&body).unwrap().into_public(), Some(PublicKey::EcP256(public)));
}
