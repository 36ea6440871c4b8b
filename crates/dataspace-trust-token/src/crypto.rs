//! Conversion of key material into `jsonwebtoken` signing and verification keys

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dataspace_trust_keys::{KeyFamily, PrivateKey, PublicKey, Result, TrustError};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;

/// Signature algorithms accepted for verification unless configured otherwise
pub const DEFAULT_ALLOWED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::ES256,
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Whether `algorithm` can be verified with a key of `family`
pub fn is_compatible(algorithm: Algorithm, family: KeyFamily) -> bool {
    match family {
        KeyFamily::EcP256 => algorithm == Algorithm::ES256,
        KeyFamily::Rsa => matches!(
            algorithm,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ),
        KeyFamily::Symmetric => false,
    }
}

/// Algorithm used when signing with `key`: ES256 for EC, RS256 for RSA
pub fn signing_algorithm(key: &PrivateKey) -> Algorithm {
    match key.family() {
        KeyFamily::Rsa => Algorithm::RS256,
        _ => Algorithm::ES256,
    }
}

/// Convert a private key into a `jsonwebtoken` encoding key
///
/// EC keys are handed over as PKCS#8 DER, RSA keys as PKCS#1 DER.
///
/// # Errors
///
/// Returns [`TrustError::Issuance`] if the key cannot be DER-encoded.
pub fn encoding_key(key: &PrivateKey) -> Result<EncodingKey> {
    match key {
        PrivateKey::EcP256(secret) => {
            let der = secret
                .to_pkcs8_der()
                .map_err(|e| TrustError::Issuance(format!("Failed to encode EC signing key: {e}")))?;
            Ok(EncodingKey::from_ec_der(der.as_bytes()))
        }
        PrivateKey::Rsa(private) => {
            let der = private
                .to_pkcs1_der()
                .map_err(|e| TrustError::Issuance(format!("Failed to encode RSA signing key: {e}")))?;
            Ok(EncodingKey::from_rsa_der(der.as_bytes()))
        }
    }
}

/// Convert a public key into a `jsonwebtoken` decoding key
///
/// # Errors
///
/// Returns [`TrustError::Signature`] if the key components are rejected.
pub fn decoding_key(key: &PublicKey) -> Result<DecodingKey> {
    match key {
        PublicKey::EcP256(public) => {
            let point = public.to_encoded_point(false);
            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                return Err(TrustError::Signature("EC public key is the identity point".to_string()));
            };
            DecodingKey::from_ec_components(&URL_SAFE_NO_PAD.encode(x), &URL_SAFE_NO_PAD.encode(y))
                .map_err(|e| TrustError::Signature(format!("Failed to create EC decoding key: {e}")))
        }
        PublicKey::Rsa(public) => DecodingKey::from_rsa_components(
            &URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            &URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        )
        .map_err(|e| TrustError::Signature(format!("Failed to create RSA decoding key: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataspace_trust_keys::test_utils;

    #[test]
    fn test_algorithm_compatibility() {
        assert!(is_compatible(Algorithm::ES256, KeyFamily::EcP256));
        assert!(!is_compatible(Algorithm::RS256, KeyFamily::EcP256));
        assert!(is_compatible(Algorithm::PS384, KeyFamily::Rsa));
        assert!(!is_compatible(Algorithm::ES256, KeyFamily::Rsa));
        assert!(!is_compatible(Algorithm::HS256, KeyFamily::Rsa));
        assert!(!is_compatible(Algorithm::HS256, KeyFamily::Symmetric));
    }

    #[test]
    fn test_signing_algorithm_follows_key_family() {
        let ec = PrivateKey::from(test_utils::ec_private_key());
        assert_eq!(signing_algorithm(&ec), Algorithm::ES256);

        let rsa = PrivateKey::from(test_utils::rsa_private_key());
        assert_eq!(signing_algorithm(&rsa), Algorithm::RS256);
    }

    #[test]
    fn test_keys_convert() {
        let ec = PrivateKey::from(test_utils::ec_private_key());
        assert!(encoding_key(&ec).is_ok());
        assert!(decoding_key(&ec.public_key()).is_ok());

        let rsa = PrivateKey::from(test_utils::rsa_private_key());
        assert!(encoding_key(&rsa).is_ok());
        assert!(decoding_key(&rsa.public_key()).is_ok());
    }
}
