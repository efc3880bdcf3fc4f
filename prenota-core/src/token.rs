use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How many random bytes make up the nonce of a session token
pub const NONCE_LENGTH: usize = 24;

const SEPARATOR: char = '.';

/// Creates a new opaque session token signed with `secret`.
///
/// The token has the shape `nonce.signature`, both hex-encoded.
pub fn create_token(secret: &str) -> String {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let nonce = hex::encode(nonce);
    let signature = sign(&nonce, secret);

    format!("{nonce}{SEPARATOR}{signature}")
}

/// Returns true if the token was signed with `secret`.
///
/// Fails closed: absent or malformed tokens are simply invalid.
pub fn verify_token(token: Option<&str>, secret: &str) -> bool {
    let Some(token) = token else {
        return false;
    };

    let parts: Vec<_> = token.split(SEPARATOR).collect();

    let [nonce, signature] = parts.as_slice() else {
        return false;
    };

    if nonce.is_empty() || signature.is_empty() {
        return false;
    }

    let expected = sign(nonce, secret);

    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

fn sign(input: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, so this never fails
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac takes any key size");
    mac.update(input.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "a-very-long-session-secret";

    #[test]
    fn test_roundtrip() {
        let token = create_token(SECRET);

        assert!(verify_token(Some(&token), SECRET), "fresh token is valid");

        let (nonce, signature) = token.split_once('.').unwrap();
        assert_eq!(nonce.len(), NONCE_LENGTH * 2, "nonce is hex of 24 bytes");
        assert_eq!(signature.len(), 64, "signature is hex sha256");
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(create_token(SECRET), create_token(SECRET));
    }

    #[test]
    fn test_tampered_signature() {
        let token = create_token(SECRET);
        let dot = token.find('.').unwrap();

        for index in (dot + 1)..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'0' { b'1' } else { b'0' };

            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                !verify_token(Some(&tampered), SECRET),
                "altering signature char {index} invalidates the token"
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_token(SECRET);

        assert!(!verify_token(Some(&token), "another-secret"));
        assert!(!verify_token(Some(&token), ""));
    }

    #[test]
    fn test_malformed() {
        let token = create_token(SECRET);

        assert!(!verify_token(None, SECRET), "absent token");
        assert!(!verify_token(Some(""), SECRET), "empty token");
        assert!(!verify_token(Some("no-separator"), SECRET));
        assert!(!verify_token(Some(&format!("{token}.extra")), SECRET));
        assert!(!verify_token(Some(".abc"), SECRET));
        assert!(!verify_token(Some("abc."), SECRET));
    }
}
