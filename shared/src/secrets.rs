//! Shared-secret handling for the charger trust boundary.
//!
//! Chargers never store plaintext secrets; the database holds a hex SHA-256
//! digest and authentication compares digests in constant time.

use {sha2::{Digest, Sha256}, subtle::ConstantTimeEq};

/// Hex-encoded SHA-256 digest of a shared secret.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Constant-time equality of two hex digests.
///
/// Undecodable or differently sized inputs compare unequal without leaking
/// where they diverge.
pub fn constant_time_eq_hex(a_hex: &str, b_hex: &str) -> bool {
    let (Ok(a), Ok(b)) = (hex::decode(a_hex), hex::decode(b_hex)) else {
        return false;
    };
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(&b).into()
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test]
    fn test_hash_secret_is_hex_sha256() {
        assert_eq!(
            hash_secret("devsecret"),
            "202576c5dc6a55ad30cc72fcf23e6048f0356c347f0045e4a63da19ce99882f6"
        );
    }

    #[test_case("devsecret", "devsecret", true; "equal secrets match")]
    #[test_case("devsecret", "other", false; "different secrets differ")]
    fn test_constant_time_eq_hex(a: &str, b: &str, expected: bool) {
        assert_eq!(constant_time_eq_hex(&hash_secret(a), &hash_secret(b)), expected);
    }

    #[test]
    fn test_non_hex_input_is_rejected() {
        assert!(!constant_time_eq_hex("zz", &hash_secret("devsecret")));
    }
}
