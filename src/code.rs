//! Generation of the 6-digit verification and reset codes.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

/// Codes are always exactly six ASCII digits.
pub const CODE_LEN: usize = 6;

/// Generate a 6-digit code from the OS random source.
///
/// Drawn uniformly over `000000..=999999` so no leading digit is favored;
/// leading zeros are kept because codes are compared as strings.
#[must_use]
pub fn generate() -> String {
    let value: u32 = OsRng.gen_range(0..=999_999);
    format!("{value:06}")
}

/// Expiry timestamp for a code issued at `now`.
#[must_use]
pub fn expiry(now: DateTime<Utc>, ttl_seconds: i64) -> DateTime<Utc> {
    now + Duration::seconds(ttl_seconds)
}

/// Shape check applied before any store lookup.
#[must_use]
pub fn valid_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{expiry, generate, valid_code, CODE_LEN};
    use chrono::{Duration, Utc};

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..64 {
            let code = generate();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| b.is_ascii_digit()), "code: {code}");
        }
    }

    #[test]
    fn generated_codes_vary() {
        let first = generate();
        // 64 draws over a million values colliding every time is not credible
        let any_different = (0..64).any(|_| generate() != first);
        assert!(any_different);
    }

    #[test]
    fn expiry_adds_ttl() {
        let now = Utc::now();
        assert_eq!(expiry(now, 900), now + Duration::seconds(900));
    }

    #[test]
    fn valid_code_rejects_malformed() {
        assert!(valid_code("000000"));
        assert!(valid_code("987654"));
        assert!(!valid_code("12345"));
        assert!(!valid_code("1234567"));
        assert!(!valid_code("12a456"));
        assert!(!valid_code(""));
    }
}
