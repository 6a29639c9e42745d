// One-time code generation and verification for buyer-agent connections

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Codes are valid for fifteen minutes from issue
pub const OTP_TTL_MINUTES: i64 = 15;

pub const OTP_EXPIRED: &str = "OTP has expired";
pub const OTP_INVALID: &str = "Invalid OTP";

/// Six-digit numeric code, zero-padded
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_TTL_MINUTES)
}

/// Outcome of checking a submitted code against the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Expired,
    Mismatch,
}

/// Expiry is checked before the code itself, so an expired code is rejected
/// even when it matches. A connection whose code was already cleared by a
/// previous verification fails as a mismatch, not a server error.
pub fn check_code(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> OtpCheck {
    match expires {
        Some(deadline) if now > deadline => return OtpCheck::Expired,
        None => return OtpCheck::Mismatch,
        _ => {},
    }

    match stored {
        Some(code) if code == submitted => OtpCheck::Valid,
        _ => OtpCheck::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_valid_code_within_window() {
        let now = Utc::now();
        assert_eq!(
            check_code(Some("123456"), Some(expiry_from(now)), "123456", now),
            OtpCheck::Valid
        );
    }

    #[test]
    fn test_expired_code_rejected_even_if_correct() {
        let now = Utc::now();
        let expired = now - Duration::minutes(1);
        assert_eq!(
            check_code(Some("123456"), Some(expired), "123456", now),
            OtpCheck::Expired
        );
    }

    #[test]
    fn test_wrong_code_rejected() {
        let now = Utc::now();
        assert_eq!(
            check_code(Some("123456"), Some(expiry_from(now)), "654321", now),
            OtpCheck::Mismatch
        );
    }

    #[test]
    fn test_cleared_code_fails_gracefully() {
        // Second verify call after confirmation: code and expiry are gone
        let now = Utc::now();
        assert_eq!(check_code(None, None, "123456", now), OtpCheck::Mismatch);
        assert_eq!(
            check_code(None, Some(expiry_from(now)), "123456", now),
            OtpCheck::Mismatch
        );
    }

    #[test]
    fn test_expiry_window_is_fifteen_minutes() {
        let now = Utc::now();
        assert_eq!(expiry_from(now) - now, Duration::minutes(15));
    }
}
