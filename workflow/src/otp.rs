//! One-time codes for the phone challenge.
//!
//! The code never leaves the client: it is shown to the user as if it had
//! been texted and compared locally. It gates the UI, nothing more.

use rand::Rng;
use std::fmt;

/// Number of digits in a code.
pub const OTP_DIGITS: usize = 6;

/// A six-digit numeric code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Build a code from a number in `100_000..=999_999`; other values are
    /// folded into that range.
    pub fn from_number(n: u32) -> Self {
        let n = 100_000 + n % 900_000;
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the user's input is exactly the code.
    pub fn matches(&self, input: &str) -> bool {
        input == self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Source of fresh codes.
pub trait OtpSource {
    fn generate(&mut self) -> OtpCode;
}

/// Codes drawn from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOtp;

impl OtpSource for RandomOtp {
    fn generate(&mut self) -> OtpCode {
        OtpCode::from_number(rand::thread_rng().gen_range(0..900_000))
    }
}
