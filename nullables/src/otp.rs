//! Nullable OTP source: codes from a fixed list.

use ballot_workflow::{OtpCode, OtpSource};

/// Hands out pre-configured codes in order, cycling when exhausted.
#[derive(Clone, Debug)]
pub struct NullOtp {
    codes: Vec<u32>,
    index: usize,
}

impl NullOtp {
    /// Codes are given as numbers in `100_000..=999_999`.
    pub fn new(codes: Vec<u32>) -> Self {
        assert!(!codes.is_empty(), "NullOtp needs at least one code");
        Self { codes, index: 0 }
    }

    /// The same code every time.
    pub fn constant(code: u32) -> Self {
        Self::new(vec![code])
    }

    /// How many codes have been issued.
    pub fn issued(&self) -> usize {
        self.index
    }
}

impl Default for NullOtp {
    fn default() -> Self {
        Self::constant(123_456)
    }
}

impl OtpSource for NullOtp {
    fn generate(&mut self) -> OtpCode {
        let code = self.codes[self.index % self.codes.len()];
        self.index += 1;
        OtpCode::from_number(code.saturating_sub(100_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_come_out_in_order() {
        let mut otp = NullOtp::new(vec![111_111, 222_222]);
        assert_eq!(otp.generate().as_str(), "111111");
        assert_eq!(otp.generate().as_str(), "222222");
        assert_eq!(otp.generate().as_str(), "111111");
        assert_eq!(otp.issued(), 3);
    }

    #[test]
    fn default_is_123456() {
        assert_eq!(NullOtp::default().generate().as_str(), "123456");
    }
}
