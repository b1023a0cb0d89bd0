//! Login code generation and comparison.
//!
//! Codes are 6-digit decimal strings drawn uniformly from
//! `100000..=999999`, so they never carry a leading zero and always
//! render as exactly six digits. Generation uses the operating system's
//! secure random source directly.

use rand::Rng;
use rand::rngs::OsRng;

/// A function that produces one-time login codes.
///
/// The default generator draws from the OS CSPRNG. Tests inject fixed
/// generators through the builder to make flows deterministic.
pub type CodeGeneratorFn = Box<dyn Fn() -> String + Send + Sync>;

/// Inclusive bounds of the generated code range.
pub(crate) const CODE_MIN: u32 = 100_000;
pub(crate) const CODE_MAX: u32 = 999_999;

/// Draws a fresh 6-digit login code from the OS secure random source.
pub(crate) fn generate_code() -> String {
    OsRng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// The default code generator.
pub(crate) fn default_generator() -> CodeGeneratorFn {
    Box::new(generate_code)
}

/// Compares two byte strings without leaking where they diverge
/// through timing.
///
/// Codes are compared exactly as strings; `"024680"` and `"24680"` are
/// different codes. Length is the only thing an observer can learn.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_stay_in_range() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let first = generate_code();
        // Drawing the same code 20 times in a row is practically impossible.
        let all_same = (0..20).all(|_| generate_code() == first);
        assert!(!all_same);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"123456", b"12345"));
        assert!(constant_time_eq(b"", b""));
        // Leading zeros are significant
        assert!(!constant_time_eq(b"024680", b"24680"));
    }
}
