// Utility functions

use rand::Rng;

/// Generate a new access code: 6 decimal digits, uniform over the full
/// range, leading zeros included.
pub fn generate_access_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_ascii_digits() {
        for _ in 0..1_000 {
            let code = generate_access_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
