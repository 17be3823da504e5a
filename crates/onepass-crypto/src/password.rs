use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{rand_bytes, CryptoError, Result};

/// Minimum length for generated passwords; anything shorter cannot contain
/// the required lowercase, uppercase and digit characters alongside the
/// section separators.
pub const MIN_PASSWORD_LEN: usize = 4;

const SECTION_LEN: usize = 3;

/// Generate a password suitable for use in most signup forms.
///
/// The result is exactly `length` characters drawn from the base64 alphabet
/// minus `+`, `/` and `=`, grouped into sections of three separated by `-`,
/// and always contains at least one lowercase letter, one uppercase letter
/// and one digit.
pub fn gen_password(length: usize) -> Result<String> {
    if length < MIN_PASSWORD_LEN {
        return Err(CryptoError::PasswordTooShort {
            requested: length,
            min: MIN_PASSWORD_LEN,
        });
    }
    loop {
        let candidate = gen_candidate(length);
        let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        if has_lower && has_upper && has_digit {
            return Ok(candidate);
        }
    }
}

fn gen_candidate(length: usize) -> String {
    let mut output = String::with_capacity(length);
    let mut pool = String::new();
    let mut i = 0;
    while output.len() < length {
        if i >= pool.len() {
            pool.push_str(&STANDARD.encode(rand_bytes(length)));
        }
        let ch = pool.as_bytes()[i] as char;
        if ch != '+' && ch != '/' && ch != '=' {
            // a separator every SECTION_LEN chars, but never as the final one
            if output.len() % (SECTION_LEN + 1) == SECTION_LEN && length - output.len() > 1 {
                output.push('-');
            }
            output.push(ch);
        }
        i += 1;
    }
    output
}
