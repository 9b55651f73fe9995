//! Random class-name suffixes
//!
//! Generated rule blocks must not collide across concurrently active
//! transitions, so every class and keyframe name carries a short random
//! hex code.

use rand::Rng;

/// Length of the hex code returned by [`random_code`]
pub const CODE_LEN: usize = 6;

const ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Six random characters from the hex alphabet
pub fn random_code() -> String {
    random_code_with_rng(&mut rand::rng())
}

/// [`random_code`] drawing from a caller-supplied RNG
pub fn random_code_with_rng<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// `prefix` followed by a fresh [`random_code`]
pub fn unique_token(prefix: &str) -> String {
    format!("{}{}", prefix, random_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        for _ in 0..64 {
            let code = random_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_seeded_codes_repeat() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let first = random_code_with_rng(&mut StdRng::seed_from_u64(7));
        let second = random_code_with_rng(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert_eq!(first.len(), CODE_LEN);
    }

    #[test]
    fn test_token_prefix() {
        let token = unique_token("__unison_visibility_");
        assert!(token.starts_with("__unison_visibility_"));
        assert_eq!(token.len(), "__unison_visibility_".len() + CODE_LEN);
    }
}
