//! Booking reference codes
//!
//! Codes are sampled uniformly from an alphabet without the look-alike
//! characters `I`, `O`, `0` and `1`. Uniqueness is not decided here: the
//! reserving transaction checks each candidate against every code issued so
//! far and claims it under a unique key, which rejects any race that slips
//! past the check.

use rand::Rng;

use crate::shared::errors::DomainError;

pub const DEFAULT_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const DEFAULT_LENGTH: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone)]
pub struct ReferenceCodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: u32,
}

impl Default for ReferenceCodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReferenceCodeGenerator {
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length: length.max(1),
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Restrict the alphabet (tests use this to force collisions).
    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        let chars: Vec<char> = alphabet.chars().collect();
        if !chars.is_empty() {
            self.alphabet = chars;
        }
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// One random candidate code.
    pub fn candidate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }

    /// Error reported once every attempt collided.
    pub fn exhausted(&self) -> DomainError {
        DomainError::ReferenceGenerationExhausted {
            attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_use_alphabet_and_length() {
        let generator = ReferenceCodeGenerator::default();
        for _ in 0..200 {
            let code = generator.candidate();
            assert_eq!(code.len(), DEFAULT_LENGTH);
            assert!(code.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn codes_are_not_digit_only() {
        let generator = ReferenceCodeGenerator::default();
        let has_letters = (0..50)
            .map(|_| generator.candidate())
            .any(|code| code.chars().any(|c| c.is_ascii_alphabetic()));
        assert!(has_letters);
    }

    #[test]
    fn codes_are_distinct() {
        let generator = ReferenceCodeGenerator::default();
        let codes: HashSet<String> = (0..1000).map(|_| generator.candidate()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn exhausted_reports_attempt_budget() {
        let generator = ReferenceCodeGenerator::new(10, 3);
        assert!(matches!(
            generator.exhausted(),
            DomainError::ReferenceGenerationExhausted { attempts: 3 }
        ));
    }
}
