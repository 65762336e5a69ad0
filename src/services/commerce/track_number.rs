use rand::Rng;

/// Upper-case alphanumerics only, so track numbers survive being read aloud
/// or typed from a confirmation email.
const TRACK_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_TRACK_NUMBER_LENGTH: usize = 10;

/// Generates fixed-length random order track numbers.
///
/// Samples the thread-local RNG per call, so instances are freely shareable
/// across concurrent checkouts. Collisions are treated as astronomically
/// unlikely and are not retried; the unique index on `orders.track_number`
/// turns one into a transaction failure rather than a duplicate order.
#[derive(Debug, Clone)]
pub struct TrackNumberGenerator {
    length: usize,
}

impl TrackNumberGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| {
                let idx = rng.gen_range(0..TRACK_NUMBER_ALPHABET.len());
                TRACK_NUMBER_ALPHABET[idx] as char
            })
            .collect()
    }
}

impl Default for TrackNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK_NUMBER_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_fixed_length_codes() {
        let gen = TrackNumberGenerator::new(12);
        assert_eq!(gen.generate().len(), 12);
        assert_eq!(TrackNumberGenerator::default().generate().len(), DEFAULT_TRACK_NUMBER_LENGTH);
    }

    #[test]
    fn uses_only_the_alphabet() {
        let gen = TrackNumberGenerator::default();
        for _ in 0..50 {
            let code = gen.generate();
            assert!(code
                .bytes()
                .all(|b| TRACK_NUMBER_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn successive_codes_differ() {
        let gen = TrackNumberGenerator::default();
        let a = gen.generate();
        let b = gen.generate();
        assert_ne!(a, b);
    }
}
