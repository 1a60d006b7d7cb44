//! Random test data
//!
//! Generators for owners, amounts and currencies used by tests and the load
//! tool. They share one process-wide generator: seeded once by [`init`] at
//! start-up (or lazily on first use), then only drawn from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, OnceLock};

use crate::domain::Currency;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

static RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

/// Seed the process-wide generator from OS entropy. Later calls are no-ops.
pub fn init() {
    rng();
}

/// Seed the process-wide generator with a fixed seed, for reproducible runs.
///
/// Returns `false` if the generator was already seeded.
pub fn init_with_seed(seed: u64) -> bool {
    RNG.set(Mutex::new(StdRng::seed_from_u64(seed))).is_ok()
}

fn rng() -> &'static Mutex<StdRng> {
    RNG.get_or_init(|| Mutex::new(StdRng::from_entropy()))
}

fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    // A panic while holding the lock cannot leave the generator invalid
    let mut guard = rng().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut *guard)
}

/// Random integer in `[min, max]`
///
/// # Panics
/// Panics if `min > max`.
pub fn random_int(min: i64, max: i64) -> i64 {
    with_rng(|r| r.gen_range(min..=max))
}

/// Random lowercase string of length `n`
pub fn random_string(n: usize) -> String {
    with_rng(|r| {
        (0..n)
            .map(|_| ALPHABET[r.gen_range(0..ALPHABET.len())] as char)
            .collect()
    })
}

/// Random owner name
pub fn random_owner() -> String {
    random_string(6)
}

/// Random amount of money, in minor units
pub fn random_money() -> i64 {
    random_int(0, 1000)
}

/// Random supported currency
pub fn random_currency() -> Currency {
    with_rng(|r| Currency::ALL[r.gen_range(0..Currency::ALL.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_int_bounds() {
        for _ in 0..200 {
            let n = random_int(5, 10);
            assert!((5..=10).contains(&n));
        }
        assert_eq!(random_int(7, 7), 7);
    }

    #[test]
    #[should_panic]
    fn test_random_int_inverted_bounds_panics() {
        random_int(10, 5);
    }

    #[test]
    fn test_random_string() {
        let s = random_string(12);
        assert_eq!(s.len(), 12);
        assert!(s.bytes().all(|b| b.is_ascii_lowercase()));
        assert!(random_string(0).is_empty());
    }

    #[test]
    fn test_random_owner_and_money() {
        assert_eq!(random_owner().len(), 6);
        let money = random_money();
        assert!((0..=1000).contains(&money));
    }

    #[test]
    fn test_random_currency_is_supported() {
        for _ in 0..20 {
            let currency = random_currency();
            assert!(crate::domain::is_supported_currency(currency.code()));
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(!init_with_seed(1));
    }
}
