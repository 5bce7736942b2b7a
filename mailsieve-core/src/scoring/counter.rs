//! Process-wide average of distinct symbols per message.
//!
//! The average pre-sizes the symbol map of subsequent results so typical
//! messages never rehash. Updates race-safely via compare-exchange on the
//! bit pattern of the stored f64; tasks may be dropped from any thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Exponentially-weighted moving average with smoothing factor 0.5.
#[derive(Debug)]
pub(crate) struct Ema {
    bits: AtomicU64,
}

impl Ema {
    pub(crate) const fn new() -> Self {
        // f64 0.0 has an all-zero bit pattern.
        Self {
            bits: AtomicU64::new(0),
        }
    }

    /// Fold one observation into the average.
    pub(crate) fn observe(&self, value: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let mean = f64::from_bits(current);
            let next = mean * 0.5 + value * 0.5;
            match self.bits.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    pub(crate) fn mean(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

static SYMBOLS_PER_MESSAGE: Ema = Ema::new();

/// Record the distinct-symbol count of a finished result.
pub(crate) fn observe_symbols_count(count: usize) {
    SYMBOLS_PER_MESSAGE.observe(count as f64);
}

/// Capacity hint for the symbol map of a fresh result, never below 4.
pub(crate) fn suggested_symbols_capacity() -> usize {
    (SYMBOLS_PER_MESSAGE.mean().round() as usize).max(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_halves_toward_each_observation() {
        let ema = Ema::new();
        ema.observe(10.0);
        assert!((ema.mean() - 5.0).abs() < 1e-12);
        ema.observe(10.0);
        assert!((ema.mean() - 7.5).abs() < 1e-12);
        ema.observe(0.0);
        assert!((ema.mean() - 3.75).abs() < 1e-12);
    }

    #[test]
    fn ema_matches_smoothing_formula() {
        let ema = Ema::new();
        let mut expected = 0.0;
        for observed in [3.0, 12.0, 7.0, 42.0] {
            ema.observe(observed);
            expected = expected * 0.5 + observed * 0.5;
            assert!((ema.mean() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn capacity_hint_is_clamped() {
        // The global average may have been nudged by other tests; the hint
        // contract is only that it never drops below 4.
        assert!(suggested_symbols_capacity() >= 4);
    }
}
