use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SAMPLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Decide whether an event is kept under `rate` (clamped to [0, 1]).
pub(crate) fn sample(rate: f32) -> bool {
    if rate >= 1.0 {
        return true;
    }
    if rate.is_nan() || rate <= 0.0 {
        return false;
    }

    let draw = SAMPLE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    draw.hash(&mut hasher);
    now_nanos.hash(&mut hasher);

    let unit = (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64;
    unit < rate as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bounds() {
        for _ in 0..100 {
            assert!(sample(1.0));
            assert!(!sample(0.0));
        }
    }

    #[test]
    fn test_sample_out_of_range_is_clamped() {
        assert!(sample(3.0));
        assert!(!sample(-1.0));
        assert!(!sample(f32::NAN));
    }

    #[test]
    fn test_sample_rate_is_roughly_respected() {
        let kept = (0..2_000).filter(|_| sample(0.5)).count();
        assert!((700..=1_300).contains(&kept), "kept {} of 2000", kept);
    }
}
