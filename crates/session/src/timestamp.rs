//! Presentation timestamp normalization.

/// Rebases encoder presentation timestamps to a session-local origin.
///
/// Encoders report timestamps on an arbitrary clock (often boot time). The
/// first timestamp fed to [`normalize`](TimestampNormalizer::normalize)
/// pins the origin; every later timestamp is reported relative to it, in
/// milliseconds, alongside a running frame index.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampNormalizer {
    first_timestamp: Option<i64>,
    frame_index: u64,
}

/// A timestamp rebased by [`TimestampNormalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTimestamp {
    /// Milliseconds since the session origin.
    pub millis: i64,
    /// Zero-based index of the frame this timestamp belongs to.
    pub frame_index: u64,
}

impl TimestampNormalizer {
    /// Creates a normalizer with no origin pinned yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebases `pts_us` (microseconds) against the session origin.
    pub fn normalize(&mut self, pts_us: i64) -> NormalizedTimestamp {
        let origin = *self.first_timestamp.get_or_insert(pts_us);
        let frame_index = self.frame_index;
        self.frame_index += 1;

        NormalizedTimestamp {
            millis: (pts_us - origin) / 1000,
            frame_index,
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_pinned_by_first_call() {
        let mut normalizer = TimestampNormalizer::new();

        let first = normalizer.normalize(9_876_543_210);
        assert_eq!(first.millis, 0);
        assert_eq!(first.frame_index, 0);

        let second = normalizer.normalize(9_876_576_543);
        assert_eq!(second.millis, 33);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn test_timestamps_before_origin_go_negative() {
        let mut normalizer = TimestampNormalizer::new();
        normalizer.normalize(1_000_000);

        assert_eq!(normalizer.normalize(0).millis, -1000);
    }
}
