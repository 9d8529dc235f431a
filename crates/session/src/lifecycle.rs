//! Platform decoder lifecycle tracking.

/// The state of a platform decoder, with the recovery attempt counter held
/// explicitly rather than in an ad-hoc retry loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DecoderLifecycle {
    /// No decoder has been created yet.
    #[default]
    Uninitialized,
    /// The decoder is accepting input.
    Ready,
    /// The decoder errored; `attempts` recoveries have been spent on it.
    Failed {
        /// Recovery attempts consumed so far.
        attempts: u32,
    },
    /// Recovery was abandoned; the decoder must not be retried.
    PermanentlyFailed,
}

impl DecoderLifecycle {
    /// Records a successful (re)initialization.
    ///
    /// Has no effect once the decoder is permanently failed; a late init
    /// completing after the session gave up must not resurrect it.
    pub fn initialized(&mut self) {
        if *self != Self::PermanentlyFailed {
            *self = Self::Ready;
        }
    }

    /// Records a decoder error.
    ///
    /// Keeps the attempt counter of an already-failed decoder so repeated
    /// errors during recovery still count against the budget.
    pub fn fail(&mut self) {
        *self = match *self {
            Self::Failed { attempts } => Self::Failed { attempts },
            Self::PermanentlyFailed => Self::PermanentlyFailed,
            _ => Self::Failed { attempts: 0 },
        };
    }

    /// Spends one recovery attempt.
    ///
    /// Returns `true` when the caller should recreate the decoder. Returns
    /// `false` from any state that is not failed, or once `max_attempts`
    /// have been spent, in which case the state becomes
    /// [`PermanentlyFailed`](Self::PermanentlyFailed).
    pub fn recover(&mut self, max_attempts: u32) -> bool {
        match *self {
            Self::Failed { attempts } if attempts < max_attempts => {
                *self = Self::Failed { attempts: attempts + 1 };
                true
            }
            Self::Failed { .. } => {
                *self = Self::PermanentlyFailed;
                false
            }
            _ => false,
        }
    }

    /// Whether the decoder is accepting input.
    pub fn is_ready(&self) -> bool {
        *self == Self::Ready
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_is_bounded() {
        let mut state = DecoderLifecycle::default();
        state.initialized();
        assert!(state.is_ready());

        state.fail();
        assert!(state.recover(2));
        assert_eq!(state, DecoderLifecycle::Failed { attempts: 1 });
        assert!(state.recover(2));
        assert!(!state.recover(2));
        assert_eq!(state, DecoderLifecycle::PermanentlyFailed);
    }

    #[test]
    fn test_permanent_failure_is_sticky() {
        let mut state = DecoderLifecycle::Failed { attempts: 0 };
        assert!(!state.recover(0));

        state.initialized();
        assert_eq!(state, DecoderLifecycle::PermanentlyFailed);
        assert!(!state.recover(10));
    }

    #[test]
    fn test_reinit_clears_failure() {
        let mut state = DecoderLifecycle::Failed { attempts: 1 };
        state.initialized();
        assert!(state.is_ready());

        // A fresh failure starts a fresh budget.
        state.fail();
        assert_eq!(state, DecoderLifecycle::Failed { attempts: 0 });
    }

    #[test]
    fn test_recover_without_failure_is_noop() {
        let mut state = DecoderLifecycle::Ready;
        assert!(!state.recover(3));
        assert!(state.is_ready());
    }
}
