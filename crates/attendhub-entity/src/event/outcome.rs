//! Terminal verification outcome.

use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;

use super::status::EventStatus;

/// The single write the worker makes to an event.
///
/// A score exists only on the `Processed` arm, so an event can never be
/// failed with a score or processed without one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// Face verification succeeded.
    Processed {
        /// Confidence in `[0, 1]`.
        match_score: f64,
    },
    /// Face verification failed.
    Failed,
}

impl EventOutcome {
    /// A processed outcome, rejecting scores outside `[0, 1]`.
    pub fn processed(match_score: f64) -> AppResult<Self> {
        if !(0.0..=1.0).contains(&match_score) {
            return Err(AppError::validation(format!(
                "match score {match_score} is outside [0, 1]"
            )));
        }
        Ok(Self::Processed { match_score })
    }

    /// The status this outcome writes.
    pub fn status(&self) -> EventStatus {
        match self {
            Self::Processed { .. } => EventStatus::Processed,
            Self::Failed => EventStatus::Failed,
        }
    }

    /// The score this outcome writes.
    pub fn match_score(&self) -> Option<f64> {
        match self {
            Self::Processed { match_score } => Some(*match_score),
            Self::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_requires_unit_interval() {
        assert!(EventOutcome::processed(0.0).is_ok());
        assert!(EventOutcome::processed(1.0).is_ok());
        assert!(EventOutcome::processed(-0.1).is_err());
        assert!(EventOutcome::processed(1.01).is_err());
        assert!(EventOutcome::processed(f64::NAN).is_err());
    }

    #[test]
    fn test_score_only_on_processed() {
        let processed = EventOutcome::processed(0.95).unwrap();
        assert_eq!(processed.status(), EventStatus::Processed);
        assert_eq!(processed.match_score(), Some(0.95));

        assert_eq!(EventOutcome::Failed.status(), EventStatus::Failed);
        assert_eq!(EventOutcome::Failed.match_score(), None);
    }
}
