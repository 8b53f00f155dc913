//! How an exchange ended, and what that means for its log line.

use tracing::Level;

/// The result of one request as far as logging is concerned.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Outcome {
    /// The downstream handler returned `Ok`.
    Success,
    /// The downstream handler returned an error.
    Failure,
}

impl Outcome {
    pub(crate) fn of<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(_) => Self::Failure,
        }
    }
}

/// Severity and message to log for each [`Outcome`].
///
/// | Outcome | Level | Message |
/// |---|---|---|
/// | `Success` | `INFO` | request has been successfully processed |
/// | `Failure` | `ERROR` | error by handling request |
#[derive(Clone, Debug)]
pub struct Outcomes {
    success: (Level, &'static str),
    failure: (Level, &'static str),
}

impl Outcomes {
    /// Overrides the entry for one outcome.
    pub fn set(&mut self, outcome: Outcome, level: Level, message: &'static str) {
        *self.slot(outcome) = (level, message);
    }

    pub fn get(&self, outcome: Outcome) -> (Level, &'static str) {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Failure => self.failure,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut (Level, &'static str) {
        match outcome {
            Outcome::Success => &mut self.success,
            Outcome::Failure => &mut self.failure,
        }
    }
}

impl Default for Outcomes {
    fn default() -> Self {
        Self {
            success: (Level::INFO, "request has been successfully processed"),
            failure: (Level::ERROR, "error by handling request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let outcomes = Outcomes::default();
        assert_eq!(
            outcomes.get(Outcome::Success),
            (Level::INFO, "request has been successfully processed"),
        );
        assert_eq!(outcomes.get(Outcome::Failure), (Level::ERROR, "error by handling request"));
    }

    #[test]
    fn set_overrides_one_entry() {
        let mut outcomes = Outcomes::default();
        outcomes.set(Outcome::Failure, Level::WARN, "handler failed");
        assert_eq!(outcomes.get(Outcome::Failure), (Level::WARN, "handler failed"));
        assert_eq!(outcomes.get(Outcome::Success).0, Level::INFO);
    }

    #[test]
    fn outcome_follows_result() {
        assert_eq!(Outcome::of(&Ok::<(), ()>(())), Outcome::Success);
        assert_eq!(Outcome::of(&Err::<(), ()>(())), Outcome::Failure);
    }
}
