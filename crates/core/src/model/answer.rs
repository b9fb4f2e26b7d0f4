use serde::{Deserialize, Serialize};

/// What was recorded for one presented question.
///
/// `Choice` always holds an index into the question's *original* choice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Answer {
    #[default]
    Unanswered,
    Choice(usize),
    TimedOut,
}

impl Answer {
    #[must_use]
    pub fn choice(self) -> Option<usize> {
        match self {
            Answer::Choice(index) => Some(index),
            Answer::Unanswered | Answer::TimedOut => None,
        }
    }

    #[must_use]
    pub fn is_unanswered(self) -> bool {
        matches!(self, Answer::Unanswered)
    }

    #[must_use]
    pub fn is_timed_out(self) -> bool {
        matches!(self, Answer::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_is_distinct_from_every_choice() {
        assert_ne!(Answer::TimedOut, Answer::Choice(0));
        assert_eq!(Answer::TimedOut.choice(), None);
        assert_eq!(Answer::Choice(0).choice(), Some(0));
        assert!(Answer::default().is_unanswered());
    }
}
