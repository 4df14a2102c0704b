//! The ternary result discipline.
//!
//! Resolution and instantiation distinguish three outcomes: a clean
//! success, a partial success whose value is usable but degraded, and a
//! failure with no usable value. Combinators thread accumulated problems
//! forward; `chain` and `map` short-circuit on failure.

use super::problem::Problem;

/// Success, partial success, or failure, with accumulated problems.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Partial(T, Vec<Problem>),
    Failure(Vec<Problem>),
}

impl<T> Outcome<T> {
    /// Build from a possible value and accumulated problems, normalizing
    /// `Partial` with no problems to `Success`.
    pub fn from_parts(value: Option<T>, problems: Vec<Problem>) -> Self {
        match value {
            Some(v) if problems.is_empty() => Outcome::Success(v),
            Some(v) => Outcome::Partial(v, problems),
            None => Outcome::Failure(problems),
        }
    }

    pub fn failure(problem: Problem) -> Self {
        Outcome::Failure(vec![problem])
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn has_value(&self) -> bool {
        !self.is_failure()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) | Outcome::Partial(v, _) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(v) | Outcome::Partial(v, _) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    pub fn problems(&self) -> &[Problem] {
        match self {
            Outcome::Success(_) => &[],
            Outcome::Partial(_, problems) | Outcome::Failure(problems) => problems,
        }
    }

    /// Decompose into value and problems.
    pub fn into_parts(self) -> (Option<T>, Vec<Problem>) {
        match self {
            Outcome::Success(v) => (Some(v), Vec::new()),
            Outcome::Partial(v, problems) => (Some(v), problems),
            Outcome::Failure(problems) => (None, problems),
        }
    }

    /// Transform the value, keeping problems. No-op on failure.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Partial(v, problems) => Outcome::Partial(f(v), problems),
            Outcome::Failure(problems) => Outcome::Failure(problems),
        }
    }

    /// Feed the value into the next step, accumulating this outcome's
    /// problems into the next outcome. Short-circuits on failure.
    pub fn chain<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(v) => f(v),
            Outcome::Partial(v, problems) => f(v).add_problems(problems),
            Outcome::Failure(problems) => Outcome::Failure(problems),
        }
    }

    /// Attach additional problems; a clean success becomes partial.
    pub fn add_problems(self, mut extra: Vec<Problem>) -> Self {
        if extra.is_empty() {
            return self;
        }
        match self {
            Outcome::Success(v) => Outcome::Partial(v, extra),
            Outcome::Partial(v, mut problems) => {
                problems.append(&mut extra);
                Outcome::Partial(v, problems)
            }
            Outcome::Failure(mut problems) => {
                problems.append(&mut extra);
                Outcome::Failure(problems)
            }
        }
    }

    /// Combine many outcomes into one: every problem is kept, and a
    /// single failure fails the whole combination.
    pub fn combine(outcomes: impl IntoIterator<Item = Outcome<T>>) -> Outcome<Vec<T>> {
        let mut values = Vec::new();
        let mut problems = Vec::new();
        let mut failed = false;
        for outcome in outcomes {
            let (value, mut outcome_problems) = outcome.into_parts();
            problems.append(&mut outcome_problems);
            match value {
                Some(v) => values.push(v),
                None => failed = true,
            }
        }
        if failed {
            Outcome::Failure(problems)
        } else {
            Outcome::from_parts(Some(values), problems)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::types::problem::{Severity, kinds};

    fn problem(details: &str) -> Problem {
        Problem::new(kinds::UNEXPECTED_TYPE, "t", Severity::Error).with_details(details)
    }

    #[test]
    fn test_from_parts_normalizes() {
        assert!(Outcome::from_parts(Some(1), vec![]).is_success());
        assert!(matches!(
            Outcome::from_parts(Some(1), vec![problem("p")]),
            Outcome::Partial(1, _)
        ));
        assert!(Outcome::<i32>::from_parts(None, vec![]).is_failure());
    }

    #[test]
    fn test_chain_accumulates_problems() {
        let partial = Outcome::Partial(2, vec![problem("first")]);
        let chained = partial.chain(|v| Outcome::Partial(v * 10, vec![problem("second")]));
        match chained {
            Outcome::Partial(20, problems) => {
                assert_eq!(problems.len(), 2);
                assert_eq!(problems[0].details, "second");
                assert_eq!(problems[1].details, "first");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_chain_short_circuits_on_failure() {
        let failed: Outcome<i32> = Outcome::failure(problem("dead"));
        let chained = failed.chain(|_| Outcome::Success(1));
        assert!(chained.is_failure());
    }

    #[test]
    fn test_combine_fails_whole_on_one_failure() {
        let combined = Outcome::combine(vec![
            Outcome::Success(1),
            Outcome::failure(problem("bad")),
            Outcome::Partial(3, vec![problem("meh")]),
        ]);
        assert!(combined.is_failure());
        assert_eq!(combined.problems().len(), 2);
    }

    #[test]
    fn test_combine_keeps_order_and_problems() {
        let combined = Outcome::combine(vec![
            Outcome::Success(1),
            Outcome::Partial(2, vec![problem("meh")]),
        ]);
        match combined {
            Outcome::Partial(values, problems) => {
                assert_eq!(values, vec![1, 2]);
                assert_eq!(problems.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
