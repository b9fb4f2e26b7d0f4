//! Reversible randomization of question and choice order.
//!
//! Every shuffle is expressed as a [`Permutation`] so the presented order can
//! always be mapped back to the authored order.

use rand::Rng;
use serde::Serialize;

use crate::model::Question;

/// A bijection over `[0, n)`; `get(i)` is the original index shown at position `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Wraps `order` if it is a bijection over `[0, order.len())`.
    #[must_use]
    pub fn from_vec(order: Vec<usize>) -> Option<Self> {
        let candidate = Self(order);
        candidate.is_bijection().then_some(candidate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Position at which each original index is presented.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.0.len()];
        for (position, &original) in self.0.iter().enumerate() {
            inverse[original] = position;
        }
        Self(inverse)
    }

    #[must_use]
    pub fn is_bijection(&self) -> bool {
        let mut sorted = self.0.clone();
        sorted.sort_unstable();
        sorted.iter().copied().eq(0..self.0.len())
    }
}

/// Uniformly random permutation of `[0, n)` (Fisher–Yates).
pub fn permute<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Permutation {
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        order.swap(i, j);
    }
    Permutation(order)
}

/// Shuffles a quiz for one attempt.
///
/// Returns the question order and, for each presented position, the order of
/// that question's choices. Questions are drawn first, then choices in
/// presented order, so a seeded `rng` reproduces the whole layout.
pub fn randomize_quiz<R: Rng + ?Sized>(
    questions: &[Question],
    rng: &mut R,
) -> (Permutation, Vec<Permutation>) {
    let question_order = permute(questions.len(), &mut *rng);
    let choice_orders = question_order
        .as_slice()
        .iter()
        .map(|&original| permute(questions[original].choices().len(), &mut *rng))
        .collect();
    (question_order, choice_orders)
}

/// A choice as displayed, remembering where it sits in the authored list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedChoice {
    pub text: String,
    pub original_index: usize,
}

/// Lays out `question`'s choices in the order given by `mapping`.
#[must_use]
pub fn displayed_choices(question: &Question, mapping: &Permutation) -> Vec<DisplayedChoice> {
    mapping
        .as_slice()
        .iter()
        .filter_map(|&original_index| {
            question.choice(original_index).map(|text| DisplayedChoice {
                text: text.to_string(),
                original_index,
            })
        })
        .collect()
}
