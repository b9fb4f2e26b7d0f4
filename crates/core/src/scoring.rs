use crate::model::{Answer, Question, QuestionDetail, Quiz, QuizResults, QuizSettings};
use crate::shuffle::Permutation;

/// Points awarded for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionScore {
    pub points: u32,
    pub speed_bonus: u32,
}

/// Turns recorded answers and timings into points.
///
/// A correct answer earns `base_points` plus a speed bonus of
/// `floor(bonus_max * (1 - elapsed / time_limit))`; anything else earns zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    base_points: u32,
    bonus_max: u32,
    time_limit_secs: u32,
}

impl Scorer {
    #[must_use]
    pub fn new(settings: &QuizSettings) -> Self {
        Self {
            base_points: settings.base_points(),
            bonus_max: settings.bonus_max(),
            time_limit_secs: settings.max_time_per_question_secs().max(1),
        }
    }

    #[must_use]
    pub fn max_points_per_question(&self) -> u32 {
        self.base_points.saturating_add(self.bonus_max)
    }

    #[must_use]
    pub fn speed_bonus(&self, elapsed_secs: u32) -> u32 {
        let elapsed = u64::from(elapsed_secs.min(self.time_limit_secs));
        let limit = u64::from(self.time_limit_secs);
        // Integer division floors, matching the float formula for non-negative inputs.
        let bonus = u64::from(self.bonus_max) * (limit - elapsed) / limit;
        u32::try_from(bonus).unwrap_or(self.bonus_max)
    }

    #[must_use]
    pub fn score_of(&self, question: &Question, answer: Answer, elapsed_secs: u32) -> QuestionScore {
        match answer {
            Answer::Choice(index) if question.is_correct(index) => {
                let speed_bonus = self.speed_bonus(elapsed_secs);
                QuestionScore {
                    points: self.base_points.saturating_add(speed_bonus),
                    speed_bonus,
                }
            }
            Answer::Choice(_) | Answer::Unanswered | Answer::TimedOut => QuestionScore::default(),
        }
    }

    /// Scores a finished attempt.
    ///
    /// `answers` and `times_secs` are indexed by presented position; `order`
    /// maps presented positions to authored question indices. Details are
    /// returned in authored order.
    #[must_use]
    pub fn finalize(
        &self,
        quiz: &Quiz,
        order: &Permutation,
        answers: &[Answer],
        times_secs: &[u32],
    ) -> QuizResults {
        let questions = quiz.questions();
        let presented_at = order.inverse();

        let details: Vec<QuestionDetail> = questions
            .iter()
            .enumerate()
            .map(|(original_index, question)| {
                let presented_position = presented_at.get(original_index).unwrap_or(original_index);
                let answer = answers.get(presented_position).copied().unwrap_or_default();
                let time_taken_secs = times_secs.get(presented_position).copied().unwrap_or(0);
                let score = self.score_of(question, answer, time_taken_secs);
                QuestionDetail {
                    original_index,
                    presented_position,
                    topic: question.topic().to_string(),
                    prompt: question.prompt().to_string(),
                    answer,
                    selected_text: answer
                        .choice()
                        .and_then(|i| question.choice(i))
                        .map(str::to_string),
                    correct_text: question.correct_choice().to_string(),
                    is_correct: answer.choice().is_some_and(|i| question.is_correct(i)),
                    time_taken_secs,
                    points: score.points,
                    speed_bonus: score.speed_bonus,
                }
            })
            .collect();

        let total_score: u32 = details.iter().map(|d| d.points).sum();
        let count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        let max_possible_score = count.saturating_mul(self.max_points_per_question());
        let percentage = if max_possible_score == 0 {
            0.0
        } else {
            f64::from(total_score) / f64::from(max_possible_score) * 100.0
        };

        // Zero means "never measured", so it is left out of the time statistics.
        let measured: Vec<u32> = times_secs.iter().copied().filter(|&t| t > 0).collect();
        let average_time_secs = if measured.is_empty() {
            0.0
        } else {
            measured.iter().map(|&t| f64::from(t)).sum::<f64>() / measured.len() as f64
        };
        let fastest_time_secs = measured.iter().copied().min().unwrap_or(0);

        QuizResults {
            quiz_id: quiz.id().clone(),
            total_score,
            max_possible_score,
            percentage,
            average_time_secs,
            fastest_time_secs,
            details,
        }
    }
}
