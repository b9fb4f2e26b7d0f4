use std::sync::Mutex;

use quiz_core::model::{Answer, QuizResults};
use services::{Presenter, QuestionSnapshot, SessionCommand, SessionError};

/// Remaining-time values worth a reminder line between full redraws.
const REMINDER_SECS: [u32; 5] = [20, 10, 5, 3, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenKey {
    position: usize,
    selected: Option<usize>,
    is_locked: bool,
}

impl ScreenKey {
    fn of(snapshot: &QuestionSnapshot) -> Self {
        Self {
            position: snapshot.position,
            selected: snapshot.selected_original_index,
            is_locked: snapshot.is_locked,
        }
    }
}

/// Line-oriented presenter for stdout.
///
/// Redraws the question only when something other than the countdown
/// changed; ticks in between print a short reminder at a few thresholds.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    last: Mutex<Option<(ScreenKey, u32)>>,
}

impl TerminalPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for TerminalPresenter {
    fn show_question(&self, snapshot: &QuestionSnapshot) {
        let key = ScreenKey::of(snapshot);
        let remaining = snapshot.seconds_remaining;
        let Ok(mut last) = self.last.lock() else {
            return;
        };

        let fresh_timer = remaining == snapshot.time_limit_secs;
        match *last {
            Some((prev, prev_remaining)) if prev == key && !fresh_timer => {
                if remaining != prev_remaining && REMINDER_SECS.contains(&remaining) {
                    println!("  … {remaining}s left");
                }
            }
            _ => print!("{}", render_question(snapshot)),
        }
        *last = Some((key, remaining));
    }

    fn show_results(&self, results: &QuizResults) {
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
        print!("{}", render_results(results));
    }

    fn show_rejected(&self, error: &SessionError) {
        println!("  ! {error}");
    }

    fn session_closed(&self) {
        println!("Bye.");
    }
}

pub fn render_question(snapshot: &QuestionSnapshot) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "Question {}/{}  [{}]  {}s\n",
        snapshot.position + 1,
        snapshot.total_questions,
        snapshot.topic,
        snapshot.seconds_remaining
    ));
    out.push_str(&format!("{}\n", snapshot.prompt));

    let selected = snapshot.selected_display_index();
    for (i, choice) in snapshot.displayed_choices.iter().enumerate() {
        let marker = if selected == Some(i) { '>' } else { ' ' };
        out.push_str(&format!("{marker} {}. {}\n", i + 1, choice.text));
    }

    if snapshot.is_locked {
        out.push_str("  (answered)\n");
    }
    let mut hints = vec![format!("1-{} answer", snapshot.displayed_choices.len())];
    if snapshot.can_go_back || snapshot.can_go_forward {
        hints.push("sel <n> select only".into());
        hints.push("s submit".into());
    }
    if snapshot.can_go_back {
        hints.push("p previous".into());
    }
    if snapshot.can_go_forward {
        hints.push("n next".into());
    }
    hints.push("r restart".into());
    hints.push("q quit".into());
    out.push_str(&format!("  [{}]\n", hints.join(", ")));
    out
}

pub fn render_results(results: &QuizResults) -> String {
    let mut out = String::new();
    out.push_str("\n=== Results ===\n");
    out.push_str(&format!(
        "Score: {} / {} ({}%)\n",
        results.total_score,
        results.max_possible_score,
        results.percentage_display()
    ));
    out.push_str(&format!(
        "Correct: {}/{}  Average time: {}s  Fastest: {}s\n",
        results.correct_count(),
        results.question_count(),
        results.average_time_display(),
        results.fastest_time_secs
    ));

    for (i, detail) in results.details.iter().enumerate() {
        let mark = if detail.is_correct { '+' } else { '-' };
        let given = match (&detail.answer, &detail.selected_text) {
            (Answer::TimedOut, _) => "timed out".to_string(),
            (_, Some(text)) => text.clone(),
            (_, None) => "no answer".to_string(),
        };
        out.push_str(&format!(
            "{mark} {}. [{}] {}\n    your answer: {given}  correct: {}  {}s  {} pts",
            i + 1,
            detail.topic,
            detail.prompt,
            detail.correct_text,
            detail.time_taken_secs,
            detail.points
        ));
        if detail.speed_bonus > 0 {
            out.push_str(&format!(" (+{} speed)", detail.speed_bonus));
        }
        out.push('\n');
    }
    out.push_str("  [r restart, q quit]\n");
    out
}

/// What one line of player input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Commands(Vec<SessionCommand>),
    Help,
    Empty,
    Unknown(String),
}

/// Map a typed line onto session commands.
///
/// A bare number answers on the spot: it selects the displayed choice and
/// submits it. `sel <n>` only selects, leaving the answer open for `s` or
/// for navigating away.
pub fn parse_input(line: &str) -> InputLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Empty;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if let Some(rest) = lowered
        .strip_prefix("select ")
        .or_else(|| lowered.strip_prefix("sel "))
    {
        return match parse_choice_number(rest) {
            Some(index) => InputLine::Commands(vec![SessionCommand::Select(index)]),
            None => InputLine::Unknown(trimmed.to_string()),
        };
    }
    match lowered.as_str() {
        "s" | "submit" => InputLine::Commands(vec![SessionCommand::Submit]),
        "p" | "prev" | "previous" => InputLine::Commands(vec![SessionCommand::Previous]),
        "n" | "next" => InputLine::Commands(vec![SessionCommand::Next]),
        "r" | "restart" => InputLine::Commands(vec![SessionCommand::Restart]),
        "q" | "quit" | "exit" => InputLine::Commands(vec![SessionCommand::Quit]),
        "h" | "?" | "help" => InputLine::Help,
        other => match parse_choice_number(other) {
            Some(index) => InputLine::Commands(vec![
                SessionCommand::Select(index),
                SessionCommand::Submit,
            ]),
            None => InputLine::Unknown(trimmed.to_string()),
        },
    }
}

/// 1-based choice number as typed, to a 0-based display index.
fn parse_choice_number(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

pub const INPUT_HELP: &str = "\
Commands:
  <number>  answer with that choice
  sel <n>   select choice n without submitting
  s         submit the selected choice
  p / n     previous / next question (when navigation is enabled)
  r         restart with a new shuffle
  q         quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_select_and_submit() {
        assert_eq!(
            parse_input(" 2 \n"),
            InputLine::Commands(vec![SessionCommand::Select(1), SessionCommand::Submit])
        );
    }

    #[test]
    fn sel_selects_without_submitting() {
        assert_eq!(
            parse_input("sel 3"),
            InputLine::Commands(vec![SessionCommand::Select(2)])
        );
        assert_eq!(
            parse_input("Select  1"),
            InputLine::Commands(vec![SessionCommand::Select(0)])
        );
        assert_eq!(parse_input("sel 0"), InputLine::Unknown("sel 0".into()));
        assert_eq!(parse_input("sel x"), InputLine::Unknown("sel x".into()));
    }

    #[test]
    fn zero_and_words_are_unknown() {
        assert_eq!(parse_input("0"), InputLine::Unknown("0".into()));
        assert_eq!(parse_input("maybe"), InputLine::Unknown("maybe".into()));
        assert_eq!(parse_input("   "), InputLine::Empty);
    }

    #[test]
    fn letters_map_to_commands() {
        assert_eq!(parse_input("Q"), InputLine::Commands(vec![SessionCommand::Quit]));
        assert_eq!(parse_input("r"), InputLine::Commands(vec![SessionCommand::Restart]));
        assert_eq!(parse_input("p"), InputLine::Commands(vec![SessionCommand::Previous]));
        assert_eq!(parse_input("?"), InputLine::Help);
    }
}
