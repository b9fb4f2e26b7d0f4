mod terminal;

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{QuizResults, QuizSettings};
use services::{
    Clock, LeaderboardClient, QuizCatalog, QuizRunner, ScoreSubmission, SessionCommand,
    SessionHandle, SubmitOutcome,
};
use storage::ManifestQuizSource;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use terminal::{INPUT_HELP, InputLine, TerminalPresenter, parse_input};

type InputLines = Lines<BufReader<Stdin>>;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuiz { raw: String },
    InvalidTimeLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuiz { raw } => write!(f, "invalid --quiz value: {raw}"),
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--data <dir>] [--quiz <n>] [--time-limit <secs>] [--navigate]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data data");
    eprintln!("  --time-limit 30");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DATA_DIR, QUIZ_TIME_LIMIT, QUIZ_LEADERBOARD_URL, QUIZ_LEADERBOARD_TOKEN, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    data_dir: PathBuf,
    /// 1-based, as shown in the quiz list.
    quiz: Option<usize>,
    time_limit_secs: Option<u32>,
    navigate: bool,
    help: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            data_dir: env("QUIZ_DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| PathBuf::from("data"), PathBuf::from),
            quiz: None,
            time_limit_secs: env("QUIZ_TIME_LIMIT")
                .map(|raw| parse_time_limit(&raw))
                .transpose()?,
            navigate: false,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => parsed.data_dir = PathBuf::from(require_value(args, "--data")?),
                "--quiz" => {
                    let value = require_value(args, "--quiz")?;
                    let n = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or(ArgsError::InvalidQuiz { raw: value.clone() })?;
                    parsed.quiz = Some(n);
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    parsed.time_limit_secs = Some(parse_time_limit(&value)?);
                }
                "--navigate" => parsed.navigate = true,
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn settings(&self) -> Result<QuizSettings, Box<dyn std::error::Error>> {
        let mut settings = QuizSettings::default();
        if let Some(secs) = self.time_limit_secs {
            settings = settings.with_time_limit(secs)?;
        }
        Ok(settings.with_navigation(self.navigate))
    }
}

fn parse_time_limit(raw: &str) -> Result<u32, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ArgsError::InvalidTimeLimit {
            raw: raw.to_string(),
        })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout belongs to the quiz itself.
    let stderr_layer = log_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

async fn choose_quiz(
    catalog: &QuizCatalog,
    preset: Option<usize>,
    input: &mut InputLines,
) -> Result<Option<usize>, Box<dyn std::error::Error>> {
    println!("Available quizzes:");
    for (i, quiz) in catalog.iter().enumerate() {
        println!(
            "  {}. {} ({} questions){}",
            i + 1,
            quiz.title(),
            quiz.question_count(),
            if quiz.description().is_empty() {
                String::new()
            } else {
                format!(" - {}", quiz.description())
            }
        );
    }

    if let Some(n) = preset {
        return Ok(Some(n - 1));
    }

    loop {
        prompt(&format!("Pick a quiz [1-{}], q to quit: ", catalog.len()));
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=catalog.len()).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("  ! enter a number between 1 and {}", catalog.len()),
        }
    }
}

/// Forward stdin to the session until the player quits or input ends.
///
/// Hands the reader back so the leaderboard prompt can keep using it.
async fn pump_input(mut input: InputLines, handle: SessionHandle) -> InputLines {
    loop {
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => {
                let _ = handle.send(SessionCommand::Quit).await;
                return input;
            }
        };
        match parse_input(&line) {
            InputLine::Commands(commands) => {
                for command in commands {
                    if handle.send(command).await.is_err() {
                        return input;
                    }
                    if command == SessionCommand::Quit {
                        return input;
                    }
                }
            }
            InputLine::Help => println!("{INPUT_HELP}"),
            InputLine::Empty => {}
            InputLine::Unknown(raw) => println!("  ! unknown command {raw:?}, ? for help"),
        }
    }
}

async fn offer_leaderboard(
    results: &QuizResults,
    input: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = LeaderboardClient::from_env();
    if !client.enabled() {
        debug!("leaderboard not configured; skipping submission");
        return Ok(());
    }

    let mut submission = loop {
        prompt("Nickname for the leaderboard (empty to skip): ");
        let Some(line) = input.next_line().await? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            return Ok(());
        }
        match ScoreSubmission::for_player(&line, results.total_score) {
            Ok(submission) => break submission,
            Err(err) => println!("  ! {err}"),
        }
    };

    loop {
        match submission.submit(&client).await {
            Ok(SubmitOutcome::Submitted | SubmitOutcome::AlreadySubmitted) => {
                println!("Score submitted.");
                return Ok(());
            }
            Err(err) => {
                println!("  ! could not submit score: {err}");
                prompt("Retry? [y/N] ");
                let retry = input
                    .next_line()
                    .await?
                    .is_some_and(|l| l.trim().eq_ignore_ascii_case("y"));
                if !retry {
                    return Ok(());
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }
    let settings = args.settings()?;

    let source = ManifestQuizSource::new(&args.data_dir);
    let catalog = QuizCatalog::load(&source).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let Some(index) = choose_quiz(&catalog, args.quiz, &mut input).await? else {
        return Ok(());
    };
    let quiz = catalog.get(index)?;

    let presenter = Arc::new(TerminalPresenter::new());
    let runner = QuizRunner::begin(quiz, settings, Clock::default_clock(), presenter)?;
    let input_task = tokio::spawn(pump_input(input, runner.handle()));

    let results = runner.run().await;
    let mut input = input_task.await?;

    if let Some(results) = results {
        offer_leaderboard(&results, &mut input).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut iter = argv.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.quiz, None);
        assert_eq!(args.time_limit_secs, None);
        assert!(!args.navigate);
        assert_eq!(args.settings().unwrap(), QuizSettings::default());
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--data", "quizzes", "--time-limit", "45", "--quiz", "2", "--navigate"],
            &[("QUIZ_DATA_DIR", "elsewhere"), ("QUIZ_TIME_LIMIT", "10")],
        )
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("quizzes"));
        assert_eq!(args.time_limit_secs, Some(45));
        assert_eq!(args.quiz, Some(2));
        let settings = args.settings().unwrap();
        assert_eq!(settings.max_time_per_question_secs(), 45);
        assert!(settings.allow_navigation());
    }

    #[test]
    fn environment_fills_in_missing_flags() {
        let args = parse(&[], &[("QUIZ_DATA_DIR", "from-env"), ("QUIZ_TIME_LIMIT", "12")]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("from-env"));
        assert_eq!(args.time_limit_secs, Some(12));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            parse(&["--quiz", "0"], &[]),
            Err(ArgsError::InvalidQuiz { .. })
        ));
        assert!(matches!(
            parse(&["--time-limit", "soon"], &[]),
            Err(ArgsError::InvalidTimeLimit { .. })
        ));
        assert!(matches!(
            parse(&["--data"], &[]),
            Err(ArgsError::MissingValue { flag: "--data" })
        ));
        assert!(matches!(
            parse(&["--verbose"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn zero_time_limit_fails_settings_validation() {
        let args = parse(&["--time-limit", "0"], &[]).unwrap();
        assert!(args.settings().is_err());
    }
}
