use std::fmt;

use chrono::{DateTime, Utc};
use course_core::model::{Lesson, LessonId, Question, QuestionId, QuizId, UserId};
use storage::repository::{QuestionDocument, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    quiz_id: QuizId,
    questions_path: Option<String>,
    lesson_id: LessonId,
    user_id: Option<UserId>,
    streak: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidStreak { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw:?}"),
            ArgsError::InvalidStreak { raw } => write!(f, "invalid --streak value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

fn parse_id<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidId { flag, raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("COURSE_DB_URL").unwrap_or_else(|_| "sqlite://dev.sqlite3?mode=rwc".into());
        let mut quiz_id = parse_id("--quiz-id", "js-basics".to_string())?;
        let mut questions_path = None;
        let mut lesson_id = parse_id("--lesson-id", "1".to_string())?;
        let mut user_id = match std::env::var("COURSE_USER_ID") {
            Ok(raw) => Some(parse_id("COURSE_USER_ID", raw)?),
            Err(_) => None,
        };
        let mut streak = 0;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--quiz-id" => {
                    quiz_id = parse_id("--quiz-id", require_value(&mut args, "--quiz-id")?)?;
                }
                "--questions" => {
                    questions_path = Some(require_value(&mut args, "--questions")?);
                }
                "--lesson-id" => {
                    lesson_id = parse_id("--lesson-id", require_value(&mut args, "--lesson-id")?)?;
                }
                "--user" => {
                    user_id = Some(parse_id("--user", require_value(&mut args, "--user")?)?);
                }
                "--streak" => {
                    let value = require_value(&mut args, "--streak")?;
                    streak = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidStreak { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            quiz_id,
            questions_path,
            lesson_id,
            user_id,
            streak,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://dev.sqlite3?mode=rwc)");
    eprintln!("  --quiz-id <id>            Quiz to fill with questions (default: js-basics)");
    eprintln!("  --questions <file.json>   JSON array of {{id, question, options, correctAnswer}}");
    eprintln!("  --lesson-id <id>          Lesson id to upsert (default: 1)");
    eprintln!("  --user <id>               Create a progress record for this user");
    eprintln!("  --streak <days>           Streak to store for --user (default: 0)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  COURSE_DB_URL, COURSE_USER_ID");
}

fn sample_questions() -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let samples: [(&str, &str, [&str; 4], &str); 3] = [
        (
            "1",
            "Which HTML element links an external stylesheet?",
            ["<link>", "<style>", "<script>", "<css>"],
            "<link>",
        ),
        (
            "2",
            "Which CSS property changes text color?",
            ["font-color", "color", "text-color", "foreground"],
            "color",
        ),
        (
            "3",
            "Which keyword declares a block-scoped constant in JavaScript?",
            ["var", "let", "const", "static"],
            "const",
        ),
    ];

    let mut out = Vec::with_capacity(samples.len());
    for (id, prompt, options, answer) in samples {
        out.push(Question::new(
            QuestionId::new(id)?,
            prompt,
            options.iter().map(|o| (*o).to_string()).collect(),
            answer,
        )?);
    }
    Ok(out)
}

fn load_questions(path: &str) -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let docs: Vec<QuestionDocument> = serde_json::from_str(&raw)?;
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let question = doc.into_question()?;
        if !question.is_scoreable() {
            eprintln!(
                "warning: question {} has a correct answer that is not one of its options",
                question.id()
            );
        }
        out.push(question);
    }
    Ok(out)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let questions = match &args.questions_path {
        Some(path) => load_questions(path)?,
        None => sample_questions()?,
    };
    for (position, question) in (0_u32..).zip(&questions) {
        storage
            .questions
            .upsert_question(&args.quiz_id, position, question)
            .await?;
    }

    let lesson = Lesson::new(
        args.lesson_id.clone(),
        "Getting Started with HTML",
        "Tags, attributes and the structure of a web page.",
        "https://www.youtube.com/embed/qz0aGYrrlhU",
        1,
        Some("Every page starts with a doctype and an html element.".into()),
    )?
    .with_level(Some("beginner".into()));
    storage.lessons.upsert_lesson(&lesson).await?;

    if let Some(user_id) = &args.user_id {
        storage.progress.set_streak(user_id, args.streak, now).await?;
    }

    println!(
        "Seeded quiz {} with {} questions and lesson {} into {}",
        args.quiz_id,
        questions.len(),
        args.lesson_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
