use std::fmt;

use course_core::model::{LessonId, QuizId, UserId};
use services::{AppOptions, AppServices, Clock, DefaultContentFallback};

mod telemetry;
mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    InvalidId { what: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    UserRequired { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { what, raw } => write!(f, "invalid {what}: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::UserRequired { command } => {
                write!(f, "{command} requires --user or COURSE_USER_ID")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz <quiz-id>       [options]");
    eprintln!("  cargo run -p app -- lesson <lesson-id>   [options] [--complete]");
    eprintln!("  cargo run -p app -- courses              [options] [--level <level>]");
    eprintln!("  cargo run -p app -- profile              [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   default sqlite://dev.sqlite3");
    eprintln!("  --user <id>         signed-in user; quizzes are not recorded without one");
    eprintln!("  --strict            reject answers that are not one of the options");
    eprintln!("  --no-fallback       report missing content instead of showing samples");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, COURSE_USER_ID, COURSE_LOG, COURSE_LOG_FORMAT");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quiz(QuizId),
    Lesson { id: LessonId, complete: bool },
    Courses { level: Option<String> },
    Profile,
}

struct Args {
    command: Command,
    db_url: String,
    user: Option<UserId>,
    options: AppOptions,
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    UserId::new(raw.as_str()).map_err(|_| ArgsError::InvalidId { what: "user id", raw })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("COURSE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut user = std::env::var("COURSE_USER_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(parse_user)
            .transpose()?;
        let mut options = AppOptions::default();

        let subcommand = args
            .next()
            .ok_or(ArgsError::MissingArgument { name: "command" })?;
        let mut target: Option<String> = None;
        let mut complete = false;
        let mut level: Option<String> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => user = Some(parse_user(require_value(args, "--user")?)?),
                "--strict" => options.strict_options = true,
                "--no-fallback" => options.fallback = DefaultContentFallback::Propagate,
                "--complete" if subcommand == "lesson" => complete = true,
                "--level" if subcommand == "courses" => {
                    level = Some(require_value(args, "--level")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if !arg.starts_with("--") && target.is_none() => target = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match subcommand.as_str() {
            "quiz" => {
                let raw = target.ok_or(ArgsError::MissingArgument { name: "quiz-id" })?;
                let id = QuizId::new(raw.as_str())
                    .map_err(|_| ArgsError::InvalidId { what: "quiz id", raw })?;
                Command::Quiz(id)
            }
            "lesson" => {
                let raw = target.ok_or(ArgsError::MissingArgument { name: "lesson-id" })?;
                let id = LessonId::new(raw.as_str())
                    .map_err(|_| ArgsError::InvalidId { what: "lesson id", raw })?;
                if complete && user.is_none() {
                    return Err(ArgsError::UserRequired {
                        command: "lesson --complete",
                    });
                }
                Command::Lesson { id, complete }
            }
            "courses" => {
                if let Some(extra) = target {
                    return Err(ArgsError::UnknownArg(extra));
                }
                Command::Courses { level }
            }
            "profile" => {
                if let Some(extra) = target {
                    return Err(ArgsError::UnknownArg(extra));
                }
                if user.is_none() {
                    return Err(ArgsError::UserRequired { command: "profile" });
                }
                Command::Profile
            }
            _ => return Err(ArgsError::UnknownArg(subcommand)),
        };

        Ok(Self {
            command,
            db_url,
            user,
            options,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() || matches!(argv[0].as_str(), "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup; services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.options).await?;
    tracing::debug!(db_url = %parsed.db_url, "storage ready");

    match parsed.command {
        Command::Quiz(quiz_id) => {
            let quiz_loop = app.quiz_loop();
            let session = quiz_loop.load(&quiz_id).await?;
            terminal::run_quiz(&quiz_loop, session, parsed.user.as_ref()).await?;
        }
        Command::Lesson { id, complete } => {
            let loaded = app.lessons().load(&id).await?;
            if complete {
                if let Some(user) = parsed.user.as_ref() {
                    app.recorder().mark_lesson_complete(user, &id).await?;
                }
            }
            terminal::print_lesson(&loaded, complete);
        }
        Command::Courses { level } => {
            let catalogue = app.lessons().catalogue().await?;
            terminal::print_catalogue(&catalogue, level.as_deref());
        }
        Command::Profile => {
            let Some(user) = parsed.user.as_ref() else {
                return Err(ArgsError::UserRequired { command: "profile" }.into());
            };
            let profile = app.progress().profile(user).await?;
            terminal::print_profile(user, &profile);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
