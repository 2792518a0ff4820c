use std::io::{self, BufRead, Write};

use course_core::model::{CourseCompletion, UserId};
use services::{
    AdvanceOutcome, LessonCatalogue, LoadedLesson, ProfileOverview, QuizLoopService, QuizSession,
    RecordingHandle,
};

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

enum QuizInput {
    Pick(usize),
    Next,
    Previous,
    Retake,
    Quit,
    Unknown,
}

impl QuizInput {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "n" | "next" => Self::Next,
            "p" | "prev" => Self::Previous,
            "r" | "retake" => Self::Retake,
            "q" | "quit" => Self::Quit,
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map_or(Self::Unknown, Self::Pick),
        }
    }
}

/// Drive one quiz attempt over stdin/stdout until the user quits.
///
/// # Errors
///
/// Returns an error if stdin/stdout fail.
pub async fn run_quiz(
    quiz_loop: &QuizLoopService,
    session: QuizSession,
    user: Option<&UserId>,
) -> io::Result<()> {
    drive_quiz(io::stdin().lock(), quiz_loop, session, user).await?;
    Ok(())
}

/// Score writes run in the background while the result is shown; they are
/// awaited before returning so the process does not exit mid-write.
async fn drive_quiz(
    input: impl BufRead,
    quiz_loop: &QuizLoopService,
    mut session: QuizSession,
    user: Option<&UserId>,
) -> io::Result<QuizSession> {
    let mut lines = input.lines();
    let mut pending: Vec<RecordingHandle> = Vec::new();

    if session.source().is_fallback() {
        println!("(showing sample questions)");
    }
    render_question(&session)?;

    while let Some(line) = lines.next().transpose()? {
        match (QuizInput::parse(&line), session.is_submitted()) {
            (QuizInput::Quit, _) => break,
            (QuizInput::Retake, true) => match session.reset() {
                Ok(()) => render_question(&session)?,
                Err(err) => println!("{err}"),
            },
            (QuizInput::Pick(number), false) => {
                let option = session
                    .current_question()
                    .and_then(|q| q.options().get(number - 1))
                    .cloned();
                match option {
                    Some(option) => match session.select_answer(option) {
                        Ok(()) => render_question(&session)?,
                        Err(err) => println!("{err}"),
                    },
                    None => println!("no option {number}"),
                }
            }
            (QuizInput::Next, false) => {
                let step = quiz_loop.advance(&mut session, user);
                pending.extend(step.recording);
                match step.outcome {
                    AdvanceOutcome::Submitted { score } => {
                        println!();
                        println!("{}", score.tier().headline());
                        println!("Your score: {score}");
                        if user.is_none() {
                            println!("Sign in with --user to save your progress.");
                        }
                        println!("[r] retake  [q] quit");
                    }
                    AdvanceOutcome::Moved { .. } | AdvanceOutcome::AlreadySubmitted { .. } => {
                        render_question(&session)?;
                    }
                }
            }
            (QuizInput::Previous, false) => match session.retreat() {
                Ok(_) => render_question(&session)?,
                Err(err) => println!("{err}"),
            },
            (_, true) => println!("[r] retake  [q] quit"),
            (QuizInput::Unknown | QuizInput::Retake, false) => println!("unrecognised input"),
        }
    }

    drop(lines);
    for handle in pending {
        if let Err(err) = handle.wait().await {
            eprintln!("score was not saved: {err}");
        }
    }
    Ok(session)
}

fn render_question(session: &QuizSession) -> io::Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let position = session.position();
    let selected = session.selected_answer();

    let mut out = io::stdout().lock();
    writeln!(out)?;
    writeln!(
        out,
        "Question {} of {} ({}%)",
        position.number, position.total, position.percent
    )?;
    writeln!(out, "{}", question.prompt())?;
    for (idx, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(option.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(out, " {marker} {}. {option}", idx + 1)?;
    }
    let next = if session.is_last_question() {
        "submit"
    } else {
        "next"
    };
    writeln!(out, "[1-{}] select  [n] {next}  [p] previous  [q] quit", question.options().len())?;
    out.flush()
}

//
// ─── LESSON / PROFILE ──────────────────────────────────────────────────────────
//

pub fn print_lesson(loaded: &LoadedLesson, completed: bool) {
    let lesson = &loaded.lesson;
    println!("{}. {}", lesson.order(), lesson.title());
    println!("{}", lesson.description());
    println!("Video: {}", lesson.video_url());
    if let Some(content) = lesson.content() {
        println!();
        println!("{content}");
    }
    if loaded.source.is_fallback() {
        println!("(sample lesson)");
    }
    if completed {
        println!();
        println!("Lesson marked as complete.");
    }
}

pub fn print_catalogue(catalogue: &LessonCatalogue, level: Option<&str>) {
    let lines = catalogue_lines(catalogue, level);
    if lines.is_empty() {
        println!("No courses found.");
    }
    for line in lines {
        println!("{line}");
    }
    if catalogue.source.is_fallback() {
        println!("(sample catalogue)");
    }
}

fn catalogue_lines(catalogue: &LessonCatalogue, level: Option<&str>) -> Vec<String> {
    catalogue
        .filter_level(level)
        .map(|lesson| {
            let level = lesson
                .level()
                .map(|l| format!(" [{l}]"))
                .unwrap_or_default();
            format!(
                "{:>2}. {} (lesson {}){level}\n    {}",
                lesson.order(),
                lesson.title(),
                lesson.id(),
                lesson.description()
            )
        })
        .collect()
}

pub fn print_profile(user: &UserId, profile: &ProfileOverview) {
    let summary = &profile.summary;
    let average = summary
        .average_quiz_score_display()
        .map_or_else(|| "N/A".to_owned(), |score| score.to_string());

    println!("Profile: {user}");
    println!("Lessons completed: {}", summary.completed_lesson_count);
    println!("Average quiz score: {average}");
    println!("Learning streak: {} days", summary.streak_days);
    println!("Course progress: {}", completion_line(profile.completion));
    if !profile.completed_lessons.is_empty() {
        let ids: Vec<&str> = profile
            .completed_lessons
            .iter()
            .map(|id| id.as_str())
            .collect();
        println!("Completed lessons: {}", ids.join(", "));
    }
}

fn completion_line(completion: CourseCompletion) -> String {
    format!(
        "{} of {} courses ({}%)",
        completion.completed, completion.total, completion.percent
    )
}
