//! Log output for the terminal app.
//!
//! `COURSE_LOG` holds an `EnvFilter` directive (default `info`), and
//! `COURSE_LOG_FORMAT=json` switches to JSON lines. Logs go to stderr so they
//! never interleave with quiz prompts on stdout.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("COURSE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("COURSE_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
