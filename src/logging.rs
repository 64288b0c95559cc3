use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{runtime::ConfigErrors, Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Could not configure logger: {0}")]
    Config(#[from] ConfigErrors),
    #[error("Could not install logger: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Log to stderr, so that summaries printed to stdout stay clean.
pub fn try_init_logging(level: log::LevelFilter) -> Result<(), LoggingError> {
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{h({d(%Y-%m-%d %H:%M:%S)} [{l}] in {M})} - {m}{n}",
        )))
        .target(Target::Stderr)
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;

    log4rs::init_config(config)?;
    Ok(())
}

/// Like [`try_init_logging`], but only reports a failure on stderr. A program
/// without a logger still runs, it just says less.
pub fn init_logging(level: log::LevelFilter) {
    if let Err(e) = try_init_logging(level) {
        eprintln!("WARNING: {e}");
    }
}
