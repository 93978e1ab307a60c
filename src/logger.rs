use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;
use std::path::Path;

/// Initializes the global logger.
///
/// Call once at the start of `main`. The level comes from `level` when given,
/// otherwise from `RUST_LOG` (e.g. `RUST_LOG=debug`), defaulting to `info`.
/// Console output goes to stderr so stdout stays clean for reports.
pub fn init(level: Option<LevelFilter>, log_file: Option<&Path>) {
    let level_filter = level.unwrap_or_else(|| {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|value| value.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info)
    });

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let console_config = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut base_config = Dispatch::new().level(level_filter).chain(console_config);

    if let Some(path) = log_file {
        match fern::log_file(path) {
            Ok(file) => {
                let file_config = Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "[{} {} {}] {}",
                            Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file);
                base_config = base_config.chain(file_config);
            }
            Err(e) => eprintln!("Failed to open log file '{}': {}", path.display(), e),
        }
    }

    if let Err(e) = base_config.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
    }

    log::debug!("Logger initialized at level {}", level_filter);
}
