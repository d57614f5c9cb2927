//! Testing utilities for metier crates.
pub mod arbitrary;

/// Logger for tests, writing through the test harness' captured stdout.
pub mod logger {
    use log::{Level, Log, Metadata, Record};

    struct Logger(Level);

    impl Log for Logger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= self.0
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let target = record.target().strip_prefix("metier_").unwrap_or(record.target());

            println!("{:<5} {:>18}: {}", record.level(), target, record.args());
        }

        fn flush(&self) {}
    }

    /// Install the test logger. Only the first call in a process takes effect.
    pub fn init(level: Level) {
        if log::set_boxed_logger(Box::new(Logger(level))).is_ok() {
            log::set_max_level(level.to_level_filter());
        }
    }
}
