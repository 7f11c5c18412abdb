use log::{Level, LevelFilter, Metadata, Record};

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        match record.level() {
            Level::Error | Level::Warn => eprintln!("{}", record.args()),
            Level::Info => println!("{}", record.args()),
            _ => eprintln!("[{}] {}", record.level(), record.args()),
        }
    }

    fn flush(&self) {}
}

pub fn init(verbose: bool) {
    let max_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    if log::set_boxed_logger(Box::new(ConsoleLogger)).is_ok() {
        log::set_max_level(max_level);
    }
}
