#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => (
        {
            info!($($arg)*);
        }
    );
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => (
        {
            debug!($($arg)*);
        }
    );
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => (
        {
            error!($($arg)*);
        }
    );
}

/// Logging capability handed over to components that must report what they
/// do, such as the refreshing cache. Keeps them testable without installing a
/// global logger.
pub trait Logger {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards to the `log` facade. The binary installs `env_logger` as backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCrateLogger;

impl Logger for LogCrateLogger {
    fn info(&self, msg: &str) {
        log_info!("{}", msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{}", msg);
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn info(&self, msg: &str) {
        (**self).info(msg)
    }

    fn error(&self, msg: &str) {
        (**self).error(msg)
    }
}
