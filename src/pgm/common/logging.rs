use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the `env_logger` backend for the `log` macros used throughout the crate.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling this more than once is harmless; only the first call installs a logger.
pub fn init_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .is_test(cfg!(test))
        .try_init();
}
