use std::io;

use tracing_subscriber::{fmt, EnvFilter};

/// tracing subscriberを初期化する。
/// - `RUST_LOG` があれば優先、なければ `info`
/// - stdoutはMCPのトランスポートなので、ログはstderrに出す
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
