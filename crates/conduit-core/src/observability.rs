//! tracing の初期化
//!
//! `RUST_LOG` があればそれを使い、なければ `default_level` を使います。
//! 二度目以降の呼び出しや、すでに global subscriber がある場合は何もしません。

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init_tracing(default_level: &str) {
    TRACING_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let result = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init();

        if result.is_err() {
            tracing::debug!("global tracing subscriber already set; keeping it");
        }
    });
}
