use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "schedule_board";

/// `RUST_LOG` wins; otherwise our own events at `info` (`debug` when verbose)
/// and dependencies at `info` only when verbose.
fn board_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if verbose {
            format!("{}=debug,info", CRATE_TARGET)
        } else {
            format!("{}=info", CRATE_TARGET)
        };
        EnvFilter::new(directive)
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(board_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines on stderr, so stdout stays a clean JSON document.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(board_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(false),
        )
        .init();
}

