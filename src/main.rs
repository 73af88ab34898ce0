use std::process::ExitCode;
use std::time::Duration;

use scrollmark::app::{self, DriverOptions};

mod logging;

const USAGE: &str = "Usage: scrollmark [--watch] <vault-root>

Reads host events as JSON lines on stdin and prints restored scroll positions
as JSON lines on stdout. Scroll positions are kept in the store file named by
<vault-root>/.scrollmark/settings.json.

  --watch   also pick up renames and deletions made directly in <vault-root>";

fn main() -> ExitCode {
    let options = match DriverOptions::from_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let logging = logging::init();
    if let Some(guard) = logging.as_ref() {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging to file");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to create tokio runtime");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(app::run(options));
    // stdin reads run on the blocking pool and may never return.
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(signal)) => ExitCode::from(signal.exit_code() as u8),
        Err(e) => {
            tracing::error!(error = %e, "scrollmark failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
