use std::io;

use tokio::sync::mpsc::UnboundedSender;

use super::driver::DriverEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Forward SIGINT/SIGTERM to the driver so the final flush runs.
#[cfg(unix)]
pub fn install_termination_signals(tx: UnboundedSender<DriverEvent>) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::time::Duration;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        for sig in signals.forever() {
            let signal = match sig {
                SIGINT => TerminationSignal::SigInt,
                SIGTERM => TerminationSignal::SigTerm,
                _ => continue,
            };

            if tx.send(DriverEvent::Terminate(signal)).is_err() {
                return;
            }

            // Grace period: if the driver is wedged, hard-exit.
            std::thread::sleep(Duration::from_secs(2));
            std::process::exit(signal.exit_code());
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn install_termination_signals(_tx: UnboundedSender<DriverEvent>) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/app/signals.rs"]
mod tests;
