//! Event loop of the headless host: stdin events, vault changes, signals and
//! engine deadlines, all on one task.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::event::{parse_line, HostEvent, Report};
use super::signals::{install_termination_signals, TerminationSignal};
use super::workspace::HeadlessWorkspace;
use crate::kernel::services::adapters::{
    ensure_settings_file, load_settings, LocalStateStore, VaultChange, VaultWatcher,
};
use crate::kernel::{Action, Effect, Engine};

pub const SETTINGS_CHECK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum DriverEvent {
    Vault(VaultChange),
    Terminate(TerminationSignal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub vault_root: PathBuf,
    pub watch: bool,
}

impl DriverOptions {
    /// `[--watch] <vault-root>`. `Ok(None)` means help was requested.
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Option<Self>, String> {
        let mut vault_root: Option<PathBuf> = None;
        let mut watch = false;

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--watch" => {
                    if watch {
                        return Err("--watch given twice".to_string());
                    }
                    watch = true;
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option: {flag}"));
                }
                path => {
                    if vault_root.is_some() {
                        return Err(format!("unexpected argument: {path}"));
                    }
                    vault_root = Some(PathBuf::from(path));
                }
            }
        }

        let vault_root = vault_root.ok_or_else(|| "missing <vault-root>".to_string())?;
        Ok(Some(Self { vault_root, watch }))
    }
}

/// Runs until stdin closes, a `quit` event arrives, or a termination signal.
pub async fn run(options: DriverOptions) -> io::Result<Option<TerminationSignal>> {
    let root = options.vault_root;
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("vault root is not a directory: {}", root.display()),
        ));
    }

    let settings_path = match ensure_settings_file(&root) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(error = %e, "cannot create settings file, using defaults");
            None
        }
    };
    let settings = load_settings(&root).unwrap_or_default();
    let mut engine = Engine::new(
        settings,
        Box::new(LocalStateStore::new(root.clone())),
        Instant::now(),
    );
    let mut workspace = HeadlessWorkspace::new();

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Err(e) = install_termination_signals(tx.clone()) {
        tracing::warn!(error = %e, "cannot install signal handlers");
    }
    let _watcher = if options.watch {
        let tx = tx.clone();
        match VaultWatcher::start(&root, move |change| {
            let _ = tx.send(DriverEvent::Vault(change));
        }) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "cannot watch vault");
                None
            }
        }
    } else {
        None
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    let mut settings_check = tokio::time::interval(SETTINGS_CHECK_INTERVAL);
    let mut settings_modified = settings_path.as_deref().and_then(modified_time);
    let mut terminated = None;

    loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    line_no += 1;
                    match parse_line(&line) {
                        Ok(Some(event)) => handle_host_event(&mut engine, &mut workspace, &event),
                        Ok(None) => {}
                        Err(e) => emit(&Report::Invalid { line: line_no, error: e.to_string() }),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read host events");
                    break;
                }
            },
            Some(event) = rx.recv() => match event {
                DriverEvent::Vault(change) => handle_vault_change(&mut engine, &mut workspace, change),
                DriverEvent::Terminate(signal) => {
                    tracing::info!(?signal, "termination signal received");
                    terminated = Some(signal);
                    break;
                }
            },
            _ = sleep_until(deadline) => {
                let result = engine.tick(&workspace, Instant::now());
                apply_effects(&mut workspace, result.effects);
            },
            _ = settings_check.tick() => {
                if let Some(path) = settings_path.as_deref() {
                    poll_settings(&mut engine, &root, path, &mut settings_modified);
                }
            },
        }

        if engine.is_stopped() {
            break;
        }
    }

    engine.shutdown();
    emit(&Report::Stopped {
        entries: engine.cache().len(),
    });
    Ok(terminated)
}

fn handle_host_event(engine: &mut Engine, workspace: &mut HeadlessWorkspace, event: &HostEvent) {
    let Some(action) = workspace.apply(event) else {
        return;
    };
    dispatch(engine, workspace, action);
}

fn handle_vault_change(engine: &mut Engine, workspace: &mut HeadlessWorkspace, change: VaultChange) {
    let action = match change {
        VaultChange::Renamed { from, to } => {
            workspace.rename(&from, &to);
            Action::Rename { from, to }
        }
        VaultChange::Deleted { path } => {
            workspace.delete(&path);
            Action::Delete { path }
        }
    };
    dispatch(engine, workspace, action);
}

fn dispatch(engine: &mut Engine, workspace: &mut HeadlessWorkspace, action: Action) {
    let result = engine.dispatch(action, &*workspace, Instant::now());
    apply_effects(workspace, result.effects);
}

fn apply_effects(workspace: &mut HeadlessWorkspace, effects: Vec<Effect>) {
    for effect in effects {
        if !effect.apply(workspace) {
            continue;
        }
        let Effect::SetScroll { path, scroll } = effect;
        emit(&Report::Restored { path, scroll });
    }
}

fn poll_settings(
    engine: &mut Engine,
    root: &Path,
    path: &Path,
    last_modified: &mut Option<SystemTime>,
) {
    let modified = modified_time(path);
    if modified.is_none() || modified == *last_modified {
        return;
    }
    *last_modified = modified;

    // A half-written or malformed file keeps the current settings.
    let Some(settings) = load_settings(root) else {
        return;
    };
    engine.update_settings(settings, Instant::now());
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

fn emit(report: &Report) {
    let Ok(line) = serde_json::to_string(report) else {
        return;
    };
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{line}");
    let _ = stdout.flush();
}

#[cfg(test)]
#[path = "../../tests/unit/app/driver.rs"]
mod tests;
