use std::path::PathBuf;

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Logo,
    Download,
    Warning,
    NotFound,
    Failed,
}

impl NotificationIcon {
    /// Icon asset for a given provider, e.g. `ktuvit/download-300.png`.
    pub fn asset(&self, provider: &str) -> String {
        let file = match self {
            Self::Logo => "logo-300.png",
            Self::Download => "download-300.png",
            Self::Warning => "warning-300.png",
            Self::NotFound => "not-found-300.png",
            Self::Failed => "failed-300.png",
        };
        format!("{provider}/{file}")
    }
}

/// Best-effort user notification. Implementations must never fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, icon: NotificationIcon, open_log: bool);
}

/// Routes notifications through the log on a dedicated target.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    provider: String,
    quiet: bool,
    log_file: Option<PathBuf>,
}

impl LogNotifier {
    pub fn new(provider: impl Into<String>, quiet: bool, log_file: Option<PathBuf>) -> Self {
        Self {
            provider: provider.into(),
            quiet,
            log_file,
        }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, icon: NotificationIcon, open_log: bool) {
        if self.quiet {
            debug!("Quiet Mode. Skipping notification message: {message}");
            return;
        }

        let asset = icon.asset(&self.provider);
        let log = if open_log {
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };

        match icon {
            NotificationIcon::Failed => {
                error!(target: "subarr::notify", icon = %asset, log = %log, "{message}")
            }
            NotificationIcon::Warning | NotificationIcon::NotFound => {
                warn!(target: "subarr::notify", icon = %asset, log = %log, "{message}")
            }
            NotificationIcon::Logo | NotificationIcon::Download => {
                info!(target: "subarr::notify", icon = %asset, log = %log, "{message}")
            }
        }
    }
}
