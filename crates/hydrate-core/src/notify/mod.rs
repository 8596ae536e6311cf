//! Notification dispatch.
//!
//! A reminder trigger plays an audio cue and, when the user granted
//! permission beforehand, shows a system notification. Dispatch is best
//! effort: failures are logged and swallowed so a trigger always proceeds
//! to reschedule.

mod chime;
mod toast;

pub use chime::{Chime, TerminalBell};
pub use toast::{DesktopToast, Toast};

use serde::{Deserialize, Serialize};

use crate::storage::NotificationsConfig;

/// Title used for system notifications.
pub const NOTIFICATION_TITLE: &str = "Hydrate";

/// Set this to route every notification to [`NoopNotifier`].
pub const DISABLE_ENV: &str = "HYDRATE_DISABLE_NOTIFICATIONS";

/// System notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not requested yet; treated as not granted.
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

pub trait Notifier: Send {
    /// Best-effort delivery of `message`. Must not fail.
    fn notify(&self, message: &str);

    /// Ask for system notification permission. User-initiated only.
    fn request_permission(&mut self) -> Permission;

    fn permission(&self) -> Permission;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }

    fn request_permission(&mut self) -> Permission {
        (**self).request_permission()
    }

    fn permission(&self) -> Permission {
        (**self).permission()
    }
}

/// Drops every notification.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, message: &str) {
        tracing::debug!(body = message, "notification suppressed");
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }
}

/// Audio cue plus permission-gated system notification.
pub struct NotificationDispatcher {
    chime: Option<Box<dyn Chime>>,
    toast: Option<Box<dyn Toast>>,
    permission: Permission,
}

impl NotificationDispatcher {
    pub fn new(chime: Option<Box<dyn Chime>>, toast: Option<Box<dyn Toast>>) -> Self {
        Self {
            chime,
            toast,
            permission: Permission::Default,
        }
    }

    /// Dispatcher wired to the terminal bell and the platform notifier,
    /// each enabled per `config`.
    pub fn from_config(config: &NotificationsConfig) -> Self {
        let chime: Option<Box<dyn Chime>> = if config.sound {
            Some(Box::new(TerminalBell))
        } else {
            None
        };
        let toast: Option<Box<dyn Toast>> = if config.system {
            Some(Box::new(DesktopToast))
        } else {
            None
        };
        Self::new(chime, toast)
    }
}

impl Notifier for NotificationDispatcher {
    fn notify(&self, message: &str) {
        if let Some(chime) = &self.chime {
            if let Err(e) = chime.play() {
                tracing::warn!(error = %e, "audio cue failed");
            }
        }

        if !self.permission.is_granted() {
            tracing::debug!(permission = ?self.permission, "skipping system notification");
            return;
        }
        if let Some(toast) = &self.toast {
            if let Err(e) = toast.show(NOTIFICATION_TITLE, message) {
                tracing::warn!(error = %e, "system notification failed");
            }
        }
    }

    fn request_permission(&mut self) -> Permission {
        self.permission = match &self.toast {
            Some(toast) if toast.available() => Permission::Granted,
            _ => Permission::Denied,
        };
        tracing::info!(permission = ?self.permission, "notification permission requested");
        self.permission
    }

    fn permission(&self) -> Permission {
        self.permission
    }
}

/// Pick a notifier from the environment, like the CLI does.
pub fn notifier_from_env(config: &NotificationsConfig) -> Box<dyn Notifier> {
    if std::env::var_os(DISABLE_ENV).is_some() {
        return Box::new(NoopNotifier);
    }
    Box::new(NotificationDispatcher::from_config(config))
}
