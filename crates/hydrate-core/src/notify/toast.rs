use crate::error::DispatchError;

/// System-level notification surface.
pub trait Toast: Send {
    /// Whether a notification service is reachable. Backs permission requests.
    fn available(&self) -> bool;

    fn show(&self, title: &str, body: &str) -> Result<(), DispatchError>;
}

/// Desktop notifications through the platform's notification service.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopToast;

#[cfg(target_os = "linux")]
impl Toast for DesktopToast {
    fn available(&self) -> bool {
        notify_rust::get_server_information().is_ok()
    }

    fn show(&self, title: &str, body: &str) -> Result<(), DispatchError> {
        notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .show()
            .map(|_| ())
            .map_err(|e| DispatchError::Delivery(e.to_string()))
    }
}

#[cfg(not(target_os = "linux"))]
impl Toast for DesktopToast {
    fn available(&self) -> bool {
        false
    }

    fn show(&self, _title: &str, _body: &str) -> Result<(), DispatchError> {
        Err(DispatchError::Unsupported)
    }
}
