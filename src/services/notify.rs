//! Log-backed notification and navigation adapters for headless runs.

use tracing::{info, warn};

use super::{Navigator, Notifier, Toast, ToastVariant};

/// Writes every toast to the log instead of a UI layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let message = toast.message.as_deref().unwrap_or("");
        match toast.variant {
            ToastVariant::Success => info!(title = %toast.title, %message, "toast"),
            ToastVariant::Error => warn!(title = %toast.title, %message, "toast"),
        }
    }
}

/// Logs navigation requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate_to_record(&self, record_id: &str) {
        info!(%record_id, "navigate: record page");
    }
}
