//! Notifier that forwards notices to `tracing`

use courier_application::Notifier;
use tracing::{debug, warn};

/// Logs warnings at `warn`. Script output is already logged by the
/// dispatch service, so it only goes out at `debug` here.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(target: "courier::notice", "{message}");
    }

    fn print(&self, message: &str) {
        debug!(target: "courier::notice", "{message}");
    }
}
