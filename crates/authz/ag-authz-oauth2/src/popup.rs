//! Authorization window polling.
//!
//! The implicit flow has no channel from the provider back to the client,
//! so after opening the authorization window the adapter watches it: read
//! the location on a fixed interval, treat an unreadable location as "still
//! on the provider's origin", and stop once the redirect shows up in the
//! window, the user closes it, the flow times out, or it is cancelled.

use ag_authz_core::BrowserWindow;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{OAuth2Error, OAuth2Result};

/// Poll `window` until it lands on a location carrying a fragment.
///
/// Returns the full location string on success. The window is closed on
/// every exit path except the one where the user already closed it.
pub(crate) async fn await_redirect(
    window: Box<dyn BrowserWindow>,
    poll_interval: Duration,
    flow_timeout: Duration,
    cancel: CancellationToken,
) -> OAuth2Result<String> {
    let deadline = Instant::now() + flow_timeout;
    // First read happens one full interval after the window opens.
    let mut ticks = time::interval_at(Instant::now() + poll_interval, poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Authorization poll cancelled");
                window.close();
                return Err(OAuth2Error::Cancelled);
            }
            tick = ticks.tick() => {
                if let Some(location) = window.location() {
                    if location.contains('#') {
                        debug!("Authorization window redirected back");
                        window.close();
                        return Ok(location);
                    }
                }
                if window.is_closed() {
                    debug!("Authorization window closed by the user");
                    return Err(OAuth2Error::WindowClosed);
                }
                if tick >= deadline {
                    debug!("Authorization poll timed out");
                    window.close();
                    return Err(OAuth2Error::Timeout(flow_timeout));
                }
            }
        }
    }
}
