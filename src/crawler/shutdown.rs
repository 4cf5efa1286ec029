use crate::browse::Browser;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on the first Ctrl-C
///
/// In-flight domains observe the token, stop their traversal and close
/// their surfaces.
pub fn spawn_interrupt_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::warn!("Received Ctrl-C, cancelling in-flight domains");
                    cancel.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            },
            _ = cancel.cancelled() => {}
        }
    })
}

/// Closes every surface the browser still holds
///
/// Returns the number of surfaces that were still open; later calls return 0.
pub async fn drain_browser(browser: &dyn Browser) -> usize {
    let leftover = browser.open_surfaces();
    if leftover > 0 {
        tracing::warn!("{} surface(s) still open at shutdown", leftover);
    }
    browser.shutdown().await
}
