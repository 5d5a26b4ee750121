//! Background logging of session changes

use patotas_core::core_identity::SessionChange;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

/// Log every sign-in and sign-out until shutdown or until the provider goes away
pub async fn log_session_changes(
    mut events: broadcast::Receiver<SessionChange>,
    mut stop: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            change = events.recv() => match change {
                Ok(change) => info!(
                    user_id = %change.identity.user_id,
                    event = ?change.event,
                    "Session change"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event subscriber lagged")
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}
