//! One-shot command dispatch for the movement actuator
//!
//! The registration path arms this dispatcher with the actuator's resource
//! URL as soon as a `movement` node registers; the operator console (an
//! external collaborator) later asks it to fire the single supported
//! command. Re-registration simply re-arms with the newest URL.

use iotgw_core::{CommandSink, GatewayError, GatewayResult};
use parking_lot::Mutex;
use tracing::info;

/// Fixed textual payload of the only supported command
const BUTTON_PAYLOAD: &str = "Button pressed from operator console.";

/// Holds the most recently armed actuator URL and sends the press command
pub struct ButtonDispatcher {
    client: reqwest::Client,
    target: Mutex<Option<String>>,
}

impl ButtonDispatcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            target: Mutex::new(None),
        }
    }

    /// URL the dispatcher would currently fire at, if armed
    pub fn target(&self) -> Option<String> {
        self.target.lock().clone()
    }

    /// Send the one-shot press command to the armed actuator. Only the
    /// success/failure signal of the response is consumed.
    pub async fn press(&self) -> GatewayResult<()> {
        let url = self
            .target()
            .ok_or_else(|| GatewayError::NotFound("no movement actuator registered".to_string()))?;

        self.client
            .post(&url)
            .body(BUTTON_PAYLOAD)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        info!(%url, "press command delivered");
        Ok(())
    }
}

impl CommandSink for ButtonDispatcher {
    fn arm(&self, target_url: String) {
        info!(url = %target_url, "command dispatcher armed");
        *self.target.lock() = Some(target_url);
    }
}

#[cfg(test)]
mod tests {
    use iotgw_core::{CommandSink, GatewayError};

    use super::ButtonDispatcher;

    #[test]
    fn arming_replaces_the_previous_target() {
        let dispatcher = ButtonDispatcher::new(reqwest::Client::new());
        assert_eq!(dispatcher.target(), None);

        dispatcher.arm("http://10.0.0.1:5683/movement".to_string());
        dispatcher.arm("http://10.0.0.2:5683/movement".to_string());
        assert_eq!(
            dispatcher.target().as_deref(),
            Some("http://10.0.0.2:5683/movement")
        );
    }

    #[tokio::test]
    async fn pressing_before_arming_is_a_not_found() {
        let dispatcher = ButtonDispatcher::new(reqwest::Client::new());
        let err = dispatcher.press().await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }
}
