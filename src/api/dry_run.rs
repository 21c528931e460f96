use crate::api::{CallGateway, CallHandle, CallOutcome};
use crate::libs::error::Result;
use crate::libs::messages::Message;
use crate::msg_info;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway that places no calls. Each call is logged and reported with a fixed outcome.
#[derive(Debug)]
pub struct DryRunGateway {
    outcome: CallOutcome,
    sequence: AtomicU64,
}

impl DryRunGateway {
    pub fn new(outcome: CallOutcome) -> Self {
        Self {
            outcome,
            sequence: AtomicU64::new(0),
        }
    }

    /// Every call counts as answered, so the cooldown applies within the run as in a live one.
    pub fn answering() -> Self {
        Self::new(CallOutcome::Completed)
    }
}

#[async_trait]
impl CallGateway for DryRunGateway {
    async fn place_call(&self, phone_number: &str, message: &str) -> Result<CallHandle> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        msg_info!(Message::DryRunCall(format!("+{}", phone_number.trim_start_matches('+')), message.to_string()));
        Ok(CallHandle(format!("dry-run-{}", n)))
    }

    async fn poll_outcome(&self, _handle: &CallHandle) -> Result<CallOutcome> {
        Ok(self.outcome.clone())
    }

    fn places_real_calls(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handles_are_sequential() {
        let gateway = DryRunGateway::new(CallOutcome::NotCompleted("no-answer".to_string()));
        let first = gateway.place_call("1", "hi").await.unwrap();
        let second = gateway.place_call("2", "hi").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(
            gateway.poll_outcome(&first).await.unwrap(),
            CallOutcome::NotCompleted("no-answer".to_string())
        );
        assert!(!gateway.places_real_calls());
    }
}
