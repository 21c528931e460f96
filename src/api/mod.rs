//! Outbound voice-call providers.
//!
//! The escalation job talks to a [`CallGateway`]: place a call that speaks a
//! message, then poll whether the callee picked up. Two providers ship with
//! the crate:
//!
//! - **Twilio**: REST calls against the Twilio Programmable Voice API
//! - **Dry run**: logs the call and reports a fixed outcome
//!
//! ## Usage
//!
//! ```rust,no_run
//! use duecall::api::{CallGateway, dry_run::DryRunGateway};
//!
//! # async fn demo() -> duecall::libs::error::Result<()> {
//! let gateway = DryRunGateway::answering();
//! let handle = gateway.place_call("15550100", "Hello").await?;
//! let outcome = gateway.poll_outcome(&handle).await?;
//! # Ok(())
//! # }
//! ```

use crate::libs::error::Result;
use async_trait::async_trait;
use std::fmt;

pub mod dry_run;
pub mod twilio;

pub use dry_run::DryRunGateway;
pub use twilio::{GatewayConfig, TwilioGateway};

/// Provider-assigned identifier of a placed call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallHandle(pub String);

impl fmt::Display for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What became of a call by the time it was polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The callee answered and the message played to the end.
    Completed,
    /// Anything else, with the provider's status (`busy`, `no-answer`, `ringing`, ...).
    NotCompleted(String),
}

impl CallOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallOutcome::Completed)
    }
}

#[async_trait]
pub trait CallGateway: Send + Sync {
    /// Dials `phone_number` (digits, country code included) and speaks `message`.
    async fn place_call(&self, phone_number: &str, message: &str) -> Result<CallHandle>;

    async fn poll_outcome(&self, handle: &CallHandle) -> Result<CallOutcome>;

    /// False for providers that only pretend to dial. Their outcomes must not
    /// reach a persisted contact ledger.
    fn places_real_calls(&self) -> bool {
        true
    }
}
