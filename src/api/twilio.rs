//! Twilio Programmable Voice client.
//!
//! Calls are created with inline TwiML that speaks the notification text;
//! the outcome is read back from the call resource. Only the `completed`
//! status counts as answered.
//!
//! ```rust,no_run
//! use duecall::api::twilio::{GatewayConfig, TwilioGateway};
//!
//! let config = GatewayConfig {
//!     account_sid: "ACxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
//!     auth_token: "secret".to_string(),
//!     from_number: "+16414183307".to_string(),
//!     api_url: "https://api.twilio.com".to_string(),
//! };
//! let gateway = TwilioGateway::new(&config);
//! ```

use crate::api::{CallGateway, CallHandle, CallOutcome};
use crate::libs::config::ConfigModule;
use crate::libs::error::{Error, Result};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_print};
use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.twilio.com";
const API_VERSION: &str = "2010-04-01";

#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResource {
    message: String,
}

#[derive(Debug)]
pub struct TwilioGateway {
    client: Client,
    config: GatewayConfig,
}

impl TwilioGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Calls",
            self.config.api_url.trim_end_matches('/'),
            API_VERSION,
            self.config.account_sid
        )
    }

    /// Decodes a call resource, turning non-2xx replies into gateway failures.
    async fn call_resource(response: Response) -> Result<CallResource> {
        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorResource>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(Error::GatewayFailure(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        Ok(response.json::<CallResource>().await?)
    }
}

#[async_trait]
impl CallGateway for TwilioGateway {
    async fn place_call(&self, phone_number: &str, message: &str) -> Result<CallHandle> {
        let to = format!("+{}", phone_number.trim_start_matches('+'));
        let twiml = say_twiml(message);
        let form = [("To", to.as_str()), ("From", self.config.from_number.as_str()), ("Twiml", twiml.as_str())];

        let response = self
            .client
            .post(format!("{}.json", self.calls_url()))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let call = Self::call_resource(response).await?;
        msg_debug!(Message::CallQueued(call.sid.clone(), call.status));
        Ok(CallHandle(call.sid))
    }

    async fn poll_outcome(&self, handle: &CallHandle) -> Result<CallOutcome> {
        let response = self
            .client
            .get(format!("{}/{}.json", self.calls_url(), handle.0))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        let call = Self::call_resource(response).await?;
        Ok(match call.status.as_str() {
            "completed" => CallOutcome::Completed,
            _ => CallOutcome::NotCompleted(call.status),
        })
    }
}

/// `<Response><Say>…</Say></Response>` with the text XML-escaped.
pub fn say_twiml(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    format!("<Response><Say>{}</Say></Response>", escaped)
}

/// Twilio account credentials and caller id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Caller id the calls are placed from, in E.164 form.
    pub from_number: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl GatewayConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "gateway".to_string(),
            name: Message::ConfigModuleGateway.to_string(),
        }
    }

    pub fn init(config: &Option<GatewayConfig>) -> anyhow::Result<Self> {
        let config = config.clone().unwrap_or(Self {
            account_sid: "".to_string(),
            auth_token: "".to_string(),
            from_number: "".to_string(),
            api_url: default_api_url(),
        });

        msg_print!(Message::ConfigModuleGateway);

        Ok(Self {
            account_sid: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptAccountSid.to_string())
                .default(config.account_sid)
                .interact_text()?,
            auth_token: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptAuthToken.to_string())
                .default(config.auth_token)
                .interact_text()?,
            from_number: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptFromNumber.to_string())
                .default(config.from_number)
                .interact_text()?,
            api_url: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptGatewayApiUrl.to_string())
                .default(config.api_url)
                .interact_text()?,
        })
    }
}
