// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 短信告警 (Twilio REST API)

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use super::{require, sms_body, NotifyResult, Texter};
use crate::error::NotifyError;
use crate::gen_time_string;

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone, Default)]
pub struct TwilioCredentials {
    pub sid: Option<String>,
    pub auth: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TwilioCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            sid: lookup("TWILIO_SID"),
            auth: lookup("TWILIO_AUTH"),
            from: lookup("TWILIO_PHONE"),
            to: lookup("ALERT_PHONE"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

pub struct TwilioTexter {
    credentials: TwilioCredentials,
    agent: ureq::Agent,
    api_base: String,
}

impl TwilioTexter {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self::with_api_base(credentials, TWILIO_API)
    }

    pub fn with_api_base(credentials: TwilioCredentials, api_base: impl Into<String>) -> Self {
        Self {
            credentials,
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(10))
                .build(),
            api_base: api_base.into(),
        }
    }
}

pub fn messages_url(api_base: &str, sid: &str) -> String {
    format!("{}/Accounts/{}/Messages.json", api_base.trim_end_matches('/'), sid)
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

impl Texter for TwilioTexter {
    fn send_alert(&self, location: &str) -> NotifyResult {
        let sid = require(&self.credentials.sid, "TWILIO_SID")?;
        let auth = require(&self.credentials.auth, "TWILIO_AUTH")?;
        let from = require(&self.credentials.from, "TWILIO_PHONE")?;
        let to = require(&self.credentials.to, "ALERT_PHONE")?;

        let body = sms_body(location, &gen_time_string());
        let response = self
            .agent
            .post(&messages_url(&self.api_base, sid))
            .set("Authorization", &basic_auth(sid, auth))
            .send_form(&[("To", to), ("From", from), ("Body", body.as_str())])
            .map_err(NotifyError::transport)?;

        let message: MessageResource = response.into_json().map_err(NotifyError::transport)?;
        debug!(sid = ?message.sid, "📱 Twilio消息已创建");
        Ok(())
    }
}
