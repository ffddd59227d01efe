// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 邮件告警 (SMTP, 隐式TLS 465端口)

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use super::{email_body, require, Mailer, NotifyResult, EMAIL_SUBJECT};
use crate::error::NotifyError;
use crate::gen_time_string;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// 邮件凭据, 任一缺失都在发送时报错
#[derive(Debug, Clone, Default)]
pub struct EmailCredentials {
    pub address: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: String,
}

impl EmailCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            address: lookup("EMAIL_ADDRESS"),
            password: lookup("EMAIL_PASSWORD"),
            recipient: lookup("ALERT_EMAIL"),
            smtp_host: lookup("SMTP_HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        }
    }
}

pub struct SmtpMailer {
    credentials: EmailCredentials,
}

impl SmtpMailer {
    pub fn new(credentials: EmailCredentials) -> Self {
        Self { credentials }
    }

    /// 构建邮件 (不发送)
    pub fn compose(&self, location: &str) -> NotifyResult<Message> {
        let from = mailbox(require(&self.credentials.address, "EMAIL_ADDRESS")?)?;
        let to = mailbox(require(&self.credentials.recipient, "ALERT_EMAIL")?)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(EMAIL_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(email_body(location, &gen_time_string()))
            .map_err(NotifyError::transport)
    }
}

fn mailbox(address: &str) -> NotifyResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

impl Mailer for SmtpMailer {
    fn send_alert(&self, location: &str) -> NotifyResult {
        let message = self.compose(location)?;
        let user = require(&self.credentials.address, "EMAIL_ADDRESS")?;
        let password = require(&self.credentials.password, "EMAIL_PASSWORD")?;

        let transport = SmtpTransport::relay(&self.credentials.smtp_host)
            .map_err(NotifyError::transport)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        let response = transport.send(&message).map_err(NotifyError::transport)?;
        debug!(code = %response.code(), "📧 SMTP响应");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn credentials(pairs: &[(&str, &str)]) -> EmailCredentials {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EmailCredentials::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn smtp_host_defaults_to_gmail() {
        assert_eq!(credentials(&[]).smtp_host, DEFAULT_SMTP_HOST);
        assert_eq!(
            credentials(&[("SMTP_HOST", "smtp.example.org")]).smtp_host,
            "smtp.example.org"
        );
    }

    #[test]
    fn missing_credentials_fail_before_any_network() {
        let mailer = SmtpMailer::new(credentials(&[("EMAIL_ADDRESS", "farm@example.org")]));
        assert!(matches!(
            mailer.send_alert("Location not available"),
            Err(NotifyError::MissingCredential("ALERT_EMAIL"))
        ));

        let mailer = SmtpMailer::new(credentials(&[
            ("EMAIL_ADDRESS", "farm@example.org"),
            ("ALERT_EMAIL", "ranger@example.org"),
        ]));
        assert!(matches!(
            mailer.send_alert("Location not available"),
            Err(NotifyError::MissingCredential("EMAIL_PASSWORD"))
        ));
    }

    #[test]
    fn invalid_recipient_is_reported() {
        let mailer = SmtpMailer::new(credentials(&[
            ("EMAIL_ADDRESS", "farm@example.org"),
            ("ALERT_EMAIL", "not an address"),
        ]));
        assert!(matches!(
            mailer.compose("x"),
            Err(NotifyError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn composed_message_carries_subject_and_location() {
        let mailer = SmtpMailer::new(credentials(&[
            ("EMAIL_ADDRESS", "farm@example.org"),
            ("ALERT_EMAIL", "ranger@example.org"),
        ]));
        let message = mailer.compose("Latitude: 1.5, Longitude: 2.5").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: ranger@example.org"));
        assert!(raw.contains("Location: Latitude: 1.5, Longitude: 2.5"));
    }
}
