// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 告警通道 (Notification Channels)
///
/// 每个通道相互独立, 失败只在调用处记录:
/// - sound:     警告音 (rodio, 正在播放时跳过)
/// - lights:    闪灯 (模拟, 定时线程)
/// - shockwave: 冲击波驱赶 (模拟)
/// - location:  IP定位 (ipinfo.io)
/// - email:     邮件 (SMTP)
/// - sms:       短信 (Twilio)
pub mod email;
pub mod lights;
pub mod location;
pub mod shockwave;
pub mod sms;
pub mod sound;

use crate::error::NotifyError;

pub use email::{EmailCredentials, SmtpMailer};
pub use lights::SimulatedLights;
pub use location::{IpLocator, LOCATION_UNAVAILABLE};
pub use shockwave::SimulatedShockwave;
pub use sms::{TwilioCredentials, TwilioTexter};
pub use sound::RodioSiren;

pub type NotifyResult<T = ()> = Result<T, NotifyError>;

/// 警告音
pub trait Siren: Send {
    fn play(&self) -> NotifyResult;
}

/// 闪灯
pub trait Lights: Send {
    fn flash(&self) -> NotifyResult;
}

/// 驱赶装置
pub trait Deterrent: Send {
    fn activate(&self) -> NotifyResult;
}

/// 定位: 尽力而为, 失败时返回占位字符串, 从不报错
pub trait Locator: Send {
    fn locate(&self) -> String;
}

/// 邮件告警
pub trait Mailer: Send {
    fn send_alert(&self, location: &str) -> NotifyResult;
}

/// 短信告警
pub trait Texter: Send {
    fn send_alert(&self, location: &str) -> NotifyResult;
}

pub const EMAIL_SUBJECT: &str = "🚨 Elephant Alert!";

pub fn email_body(location: &str, time: &str) -> String {
    format!(
        "An elephant is near the fence! Please take action immediately.\nLocation: {}\nTime: {}",
        location, time
    )
}

pub fn sms_body(location: &str, time: &str) -> String {
    format!(
        "🚨 Elephant Detected! It is near the fencing. Take action immediately!\nLocation: {}\nTime: {}",
        location, time
    )
}

/// 必填凭据: 缺失或为空都视为未配置
pub(crate) fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, NotifyError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(NotifyError::MissingCredential(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_carry_location_and_time() {
        let location = "Latitude: 12.9, Longitude: 77.6";
        let email = email_body(location, "2026-10-16 08:00:00");
        assert!(email.starts_with("An elephant is near the fence!"));
        assert!(email.contains("\nLocation: Latitude: 12.9, Longitude: 77.6\n"));
        assert!(email.ends_with("Time: 2026-10-16 08:00:00"));

        let sms = sms_body(location, "t");
        assert!(sms.starts_with("🚨 Elephant Detected!"));
        assert!(sms.contains("Location: Latitude: 12.9"));
    }

    #[test]
    fn require_rejects_missing_and_blank() {
        assert!(matches!(
            require(&None, "ALERT_EMAIL"),
            Err(NotifyError::MissingCredential("ALERT_EMAIL"))
        ));
        assert!(require(&Some("  ".to_string()), "ALERT_EMAIL").is_err());
        assert_eq!(require(&Some("a@b.c".to_string()), "ALERT_EMAIL").unwrap(), "a@b.c");
    }
}
