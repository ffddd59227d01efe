// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 告警分发
//!
//! 帧循环只负责把 `Escalation` 投递到通道, 由独立的工作线程执行
//! 声音/闪灯/邮件/短信等耗时动作, 不阻塞检测.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use tracing::{error, info, warn};

use super::Escalation;
use crate::error::SentinelResult;
use crate::notify::{Deterrent, Lights, Locator, Mailer, Siren, Texter};

/// 告警出口: 接收状态机产生的升级事件
pub trait AlertSink {
    fn dispatch(&self, escalation: Escalation);
}

/// 按告警等级执行具体动作, 每个动作的失败互不影响
pub struct Responder {
    siren: Box<dyn Siren>,
    lights: Box<dyn Lights>,
    deterrent: Box<dyn Deterrent>,
    locator: Box<dyn Locator>,
    mailer: Box<dyn Mailer>,
    texter: Box<dyn Texter>,
}

impl Responder {
    pub fn new(
        siren: Box<dyn Siren>,
        lights: Box<dyn Lights>,
        deterrent: Box<dyn Deterrent>,
        locator: Box<dyn Locator>,
        mailer: Box<dyn Mailer>,
        texter: Box<dyn Texter>,
    ) -> Self {
        Self {
            siren,
            lights,
            deterrent,
            locator,
            mailer,
            texter,
        }
    }

    pub fn respond(&self, escalation: Escalation) {
        match escalation {
            Escalation::EnteredWarning => {
                warn!("⚠️ Elephant Approaching (Warning Zone)");
                if let Err(e) = self.siren.play() {
                    error!("❌ 警告音播放失败: {}", e);
                }
                if let Err(e) = self.lights.flash() {
                    error!("❌ 闪灯失败: {}", e);
                }
            }
            Escalation::EnteredDanger => {
                warn!("🚨 Elephant VERY CLOSE (Danger Zone)");
                let location = self.locator.locate();
                match self.mailer.send_alert(&location) {
                    Ok(()) => info!("📧 告警邮件已发送"),
                    Err(e) => error!("❌ 邮件发送失败: {}", e),
                }
                match self.texter.send_alert(&location) {
                    Ok(()) => info!("📱 告警短信已发送"),
                    Err(e) => error!("❌ 短信发送失败: {}", e),
                }
                if let Err(e) = self.deterrent.activate() {
                    error!("❌ 驱赶装置启动失败: {}", e);
                }
            }
        }
    }
}

/// 同步执行 (测试及单线程场景)
impl AlertSink for Responder {
    fn dispatch(&self, escalation: Escalation) {
        self.respond(escalation);
    }
}

/// 后台告警线程
pub struct Dispatcher {
    tx: Option<Sender<Escalation>>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn spawn(responder: Responder) -> SentinelResult<Self> {
        let (tx, rx) = unbounded::<Escalation>();
        let worker = thread::Builder::new()
            .name("alert-dispatcher".to_string())
            .spawn(move || {
                info!("🔔 告警线程启动");
                for escalation in rx.iter() {
                    responder.respond(escalation);
                }
                info!("🔕 告警线程退出");
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// 关闭通道, 等待已排队的告警处理完毕
    pub fn shutdown(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("❌ 告警线程异常退出");
            }
        }
    }
}

impl AlertSink for Dispatcher {
    fn dispatch(&self, escalation: Escalation) {
        match &self.tx {
            Some(tx) => {
                if tx.send(escalation).is_err() {
                    error!("❌ 告警线程已退出, 丢弃 {:?}", escalation);
                }
            }
            None => warn!("⚠️ 告警分发已关闭, 丢弃 {:?}", escalation),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::notify::NotifyResult;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<String>>>;

    struct Fake {
        name: &'static str,
        calls: Calls,
        fail: bool,
    }

    impl Fake {
        fn record(&self, detail: &str) -> NotifyResult {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}{}", self.name, detail));
            if self.fail {
                Err(NotifyError::transport("boom"))
            } else {
                Ok(())
            }
        }
    }

    impl Siren for Fake {
        fn play(&self) -> NotifyResult {
            self.record("")
        }
    }
    impl Lights for Fake {
        fn flash(&self) -> NotifyResult {
            self.record("")
        }
    }
    impl Deterrent for Fake {
        fn activate(&self) -> NotifyResult {
            self.record("")
        }
    }
    impl Locator for Fake {
        fn locate(&self) -> String {
            let _ = self.record("");
            "Latitude: 1.5, Longitude: 2.5".to_string()
        }
    }
    impl Mailer for Fake {
        fn send_alert(&self, location: &str) -> NotifyResult {
            self.record(&format!(":{}", location))
        }
    }
    impl Texter for Fake {
        fn send_alert(&self, location: &str) -> NotifyResult {
            self.record(&format!(":{}", location))
        }
    }

    fn responder(calls: &Calls, failing: &[&str]) -> Responder {
        let fake = |name: &'static str| Fake {
            name,
            calls: calls.clone(),
            fail: failing.contains(&name),
        };
        Responder::new(
            Box::new(fake("siren")),
            Box::new(fake("lights")),
            Box::new(fake("shockwave")),
            Box::new(fake("locate")),
            Box::new(fake("email")),
            Box::new(fake("sms")),
        )
    }

    #[test]
    fn warning_plays_siren_then_flashes() {
        let calls = Calls::default();
        responder(&calls, &[]).dispatch(Escalation::EnteredWarning);
        assert_eq!(*calls.lock().unwrap(), vec!["siren", "lights"]);
    }

    #[test]
    fn danger_runs_every_action_once_in_order() {
        let calls = Calls::default();
        responder(&calls, &[]).dispatch(Escalation::EnteredDanger);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "locate",
                "email:Latitude: 1.5, Longitude: 2.5",
                "sms:Latitude: 1.5, Longitude: 2.5",
                "shockwave",
            ]
        );
    }

    #[test]
    fn failing_channel_does_not_block_the_others() {
        let calls = Calls::default();
        let r = responder(&calls, &["email", "siren"]);
        r.dispatch(Escalation::EnteredWarning);
        r.dispatch(Escalation::EnteredDanger);

        let calls = calls.lock().unwrap();
        assert!(calls.iter().any(|c| c == "lights"));
        assert!(calls.iter().any(|c| c.starts_with("sms:")));
        assert_eq!(calls.last().map(String::as_str), Some("shockwave"));
    }

    #[test]
    fn dispatcher_delivers_queued_escalations_before_shutdown() {
        let calls = Calls::default();
        let mut dispatcher = Dispatcher::spawn(responder(&calls, &[])).unwrap();
        dispatcher.dispatch(Escalation::EnteredWarning);
        dispatcher.dispatch(Escalation::EnteredDanger);
        dispatcher.shutdown();

        assert_eq!(calls.lock().unwrap().len(), 6);

        // 关闭后投递只记录日志
        dispatcher.dispatch(Escalation::EnteredWarning);
        assert_eq!(calls.lock().unwrap().len(), 6);
    }
}
