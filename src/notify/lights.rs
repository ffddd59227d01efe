// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 模拟闪灯: 在独立线程上按固定节奏开关, 同一时刻只允许一次闪烁

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::{Lights, NotifyResult};
use crate::error::NotifyError;

pub struct SimulatedLights {
    cycles: u32,
    interval: Duration,
    busy: Arc<AtomicBool>,
}

impl SimulatedLights {
    /// 5 次, 亮 0.5s / 灭 0.5s
    pub fn new() -> Self {
        Self::with_timing(5, Duration::from_millis(500))
    }

    pub fn with_timing(cycles: u32, interval: Duration) -> Self {
        Self {
            cycles,
            interval,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Default for SimulatedLights {
    fn default() -> Self {
        Self::new()
    }
}

fn flash_cycles(cycles: u32, interval: Duration, mut emit: impl FnMut(&str)) {
    emit("💡 Flashing Lights ON");
    for _ in 0..cycles {
        emit("💡 ON");
        thread::sleep(interval);
        emit("💡 OFF");
        thread::sleep(interval);
    }
    emit("💡 Flashing Lights OFF");
}

/// 线程结束 (含 panic) 时释放占用标志
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Lights for SimulatedLights {
    fn flash(&self) -> NotifyResult {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("💡 闪灯进行中, 跳过");
            return Ok(());
        }

        let guard = BusyGuard(self.busy.clone());
        let cycles = self.cycles;
        let interval = self.interval;
        thread::Builder::new()
            .name("lights".to_string())
            .spawn(move || {
                let _guard = guard;
                flash_cycles(cycles, interval, |line| info!("{}", line));
            })
            .map_err(|e| {
                // spawn 失败时闭包(及 guard)已被丢弃, 标志已复位
                NotifyError::Transport(format!("lights thread: {}", e))
            })?;
        Ok(())
    }
}
