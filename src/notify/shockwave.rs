// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
// 模拟冲击波驱赶装置

use tracing::warn;

use super::{Deterrent, NotifyResult};

#[derive(Debug, Default)]
pub struct SimulatedShockwave;

impl Deterrent for SimulatedShockwave {
    fn activate(&self) -> NotifyResult {
        warn!("⚡ Shockwave Activated!");
        Ok(())
    }
}
