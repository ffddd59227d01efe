// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 警告音 (rodio)
//!
//! rodio 的输出流不能跨线程, 因此由专用音频线程持有,
//! `play()` 通过通道提交请求并等待结果 (解码入队即返回, 播放在后台进行).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Sender};
use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, error, info};

use super::{NotifyResult, Siren};
use crate::error::NotifyError;

type PlayRequest = Sender<NotifyResult>;

pub struct RodioSiren {
    tx: Sender<PlayRequest>,
}

impl RodioSiren {
    pub fn new(path: impl AsRef<Path>) -> NotifyResult<Self> {
        let clip: PathBuf = path.as_ref().to_path_buf();
        let (tx, rx) = unbounded::<PlayRequest>();

        thread::Builder::new()
            .name("siren".to_string())
            .spawn(move || {
                let output = OutputStream::try_default()
                    .map_err(NotifyError::audio)
                    .and_then(|(stream, handle)| {
                        let sink = Sink::try_new(&handle).map_err(NotifyError::audio)?;
                        Ok((stream, sink))
                    });
                match &output {
                    Ok(_) => info!("🔊 音频输出就绪: {}", clip.display()),
                    Err(e) => error!("❌ 音频输出不可用: {}", e),
                }

                for reply in rx.iter() {
                    let result = match &output {
                        Ok((_stream, sink)) => play_clip(sink, &clip),
                        Err(e) => Err(NotifyError::Audio(e.to_string())),
                    };
                    let _ = reply.send(result);
                }
            })
            .map_err(NotifyError::audio)?;

        Ok(Self { tx })
    }
}

/// 正在播放时跳过, 避免叠音
fn play_clip(sink: &Sink, clip: &Path) -> NotifyResult {
    if !sink.empty() {
        debug!("🔊 警告音仍在播放, 跳过");
        return Ok(());
    }
    let file = File::open(clip)
        .map_err(|e| NotifyError::Audio(format!("{}: {}", clip.display(), e)))?;
    let source = Decoder::new(BufReader::new(file)).map_err(NotifyError::audio)?;
    sink.append(source);
    info!("🔊 播放警告音");
    Ok(())
}

impl Siren for RodioSiren {
    fn play(&self) -> NotifyResult {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(reply_tx)
            .map_err(|_| NotifyError::Closed("siren"))?;
        reply_rx.recv().map_err(|_| NotifyError::Closed("siren"))?
    }
}
