// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 围栏大象监控 (Elephant Sentinel)
///
/// 系统架构:
/// 1. 解码线程: FFmpeg 摄像头/视频解码 → 帧通道
/// 2. 主线程:   检测 → 区域分级 → 状态机 → 渲染 (macroquad)
/// 3. 告警线程: 声音 / 闪灯 / 定位 / 邮件 / 短信 / 冲击波
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use macroquad::prelude::*;
use macroquad::Window;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use elephant_sentinel::alert::{Dispatcher, Responder, ZoneClassifier, ZoneConfig};
use elephant_sentinel::config::load_credentials;
use elephant_sentinel::input::{get_video_devices, FfmpegSource};
use elephant_sentinel::notify::{
    EmailCredentials, IpLocator, RodioSiren, SimulatedLights, SimulatedShockwave, SmtpMailer,
    TwilioCredentials, TwilioTexter,
};
use elephant_sentinel::renderer::{Renderer, WINDOW_TITLE};
use elephant_sentinel::{Args, Monitor, SentinelError, YOLOv8};

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("elephant_sentinel=info,sentinel=info,ort=warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(false))
            .with(env_filter)
            .init();
    }
}

fn build_monitor(args: &Args) -> Result<Monitor> {
    // ========== 检测模型 ==========
    let detector = YOLOv8::new(args.detector_config())
        .map_err(|e| SentinelError::ModelLoad(format!("{}: {:#}", args.model.display(), e)))?;
    detector.summary();

    let classifier = ZoneClassifier::new(ZoneConfig::load(&args.zones));

    // ========== 告警线程 ==========
    let siren = RodioSiren::new(&args.sound).context("failed to start siren thread")?;
    let responder = Responder::new(
        Box::new(siren),
        Box::new(SimulatedLights::new()),
        Box::new(SimulatedShockwave),
        Box::new(IpLocator::new()),
        Box::new(SmtpMailer::new(EmailCredentials::from_env())),
        Box::new(TwilioTexter::new(TwilioCredentials::from_env())),
    );
    let dispatcher = Dispatcher::spawn(responder)?;

    // ========== 视频输入 ==========
    let source = FfmpegSource::open(&args.input_source())?;

    Ok(Monitor::new(
        Box::new(source),
        Box::new(detector),
        classifier,
        Box::new(dispatcher),
    ))
}

fn window_conf() -> Conf {
    Conf {
        window_title: WINDOW_TITLE.to_string(),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

fn run(args: Args) -> Result<()> {
    if args.list_devices {
        for device in get_video_devices() {
            println!("[{}] {}", device.index, device.name);
        }
        return Ok(());
    }

    load_credentials(&args.credentials);

    info!("🚀 围栏大象监控启动");
    info!("📦 检测模型: {}", args.model.display());
    info!("📹 输入源: {}", args.input_source());

    let mut monitor = build_monitor(&args)?;
    info!("✅ 系统就绪, 开始监控...");

    if args.headless {
        monitor.run_headless();
        return Ok(());
    }

    Window::from_config(window_conf(), async move {
        let mut renderer = Renderer::new();
        loop {
            if is_key_pressed(KeyCode::Q) {
                info!("👋 按下 q, 退出");
                break;
            }
            match monitor.step() {
                Some(report) => renderer.update(report),
                None => {
                    info!("🏁 视频流结束");
                    break;
                }
            }
            renderer.draw(monitor.classifier());
            next_frame().await;
        }
        // 停止解码并等待已排队的告警处理完毕
        drop(monitor);
    });
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
