//! Graphic Engine - 最小 Direct3D 11 渲染程序
//!
//! 打开一个窗口，用颜色着色器绘制一个绿色三角形，按 Escape 退出。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件
//! cargo run
//!
//! # 命令行覆盖
//! cargo run -- --width 1024 --height 768 --no-vsync
//! cargo run -- --fullscreen
//! ```
//!
//! # 架构概览
//!
//! ```text
//! ┌─────────────┐
//! │   main.rs   │  应用程序入口
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  app::System │  窗口与事件循环
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Graphics   │  设备上下文 / 相机 / 网格 / 着色器
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   D3D11     │  具体后端实现
//! └─────────────┘
//! ```

use graphic_engine::core::{log, Config};
use tracing::{error, info};

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载引擎配置文件（config.toml）
/// 2. 应用命令行参数覆盖
/// 3. 验证配置
/// 4. 初始化日志系统
/// 5. 创建窗口和渲染器，进入主循环
///
/// 配置无效或事件循环创建失败时以退出码 1 结束。
fn main() {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());

    // 3. 验证配置
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 4. 初始化日志系统（使用配置中的设置）
    log::init_logger(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "Graphic Engine starting...");

    info!(
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        fullscreen = config.graphics.fullscreen,
        "Graphics configuration"
    );

    // 5. 运行
    if let Err(e) = run(config) {
        error!("Application failed: {:#}", e);
        eprintln!("Application failed: {:#}", e);
        std::process::exit(1);
    }

    info!("Graphic Engine exited");
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> anyhow::Result<()> {
    use graphic_engine::app::System;
    use graphic_engine::core::notify::MessageBoxNotifier;
    use graphic_engine::gfx::{D3d11Backend, FxcCompiler};
    use graphic_engine::renderer::Graphics;

    let graphics = Graphics::new(
        D3d11Backend::new(),
        Box::new(FxcCompiler),
        Box::new(MessageBoxNotifier),
        config.clone(),
    );
    System::new(config, graphics).run()
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("Direct3D 11 is only available on Windows")
}
