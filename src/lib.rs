//! Graphic Engine - 最小 Direct3D 11 渲染管线
//!
//! 一个网格、一对着色器、一个帧循环：在窗口中用颜色着色器绘制一个绿色三角形。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理、输入、用户提示）
//! - `math`: 数学库（左手系矩阵辅助函数）
//! - `component`: 相机
//! - `gfx`: 图形后端抽象层与 Direct3D 11 实现
//! - `renderer`: 网格、着色器阶段和渲染编排器
//! - `app`: winit 宿主程序
//!
//! # 使用示例
//!
//! ```no_run
//! use graphic_engine::core::Config;
//!
//! let mut config = Config::from_file_or_default("config.toml");
//! config.apply_args(std::env::args());
//! config.validate().expect("invalid configuration");
//! ```

pub mod app;
pub mod component;
pub mod core;
pub mod gfx;
pub mod math;
pub mod renderer;
