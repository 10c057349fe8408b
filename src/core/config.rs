//! 配置管理模块
//!
//! 提供引擎配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "Graphic Engine"
//!
//! [graphics]
//! vsync = true
//! fullscreen = false
//! screen_depth = 1000.0
//! screen_near = 0.1
//!
//! [camera]
//! position = [0.0, 0.0, -5.0]
//! rotation = [0.0, 0.0, 0.0]   # 弧度
//!
//! [shaders]
//! vertex = "src/renderer/shaders/color.vs.hlsl"
//! pixel = "src/renderer/shaders/color.ps.hlsl"
//! diagnostic_file = "shader-error.txt"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};

/// 引擎配置
///
/// 包含了引擎运行所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 相机初始状态
    #[serde(default)]
    pub camera: CameraConfig,

    /// 着色器源文件
    #[serde(default)]
    pub shaders: ShaderConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度（窗口模式）
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度（窗口模式）
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 全屏模式（使用显示器分辨率）
    #[serde(default)]
    pub fullscreen: bool,

    /// 远裁剪面
    #[serde(default = "default_screen_depth")]
    pub screen_depth: f32,

    /// 近裁剪面
    #[serde(default = "default_screen_near")]
    pub screen_near: f32,
}

/// 相机初始状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 位置 (x, y, z)
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],

    /// 旋转（欧拉角，弧度）(pitch, yaw, roll)
    #[serde(default)]
    pub rotation: [f32; 3],
}

/// 着色器配置
///
/// 入口点和目标版本是着色器阶段与编译器之间的约定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// 顶点着色器源文件
    #[serde(default = "default_vertex_shader")]
    pub vertex: PathBuf,

    /// 像素着色器源文件
    #[serde(default = "default_pixel_shader")]
    pub pixel: PathBuf,

    /// 顶点着色器入口点
    #[serde(default = "default_vertex_entry")]
    pub vertex_entry: String,

    /// 像素着色器入口点
    #[serde(default = "default_pixel_entry")]
    pub pixel_entry: String,

    /// 顶点着色器目标版本
    #[serde(default = "default_vertex_target")]
    pub vertex_target: String,

    /// 像素着色器目标版本
    #[serde(default = "default_pixel_target")]
    pub pixel_target: String,

    /// 编译错误输出文件（每次失败覆盖）
    #[serde(default = "default_diagnostic_file")]
    pub diagnostic_file: PathBuf,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "Graphic Engine".to_string() }
fn default_vsync() -> bool { true }
fn default_screen_depth() -> f32 { 1000.0 }
fn default_screen_near() -> f32 { 0.1 }
fn default_camera_position() -> [f32; 3] { [0.0, 0.0, -5.0] }
fn default_vertex_shader() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/renderer/shaders/color.vs.hlsl")
}
fn default_pixel_shader() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/renderer/shaders/color.ps.hlsl")
}
fn default_vertex_entry() -> String { "ColorVertexShader".to_string() }
fn default_pixel_entry() -> String { "ColorPixelShader".to_string() }
fn default_vertex_target() -> String { "vs_5_0".to_string() }
fn default_pixel_target() -> String { "ps_5_0".to_string() }
fn default_diagnostic_file() -> PathBuf { PathBuf::from("shader-error.txt") }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "graphic_engine.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            fullscreen: false,
            screen_depth: default_screen_depth(),
            screen_near: default_screen_near(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            rotation: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: default_vertex_shader(),
            pixel: default_pixel_shader(),
            vertex_entry: default_vertex_entry(),
            pixel_entry: default_pixel_entry(),
            vertex_target: default_vertex_target(),
            pixel_target: default_pixel_target(),
            diagnostic_file: default_diagnostic_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 读取并解析 TOML 配置文件
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?)
    }

    /// 文件缺失或无法解析时退回默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 用命令行参数覆盖配置
    ///
    /// `--width <n>`、`--height <n>`、`--fullscreen`、`--no-vsync`；
    /// 无法解析的数值和未知参数被忽略。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--fullscreen" => self.graphics.fullscreen = true,
                "--no-vsync" => self.graphics.vsync = false,
                flag @ ("--width" | "--height") => {
                    let value = args.next().and_then(|v| v.as_ref().parse::<u32>().ok());
                    match (flag, value) {
                        ("--width", Some(width)) => self.window.width = width,
                        (_, Some(height)) => self.window.height = height,
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// 检查窗口尺寸和裁剪面
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: &str| -> Result<()> {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: reason.to_string(),
            }
            .into())
        };

        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window.width/height", "Window dimensions must be greater than 0");
        }
        if !(self.graphics.screen_near > 0.0) {
            return invalid("graphics.screen_near", "Near plane must be greater than 0");
        }
        if self.graphics.screen_depth <= self.graphics.screen_near {
            return invalid("graphics.screen_depth", "Far plane must lie beyond the near plane");
        }
        Ok(())
    }
}
