//! 错误处理模块
//!
//! 定义了引擎中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 设计原则
//!
//! - 使用 `thiserror` 自动实现 `Error` trait
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 易于模式匹配和错误处理

use std::path::PathBuf;

use thiserror::Error;

/// 引擎统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, EngineError>;

/// 引擎的错误类型
///
/// 包含了引擎运行过程中可能遇到的各种错误情况。
#[derive(Debug, Error)]
pub enum EngineError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 图形 API 错误
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// 网格数据错误
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 初始化错误
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// 适配器、输出或设备创建失败
    #[error("Device creation failed: {0}")]
    DeviceCreation(String),

    /// 交换链错误
    #[error("Swapchain error: {0}")]
    SwapChain(String),

    /// 资源（视图、状态、缓冲区、着色器对象）创建失败
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// 着色器编译失败，诊断信息已写入文件
    #[error("Shader compilation failed for {path}, see {diagnostics}", path = .path.display(), diagnostics = .diagnostics.display())]
    ShaderCompilation { path: PathBuf, diagnostics: PathBuf },

    /// 着色器源文件缺失（编译器没有产生诊断信息）
    #[error("Missing shader file: {}", .0.display())]
    ShaderSourceMissing(PathBuf),

    /// 帧内命令执行失败（Map、Present 等）
    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    /// 组件尚未初始化或已经关闭
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),
}

/// 网格数据相关的错误
#[derive(Debug, Error)]
pub enum MeshError {
    /// 没有顶点或索引
    #[error("Mesh has no {0}")]
    Empty(&'static str),

    /// 索引数量不是三角形列表的整数倍
    #[error("Index count {0} is not a multiple of 3")]
    NotTriangleList(usize),

    /// 索引越界
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
