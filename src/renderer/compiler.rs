//! 着色器编译器接口
//!
//! 着色器阶段通过 `ShaderCompiler` 把 HLSL 源文件编译成字节码。
//! Windows 上的实现是 `gfx::d3d11::FxcCompiler`。

use std::path::{Path, PathBuf};

/// 一次编译请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// 源文件路径
    pub path: PathBuf,
    /// 入口函数名，如 `ColorVertexShader`
    pub entry_point: String,
    /// 目标版本，如 `vs_5_0`
    pub target: String,
}

impl ShaderSource {
    pub fn new(path: impl AsRef<Path>, entry_point: &str, target: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entry_point: entry_point.to_string(),
            target: target.to_string(),
        }
    }
}

/// 编译失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileFailure {
    /// 编译器输出的原始诊断信息
    Diagnostics(Vec<u8>),
    /// 没有诊断信息，通常是源文件不存在
    MissingSource,
}

/// 着色器编译器
pub trait ShaderCompiler {
    fn compile(&self, source: &ShaderSource) -> Result<Vec<u8>, CompileFailure>;
}
