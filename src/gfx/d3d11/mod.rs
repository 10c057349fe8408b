//! Direct3D 11 图形 API 实现模块
//!
//! - Backend: DXGI 枚举、设备与交换链、资源创建和即时上下文命令
//! - Compiler: 基于 FXC 的 HLSL 编译器

pub mod backend;
pub mod compiler;

// 重新导出常用类型
pub use backend::D3d11Backend;
pub use compiler::FxcCompiler;
