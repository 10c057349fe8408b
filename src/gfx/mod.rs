//! 图形后端模块
//!
//! 本模块封装了图形 API 的底层实现：
//! - `backend`：渲染管线依赖的设备接口（trait + 与 API 无关的描述符）
//! - `context`：设备上下文，持有设备、交换链和帧缓冲对象
//! - `d3d11`：Direct3D 11 实现（仅 Windows）
//!
//! 上层只依赖 `backend` 中的 trait，测试使用记录型后端 `mock`。

pub mod backend;
pub mod context;
#[cfg(target_os = "windows")]
pub mod d3d11;
#[cfg(test)]
pub mod mock;

pub use backend::{Backend, Context, Device, SwapChain};
pub use context::{DeviceContext, DeviceSettings};
#[cfg(target_os = "windows")]
pub use d3d11::{D3d11Backend, FxcCompiler};
