//! 渲染器模块
//!
//! 与具体图形 API 无关的渲染逻辑：顶点格式、网格资源、颜色着色器阶段，
//! 以及把它们串成一帧的 `Graphics` 编排器。
//!
//! # 架构设计
//!
//! - `Graphics`：对宿主暴露 initialize / frame / shutdown
//! - `ShaderStage`、`Mesh`：持有各自的 GPU 对象，按创建逆序释放
//! - 设备访问全部通过 `gfx::backend` 中的 trait 完成

pub mod compiler;
pub mod graphics;
pub mod mesh;
pub mod shader;
pub mod vertex;

pub use compiler::{CompileFailure, ShaderCompiler, ShaderSource};
pub use graphics::Graphics;
pub use mesh::Mesh;
pub use shader::{MatrixBuffer, ShaderStage};
pub use vertex::Vertex;
