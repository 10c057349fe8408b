//! 组件模块
//!
//! 渲染循环中可独立更新的对象。目前只有相机。

pub mod camera;

pub use camera::Camera;
