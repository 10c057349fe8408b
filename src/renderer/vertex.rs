//! 顶点数据定义
//!
//! 本模块定义了渲染管线使用的顶点结构体，以及与之对应的输入布局。
//!
//! # 设计说明
//!
//! - 使用 `#[repr(C)]` 确保内存布局与 HLSL 输入结构一致
//! - 实现 `Pod` 和 `Zeroable` trait 以支持零拷贝上传到 GPU
//! - 输入布局 `Vertex::INPUT_LAYOUT` 与结构体定义放在一起，避免两者不一致

use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

use crate::gfx::backend::{Format, InputElement};
use crate::math::{Color, Vector3};

/// 顶点结构体
///
/// # 内存布局
///
/// - `position`：前 12 字节（3 个 f32）
/// - `color`：后 16 字节（4 个 f32），偏移 12
///
/// 总大小：28 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置（模型空间）
    pub position: [f32; 3],
    /// 顶点颜色（RGBA，范围 0.0-1.0）
    pub color: [f32; 4],
}

impl Vertex {
    /// 顶点着色器的输入布局：POSITION + COLOR，槽位 0，每顶点数据
    pub const INPUT_LAYOUT: [InputElement; 2] = [
        InputElement {
            semantic: "POSITION",
            format: Format::R32G32B32Float,
            offset: offset_of!(Vertex, position) as u32,
        },
        InputElement {
            semantic: "COLOR",
            format: Format::R32G32B32A32Float,
            offset: offset_of!(Vertex, color) as u32,
        },
    ];

    /// 顶点步长（字节）
    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    /// 从数学库类型创建顶点
    pub fn from_vectors(position: Vector3, color: Color) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color: color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(size_of::<Vertex>(), 28);
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(Vertex::INPUT_LAYOUT[0].offset, 0);
        assert_eq!(Vertex::INPUT_LAYOUT[1].offset, 12);
        assert_eq!(Vertex::INPUT_LAYOUT[1].semantic, "COLOR");
    }

    #[test]
    fn test_vertex_bytes() {
        let v = Vertex::from_vectors(Vector3::new(1.0, 2.0, 3.0), Color::GREEN);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[12..16], &0.0f32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &1.0f32.to_ne_bytes());
    }
}
