//! 网格资源
//!
//! 持有一份不可变的顶点缓冲和索引缓冲（三角形列表），
//! 负责把它们绑定到输入装配阶段。绘制命令由着色器阶段发出。

use tracing::debug;

use crate::core::error::{MeshError, Result};
use crate::gfx::backend::*;
use crate::math::{Color, Vector3};

use super::vertex::Vertex;

/// 网格资源
pub struct Mesh<B: Backend> {
    vertex_buffer: Option<B::Buffer>,
    index_buffer: Option<B::Buffer>,
    vertex_count: usize,
    index_count: usize,
}

impl<B: Backend> Mesh<B> {
    /// 创建默认网格：一个绿色三角形
    pub fn initialize(device: &B::Device) -> Result<Self> {
        let vertices = [
            Vertex::from_vectors(Vector3::new(-1.0, -1.0, 0.0), Color::GREEN), // 左下
            Vertex::from_vectors(Vector3::new(0.0, 1.0, 0.0), Color::GREEN),   // 顶部
            Vertex::from_vectors(Vector3::new(1.0, -1.0, 0.0), Color::GREEN),  // 右下
        ];
        let indices = [0u32, 1, 2];

        Self::from_geometry(device, &vertices, &indices)
    }

    /// 从任意三角形列表创建网格
    pub fn from_geometry(device: &B::Device, vertices: &[Vertex], indices: &[u32]) -> Result<Self> {
        if vertices.is_empty() {
            return Err(MeshError::Empty("vertices").into());
        }
        if indices.is_empty() {
            return Err(MeshError::Empty("indices").into());
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangleList(indices.len()).into());
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count: vertices.len() }.into());
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let vertex_buffer = device.create_buffer(
            &BufferDesc {
                byte_width: vertex_bytes.len() as u32,
                usage: BufferUsage::Immutable,
                bind: BindFlags::Vertex,
                cpu_write: false,
            },
            Some(vertex_bytes),
        )?;

        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let index_buffer = device.create_buffer(
            &BufferDesc {
                byte_width: index_bytes.len() as u32,
                usage: BufferUsage::Immutable,
                bind: BindFlags::Index,
                cpu_write: false,
            },
            Some(index_bytes),
        )?;

        debug!(vertices = vertices.len(), indices = indices.len(), "Mesh buffers created");

        Ok(Self {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            vertex_count: vertices.len(),
            index_count: indices.len(),
        })
    }

    /// 绑定顶点缓冲、索引缓冲和图元拓扑
    pub fn render(&self, context: &B::Context) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer) else {
            return;
        };

        context.set_vertex_buffer(0, vertex_buffer, Vertex::STRIDE, 0);
        context.set_index_buffer(index_buffer, Format::R32Uint, 0);
        context.set_primitive_topology(PrimitiveTopology::TriangleList);
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// 释放缓冲区，先索引后顶点
    pub fn shutdown(&mut self) {
        self.index_buffer.take();
        self.vertex_buffer.take();
    }
}

impl<B: Backend> Drop for Mesh<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::gfx::mock::{Call, MockBackend, MockObject};

    fn device(backend: &MockBackend) -> (MockObject, MockObject, MockObject) {
        let desc = SwapChainDesc {
            width: 800,
            height: 600,
            format: Format::R8G8B8A8Unorm,
            refresh_rate: RefreshRate::UNSPECIFIED,
            buffer_count: 1,
            sample_count: 1,
            windowed: true,
        };
        backend.create_device_and_swap_chain(&desc, MockBackend::window()).unwrap()
    }

    #[test]
    fn test_default_triangle() {
        let backend = MockBackend::new();
        let (_sc, device, _ctx) = device(&backend);
        backend.clear_calls();

        let mesh = Mesh::<MockBackend>::initialize(&device).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);

        let buffers: Vec<(BufferDesc, Option<Vec<u8>>)> = backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateBuffer { desc, initial_data } => Some((desc, initial_data)),
                _ => None,
            })
            .collect();
        assert_eq!(buffers.len(), 2);

        let (vb_desc, vb_data) = &buffers[0];
        assert_eq!(vb_desc.bind, BindFlags::Vertex);
        assert_eq!(vb_desc.usage, BufferUsage::Immutable);
        assert_eq!(vb_desc.byte_width, 84);
        let vertices: Vec<Vertex> = vb_data
            .as_ref()
            .unwrap()
            .chunks_exact(28)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(vertices[1].position, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[2].position, [1.0, -1.0, 0.0]);
        assert!(vertices.iter().all(|v| v.color == [0.0, 1.0, 0.0, 1.0]));

        let (ib_desc, ib_data) = &buffers[1];
        assert_eq!(ib_desc.bind, BindFlags::Index);
        let indices: Vec<u32> = ib_data
            .as_ref()
            .unwrap()
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_render_binds_without_drawing() {
        let backend = MockBackend::new();
        let (_sc, device, ctx) = device(&backend);
        let mesh = Mesh::<MockBackend>::initialize(&device).unwrap();
        backend.clear_calls();

        mesh.render(&ctx);
        assert_eq!(
            backend.calls(),
            vec![
                Call::SetVertexBuffer { slot: 0, stride: 28, offset: 0 },
                Call::SetIndexBuffer { format: Format::R32Uint, offset: 0 },
                Call::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            ]
        );
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let backend = MockBackend::new();
        let (_sc, device, _ctx) = device(&backend);
        let mut mesh = Mesh::<MockBackend>::initialize(&device).unwrap();
        backend.clear_calls();

        mesh.shutdown();
        mesh.shutdown();
        drop(mesh);
        assert_eq!(backend.releases(), vec!["index_buffer", "vertex_buffer"]);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        let backend = MockBackend::new();
        let (_sc, device, _ctx) = device(&backend);
        let v = Vertex::default();

        let empty = Mesh::<MockBackend>::from_geometry(&device, &[], &[0, 1, 2]);
        assert!(matches!(empty, Err(EngineError::Mesh(MeshError::Empty("vertices")))));

        let partial = Mesh::<MockBackend>::from_geometry(&device, &[v, v], &[0, 1]);
        assert!(matches!(partial, Err(EngineError::Mesh(MeshError::NotTriangleList(2)))));

        let out_of_range = Mesh::<MockBackend>::from_geometry(&device, &[v, v, v], &[0, 1, 3]);
        assert!(matches!(
            out_of_range,
            Err(EngineError::Mesh(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 }))
        ));
    }

    #[test]
    fn test_buffer_failure_propagates() {
        let backend = MockBackend::new();
        let (_sc, device, _ctx) = device(&backend);
        backend.fail_on("index_buffer");
        backend.clear_calls();

        let result = Mesh::<MockBackend>::initialize(&device);
        assert!(matches!(result, Err(EngineError::Graphics(_))));
        // 已经创建的顶点缓冲随之释放
        assert_eq!(backend.releases(), vec!["vertex_buffer"]);
    }
}
