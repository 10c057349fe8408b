//! 颜色着色器阶段
//!
//! 编译并持有顶点/像素着色器、输入布局和矩阵常量缓冲。
//! 每次绘制前把转置后的世界、观察、投影矩阵写入常量缓冲，
//! 然后绑定着色器并发出 `draw_indexed`。

use std::mem::size_of;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, error, info};

use crate::core::config::ShaderConfig;
use crate::core::error::GraphicsError;
use crate::core::notify::Notifier;
use crate::gfx::backend::*;
use crate::math::{matrix, Matrix4};

use super::compiler::{CompileFailure, ShaderCompiler, ShaderSource};
use super::vertex::Vertex;

/// 矩阵常量缓冲（对应 HLSL 的 `MatrixBuffer`，寄存器 b0）
///
/// 存放的是转置后的矩阵：HLSL 默认按列主序读取常量缓冲，
/// 行向量约定的矩阵转置后，着色器中的 `mul(v, M)` 才能得到正确结果。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MatrixBuffer {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl MatrixBuffer {
    pub fn new(world: &Matrix4, view: &Matrix4, projection: &Matrix4) -> Self {
        Self {
            world: matrix::rows(&world.transpose()),
            view: matrix::rows(&view.transpose()),
            projection: matrix::rows(&projection.transpose()),
        }
    }
}

/// 着色器类型，用于错误提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Vertex,
    Pixel,
}

impl Stage {
    fn missing_caption(self) -> &'static str {
        match self {
            Stage::Vertex => "Missing Vertex Shader File",
            Stage::Pixel => "Missing Pixel Shader File",
        }
    }
}

/// 颜色着色器阶段
pub struct ShaderStage<B: Backend> {
    vertex_shader: Option<B::VertexShader>,
    pixel_shader: Option<B::PixelShader>,
    layout: Option<B::InputLayout>,
    matrix_buffer: Option<B::Buffer>,
}

impl<B: Backend> ShaderStage<B> {
    /// 编译着色器并创建所需的 GPU 对象
    pub fn initialize(
        device: &B::Device,
        compiler: &dyn ShaderCompiler,
        notifier: &dyn Notifier,
        config: &ShaderConfig,
    ) -> Result<Self, GraphicsError> {
        let vs_source = ShaderSource::new(&config.vertex, &config.vertex_entry, &config.vertex_target);
        let ps_source = ShaderSource::new(&config.pixel, &config.pixel_entry, &config.pixel_target);

        let vs_bytecode = compile(compiler, notifier, &vs_source, Stage::Vertex, &config.diagnostic_file)?;
        let ps_bytecode = compile(compiler, notifier, &ps_source, Stage::Pixel, &config.diagnostic_file)?;

        let vertex_shader = device.create_vertex_shader(&vs_bytecode)?;
        let pixel_shader = device.create_pixel_shader(&ps_bytecode)?;

        // 输入布局必须与 Vertex 结构体和着色器的输入签名一致
        let layout = device.create_input_layout(&Vertex::INPUT_LAYOUT, &vs_bytecode)?;

        let matrix_buffer = device.create_buffer(
            &BufferDesc {
                byte_width: size_of::<MatrixBuffer>() as u32,
                usage: BufferUsage::Dynamic,
                bind: BindFlags::Constant,
                cpu_write: true,
            },
            None,
        )?;

        info!(
            vertex = %config.vertex.display(),
            pixel = %config.pixel.display(),
            "Color shader initialized"
        );

        Ok(Self {
            vertex_shader: Some(vertex_shader),
            pixel_shader: Some(pixel_shader),
            layout: Some(layout),
            matrix_buffer: Some(matrix_buffer),
        })
    }

    /// 写入矩阵并绘制 `index_count` 个索引
    pub fn render(
        &self,
        context: &B::Context,
        index_count: u32,
        world: &Matrix4,
        view: &Matrix4,
        projection: &Matrix4,
    ) -> Result<(), GraphicsError> {
        let (Some(vertex_shader), Some(pixel_shader), Some(layout), Some(matrix_buffer)) = (
            &self.vertex_shader,
            &self.pixel_shader,
            &self.layout,
            &self.matrix_buffer,
        ) else {
            return Err(GraphicsError::NotInitialized("Color shader"));
        };

        let payload = MatrixBuffer::new(world, view, projection);
        context.write_discard(matrix_buffer, bytemuck::bytes_of(&payload))?;
        context.set_vs_constant_buffer(0, matrix_buffer);

        context.set_input_layout(layout);
        context.set_vertex_shader(vertex_shader);
        context.set_pixel_shader(pixel_shader);
        context.draw_indexed(index_count, 0, 0);

        Ok(())
    }

    /// 释放常量缓冲、输入布局和两个着色器
    pub fn shutdown(&mut self) {
        self.matrix_buffer.take();
        self.layout.take();
        self.pixel_shader.take();
        self.vertex_shader.take();
    }
}

impl<B: Backend> Drop for ShaderStage<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn compile(
    compiler: &dyn ShaderCompiler,
    notifier: &dyn Notifier,
    source: &ShaderSource,
    stage: Stage,
    diagnostic_file: &Path,
) -> Result<Vec<u8>, GraphicsError> {
    debug!(path = %source.path.display(), entry = %source.entry_point, target = %source.target, "Compiling shader");

    match compiler.compile(source) {
        Ok(bytecode) => Ok(bytecode),
        Err(CompileFailure::Diagnostics(message)) => {
            write_diagnostics(&message, diagnostic_file);
            notifier.notify(
                &source.path.to_string_lossy(),
                &format!(
                    "Error compiling shader.  Check {} for message.",
                    diagnostic_file.display()
                ),
            );
            Err(GraphicsError::ShaderCompilation {
                path: source.path.clone(),
                diagnostics: diagnostic_file.to_path_buf(),
            })
        }
        Err(CompileFailure::MissingSource) => {
            notifier.notify(stage.missing_caption(), &source.path.to_string_lossy());
            Err(GraphicsError::ShaderSourceMissing(source.path.clone()))
        }
    }
}

/// 把编译器输出原样写入诊断文件（覆盖旧内容）
fn write_diagnostics(message: &[u8], path: &Path) {
    if let Err(e) = std::fs::write(path, message) {
        error!(path = %path.display(), error = %e, "Failed to write shader diagnostics");
    }
}
