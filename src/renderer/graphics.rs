//! 渲染编排器
//!
//! 按固定顺序创建设备上下文、相机、网格和着色器阶段，
//! 每帧执行 清屏 → 更新相机 → 绑定网格 → 绘制 → 呈现。

use raw_window_handle::RawWindowHandle;
use tracing::{debug, info};

use crate::component::Camera;
use crate::core::config::Config;
use crate::core::error::{EngineError, GraphicsError, Result};
use crate::core::notify::Notifier;
use crate::gfx::backend::Backend;
use crate::gfx::context::{DeviceContext, DeviceSettings};
use crate::math::Color;

use super::compiler::ShaderCompiler;
use super::mesh::Mesh;
use super::shader::ShaderStage;

const NOTICE_CAPTION: &str = "Error";

/// 渲染编排器
///
/// 两种状态：空闲（未初始化或已关闭）和运行中。
pub struct Graphics<B: Backend> {
    backend: B,
    compiler: Box<dyn ShaderCompiler>,
    notifier: Box<dyn Notifier>,
    config: Config,

    device: Option<DeviceContext<B>>,
    camera: Option<Camera>,
    mesh: Option<Mesh<B>>,
    shader: Option<ShaderStage<B>>,
}

impl<B: Backend> Graphics<B> {
    pub fn new(
        backend: B,
        compiler: Box<dyn ShaderCompiler>,
        notifier: Box<dyn Notifier>,
        config: Config,
    ) -> Self {
        Self {
            backend,
            compiler,
            notifier,
            config,
            device: None,
            camera: None,
            mesh: None,
            shader: None,
        }
    }

    /// 创建全部渲染对象
    ///
    /// 任何一步失败都会向用户提示并返回错误，已创建的对象随之释放。
    pub fn initialize(&mut self, width: u32, height: u32, window: RawWindowHandle) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if width == 0 || height == 0 {
            self.notifier.notify(NOTICE_CAPTION, "Could not initialize Direct3D");
            return Err(EngineError::Initialization(format!(
                "window client area is empty ({width}x{height})"
            )));
        }

        let graphics = &self.config.graphics;
        let settings = DeviceSettings {
            width,
            height,
            vsync: graphics.vsync,
            window,
            fullscreen: graphics.fullscreen,
            screen_far: graphics.screen_depth,
            screen_near: graphics.screen_near,
        };

        let device = DeviceContext::initialize(&self.backend, &settings).map_err(|e| {
            self.notifier.notify(NOTICE_CAPTION, "Could not initialize Direct3D");
            e
        })?;

        let mut camera = Camera::new();
        let [x, y, z] = self.config.camera.position;
        camera.set_position(x, y, z);
        let [pitch, yaw, roll] = self.config.camera.rotation;
        camera.set_rotation(pitch, yaw, roll);

        let mesh = Mesh::<B>::initialize(device.device()?).map_err(|e| {
            self.notifier.notify(NOTICE_CAPTION, "Could not initialize the model object.");
            e
        })?;

        let shader = ShaderStage::<B>::initialize(
            device.device()?,
            self.compiler.as_ref(),
            self.notifier.as_ref(),
            &self.config.shaders,
        )
        .map_err(|e| {
            self.notifier.notify(NOTICE_CAPTION, "Could not initialize the color shader object.");
            e
        })?;

        let (card, memory_mb) = device.video_card_info();
        info!(video_card = card, memory_mb, "Graphics initialized");

        self.device = Some(device);
        self.camera = Some(camera);
        self.mesh = Some(mesh);
        self.shader = Some(shader);
        Ok(())
    }

    /// 渲染一帧
    pub fn frame(&mut self) -> Result<()> {
        let (Some(device), Some(camera), Some(mesh), Some(shader)) =
            (&self.device, &mut self.camera, &self.mesh, &self.shader)
        else {
            return Err(GraphicsError::NotInitialized("Graphics").into());
        };

        device.begin_frame(Color::BLACK)?;

        camera.render();
        let world = device.world_matrix();
        let view = camera.view_matrix();
        let projection = device.projection_matrix();

        let context = device.context()?;
        mesh.render(context);
        shader.render(context, mesh.index_count() as u32, &world, &view, &projection)?;

        device.end_frame()?;
        Ok(())
    }

    /// 按 着色器 → 网格 → 相机 → 设备上下文 的顺序释放
    pub fn shutdown(&mut self) {
        if self.device.is_none() {
            return;
        }

        if let Some(mut shader) = self.shader.take() {
            shader.shutdown();
        }
        if let Some(mut mesh) = self.mesh.take() {
            mesh.shutdown();
        }
        self.camera.take();
        if let Some(mut device) = self.device.take() {
            device.shutdown();
        }

        info!("Graphics shut down");
    }

    pub fn is_running(&self) -> bool {
        self.device.is_some() && self.shader.is_some()
    }
}

impl<B: Backend> Drop for Graphics<B> {
    fn drop(&mut self) {
        if self.is_running() {
            debug!("Graphics dropped while running");
        }
        self.shutdown();
    }
}
