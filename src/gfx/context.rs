//! 设备上下文
//!
//! 拥有设备、即时上下文、交换链以及帧缓冲相关的视图和状态对象，
//! 并保存世界、投影和正交矩阵。
//!
//! 所有对象都放在 `Option` 中，`shutdown` 按创建的逆序逐个 `take()` 释放，
//! 因此重复调用是安全的；`Drop` 也会调用它。

use raw_window_handle::RawWindowHandle;
use tracing::{debug, info, warn};

use super::backend::*;
use crate::core::error::GraphicsError;
use crate::math::{constants::QUARTER_PI, matrix, Color, Matrix4};

/// 设备上下文初始化参数
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub window: RawWindowHandle,
    pub fullscreen: bool,
    /// 远裁剪面
    pub screen_far: f32,
    /// 近裁剪面
    pub screen_near: f32,
}

/// 设备上下文
pub struct DeviceContext<B: Backend> {
    vsync: bool,
    video_card_memory: usize,
    video_card_description: String,

    swap_chain: Option<B::SwapChain>,
    device: Option<B::Device>,
    context: Option<B::Context>,
    render_target_view: Option<B::RenderTargetView>,
    depth_stencil_buffer: Option<B::Texture>,
    depth_stencil_state: Option<B::DepthStencilState>,
    depth_stencil_view: Option<B::DepthStencilView>,
    rasterizer_state: Option<B::RasterizerState>,

    projection_matrix: Matrix4,
    world_matrix: Matrix4,
    ortho_matrix: Matrix4,
}

impl<B: Backend> DeviceContext<B> {
    /// 创建设备、交换链和帧缓冲对象
    ///
    /// 任何一步失败都会返回错误，已经创建的对象全部释放。
    pub fn initialize(backend: &B, settings: &DeviceSettings) -> Result<Self, GraphicsError> {
        info!(
            backend = backend.name(),
            width = settings.width,
            height = settings.height,
            vsync = settings.vsync,
            fullscreen = settings.fullscreen,
            "Initializing device context"
        );

        // 枚举显示硬件：适配器 0，输出 0
        let factory = backend.create_factory()?;
        let adapter = backend.enum_adapter(&factory, 0)?;
        let output = backend.enum_output(&adapter, 0)?;
        let modes = backend.display_modes(&output, Format::R8G8B8A8Unorm)?;
        let refresh_rate = select_refresh_rate(&modes, settings.width, settings.height);

        let adapter_info = backend.adapter_info(&adapter)?;
        let video_card_memory = adapter_info.dedicated_video_memory / 1024 / 1024;
        info!(
            adapter = %adapter_info.description,
            memory_mb = video_card_memory,
            "Selected video card"
        );

        drop(output);
        drop(adapter);
        drop(factory);

        let swap_chain_desc = SwapChainDesc {
            width: settings.width,
            height: settings.height,
            format: Format::R8G8B8A8Unorm,
            refresh_rate: if settings.vsync { refresh_rate } else { RefreshRate::UNSPECIFIED },
            buffer_count: 1,
            sample_count: 1,
            windowed: !settings.fullscreen,
        };
        let (swap_chain, device, context) =
            backend.create_device_and_swap_chain(&swap_chain_desc, settings.window)?;

        // 交换链一旦存在就交给 `Self` 持有：后续任何一步失败时由 `Drop`
        // 先退出全屏再按逆序释放
        let aspect = settings.width as f32 / settings.height as f32;
        let mut this = Self {
            vsync: settings.vsync,
            video_card_memory,
            video_card_description: adapter_info.description,
            swap_chain: Some(swap_chain),
            device: Some(device),
            context: Some(context),
            render_target_view: None,
            depth_stencil_buffer: None,
            depth_stencil_state: None,
            depth_stencil_view: None,
            rasterizer_state: None,
            projection_matrix: matrix::perspective_fov_lh(
                QUARTER_PI,
                aspect,
                settings.screen_near,
                settings.screen_far,
            ),
            world_matrix: Matrix4::identity(),
            ortho_matrix: matrix::orthographic_lh(
                settings.width as f32,
                settings.height as f32,
                settings.screen_near,
                settings.screen_far,
            ),
        };
        this.create_frame_resources(settings)?;

        debug!(aspect, "Device context ready");
        Ok(this)
    }

    /// 渲染目标视图、深度模板对象、光栅化状态和视口
    fn create_frame_resources(&mut self, settings: &DeviceSettings) -> Result<(), GraphicsError> {
        let (Some(swap_chain), Some(device), Some(context)) =
            (&self.swap_chain, &self.device, &self.context)
        else {
            return Err(GraphicsError::NotInitialized("Device"));
        };

        // 后台缓冲的渲染目标视图；视图创建后纹理即可释放
        let back_buffer = swap_chain.back_buffer()?;
        let render_target_view = device.create_render_target_view(&back_buffer)?;
        drop(back_buffer);

        let depth_stencil_buffer = device.create_depth_buffer(&DepthBufferDesc {
            width: settings.width,
            height: settings.height,
            format: Format::D24UnormS8Uint,
        })?;

        let depth_stencil_state = device.create_depth_stencil_state(&DepthStencilDesc::standard())?;
        context.set_depth_stencil_state(&depth_stencil_state, 1);

        let depth_stencil_view = device.create_depth_stencil_view(&depth_stencil_buffer)?;
        context.set_render_targets(&render_target_view, &depth_stencil_view);

        let rasterizer_state = device.create_rasterizer_state(&RasterizerDesc::standard())?;
        context.set_rasterizer_state(&rasterizer_state);

        context.set_viewport(&Viewport::full(settings.width, settings.height));

        self.render_target_view = Some(render_target_view);
        self.depth_stencil_buffer = Some(depth_stencil_buffer);
        self.depth_stencil_state = Some(depth_stencil_state);
        self.depth_stencil_view = Some(depth_stencil_view);
        self.rasterizer_state = Some(rasterizer_state);
        Ok(())
    }

    /// 释放所有对象
    ///
    /// 先退出全屏，再按创建的逆序释放。
    pub fn shutdown(&mut self) {
        if let Some(swap_chain) = &self.swap_chain {
            if let Err(e) = swap_chain.set_fullscreen(false) {
                warn!(error = %e, "Failed to leave fullscreen before release");
            }
        } else {
            return;
        }

        self.rasterizer_state.take();
        self.depth_stencil_view.take();
        self.depth_stencil_state.take();
        self.depth_stencil_buffer.take();
        self.render_target_view.take();
        self.context.take();
        self.device.take();
        self.swap_chain.take();

        debug!("Device context released");
    }

    /// 清除颜色缓冲和深度模板缓冲
    pub fn begin_frame(&self, color: Color) -> Result<(), GraphicsError> {
        let context = self.context()?;
        let rtv = self
            .render_target_view
            .as_ref()
            .ok_or(GraphicsError::NotInitialized("Render target view"))?;
        let dsv = self
            .depth_stencil_view
            .as_ref()
            .ok_or(GraphicsError::NotInitialized("Depth stencil view"))?;

        context.clear_render_target(rtv, color.to_array());
        context.clear_depth_stencil(dsv, 1.0, 0);
        Ok(())
    }

    /// 呈现后台缓冲；开启垂直同步时同步间隔为 1
    pub fn end_frame(&self) -> Result<(), GraphicsError> {
        let swap_chain = self
            .swap_chain
            .as_ref()
            .ok_or(GraphicsError::NotInitialized("Swap chain"))?;
        swap_chain.present(if self.vsync { 1 } else { 0 })
    }

    pub fn device(&self) -> Result<&B::Device, GraphicsError> {
        self.device.as_ref().ok_or(GraphicsError::NotInitialized("Device"))
    }

    pub fn context(&self) -> Result<&B::Context, GraphicsError> {
        self.context.as_ref().ok_or(GraphicsError::NotInitialized("Device context"))
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        self.projection_matrix
    }

    pub fn world_matrix(&self) -> Matrix4 {
        self.world_matrix
    }

    pub fn ortho_matrix(&self) -> Matrix4 {
        self.ortho_matrix
    }

    /// 显卡名称与专用显存（MB）
    pub fn video_card_info(&self) -> (&str, usize) {
        (&self.video_card_description, self.video_card_memory)
    }

    pub fn is_initialized(&self) -> bool {
        self.swap_chain.is_some()
    }
}

impl<B: Backend> Drop for DeviceContext<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 选择与窗口尺寸匹配的显示模式的刷新率
///
/// 多个模式匹配时取最后一个（枚举按刷新率升序，即最高刷新率）；
/// 没有精确匹配时使用最后一个枚举到的模式；一个模式都没有时不限制刷新率。
pub fn select_refresh_rate(modes: &[DisplayMode], width: u32, height: u32) -> RefreshRate {
    if let Some(mode) = modes.iter().rev().find(|m| m.width == width && m.height == height) {
        return mode.refresh_rate;
    }

    match modes.last() {
        Some(mode) => {
            warn!(
                width,
                height,
                fallback_width = mode.width,
                fallback_height = mode.height,
                "No display mode matches the window size, using the last enumerated mode"
            );
            mode.refresh_rate
        }
        None => {
            warn!("Output reported no display modes, refresh rate left unspecified");
            RefreshRate::UNSPECIFIED
        }
    }
}
