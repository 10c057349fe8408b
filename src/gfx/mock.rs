//! 记录型测试后端
//!
//! 不访问任何 GPU：每个调用都被追加到共享的调用日志中，
//! 每个句柄在 drop 时记录一次 `Release`。测试据此检查
//! 创建顺序、绘制命令和释放顺序。
//!
//! `fail_on` 可以让指定名称的操作返回错误，用于测试初始化失败路径。

use std::cell::RefCell;
use std::rc::Rc;

use raw_window_handle::{RawWindowHandle, WebWindowHandle};

use super::backend::*;
use crate::core::error::GraphicsError;

/// 记录下来的调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(&'static str),
    Release(&'static str),
    DisplayModes,
    CreateSwapChain(SwapChainDesc),
    CreateDepthBuffer(DepthBufferDesc),
    CreateBuffer { desc: BufferDesc, initial_data: Option<Vec<u8>> },
    CreateInputLayout(Vec<InputElement>),
    SetDepthStencilState(u32),
    SetRenderTargets,
    SetRasterizerState,
    SetViewport(Viewport),
    ClearRenderTarget([f32; 4]),
    ClearDepthStencil(f32, u8),
    UpdateDynamic(Vec<u8>),
    SetVsConstantBuffer(u32),
    SetInputLayout,
    SetVertexShader,
    SetPixelShader,
    SetVertexBuffer { slot: u32, stride: u32, offset: u32 },
    SetIndexBuffer { format: Format, offset: u32 },
    SetPrimitiveTopology(PrimitiveTopology),
    DrawIndexed { count: u32, start: u32, base: i32 },
    Present(u32),
    SetFullscreen(bool),
}

/// 共享状态：调用日志与故障注入
#[derive(Debug, Default)]
pub struct MockState {
    log: RefCell<Vec<Call>>,
    fail: RefCell<Option<&'static str>>,
}

impl MockState {
    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn check(&self, op: &'static str) -> GfxResult<()> {
        if *self.fail.borrow() == Some(op) {
            return Err(GraphicsError::ResourceCreation(format!("{op} failed (injected)")));
        }
        Ok(())
    }
}

/// 拥有型句柄，drop 时记录释放
#[derive(Debug)]
pub struct MockHandle {
    pub kind: &'static str,
    state: Rc<MockState>,
}

impl MockHandle {
    fn new(kind: &'static str, state: &Rc<MockState>) -> Self {
        state.record(Call::Create(kind));
        Self { kind, state: Rc::clone(state) }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.state.record(Call::Release(self.kind));
    }
}

/// 测试后端
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Rc<MockState>,
    modes: Vec<DisplayMode>,
}

impl MockBackend {
    /// 提供一个 800x600@60 的显示模式
    pub fn new() -> Self {
        Self::with_modes(vec![DisplayMode {
            width: 800,
            height: 600,
            refresh_rate: RefreshRate { numerator: 60, denominator: 1 },
        }])
    }

    pub fn with_modes(modes: Vec<DisplayMode>) -> Self {
        Self { state: Rc::new(MockState::default()), modes }
    }

    /// 让名为 `op` 的操作失败
    pub fn fail_on(&self, op: &'static str) {
        *self.state.fail.borrow_mut() = Some(op);
    }

    /// 调用日志快照
    pub fn calls(&self) -> Vec<Call> {
        self.state.log.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.state.log.borrow_mut().clear();
    }

    /// 按顺序列出被释放的对象
    pub fn releases(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Release(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// 按顺序列出被创建的对象
    pub fn creations(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// 测试用窗口句柄
    pub fn window() -> RawWindowHandle {
        RawWindowHandle::Web(WebWindowHandle::new(1))
    }

    fn handle(&self, kind: &'static str) -> GfxResult<MockHandle> {
        self.state.check(kind)?;
        Ok(MockHandle::new(kind, &self.state))
    }
}

/// 设备、上下文、交换链共用同一个记录句柄
#[derive(Debug)]
pub struct MockObject(MockHandle);

impl MockObject {
    fn state(&self) -> &MockState {
        &self.0.state
    }

    fn handle(&self, kind: &'static str) -> GfxResult<MockHandle> {
        self.state().check(kind)?;
        Ok(MockHandle::new(kind, &self.0.state))
    }
}

impl Backend for MockBackend {
    type Factory = MockHandle;
    type Adapter = MockHandle;
    type Output = MockHandle;
    type SwapChain = MockObject;
    type Device = MockObject;
    type Context = MockObject;
    type Texture = MockHandle;
    type RenderTargetView = MockHandle;
    type DepthStencilView = MockHandle;
    type DepthStencilState = MockHandle;
    type RasterizerState = MockHandle;
    type Buffer = MockHandle;
    type VertexShader = MockHandle;
    type PixelShader = MockHandle;
    type InputLayout = MockHandle;

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn create_factory(&self) -> GfxResult<MockHandle> {
        self.handle("factory")
    }

    fn enum_adapter(&self, _factory: &MockHandle, _index: u32) -> GfxResult<MockHandle> {
        self.handle("adapter")
    }

    fn enum_output(&self, _adapter: &MockHandle, _index: u32) -> GfxResult<MockHandle> {
        self.handle("output")
    }

    fn display_modes(&self, _output: &MockHandle, _format: Format) -> GfxResult<Vec<DisplayMode>> {
        self.state.check("display_modes")?;
        self.state.record(Call::DisplayModes);
        Ok(self.modes.clone())
    }

    fn adapter_info(&self, _adapter: &MockHandle) -> GfxResult<AdapterInfo> {
        self.state.check("adapter_info")?;
        Ok(AdapterInfo {
            description: "Mock Adapter".to_string(),
            dedicated_video_memory: 256 * 1024 * 1024,
        })
    }

    fn create_device_and_swap_chain(
        &self,
        desc: &SwapChainDesc,
        _window: RawWindowHandle,
    ) -> GfxResult<(MockObject, MockObject, MockObject)> {
        self.state.check("device")?;
        self.state.record(Call::CreateSwapChain(desc.clone()));
        Ok((
            MockObject(MockHandle::new("swap_chain", &self.state)),
            MockObject(MockHandle::new("device", &self.state)),
            MockObject(MockHandle::new("context", &self.state)),
        ))
    }
}

impl SwapChain<MockBackend> for MockObject {
    fn back_buffer(&self) -> GfxResult<MockHandle> {
        self.handle("back_buffer")
    }

    fn present(&self, sync_interval: u32) -> GfxResult<()> {
        self.state().check("present")?;
        self.state().record(Call::Present(sync_interval));
        Ok(())
    }

    fn set_fullscreen(&self, fullscreen: bool) -> GfxResult<()> {
        self.state().record(Call::SetFullscreen(fullscreen));
        Ok(())
    }
}

impl Device<MockBackend> for MockObject {
    fn create_render_target_view(&self, _texture: &MockHandle) -> GfxResult<MockHandle> {
        self.handle("render_target_view")
    }

    fn create_depth_buffer(&self, desc: &DepthBufferDesc) -> GfxResult<MockHandle> {
        self.state().check("depth_buffer")?;
        self.state().record(Call::CreateDepthBuffer(desc.clone()));
        self.handle("depth_buffer")
    }

    fn create_depth_stencil_state(&self, _desc: &DepthStencilDesc) -> GfxResult<MockHandle> {
        self.handle("depth_stencil_state")
    }

    fn create_depth_stencil_view(&self, _texture: &MockHandle) -> GfxResult<MockHandle> {
        self.handle("depth_stencil_view")
    }

    fn create_rasterizer_state(&self, _desc: &RasterizerDesc) -> GfxResult<MockHandle> {
        self.handle("rasterizer_state")
    }

    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> GfxResult<MockHandle> {
        let kind = match desc.bind {
            BindFlags::Vertex => "vertex_buffer",
            BindFlags::Index => "index_buffer",
            BindFlags::Constant => "constant_buffer",
        };
        self.state().check(kind)?;
        self.state().record(Call::CreateBuffer {
            desc: desc.clone(),
            initial_data: initial_data.map(<[u8]>::to_vec),
        });
        self.handle(kind)
    }

    fn create_vertex_shader(&self, _bytecode: &[u8]) -> GfxResult<MockHandle> {
        self.handle("vertex_shader")
    }

    fn create_pixel_shader(&self, _bytecode: &[u8]) -> GfxResult<MockHandle> {
        self.handle("pixel_shader")
    }

    fn create_input_layout(&self, elements: &[InputElement], _bytecode: &[u8]) -> GfxResult<MockHandle> {
        self.state().check("input_layout")?;
        self.state().record(Call::CreateInputLayout(elements.to_vec()));
        self.handle("input_layout")
    }
}

impl Context<MockBackend> for MockObject {
    fn set_depth_stencil_state(&self, _state: &MockHandle, stencil_ref: u32) {
        self.state().record(Call::SetDepthStencilState(stencil_ref));
    }

    fn set_render_targets(&self, _rtv: &MockHandle, _dsv: &MockHandle) {
        self.state().record(Call::SetRenderTargets);
    }

    fn set_rasterizer_state(&self, _state: &MockHandle) {
        self.state().record(Call::SetRasterizerState);
    }

    fn set_viewport(&self, viewport: &Viewport) {
        self.state().record(Call::SetViewport(*viewport));
    }

    fn clear_render_target(&self, _rtv: &MockHandle, color: [f32; 4]) {
        self.state().record(Call::ClearRenderTarget(color));
    }

    fn clear_depth_stencil(&self, _dsv: &MockHandle, depth: f32, stencil: u8) {
        self.state().record(Call::ClearDepthStencil(depth, stencil));
    }

    fn write_discard(&self, _buffer: &MockHandle, data: &[u8]) -> GfxResult<()> {
        self.state().check("map")?;
        self.state().record(Call::UpdateDynamic(data.to_vec()));
        Ok(())
    }

    fn set_vs_constant_buffer(&self, slot: u32, _buffer: &MockHandle) {
        self.state().record(Call::SetVsConstantBuffer(slot));
    }

    fn set_input_layout(&self, _layout: &MockHandle) {
        self.state().record(Call::SetInputLayout);
    }

    fn set_vertex_shader(&self, _shader: &MockHandle) {
        self.state().record(Call::SetVertexShader);
    }

    fn set_pixel_shader(&self, _shader: &MockHandle) {
        self.state().record(Call::SetPixelShader);
    }

    fn set_vertex_buffer(&self, slot: u32, _buffer: &MockHandle, stride: u32, offset: u32) {
        self.state().record(Call::SetVertexBuffer { slot, stride, offset });
    }

    fn set_index_buffer(&self, _buffer: &MockHandle, format: Format, offset: u32) {
        self.state().record(Call::SetIndexBuffer { format, offset });
    }

    fn set_primitive_topology(&self, topology: PrimitiveTopology) {
        self.state().record(Call::SetPrimitiveTopology(topology));
    }

    fn draw_indexed(&self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.state().record(Call::DrawIndexed { count: index_count, start: start_index, base: base_vertex });
    }
}
