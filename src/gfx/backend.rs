//! 图形后端的统一抽象接口
//!
//! 本模块定义了渲染管线所需的最小设备接口：工厂与适配器枚举、
//! 设备与交换链、资源创建以及即时上下文上的命令。
//! 上层（`renderer`）只依赖这些 trait，不直接接触 Direct3D 11。
//!
//! 描述符类型（`Format`、`BufferDesc` 等）与具体 API 无关，
//! 由后端负责翻译成原生结构体。
//!
//! 所有资源句柄都是拥有型的：句柄被 drop 时释放底层对象。

use raw_window_handle::RawWindowHandle;

use crate::core::error::GraphicsError;

/// 后端操作的 Result 类型
pub type GfxResult<T> = std::result::Result<T, GraphicsError>;

/// 像素 / 顶点 / 索引格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 32 位 RGBA 颜色，交换链格式
    R8G8B8A8Unorm,
    /// 24 位深度 + 8 位模板
    D24UnormS8Uint,
    /// 32 位无符号索引
    R32Uint,
    /// float3，顶点位置
    R32G32B32Float,
    /// float4，顶点颜色
    R32G32B32A32Float,
}

/// 刷新率（有理数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl RefreshRate {
    /// 不限制刷新率
    pub const UNSPECIFIED: RefreshRate = RefreshRate { numerator: 0, denominator: 1 };
}

/// 显示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: RefreshRate,
}

/// 适配器信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// 显卡名称
    pub description: String,
    /// 专用显存（字节）
    pub dedicated_video_memory: usize,
}

/// 交换链描述
#[derive(Debug, Clone, PartialEq)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub refresh_rate: RefreshRate,
    /// 单个后台缓冲
    pub buffer_count: u32,
    /// 不使用多重采样
    pub sample_count: u32,
    pub windowed: bool,
}

/// 深度缓冲纹理描述
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBufferDesc {
    pub width: u32,
    pub height: u32,
    pub format: Format,
}

/// 比较函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonFunc {
    Less,
    Always,
}

/// 模板操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Incr,
    Decr,
}

/// 单面模板操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFace {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
    pub func: ComparisonFunc,
}

/// 深度模板状态描述
#[derive(Debug, Clone, PartialEq)]
pub struct DepthStencilDesc {
    pub depth_enable: bool,
    /// 写入全部深度
    pub depth_write: bool,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilFace,
    pub back_face: StencilFace,
}

impl DepthStencilDesc {
    /// 深度测试 less，正面通过深度失败时 incr，背面 decr
    pub fn standard() -> Self {
        Self {
            depth_enable: true,
            depth_write: true,
            depth_func: ComparisonFunc::Less,
            stencil_enable: true,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: StencilFace {
                fail: StencilOp::Keep,
                depth_fail: StencilOp::Incr,
                pass: StencilOp::Keep,
                func: ComparisonFunc::Always,
            },
            back_face: StencilFace {
                fail: StencilOp::Keep,
                depth_fail: StencilOp::Decr,
                pass: StencilOp::Keep,
                func: ComparisonFunc::Always,
            },
        }
    }
}

/// 光栅化状态描述（实心填充）
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizerDesc {
    /// 剔除背面；为 false 时不剔除
    pub cull_back: bool,
    /// 逆时针为正面
    pub front_counter_clockwise: bool,
    pub depth_clip: bool,
}

impl RasterizerDesc {
    /// 实心填充，剔除背面，顺时针为正面
    pub fn standard() -> Self {
        Self {
            cull_back: true,
            front_counter_clockwise: false,
            depth_clip: true,
        }
    }
}

/// 视口
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// 覆盖整个渲染目标，深度范围 [0, 1]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 缓冲区用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// 创建时填充，之后只读
    Immutable,
    /// CPU 每帧写入
    Dynamic,
}

/// 缓冲区绑定点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindFlags {
    Vertex,
    Index,
    Constant,
}

/// 缓冲区描述
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    pub byte_width: u32,
    pub usage: BufferUsage,
    pub bind: BindFlags,
    /// CPU 可写（动态缓冲需要）
    pub cpu_write: bool,
}

/// 输入布局元素（每顶点数据，槽位 0）
#[derive(Debug, Clone, PartialEq)]
pub struct InputElement {
    pub semantic: &'static str,
    pub format: Format,
    pub offset: u32,
}

/// 图元拓扑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// 图形后端
///
/// 负责枚举显示硬件并创建设备、即时上下文和交换链。
/// 关联类型是各个 COM 对象的拥有型句柄。
pub trait Backend {
    type Factory;
    type Adapter;
    type Output;
    type SwapChain: SwapChain<Self>;
    type Device: Device<Self>;
    type Context: Context<Self>;
    type Texture;
    type RenderTargetView;
    type DepthStencilView;
    type DepthStencilState;
    type RasterizerState;
    type Buffer;
    type VertexShader;
    type PixelShader;
    type InputLayout;

    /// 后端名称，用于日志
    fn name(&self) -> &'static str;

    /// 创建显示工厂
    fn create_factory(&self) -> GfxResult<Self::Factory>;

    /// 枚举适配器
    fn enum_adapter(&self, factory: &Self::Factory, index: u32) -> GfxResult<Self::Adapter>;

    /// 枚举适配器的输出（显示器）
    fn enum_output(&self, adapter: &Self::Adapter, index: u32) -> GfxResult<Self::Output>;

    /// 列出输出在指定格式下支持的显示模式
    fn display_modes(&self, output: &Self::Output, format: Format) -> GfxResult<Vec<DisplayMode>>;

    /// 读取适配器描述
    fn adapter_info(&self, adapter: &Self::Adapter) -> GfxResult<AdapterInfo>;

    /// 创建设备、即时上下文和交换链（功能级别 11.0，硬件驱动）
    fn create_device_and_swap_chain(
        &self,
        desc: &SwapChainDesc,
        window: RawWindowHandle,
    ) -> GfxResult<(Self::SwapChain, Self::Device, Self::Context)>;
}

/// 交换链
pub trait SwapChain<B: Backend + ?Sized> {
    /// 获取后台缓冲纹理
    fn back_buffer(&self) -> GfxResult<B::Texture>;

    /// 呈现；`sync_interval` 为 1 时等待垂直同步
    fn present(&self, sync_interval: u32) -> GfxResult<()>;

    /// 切换全屏状态
    fn set_fullscreen(&self, fullscreen: bool) -> GfxResult<()>;
}

/// 设备：资源工厂
pub trait Device<B: Backend + ?Sized> {
    fn create_render_target_view(&self, texture: &B::Texture) -> GfxResult<B::RenderTargetView>;

    fn create_depth_buffer(&self, desc: &DepthBufferDesc) -> GfxResult<B::Texture>;

    fn create_depth_stencil_state(&self, desc: &DepthStencilDesc) -> GfxResult<B::DepthStencilState>;

    fn create_depth_stencil_view(&self, texture: &B::Texture) -> GfxResult<B::DepthStencilView>;

    fn create_rasterizer_state(&self, desc: &RasterizerDesc) -> GfxResult<B::RasterizerState>;

    /// 创建缓冲区；`initial_data` 为 `None` 时内容未定义
    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> GfxResult<B::Buffer>;

    fn create_vertex_shader(&self, bytecode: &[u8]) -> GfxResult<B::VertexShader>;

    fn create_pixel_shader(&self, bytecode: &[u8]) -> GfxResult<B::PixelShader>;

    /// 根据顶点着色器字节码的输入签名创建输入布局
    fn create_input_layout(
        &self,
        elements: &[InputElement],
        vertex_shader_bytecode: &[u8],
    ) -> GfxResult<B::InputLayout>;
}

/// 即时上下文：状态绑定与绘制命令
pub trait Context<B: Backend + ?Sized> {
    fn set_depth_stencil_state(&self, state: &B::DepthStencilState, stencil_ref: u32);

    fn set_render_targets(&self, rtv: &B::RenderTargetView, dsv: &B::DepthStencilView);

    fn set_rasterizer_state(&self, state: &B::RasterizerState);

    fn set_viewport(&self, viewport: &Viewport);

    fn clear_render_target(&self, rtv: &B::RenderTargetView, color: [f32; 4]);

    /// 同时清除深度与模板
    fn clear_depth_stencil(&self, dsv: &B::DepthStencilView, depth: f32, stencil: u8);

    /// 以丢弃方式映射动态缓冲区，写入 `data` 后取消映射
    fn write_discard(&self, buffer: &B::Buffer, data: &[u8]) -> GfxResult<()>;

    fn set_vs_constant_buffer(&self, slot: u32, buffer: &B::Buffer);

    fn set_input_layout(&self, layout: &B::InputLayout);

    fn set_vertex_shader(&self, shader: &B::VertexShader);

    fn set_pixel_shader(&self, shader: &B::PixelShader);

    fn set_vertex_buffer(&self, slot: u32, buffer: &B::Buffer, stride: u32, offset: u32);

    fn set_index_buffer(&self, buffer: &B::Buffer, format: Format, offset: u32);

    fn set_primitive_topology(&self, topology: PrimitiveTopology);

    fn draw_indexed(&self, index_count: u32, start_index: u32, base_vertex: i32);
}
