//! Direct3D 11 图形后端实现
//!
//! 把 `gfx::backend` 中的 trait 映射到 DXGI / Direct3D 11 调用。
//! 所有 COM 对象都由 `windows` crate 的智能指针持有，drop 时自动 Release。
//!
//! # 初始化流程
//!
//! 1. 创建 DXGI 工厂，枚举适配器 0 和输出 0
//! 2. 读取显示模式列表和适配器描述
//! 3. 创建设备、即时上下文和交换链（功能级别 11.0）
//! 4. 由 `DeviceContext` 继续创建视图和状态对象

use std::ffi::CString;

use raw_window_handle::RawWindowHandle;
use tracing::debug;
use windows::{
    core::*, Win32::Foundation::*, Win32::Graphics::Direct3D::*, Win32::Graphics::Direct3D11::*,
    Win32::Graphics::Dxgi::Common::*, Win32::Graphics::Dxgi::*,
};

use crate::core::error::GraphicsError;
use crate::gfx::backend::{self as gfx, GfxResult};

/// Direct3D 11 后端
#[derive(Debug, Default, Clone, Copy)]
pub struct D3d11Backend;

impl D3d11Backend {
    pub fn new() -> Self {
        Self
    }
}

/// 交换链（同时实现 `gfx::SwapChain`）
pub struct D3d11SwapChain(IDXGISwapChain);

/// 设备（同时实现 `gfx::Device`）
pub struct D3d11Device(ID3D11Device);

/// 即时上下文（同时实现 `gfx::Context`）
pub struct D3d11Context(ID3D11DeviceContext);

fn creation_error(what: &str, e: Error) -> GraphicsError {
    GraphicsError::ResourceCreation(format!("{what}: {e}"))
}

fn device_error(what: &str, e: Error) -> GraphicsError {
    GraphicsError::DeviceCreation(format!("{what}: {e}"))
}

/// 输出参数形式的创建函数成功后仍可能返回空指针
fn created<T>(what: &str, object: Option<T>) -> GfxResult<T> {
    object.ok_or_else(|| GraphicsError::ResourceCreation(format!("{what} returned no object")))
}

fn to_dxgi_format(format: gfx::Format) -> DXGI_FORMAT {
    match format {
        gfx::Format::R8G8B8A8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        gfx::Format::D24UnormS8Uint => DXGI_FORMAT_D24_UNORM_S8_UINT,
        gfx::Format::R32Uint => DXGI_FORMAT_R32_UINT,
        gfx::Format::R32G32B32Float => DXGI_FORMAT_R32G32B32_FLOAT,
        gfx::Format::R32G32B32A32Float => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

fn to_comparison(func: gfx::ComparisonFunc) -> D3D11_COMPARISON_FUNC {
    match func {
        gfx::ComparisonFunc::Less => D3D11_COMPARISON_LESS,
        gfx::ComparisonFunc::Always => D3D11_COMPARISON_ALWAYS,
    }
}

fn to_stencil_op(op: gfx::StencilOp) -> D3D11_STENCIL_OP {
    match op {
        gfx::StencilOp::Keep => D3D11_STENCIL_OP_KEEP,
        gfx::StencilOp::Incr => D3D11_STENCIL_OP_INCR,
        gfx::StencilOp::Decr => D3D11_STENCIL_OP_DECR,
    }
}

fn to_stencil_face(face: &gfx::StencilFace) -> D3D11_DEPTH_STENCILOP_DESC {
    D3D11_DEPTH_STENCILOP_DESC {
        StencilFailOp: to_stencil_op(face.fail),
        StencilDepthFailOp: to_stencil_op(face.depth_fail),
        StencilPassOp: to_stencil_op(face.pass),
        StencilFunc: to_comparison(face.func),
    }
}

impl gfx::Backend for D3d11Backend {
    type Factory = IDXGIFactory1;
    type Adapter = IDXGIAdapter;
    type Output = IDXGIOutput;
    type SwapChain = D3d11SwapChain;
    type Device = D3d11Device;
    type Context = D3d11Context;
    type Texture = ID3D11Texture2D;
    type RenderTargetView = ID3D11RenderTargetView;
    type DepthStencilView = ID3D11DepthStencilView;
    type DepthStencilState = ID3D11DepthStencilState;
    type RasterizerState = ID3D11RasterizerState;
    type Buffer = ID3D11Buffer;
    type VertexShader = ID3D11VertexShader;
    type PixelShader = ID3D11PixelShader;
    type InputLayout = ID3D11InputLayout;

    fn name(&self) -> &'static str {
        "Direct3D 11"
    }

    fn create_factory(&self) -> GfxResult<IDXGIFactory1> {
        unsafe { CreateDXGIFactory1::<IDXGIFactory1>() }
            .map_err(|e| device_error("Failed to create DXGI factory", e))
    }

    fn enum_adapter(&self, factory: &IDXGIFactory1, index: u32) -> GfxResult<IDXGIAdapter> {
        unsafe { factory.EnumAdapters(index) }
            .map_err(|e| device_error("Failed to enumerate video card", e))
    }

    fn enum_output(&self, adapter: &IDXGIAdapter, index: u32) -> GfxResult<IDXGIOutput> {
        unsafe { adapter.EnumOutputs(index) }
            .map_err(|e| device_error("Failed to enumerate monitor", e))
    }

    fn display_modes(&self, output: &IDXGIOutput, format: gfx::Format) -> GfxResult<Vec<gfx::DisplayMode>> {
        let format = to_dxgi_format(format);
        let mut count = 0u32;

        unsafe {
            // 第一次调用只取数量
            output
                .GetDisplayModeList(format, DXGI_ENUM_MODES_INTERLACED, &mut count, None)
                .map_err(|e| device_error("Failed to query display mode count", e))?;

            let mut modes = vec![DXGI_MODE_DESC::default(); count as usize];
            output
                .GetDisplayModeList(format, DXGI_ENUM_MODES_INTERLACED, &mut count, Some(modes.as_mut_ptr()))
                .map_err(|e| device_error("Failed to list display modes", e))?;
            modes.truncate(count as usize);

            debug!(count, "Display modes enumerated");

            Ok(modes
                .iter()
                .map(|m| gfx::DisplayMode {
                    width: m.Width,
                    height: m.Height,
                    refresh_rate: gfx::RefreshRate {
                        numerator: m.RefreshRate.Numerator,
                        denominator: m.RefreshRate.Denominator,
                    },
                })
                .collect())
        }
    }

    fn adapter_info(&self, adapter: &IDXGIAdapter) -> GfxResult<gfx::AdapterInfo> {
        let desc = unsafe { adapter.GetDesc() }
            .map_err(|e| device_error("Failed to read adapter description", e))?;

        let len = desc.Description.iter().position(|&c| c == 0).unwrap_or(desc.Description.len());
        Ok(gfx::AdapterInfo {
            description: String::from_utf16_lossy(&desc.Description[..len]),
            dedicated_video_memory: desc.DedicatedVideoMemory,
        })
    }

    fn create_device_and_swap_chain(
        &self,
        desc: &gfx::SwapChainDesc,
        window: RawWindowHandle,
    ) -> GfxResult<(D3d11SwapChain, D3d11Device, D3d11Context)> {
        let hwnd = match window {
            RawWindowHandle::Win32(handle) => HWND(handle.hwnd.get() as *mut std::ffi::c_void),
            _ => {
                return Err(GraphicsError::SwapChain(
                    "Expected Win32 window handle on Windows platform".to_string(),
                ))
            }
        };

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: desc.width,
                Height: desc.height,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: desc.refresh_rate.numerator,
                    Denominator: desc.refresh_rate.denominator,
                },
                Format: to_dxgi_format(desc.format),
                ScanlineOrdering: DXGI_MODE_SCANLINE_ORDER_UNSPECIFIED,
                Scaling: DXGI_MODE_SCALING_UNSPECIFIED,
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: desc.sample_count,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: desc.buffer_count,
            OutputWindow: hwnd,
            Windowed: desc.windowed.into(),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            Flags: 0,
        };

        let feature_levels = [D3D_FEATURE_LEVEL_11_0];
        let mut swap_chain: Option<IDXGISwapChain> = None;
        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;

        unsafe {
            D3D11CreateDeviceAndSwapChain(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_FLAG::default(),
                Some(&feature_levels),
                D3D11_SDK_VERSION,
                Some(&swap_chain_desc),
                Some(&mut swap_chain),
                Some(&mut device),
                None,
                Some(&mut context),
            )
            .map_err(|e| device_error("Failed to create device and swap chain", e))?;
        }

        let swap_chain = swap_chain.ok_or_else(|| GraphicsError::SwapChain("No swap chain returned".to_string()))?;
        let device = device.ok_or_else(|| GraphicsError::DeviceCreation("No device returned".to_string()))?;
        let context =
            context.ok_or_else(|| GraphicsError::DeviceCreation("No immediate context returned".to_string()))?;

        debug!(width = desc.width, height = desc.height, windowed = desc.windowed, "Swap chain created");

        Ok((D3d11SwapChain(swap_chain), D3d11Device(device), D3d11Context(context)))
    }
}

impl gfx::SwapChain<D3d11Backend> for D3d11SwapChain {
    fn back_buffer(&self) -> GfxResult<ID3D11Texture2D> {
        unsafe { self.0.GetBuffer::<ID3D11Texture2D>(0) }
            .map_err(|e| GraphicsError::SwapChain(format!("Failed to get back buffer: {e}")))
    }

    fn present(&self, sync_interval: u32) -> GfxResult<()> {
        unsafe { self.0.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .map_err(|e| GraphicsError::CommandExecution(format!("Present failed: {e}")))
    }

    fn set_fullscreen(&self, fullscreen: bool) -> GfxResult<()> {
        unsafe { self.0.SetFullscreenState(fullscreen.into(), None::<&IDXGIOutput>) }
            .map_err(|e| GraphicsError::SwapChain(format!("Failed to change fullscreen state: {e}")))
    }
}

impl gfx::Device<D3d11Backend> for D3d11Device {
    fn create_render_target_view(&self, texture: &ID3D11Texture2D) -> GfxResult<ID3D11RenderTargetView> {
        let mut rtv: Option<ID3D11RenderTargetView> = None;
        unsafe { self.0.CreateRenderTargetView(texture, None, Some(&mut rtv)) }
            .map_err(|e| creation_error("Failed to create render target view", e))?;
        created("CreateRenderTargetView", rtv)
    }

    fn create_depth_buffer(&self, desc: &gfx::DepthBufferDesc) -> GfxResult<ID3D11Texture2D> {
        let texture_desc = D3D11_TEXTURE2D_DESC {
            Width: desc.width,
            Height: desc.height,
            MipLevels: 1,
            ArraySize: 1,
            Format: to_dxgi_format(desc.format),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };

        let mut texture: Option<ID3D11Texture2D> = None;
        unsafe { self.0.CreateTexture2D(&texture_desc, None, Some(&mut texture)) }
            .map_err(|e| creation_error("Failed to create depth buffer", e))?;
        created("CreateTexture2D", texture)
    }

    fn create_depth_stencil_state(&self, desc: &gfx::DepthStencilDesc) -> GfxResult<ID3D11DepthStencilState> {
        let state_desc = D3D11_DEPTH_STENCIL_DESC {
            DepthEnable: desc.depth_enable.into(),
            DepthWriteMask: if desc.depth_write {
                D3D11_DEPTH_WRITE_MASK_ALL
            } else {
                D3D11_DEPTH_WRITE_MASK_ZERO
            },
            DepthFunc: to_comparison(desc.depth_func),
            StencilEnable: desc.stencil_enable.into(),
            StencilReadMask: desc.stencil_read_mask,
            StencilWriteMask: desc.stencil_write_mask,
            FrontFace: to_stencil_face(&desc.front_face),
            BackFace: to_stencil_face(&desc.back_face),
        };

        let mut state: Option<ID3D11DepthStencilState> = None;
        unsafe { self.0.CreateDepthStencilState(&state_desc, Some(&mut state)) }
            .map_err(|e| creation_error("Failed to create depth stencil state", e))?;
        created("CreateDepthStencilState", state)
    }

    fn create_depth_stencil_view(&self, texture: &ID3D11Texture2D) -> GfxResult<ID3D11DepthStencilView> {
        let view_desc = D3D11_DEPTH_STENCIL_VIEW_DESC {
            Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
            ViewDimension: D3D11_DSV_DIMENSION_TEXTURE2D,
            Flags: 0,
            Anonymous: D3D11_DEPTH_STENCIL_VIEW_DESC_0 {
                Texture2D: D3D11_TEX2D_DSV { MipSlice: 0 },
            },
        };

        let mut view: Option<ID3D11DepthStencilView> = None;
        unsafe { self.0.CreateDepthStencilView(texture, Some(&view_desc), Some(&mut view)) }
            .map_err(|e| creation_error("Failed to create depth stencil view", e))?;
        created("CreateDepthStencilView", view)
    }

    fn create_rasterizer_state(&self, desc: &gfx::RasterizerDesc) -> GfxResult<ID3D11RasterizerState> {
        let rasterizer_desc = D3D11_RASTERIZER_DESC {
            FillMode: D3D11_FILL_SOLID,
            CullMode: if desc.cull_back { D3D11_CULL_BACK } else { D3D11_CULL_NONE },
            FrontCounterClockwise: desc.front_counter_clockwise.into(),
            DepthBias: 0,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: 0.0,
            DepthClipEnable: desc.depth_clip.into(),
            ScissorEnable: false.into(),
            MultisampleEnable: false.into(),
            AntialiasedLineEnable: false.into(),
        };

        let mut state: Option<ID3D11RasterizerState> = None;
        unsafe { self.0.CreateRasterizerState(&rasterizer_desc, Some(&mut state)) }
            .map_err(|e| creation_error("Failed to create rasterizer state", e))?;
        created("CreateRasterizerState", state)
    }

    fn create_buffer(&self, desc: &gfx::BufferDesc, initial_data: Option<&[u8]>) -> GfxResult<ID3D11Buffer> {
        let buffer_desc = D3D11_BUFFER_DESC {
            ByteWidth: desc.byte_width,
            Usage: match desc.usage {
                gfx::BufferUsage::Immutable => D3D11_USAGE_IMMUTABLE,
                gfx::BufferUsage::Dynamic => D3D11_USAGE_DYNAMIC,
            },
            BindFlags: match desc.bind {
                gfx::BindFlags::Vertex => D3D11_BIND_VERTEX_BUFFER.0 as u32,
                gfx::BindFlags::Index => D3D11_BIND_INDEX_BUFFER.0 as u32,
                gfx::BindFlags::Constant => D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            },
            CPUAccessFlags: if desc.cpu_write { D3D11_CPU_ACCESS_WRITE.0 as u32 } else { 0 },
            MiscFlags: 0,
            StructureByteStride: 0,
        };

        let subresource = initial_data.map(|data| D3D11_SUBRESOURCE_DATA {
            pSysMem: data.as_ptr() as *const std::ffi::c_void,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        });

        let mut buffer: Option<ID3D11Buffer> = None;
        unsafe {
            self.0.CreateBuffer(
                &buffer_desc,
                subresource.as_ref().map(|s| s as *const D3D11_SUBRESOURCE_DATA),
                Some(&mut buffer),
            )
        }
        .map_err(|e| creation_error("Failed to create buffer", e))?;
        created("CreateBuffer", buffer)
    }

    fn create_vertex_shader(&self, bytecode: &[u8]) -> GfxResult<ID3D11VertexShader> {
        let mut shader: Option<ID3D11VertexShader> = None;
        unsafe { self.0.CreateVertexShader(bytecode, None, Some(&mut shader)) }
            .map_err(|e| creation_error("Failed to create vertex shader", e))?;
        created("CreateVertexShader", shader)
    }

    fn create_pixel_shader(&self, bytecode: &[u8]) -> GfxResult<ID3D11PixelShader> {
        let mut shader: Option<ID3D11PixelShader> = None;
        unsafe { self.0.CreatePixelShader(bytecode, None, Some(&mut shader)) }
            .map_err(|e| creation_error("Failed to create pixel shader", e))?;
        created("CreatePixelShader", shader)
    }

    fn create_input_layout(
        &self,
        elements: &[gfx::InputElement],
        vertex_shader_bytecode: &[u8],
    ) -> GfxResult<ID3D11InputLayout> {
        // 语义名需要以 NUL 结尾，且在调用期间保持有效
        let names = elements
            .iter()
            .map(|e| CString::new(e.semantic))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GraphicsError::ResourceCreation(format!("Invalid semantic name: {e}")))?;

        let descs: Vec<D3D11_INPUT_ELEMENT_DESC> = elements
            .iter()
            .zip(&names)
            .map(|(element, name)| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(name.as_ptr() as *const u8),
                SemanticIndex: 0,
                Format: to_dxgi_format(element.format),
                InputSlot: 0,
                AlignedByteOffset: element.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut layout: Option<ID3D11InputLayout> = None;
        unsafe { self.0.CreateInputLayout(&descs, vertex_shader_bytecode, Some(&mut layout)) }
            .map_err(|e| creation_error("Failed to create input layout", e))?;
        created("CreateInputLayout", layout)
    }
}

impl gfx::Context<D3d11Backend> for D3d11Context {
    fn set_depth_stencil_state(&self, state: &ID3D11DepthStencilState, stencil_ref: u32) {
        unsafe { self.0.OMSetDepthStencilState(state, stencil_ref) }
    }

    fn set_render_targets(&self, rtv: &ID3D11RenderTargetView, dsv: &ID3D11DepthStencilView) {
        unsafe { self.0.OMSetRenderTargets(Some(&[Some(rtv.clone())]), dsv) }
    }

    fn set_rasterizer_state(&self, state: &ID3D11RasterizerState) {
        unsafe { self.0.RSSetState(state) }
    }

    fn set_viewport(&self, viewport: &gfx::Viewport) {
        let viewport = D3D11_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        unsafe { self.0.RSSetViewports(Some(&[viewport])) }
    }

    fn clear_render_target(&self, rtv: &ID3D11RenderTargetView, color: [f32; 4]) {
        unsafe { self.0.ClearRenderTargetView(rtv, &color) }
    }

    fn clear_depth_stencil(&self, dsv: &ID3D11DepthStencilView, depth: f32, stencil: u8) {
        let flags = (D3D11_CLEAR_DEPTH.0 | D3D11_CLEAR_STENCIL.0) as u32;
        unsafe { self.0.ClearDepthStencilView(dsv, flags, depth, stencil) }
    }

    fn write_discard(&self, buffer: &ID3D11Buffer, data: &[u8]) -> GfxResult<()> {
        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe {
            self.0
                .Map(buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(|e| GraphicsError::CommandExecution(format!("Failed to map buffer: {e}")))?;

            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.pData as *mut u8, data.len());

            self.0.Unmap(buffer, 0);
        }
        Ok(())
    }

    fn set_vs_constant_buffer(&self, slot: u32, buffer: &ID3D11Buffer) {
        unsafe { self.0.VSSetConstantBuffers(slot, Some(&[Some(buffer.clone())])) }
    }

    fn set_input_layout(&self, layout: &ID3D11InputLayout) {
        unsafe { self.0.IASetInputLayout(layout) }
    }

    fn set_vertex_shader(&self, shader: &ID3D11VertexShader) {
        unsafe { self.0.VSSetShader(shader, None) }
    }

    fn set_pixel_shader(&self, shader: &ID3D11PixelShader) {
        unsafe { self.0.PSSetShader(shader, None) }
    }

    fn set_vertex_buffer(&self, slot: u32, buffer: &ID3D11Buffer, stride: u32, offset: u32) {
        unsafe {
            self.0.IASetVertexBuffers(
                slot,
                1,
                Some(&Some(buffer.clone())),
                Some(&stride),
                Some(&offset),
            )
        }
    }

    fn set_index_buffer(&self, buffer: &ID3D11Buffer, format: gfx::Format, offset: u32) {
        unsafe { self.0.IASetIndexBuffer(buffer, to_dxgi_format(format), offset) }
    }

    fn set_primitive_topology(&self, topology: gfx::PrimitiveTopology) {
        let topology = match topology {
            gfx::PrimitiveTopology::TriangleList => D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        };
        unsafe { self.0.IASetPrimitiveTopology(topology) }
    }

    fn draw_indexed(&self, index_count: u32, start_index: u32, base_vertex: i32) {
        unsafe { self.0.DrawIndexed(index_count, start_index, base_vertex) }
    }
}
