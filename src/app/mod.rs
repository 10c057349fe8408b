//! 宿主程序
//!
//! 创建窗口、运行 winit 事件循环，把键盘事件写入 `InputState`，
//! 并在每次重绘时驱动 `Graphics` 渲染一帧。
//!
//! 事件回调是一个捕获 `System` 实例的闭包，不需要全局指针。

use anyhow::Context as _;
use raw_window_handle::HasWindowHandle;
use tracing::{debug, error, info};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::core::config::Config;
use crate::core::input::{self, InputState, VK_ESCAPE};
use crate::gfx::backend::Backend;
use crate::renderer::Graphics;

/// 应用程序
pub struct System<B: Backend> {
    config: Config,
    input: InputState,
    graphics: Graphics<B>,
    window: Option<Window>,
}

impl<B: Backend + 'static> System<B> {
    pub fn new(config: Config, graphics: Graphics<B>) -> Self {
        Self {
            config,
            input: InputState::new(),
            graphics,
            window: None,
        }
    }

    /// 创建窗口和渲染对象，然后进入消息循环直到退出
    ///
    /// 渲染对象初始化失败只记录日志，不视为进程错误。
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let window = self.create_window(&event_loop)?;
        let size = window.inner_size();
        let handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();
        self.window = Some(window);

        if let Err(e) = self.graphics.initialize(size.width, size.height, handle) {
            error!("Failed to initialize graphics: {}", e);
            self.shutdown();
            return Ok(());
        }

        info!("Entering main loop...");
        event_loop
            .run(move |event, elwt| self.handle_event(event, elwt))
            .context("Event loop terminated with an error")?;

        Ok(())
    }

    /// 创建窗口
    ///
    /// 全屏时使用主显示器分辨率并置于 (0, 0)；窗口模式使用配置尺寸并居中。
    fn create_window(&self, event_loop: &EventLoop<()>) -> anyhow::Result<Window> {
        let monitor = event_loop.primary_monitor();
        let screen = monitor
            .as_ref()
            .map(|m| m.size())
            .unwrap_or(PhysicalSize::new(self.config.window.width, self.config.window.height));

        let mut builder = WindowBuilder::new()
            .with_title(self.config.window.title.clone())
            .with_resizable(false);

        if self.config.graphics.fullscreen {
            builder = builder
                .with_inner_size(screen)
                .with_position(PhysicalPosition::new(0, 0))
                .with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else {
            let width = self.config.window.width;
            let height = self.config.window.height;
            let x = (screen.width.saturating_sub(width) / 2) as i32;
            let y = (screen.height.saturating_sub(height) / 2) as i32;
            builder = builder
                .with_inner_size(PhysicalSize::new(width, height))
                .with_position(PhysicalPosition::new(x, y));
        }

        let window = builder.build(event_loop).context("Failed to create window")?;
        window.set_cursor_visible(false);

        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            fullscreen = self.config.graphics.fullscreen,
            "Window created"
        );
        Ok(window)
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            ..
                        },
                    ..
                } => {
                    if let Some(key) = input::virtual_key(code) {
                        self.on_key(key, state);
                    }
                }
                WindowEvent::RedrawRequested => {
                    if !self.frame() {
                        elwt.exit();
                    }
                }
                _ => (),
            },
            Event::AboutToWait => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => self.shutdown(),
            _ => (),
        }
    }

    fn on_key(&mut self, key: u8, state: ElementState) {
        match state {
            ElementState::Pressed => self.input.key_down(key),
            ElementState::Released => self.input.key_up(key),
        }
    }

    /// 处理一帧；返回 `false` 表示应当退出
    fn frame(&mut self) -> bool {
        if self.input.is_key_down(VK_ESCAPE) {
            debug!("Escape pressed");
            return false;
        }

        match self.graphics.frame() {
            Ok(()) => true,
            Err(e) => {
                error!("Frame failed: {}", e);
                false
            }
        }
    }

    /// 先释放渲染对象，再销毁窗口
    fn shutdown(&mut self) {
        self.graphics.shutdown();
        if self.window.take().is_some() {
            info!("Window destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::testing::RecordingNotifier;
    use crate::gfx::mock::{Call, MockBackend};
    use crate::renderer::compiler::testing::FakeCompiler;

    fn system(backend: &MockBackend) -> System<MockBackend> {
        let graphics = Graphics::new(
            backend.clone(),
            Box::new(FakeCompiler::default()),
            Box::new(RecordingNotifier::default()),
            Config::default(),
        );
        System::new(Config::default(), graphics)
    }

    #[test]
    fn test_frame_renders_until_escape() {
        let backend = MockBackend::new();
        let mut system = system(&backend);
        system.graphics.initialize(800, 600, MockBackend::window()).unwrap();

        assert!(system.frame());
        assert!(backend.calls().contains(&Call::Present(1)));

        system.on_key(VK_ESCAPE, ElementState::Pressed);
        backend.clear_calls();
        assert!(!system.frame());
        assert!(backend.calls().is_empty());

        system.on_key(VK_ESCAPE, ElementState::Released);
        assert!(system.frame());
    }

    #[test]
    fn test_frame_failure_stops_loop() {
        let backend = MockBackend::new();
        let mut system = system(&backend);
        // 未初始化时渲染失败
        assert!(!system.frame());
    }

    #[test]
    fn test_shutdown_releases_graphics() {
        let backend = MockBackend::new();
        let mut system = system(&backend);
        system.graphics.initialize(800, 600, MockBackend::window()).unwrap();
        backend.clear_calls();

        system.shutdown();
        assert!(!system.graphics.is_running());
        assert_eq!(backend.releases().last(), Some(&"swap_chain"));
    }
}
