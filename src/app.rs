// ============================================================================
// app.rs - driftfield
// winit event-loop handler: owns the window and mounts the background in it.
// ============================================================================

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::FieldConfig;
use crate::lifecycle::Background;
use crate::renderer::GpuHost;

// ======================== Application ========================

pub struct App {
    config: FieldConfig,
    window: Option<Arc<Window>>,
    background: Option<Background<GpuHost>>,
}

impl App {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            window: None,
            background: None,
        }
    }

    fn mount(&mut self, window: Arc<Window>) {
        let host = GpuHost::new(window, &self.config);
        match Background::mount(host, &self.config) {
            Ok(background) => self.background = Some(background),
            // The window stays up; only the background is lost.
            Err(e) => log::error!("Background disabled: {}", e),
        }
    }

    fn unmount(&mut self) {
        if let Some(mut background) = self.background.take() {
            background.shutdown();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.background.is_some() {
            return;
        }

        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let window_attrs = WindowAttributes::default()
                    .with_title("driftfield")
                    .with_inner_size(winit::dpi::LogicalSize::new(1280u32, 800u32));
                match event_loop.create_window(window_attrs) {
                    Ok(window) => {
                        let window = Arc::new(window);
                        self.window = Some(window.clone());
                        window
                    }
                    Err(e) => {
                        log::error!("Failed to create window: {}", e);
                        event_loop.exit();
                        return;
                    }
                }
            }
        };

        self.mount(window);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
                return;
            }
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state.is_pressed() && key.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.unmount();
                event_loop.exit();
                return;
            }
            WindowEvent::Destroyed => {
                self.unmount();
                return;
            }
            _ => {}
        }

        let Some(background) = &mut self.background else {
            return;
        };

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                background.on_pointer_moved(position.x, position.y);
            }

            WindowEvent::Resized(new_size) => {
                background.on_resized(new_size.width, new_size.height);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                background.on_scale_factor_changed(scale_factor);
            }

            WindowEvent::Occluded(occluded) => {
                background.set_visible(!occluded);
            }

            WindowEvent::RedrawRequested => {
                background.on_frame();
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}
