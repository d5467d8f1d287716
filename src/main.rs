use anyhow::{anyhow, Context, Result};
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{error, info, warn, LevelFilter};
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use std::{ffi::CString, num::NonZeroU32, sync::Arc};
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{Event, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

use triangles::{
    config::{load_or_create_config, DemoConfig},
    input::KeyState,
    render::Renderer,
};

struct App {
    // Dropped first, while the context is still alive
    renderer: Option<Renderer>,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    keys: KeyState,
}

impl App {
    fn new(config: &DemoConfig) -> Result<(Self, EventLoop<()>)> {
        let event_loop = EventLoopBuilder::new().build()?;
        let window_builder = WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let wanted_samples = config.window.samples;

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                // Most samples not above what was asked for
                configs
                    .reduce(|accum, config| {
                        let samples = config.num_samples();
                        if samples <= wanted_samples && samples > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("glutin only calls the picker with at least one config")
            })
            .map_err(|e| anyhow!("Failed to pick a GL config: {e}"))?;

        let window = window.context("Failed to open window")?;
        info!("Picked a GL config with {} samples", gl_config.num_samples());

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let gl_display = gl_config.display();
        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .context("Failed to create an OpenGL 3.3 core context")?
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .context("Failed to create GL surface")?
        };

        let gl_context = not_current
            .make_current(&gl_surface)
            .context("Failed to make context current")?;

        if config.window.vsync {
            if let Err(e) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
                warn!("Could not enable vsync: {}", e);
            }
        }

        let gl = Arc::new(unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => gl_display.get_proc_address(&symbol),
                Err(_) => std::ptr::null(),
            })
        });

        let renderer = Renderer::new(gl, config)?;
        let size = window.inner_size();
        renderer.resize(size.width, size.height);

        Ok((
            Self {
                renderer: Some(renderer),
                gl_surface,
                gl_context,
                window,
                keys: KeyState::default(),
            },
            event_loop,
        ))
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        self.gl_surface.resize(&self.gl_context, width, height);
        if let Some(renderer) = &self.renderer {
            renderer.resize(size.width, size.height);
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.render(&self.keys);
        if let Err(e) = self.gl_surface.swap_buffers(&self.gl_context) {
            error!("Failed to swap buffers: {}", e);
        }
    }

    fn exit(&mut self, elwt: &EventLoopWindowTarget<()>) {
        self.cleanup();
        elwt.exit();
    }

    fn cleanup(&mut self) {
        if self.renderer.is_some() {
            info!("Releasing GL resources");
            self.renderer = None;
        }
    }
}

fn load_config() -> DemoConfig {
    let loaded = match std::env::args_os().nth(1) {
        Some(path) => DemoConfig::from_file(path),
        None => load_or_create_config(),
    };
    loaded.unwrap_or_else(|e| {
        error!("{:#}", e);
        warn!("Using default configuration");
        DemoConfig::default()
    })
}

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;

    let config = load_config();
    let (mut app, event_loop) = App::new(&config)?;
    info!("Hold C to change the triangles, N or Escape to quit");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => app.exit(elwt),
            WindowEvent::Resized(size) => app.resize(size),
            WindowEvent::KeyboardInput { event, .. } => {
                app.keys.handle_physical(event.physical_key, event.state);
                if app.keys.quit {
                    app.exit(elwt);
                }
            }
            WindowEvent::Focused(false) => app.keys.focus_lost(),
            WindowEvent::RedrawRequested => app.redraw(),
            _ => (),
        },
        // No frame limiting
        Event::AboutToWait => app.window.request_redraw(),
        Event::LoopExiting => app.cleanup(),
        _ => (),
    })?;

    Ok(())
}
