use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use chip8_driver::{
    driver::{
        DEFAULT_SCALE, DEFAULT_TICKS_PER_FRAME, DriverConfig, FrameHost, PixelFrame, Rom,
        RomError, RomLoader, ScheduleHandle, Session,
    },
    emu::{Chip8, DISPLAY_X, DISPLAY_Y},
};

const TITLE: &str = "chip8-driver";

enum UserEvent {
    RomLoaded(Result<Rom, RomError>),
}

/// Frame host backed by the window's redraw requests.
struct RedrawHost {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<ScheduleHandle>,
}

impl FrameHost for RedrawHost {
    fn request_frame(&mut self) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle::new(self.next_id);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: ScheduleHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

struct App {
    config: DriverConfig,
    proxy: EventLoopProxy<UserEvent>,
    initial_rom: Option<PathBuf>,

    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,
    host: Option<RedrawHost>,

    session: Session<Chip8>,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(
        config: DriverConfig,
        proxy: EventLoopProxy<UserEvent>,
        initial_rom: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let mut session = Session::new(config);
        session
            .attach(Chip8::default())
            .context("Failed to attach CHIP-8 machine")?;

        Ok(Self {
            config,
            proxy,
            initial_rom,
            pixels: None,
            window: None,
            host: None,
            session,
            exit_result: Ok(()),
        })
    }

    /// Window size for the configured scale, which `DriverConfig` caps at `MAX_SCALE`.
    fn surface_size(&self) -> (u32, u32) {
        let scale = self.config.scale.get();
        (DISPLAY_X as u32 * scale, DISPLAY_Y as u32 * scale)
    }

    /// Shows a message to the user in the title bar.
    fn notify(&self, message: &str) {
        warn!("{message}");
        if let Some(window) = &self.window {
            window.set_title(&format!("{TITLE} - {message}"));
        }
    }

    fn spawn_loader(&self, selection: Option<PathBuf>) {
        let proxy = self.proxy.clone();
        RomLoader::spawn(selection, move |result| {
            if proxy.send_event(UserEvent::RomLoaded(result)).is_err() {
                warn!("Event loop closed before the ROM finished loading");
            }
        });
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        if self.window.is_some() {
            return Ok(());
        }

        let (width, height) = self.surface_size();
        let window = {
            let size = LogicalSize::new(width, height);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title(TITLE)
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let mut pixels = Pixels::new(width, height, surface_texture)
                .context("Failed to create pixels surface")?;
            pixels.clear_color(pixels::wgpu::Color::BLACK);

            window.request_redraw();
            Some(pixels)
        };
        self.host = Some(RedrawHost {
            window,
            next_id: 0,
            pending: None,
        });

        let initial_rom = self.initial_rom.take();
        self.spawn_loader(initial_rom);
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::DroppedFile(path) => {
                self.spawn_loader(Some(path));
            }

            WindowEvent::RedrawRequested => {
                self.try_redraw()?;
            }

            WindowEvent::KeyboardInput { event, .. } => {
                self.session
                    .keypress(event.physical_key, event.state == ElementState::Pressed);
            }

            _ => (),
        }
        Ok(())
    }

    fn try_redraw(&mut self) -> anyhow::Result<()> {
        let (width, height) = self.surface_size();
        let (Some(pixels), Some(host)) = (self.pixels.as_mut(), self.host.as_mut()) else {
            return Ok(());
        };

        let mut halted = None;
        if let Some(handle) = host.pending.take() {
            let mut surface = PixelFrame::new(pixels.frame_mut(), width, height);
            if let Err(e) = self.session.on_frame(handle, &mut surface, host) {
                halted = Some(e.to_string());
            }
        }

        pixels.render().context("Pixels render error")?;

        if let Some(message) = halted {
            self.notify(&message);
        }
        Ok(())
    }

    fn rom_loaded(&mut self, result: Result<Rom, RomError>) {
        let rom = match result {
            Ok(rom) => rom,
            Err(e) => return self.notify(&e.to_string()),
        };

        let Some(host) = self.host.as_mut() else {
            return self.notify("Window is not ready, ROM discarded");
        };

        match self.session.load(rom, host) {
            Ok(generation) => {
                if let Some(window) = &self.window {
                    window.set_title(&format!("{TITLE} - running (generation {generation})"));
                }
            }
            Err(e) => self.notify(&e.to_string()),
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::RomLoaded(result) => self.rom_loaded(result),
        }
    }
}

/// CHIP-8 emulator written in Rust.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Drop a ROM file onto the window to (re)load it.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file to start with
    rom_path: Option<PathBuf>,

    /// Instructions executed per displayed frame
    #[arg(short, long, default_value_t = DEFAULT_TICKS_PER_FRAME.get())]
    ticks_per_frame: u32,

    /// Screen pixels per CHIP-8 pixel (1 to 64)
    #[arg(short, long, default_value_t = DEFAULT_SCALE.get())]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = DriverConfig::new(args.ticks_per_frame, args.scale)
        .context("Invalid driver configuration")?;
    info!(
        "Starting with {} ticks per frame at scale {}",
        config.ticks_per_frame, config.scale
    );

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, event_loop.create_proxy(), args.rom_path)
        .context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
