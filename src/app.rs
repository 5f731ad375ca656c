//! Window, event loop and frame pacing.

use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::error::AppError;
use crate::gpu::Renderer;
use crate::input::{Input, InputEvent};
use crate::loader::{self, ImageSource, LoadResult};
use crate::session::{LoadOutcome, Session};
use crate::time::FrameClock;

#[cfg(feature = "egui")]
use crate::gpu::egui_integration::EguiIntegration;
#[cfg(feature = "egui")]
use crate::ui::{self, UiAction, UiState};

/// Events posted to the loop from other threads.
#[derive(Debug)]
pub enum AppEvent {
    ImageLoaded(LoadResult),
}

/// Open the window and run until it is closed.
pub fn run(session: Session, image: Option<ImageSource>) -> Result<(), AppError> {
    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(session, event_loop.create_proxy(), image);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    ui_state: UiState,
    session: Session,
    clock: FrameClock,
    input: Input,
    proxy: EventLoopProxy<AppEvent>,
    /// Image to load once the window exists.
    initial_image: Option<ImageSource>,
    error: Option<AppError>,
}

impl App {
    fn new(session: Session, proxy: EventLoopProxy<AppEvent>, initial_image: Option<ImageSource>) -> Self {
        Self {
            window: None,
            renderer: None,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            ui_state: UiState::new(initial_image.as_ref().map(ToString::to_string)),
            session,
            clock: FrameClock::default(),
            input: Input::new(),
            proxy,
            initial_image,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title("dotfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.session
            .resize(Vec2::new(size.width as f32, size.height as f32));

        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(renderer.device(), renderer.format(), &window));
        }

        self.renderer = Some(renderer);
        self.window = Some(window);

        if let Some(source) = self.initial_image.take() {
            self.start_load(source);
        }
        Ok(())
    }

    /// Kick off a background load. Results of earlier loads still in
    /// flight will be dropped on arrival.
    fn start_load(&mut self, source: ImageSource) {
        let generation = self.session.begin_load(&source);
        let proxy = self.proxy.clone();
        loader::spawn_load(source, generation, move |result| {
            if proxy.send_event(AppEvent::ImageLoaded(result)).is_err() {
                log::warn!("event loop closed before image load {generation} finished");
            }
        });
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(p) => self.session.pointer_moved(p),
            InputEvent::PointerPressed(p) => {
                self.session.pointer_pressed(p);
            }
            InputEvent::PointerLeft => self.session.pointer_left(),
            InputEvent::Escape => self.session.dismiss_popup(),
        }
    }

    #[cfg(feature = "egui")]
    fn apply_ui(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            match action {
                UiAction::Control(control) => {
                    self.session.apply_control(control);
                }
                UiAction::SetRelational(on) => self.session.set_relational(on),
                UiAction::Load(text) => match text.parse::<ImageSource>() {
                    Ok(source) => self.start_load(source),
                    Err(never) => match never {},
                },
                UiAction::DismissPopup => self.session.dismiss_popup(),
                UiAction::DismissAlert => self.session.dismiss_alert(),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }

        let now = self.clock.tick();
        self.session.frame(now, self.clock.frame());

        #[cfg(feature = "egui")]
        let egui_output = match (self.egui.as_mut(), self.window.as_ref()) {
            (Some(egui), Some(window)) => {
                let session = &self.session;
                let ui_state = &mut self.ui_state;
                ui_state.fps = self.clock.fps();
                let mut actions = Vec::new();
                let output = egui.run(window, |ctx| {
                    actions = ui::draw(ctx, session, ui_state);
                });
                self.apply_ui(actions);
                Some(output)
            }
            _ => None,
        };

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.prepare(&self.session);

        #[cfg(feature = "egui")]
        let result = {
            let size = [renderer.config.width, renderer.config.height];
            let egui = self.egui.as_mut();
            renderer.render(|device, queue, encoder, view| {
                if let (Some(egui), Some(output)) = (egui, egui_output.as_ref()) {
                    egui.paint(device, queue, encoder, view, size, output);
                }
            })
        };
        #[cfg(not(feature = "egui"))]
        let result = renderer.render(|_, _, _, _| {});

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(err) => log::error!("render error: {err:?}"),
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            log::error!("{err}");
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::ImageLoaded(result) => match self.session.apply_load(result) {
                LoadOutcome::Applied { dots } => log::info!("image applied: {dots} dots"),
                // Both already logged by the session; failures also raise
                // the overlay alert.
                LoadOutcome::Stale | LoadOutcome::Failed(_) => {}
            },
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (self.egui.as_mut(), self.window.as_ref()) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                self.session
                    .resize(Vec2::new(physical_size.width as f32, physical_size.height as f32));
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            ref other => {
                if let Some(input) = self.input.handle_event(other) {
                    // The overlay swallows clicks and keys aimed at it; the
                    // tilt still follows the pointer everywhere.
                    match input {
                        InputEvent::PointerMoved(p) if consumed => {
                            self.session.pointer_moved(p);
                            self.session.pointer_left();
                        }
                        InputEvent::PointerPressed(_) | InputEvent::Escape if consumed => {}
                        input => self.handle_input(input),
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            if self.clock.frame_due() {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_frame()));
    }
}
