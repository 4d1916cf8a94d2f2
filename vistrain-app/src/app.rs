use crate::distance::SimulatedDistance;
use crate::keys::{answer_key, command, Command};
use crate::transcriber::StdinTranscriber;
use anyhow::{anyhow, Context, Result};
use rand::rngs::ThreadRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vistrain_core::{PhaseAnimator, SessionPhase, TrainingMode};
use vistrain_experiment::{
    submit_logged, BinocularMode, ChartEngine, ChartEvent, ChartVocabulary, EngineConfig,
    JsonLinesStore, SessionEvent, Surface, TrainingSession,
};
use vistrain_input::{hit_test, map_key, InputSource, ResponseContext, ResponseSender, VoiceChannel};
use vistrain_render::{load_font, training_zones, ChartView, SkiaRenderer, TrainingView};
use vistrain_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

type Session = TrainingSession<HighPrecisionTimer, ThreadRng>;
type Chart = ChartEngine<HighPrecisionTimer, ThreadRng>;

const GAP_STEP_PX: f32 = 4.0;

enum Activity {
    Training(Session),
    Chart(Chart),
}

impl Activity {
    fn responder(&self) -> ResponseSender {
        match self {
            Activity::Training(s) => s.responder(),
            Activity::Chart(c) => c.responder(),
        }
    }

    fn context(&self) -> ResponseContext {
        match self {
            Activity::Training(s) => s.context(),
            Activity::Chart(c) => c.context(),
        }
    }
}

pub struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    activity: Activity,
    responder: ResponseSender,
    frame_timer: HighPrecisionTimer,
    last_frame_ns: u64,
    animator: Option<PhaseAnimator>,
    voice: VoiceChannel,
    transcriber: Option<StdinTranscriber>,
    voice_context: Option<ResponseContext>,
    store: Option<JsonLinesStore>,
    distance: SimulatedDistance,
    current_size: Option<PhysicalSize<u32>>,
    cursor: (f32, f32),
    should_exit: bool,
}

impl App {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let activity = Self::build_activity(&config, config.surface, config.mode);
        let store = match &config.results_path {
            Some(path) => match JsonLinesStore::open(path) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "results will not be saved");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            responder: activity.responder(),
            activity,
            window: None,
            pixels: None,
            renderer: None,
            frame_timer: HighPrecisionTimer::new(),
            last_frame_ns: 0,
            animator: config.phase_drift.then(PhaseAnimator::default),
            voice: VoiceChannel::new(),
            transcriber: None,
            voice_context: None,
            store,
            distance: SimulatedDistance::new(),
            current_size: None,
            cursor: (0.0, 0.0),
            should_exit: false,
            config,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            surface = ?self.config.surface,
            mode = %self.config.mode,
            "starting; Space starts or pauses, F1 switches surface, Esc quits"
        );
        if self.config.voice {
            self.start_voice();
        }
        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn build_activity(config: &EngineConfig, surface: Surface, mode: TrainingMode) -> Activity {
        match surface {
            Surface::Gabor => Activity::Training(TrainingSession::new(
                mode,
                config.training.clone(),
                HighPrecisionTimer::new(),
                rand::rng(),
            )),
            Surface::Chart => Activity::Chart(ChartEngine::new(
                config.chart.clone(),
                HighPrecisionTimer::new(),
                rand::rng(),
            )),
        }
    }

    fn switch_to(&mut self, surface: Surface, mode: TrainingMode) {
        self.config.surface = surface;
        self.config.mode = mode;
        self.activity = Self::build_activity(&self.config, surface, mode);
        self.responder = self.activity.responder();
        info!(?surface, %mode, "surface changed");
    }

    fn start_voice(&mut self) {
        let mut transcriber = StdinTranscriber::new();
        let context = self.activity.context();
        if self.voice.start(&mut transcriber, context).is_ok() {
            self.voice_context = Some(context);
            self.transcriber = Some(transcriber);
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;
        let refresh_hz = monitor.refresh_rate_millihertz().map(|r| r as f64 / 1000.0);

        let attributes = Window::default_attributes()
            .with_title("Vistrain")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz = ?refresh_hz,
            "display configured"
        );

        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let font = match &self.config.font_path {
            Some(path) => match load_font(path) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "labels disabled");
                    None
                }
            },
            None => None,
        };
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);
        self.current_size = Some(size);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn update(&mut self) {
        let context = self.activity.context();
        if let Some(t) = &self.transcriber {
            if self.voice_context != Some(context) {
                t.set_context(context);
                self.voice_context = Some(context);
            }
        }
        self.voice.pump(&self.responder);

        match &mut self.activity {
            Activity::Training(session) => {
                for event in session.update() {
                    if let SessionEvent::Completed(result) = event {
                        if let Some(store) = self.store.as_mut() {
                            submit_logged(store, &result);
                        }
                    }
                }
            }
            Activity::Chart(chart) => {
                for event in chart.update() {
                    match event {
                        ChartEvent::DistanceDecided(decision) => {
                            self.distance.apply(decision);
                        }
                        ChartEvent::ChartComplete => {
                            let stats = chart.stats();
                            info!(
                                charts = stats.charts_completed,
                                accuracy = stats.accuracy(),
                                "chart cleared"
                            );
                        }
                        ChartEvent::Answered { .. } => {}
                    }
                }
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let now = self.frame_timer.now();
        let elapsed = Duration::from_nanos(now.saturating_sub(self.last_frame_ns));
        self.last_frame_ns = now;
        let phase_offset = self
            .animator
            .as_mut()
            .map_or(0.0, |a| a.advance(elapsed));

        let frame = pixels.frame_mut();
        let stats = match &self.activity {
            Activity::Training(session) => renderer.render_training(
                &TrainingView::of(session, phase_offset),
                frame,
                &mut self.frame_timer,
            )?,
            Activity::Chart(chart) => {
                renderer.render_chart(&ChartView::of(chart), frame, &mut self.frame_timer)?
            }
        };
        pixels.render().context("presenting frame")?;

        debug!(
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        if let Some(cmd) = command(code) {
            self.handle_command(cmd, event_loop);
            return;
        }
        let Some(answer) = answer_key(code).and_then(|k| map_key(k, self.activity.context())) else {
            return;
        };
        self.responder.submit(InputSource::Keyboard, answer);
    }

    fn handle_command(&mut self, cmd: Command, event_loop: &ActiveEventLoop) {
        match cmd {
            Command::Quit => return self.cleanup_and_exit(event_loop),
            Command::SwitchSurface => {
                let next = match self.config.surface {
                    Surface::Gabor => Surface::Chart,
                    Surface::Chart => Surface::Gabor,
                };
                return self.switch_to(next, self.config.mode);
            }
            _ => {}
        }

        let mut next_mode = None;
        match (cmd, &mut self.activity) {
            (Command::Toggle, Activity::Training(session)) => match session.phase() {
                SessionPhase::Idle | SessionPhase::Complete => {
                    session.start();
                }
                SessionPhase::Paused(_) => {
                    session.resume();
                }
                _ => {
                    session.pause();
                }
            },
            (Command::CycleMode, Activity::Training(session)) => {
                if session.phase().is_running() || session.phase().is_paused() {
                    return;
                }
                let i = TrainingMode::ALL
                    .iter()
                    .position(|&m| m == session.mode())
                    .unwrap_or(0);
                next_mode = Some(TrainingMode::ALL[(i + 1) % TrainingMode::ALL.len()]);
            }
            (Command::CycleMode, Activity::Chart(chart)) => {
                let next = match chart.vocabulary() {
                    ChartVocabulary::Directional => ChartVocabulary::Letters,
                    ChartVocabulary::Letters => ChartVocabulary::Directional,
                };
                chart.set_vocabulary(next);
            }
            (Command::CycleBinocular, Activity::Chart(chart)) => {
                let next = match chart.mode() {
                    BinocularMode::Duplicate => BinocularMode::RedGreen,
                    BinocularMode::RedGreen => BinocularMode::GridSquare,
                    BinocularMode::GridSquare => BinocularMode::GridSlanted,
                    BinocularMode::GridSlanted => BinocularMode::Alternating,
                    BinocularMode::Alternating => BinocularMode::Duplicate,
                };
                chart.set_mode(next);
                info!(mode = ?next, "binocular mode");
            }
            (Command::WidenGap, Activity::Chart(chart)) => {
                chart.adjust_ipd_gap(GAP_STEP_PX);
            }
            (Command::NarrowGap, Activity::Chart(chart)) => {
                chart.adjust_ipd_gap(-GAP_STEP_PX);
            }
            _ => {}
        }
        if let Some(mode) = next_mode {
            self.switch_to(Surface::Gabor, mode);
        }
    }

    fn handle_click(&mut self) {
        let Some(size) = self.current_size else {
            return;
        };
        let (w, h) = (size.width as f32, size.height as f32);
        let zones = match &self.activity {
            Activity::Training(session) => training_zones(
                session.mode(),
                w,
                h,
                session.config().patch_size as f32,
            ),
            Activity::Chart(chart) => ChartView::of(chart).zones(w, h),
        };
        if let Some(answer) = hit_test(&zones, self.cursor.0, self.cursor.1) {
            self.responder.submit(InputSource::Pointer, answer);
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.current_size = Some(size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(size.width, size.height) {
                warn!(error = %format!("{e:#}"), "failed to resize canvas");
            }
        }
        info!(width = size.width, height = size.height, "display resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(t) = self.transcriber.as_mut() {
            self.voice.stop(t);
        }
        if let Activity::Training(session) = &self.activity {
            if let Some(result) = session.result() {
                info!(
                    accuracy = result.accuracy,
                    correct = result.correct_trials,
                    "last session"
                );
            }
        }
        info!(distance_cm = self.distance.cm(), "exiting");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                warn!(error = %format!("{e:#}"), "failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    warn!(error = %format!("{e:#}"), "render failed");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
