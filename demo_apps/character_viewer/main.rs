//! Character Viewer
//!
//! Loads a rigged character and its animation clips, then cross-fades to
//! whichever clip is picked in the "Animation" dropdown.
//!
//! ```text
//! character_viewer [--preset showcase|capoeira] [--config viewer.json] [--assets DIR_OR_URL]
//! ```

mod ui_pass;

use std::sync::Arc;

use anyhow::{Context as _, bail};
use marionette::app::winit::{App, AppHandler, Window};
use marionette::assets::{AssetReaderVariant, FileAssetReader};
use marionette::engine::{Engine, FrameState};
use marionette::renderer::RenderSettings;
use marionette::utils::{FpsCounter, OrbitControls};
use marionette::viewer::{SessionPhase, ViewerConfig, ViewerSession};
use marionette::{AssetServer, PerspectiveCamera};
use winit::event::WindowEvent;

use crate::ui_pass::UiPass;

struct CharacterViewer {
    session: ViewerSession<AssetServer>,
    clip_names: Vec<String>,
    title: String,

    ui_pass: Option<UiPass>,
    controls: OrbitControls,
    fps_counter: FpsCounter,
    current_fps: f32,
}

impl CharacterViewer {
    fn new(config: &ViewerConfig, assets: AssetServer, engine: &mut Engine, window: &Arc<Window>) -> Self {
        let (width, height) = engine.size();
        engine.camera = PerspectiveCamera::from_config(&config.camera, 1.0);
        engine.camera.set_aspect(width, height);
        let controls = OrbitControls::from_camera(&engine.camera);

        let ui_pass = engine
            .renderer
            .context()
            .map(|ctx| UiPass::new(&ctx.device, ctx.color_format(), window));

        let mut session = ViewerSession::new(assets, config);
        session.start();

        Self {
            clip_names: config.catalog.clips.clone(),
            title: config.title.clone(),
            session,
            ui_pass,
            controls,
            fps_counter: FpsCounter::new(),
            current_fps: 0.0,
        }
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        let mut picked: Option<String> = None;

        egui::Window::new("Animation")
            .default_pos([10.0, 10.0])
            .default_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                let playback = self.session.playback();
                let mut chosen = playback.selection().to_string();

                egui::ComboBox::from_id_salt("animation_selector")
                    .width(180.0)
                    .selected_text(chosen.clone())
                    .show_ui(ui, |ui| {
                        for name in &self.clip_names {
                            let label = if playback.registry().contains(name) {
                                name.clone()
                            } else {
                                format!("{name} (loading)")
                            };
                            if ui.selectable_value(&mut chosen, name.clone(), label).changed() {
                                picked = Some(name.clone());
                            }
                        }
                    });

                ui.separator();

                let status = match self.session.phase() {
                    SessionPhase::Idle => "Idle".to_string(),
                    SessionPhase::AwaitingBase => "Loading base model...".to_string(),
                    SessionPhase::BaseFailed => "Base model failed to load".to_string(),
                    SessionPhase::Loading if self.session.pending() > 0 => {
                        format!("Loading {} file(s)...", self.session.pending())
                    }
                    SessionPhase::Loading => "Ready".to_string(),
                };
                ui.label(status);
                ui.label(format!(
                    "Clips: {}/{}",
                    playback.registry().len(),
                    self.clip_names.len()
                ));
                if let Some(current) = playback.current_clip_name() {
                    ui.label(format!("Playing: {current}"));
                }
                ui.label(format!("FPS: {:.0}", self.current_fps));
            });

        if let Some(name) = picked {
            log::info!("Selected '{name}'");
            self.session.select(&name);
        }
    }
}

impl AppHandler for CharacterViewer {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
        let config = ViewerConfig::default();
        let reader = FileAssetReader::new(&config.asset_root);
        let assets = AssetServer::with_reader(AssetReaderVariant::File(Arc::new(reader)));
        Self::new(&config, assets, engine, window)
    }

    fn on_event(&mut self, _engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        let Some(ui_pass) = &mut self.ui_pass else {
            return false;
        };
        if ui_pass.handle_input(window, event) {
            return true;
        }

        if let WindowEvent::Resized(size) = event {
            let scale_factor = window.scale_factor() as f32;
            ui_pass.resize(size.width, size.height, scale_factor);
        }

        false
    }

    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {
        self.session.pump();

        if let Some(model) = self.session.playback().model()
            && !engine.renderer.has_model()
        {
            engine.renderer.upload_model(model);
        }

        self.session.update(frame.dt);
        if let Some(model) = self.session.playback().model() {
            engine.renderer.update_model(model);
        }

        self.controls.update(&mut engine.camera, &engine.input, frame.dt);

        if let Some(fps) = self.fps_counter.update() {
            self.current_fps = fps;
            window.set_title(&format!("{} | FPS: {:.0}", self.title, fps));
        }

        if let Some(mut ui_pass) = self.ui_pass.take() {
            ui_pass.begin_frame(window);
            let ctx = ui_pass.context().clone();
            self.render_ui(&ctx);
            ui_pass.end_frame(window);
            self.ui_pass = Some(ui_pass);
        }
    }

    fn compose_frame(&mut self, engine: &mut Engine) {
        let Some(composer) = engine.renderer.begin_frame(&engine.camera) else {
            return;
        };
        match &mut self.ui_pass {
            Some(ui_pass) => composer.add_overlay(ui_pass).render(),
            None => composer.render(),
        }
    }
}

struct Args {
    preset: Option<String>,
    config: Option<String>,
    assets: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        preset: None,
        config: None,
        assets: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--preset" => &mut args.preset,
            "--config" => &mut args.config,
            "--assets" => &mut args.assets,
            "-h" | "--help" => {
                println!(
                    "usage: character_viewer [--preset showcase|capoeira] [--config FILE] [--assets DIR_OR_URL]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'"),
        };
        *slot = Some(iter.next().with_context(|| format!("{arg} needs a value"))?);
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;

    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => ViewerConfig::load(path)?,
        (None, Some(name)) => {
            ViewerConfig::preset(name).with_context(|| format!("unknown preset '{name}'"))?
        }
        (None, None) => ViewerConfig::default(),
    };
    if let Some(root) = args.assets {
        config.asset_root = root;
    }
    config.validate()?;

    let assets = AssetServer::new(&config.asset_root)?;
    log::info!(
        "Viewing {} clip(s) from {}",
        config.catalog.clips.len(),
        config.asset_root
    );

    App::new()
        .with_title(config.title.clone())
        .with_settings(RenderSettings::from_config(&config.render))
        .with_stage(config.stage.clone())
        .run_with(move |engine, window| CharacterViewer::new(&config, assets, engine, window))?;

    Ok(())
}
