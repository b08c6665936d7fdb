use anyhow::Result;
use glam::Vec3;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use umbra_engine::core::{App, AppControl, FrameCtx};
use umbra_engine::device::GpuInit;
use umbra_engine::frame::{Camera, Light};
use umbra_engine::gpu::{ComputeHost, WgpuHost, WgpuImage};
use umbra_engine::logging::{init_logging, LoggingConfig};
use umbra_engine::render::{DispatchOrchestrator, FrameInputs, FrameOutcome, RaymarchConfig};
use umbra_engine::scene::{Operation, Rgb, SceneGraph, ShapeDescriptor, ShapeId};
use umbra_engine::window::{Runtime, RuntimeConfig};

/// Background standing in for a camera image.
const BACKDROP: wgpu::Color = wgpu::Color { r: 0.08, g: 0.09, b: 0.12, a: 1.0 };

struct Demo {
    scene: SceneGraph,
    orbiter: ShapeId,
    blob: ShapeId,
    light: Light,

    gpu: Option<GpuState>,
    last_outcome: Option<bool>,
}

/// Per-device state, created on the first frame.
struct GpuState {
    host: WgpuHost,
    orchestrator: DispatchOrchestrator<WgpuHost>,
    source: Option<WgpuImage>,
}

impl Demo {
    fn new() -> Self {
        let mut scene = SceneGraph::new();

        // Blended cluster: a cube with two spheres melted into it.
        let cluster = scene.add(
            ShapeDescriptor::cube()
                .with_operation(Operation::Blend)
                .with_blend(0.6)
                .scaled(Vec3::splat(0.8))
                .colored(Rgb::new(0.85, 0.35, 0.25)),
        );
        let blob = scene
            .add_child(
                cluster,
                ShapeDescriptor::sphere()
                    .at(Vec3::new(0.9, 0.4, 0.0))
                    .scaled(Vec3::splat(0.7))
                    .colored(Rgb::new(0.95, 0.75, 0.3)),
            )
            .unwrap_or(cluster);
        scene.add_child(
            cluster,
            ShapeDescriptor::sphere()
                .at(Vec3::new(-0.8, -0.3, 0.2))
                .scaled(Vec3::splat(0.5))
                .with_operation(Operation::Cut),
        );

        let orbiter = scene.add(
            ShapeDescriptor::torus()
                .at(Vec3::new(2.5, 0.0, 0.0))
                .scaled(Vec3::splat(0.6))
                .colored(Rgb::new(0.3, 0.6, 0.95)),
        );

        scene.add(
            ShapeDescriptor::cube()
                .at(Vec3::new(0.0, -1.6, 0.0))
                .scaled(Vec3::new(8.0, 0.1, 8.0))
                .colored(Rgb::new(0.6, 0.6, 0.6)),
        );

        Self {
            scene,
            orbiter,
            blob,
            light: Light::directional(Vec3::new(-0.4, -1.0, -0.3)),
            gpu: None,
            last_outcome: None,
        }
    }

    fn animate(&mut self, t: f32) {
        if let Some(torus) = self.scene.get_mut(self.orbiter) {
            torus.position = Vec3::new(2.5 * t.cos(), 0.3 * (2.0 * t).sin(), 2.5 * t.sin());
        }
        if let Some(sphere) = self.scene.get_mut(self.blob) {
            sphere.position.x = 0.6 + 0.4 * (1.3 * t).sin();
        }
    }

    fn report(&mut self, outcome: &FrameOutcome) {
        let rendered = outcome.is_rendered();
        if self.last_outcome == Some(rendered) {
            return;
        }
        self.last_outcome = Some(rendered);
        match outcome {
            FrameOutcome::Rendered(stats) => {
                log::info!("raymarching {} shapes in {} groups", stats.shapes, stats.groups)
            }
            FrameOutcome::PassedThrough(err) => log::warn!("showing camera image only: {err}"),
        }
    }
}

impl App for Demo {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event
            && event.state == ElementState::Pressed
            && event.logical_key == Key::Named(NamedKey::Escape)
        {
            return AppControl::Exit;
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.animate(ctx.time.elapsed);

        let state = self.gpu.get_or_insert_with(|| GpuState {
            host: WgpuHost::new(ctx.gpu.device(), ctx.gpu.queue()),
            orchestrator: DispatchOrchestrator::new(RaymarchConfig {
                frames_in_flight: ctx.gpu.frame_latency() as usize,
                ..Default::default()
            }),
            source: None,
        });

        let scene = &self.scene;
        let light = &self.light;
        let t = ctx.time.elapsed;
        let mut outcome = None;

        let control = ctx.present(|view, format, (width, height)| {
            let GpuState { host, orchestrator, source } = state;

            let stale = source
                .as_ref()
                .is_none_or(|s| s.width() != width || s.height() != height);
            if stale {
                *source = match host.create_image("umbra camera image", width, height) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        log::error!("camera image: {err}");
                        None
                    }
                };
            }
            let Some(source) = source.as_ref() else { return };

            host.set_output(view, format);
            host.clear_image(source, BACKDROP);

            let eye = Vec3::new(6.0 * (0.2 * t).sin(), 2.5, 6.0 * (0.2 * t).cos());
            let camera = Camera::look_at(
                eye,
                Vec3::ZERO,
                Vec3::Y,
                45f32.to_radians(),
                width as f32 / height as f32,
                0.1,
                100.0,
            );

            outcome = Some(orchestrator.render_frame(
                host,
                scene,
                FrameInputs {
                    source,
                    width,
                    height,
                    camera: &camera,
                    light: Some(light),
                },
            ));
            host.clear_output();
        });

        if let Some(outcome) = outcome {
            self.report(&outcome);
        }
        control
    }

    fn on_exit(&mut self) {
        if let Some(mut state) = self.gpu.take() {
            state.orchestrator.dispose(&mut state.host);
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "umbra studio".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        Demo::new(),
    )
}
