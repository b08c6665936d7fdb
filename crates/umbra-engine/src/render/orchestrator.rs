use crate::frame::{Camera, FrameParams, Light};
use crate::gpu::{ComputeHost, KernelBindings, KernelSource, SceneBuffer, WorkgroupCount};
use crate::scene::{SceneCompiler, SceneGraphReader};

use super::{RaymarchConfig, RenderError};

/// Everything one frame needs besides the scene.
pub struct FrameInputs<'a, I> {
    /// Camera image; also the fallback output.
    pub source: &'a I,
    pub width: u32,
    pub height: u32,
    pub camera: &'a Camera,
    /// `None` binds a straight-down directional light.
    pub light: Option<&'a Light>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameStats {
    /// Records uploaded (top-level shapes plus their direct children).
    pub shapes: usize,
    pub groups: usize,
    pub workgroups: WorkgroupCount,
}

/// Result of [`DispatchOrchestrator::render_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered(FrameStats),
    /// The source image was composited unchanged.
    PassedThrough(RenderError),
}

impl FrameOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FrameOutcome::Rendered(_))
    }
}

enum KernelState<K> {
    Unloaded,
    Ready(K),
    Failed(RenderError),
}

struct Destination<I> {
    image: I,
    width: u32,
    height: u32,
}

/// Drives one raymarch frame: compile, upload, bind, dispatch, composite.
///
/// Per-frame failures never escape. A frame that cannot be raymarched composites
/// the source image instead and reports why in its [`FrameOutcome`].
pub struct DispatchOrchestrator<H: ComputeHost> {
    kernel_source: Option<KernelSource>,
    kernel: KernelState<H::Kernel>,
    compiler: SceneCompiler,
    scene_buffer: SceneBuffer<H::Buffer>,
    destination: Option<Destination<H::Image>>,

    warned_missing_light: bool,
    last_skip: Option<RenderError>,
}

impl<H: ComputeHost> DispatchOrchestrator<H> {
    pub fn new(config: RaymarchConfig) -> Self {
        Self {
            kernel_source: config.kernel,
            kernel: KernelState::Unloaded,
            compiler: SceneCompiler::new(),
            scene_buffer: SceneBuffer::new(config.frames_in_flight),
            destination: None,
            warned_missing_light: false,
            last_skip: None,
        }
    }

    /// Swaps the kernel. The new one is compiled on the next frame.
    pub fn set_kernel(&mut self, source: Option<KernelSource>) {
        self.kernel_source = source;
        self.kernel = KernelState::Unloaded;
    }

    /// Compiler holding the records of the last frame.
    pub fn compiler(&self) -> &SceneCompiler {
        &self.compiler
    }

    /// Records one frame on `host` and submits it.
    pub fn render_frame<R: SceneGraphReader>(
        &mut self,
        host: &mut H,
        scene: &R,
        inputs: FrameInputs<'_, H::Image>,
    ) -> FrameOutcome {
        match self.record(host, scene, &inputs) {
            Ok(stats) => {
                let fence = host.submit();
                self.scene_buffer.retire(&fence);

                if let Some(prev) = self.last_skip.take() {
                    log::info!("raymarching resumed after: {prev}");
                }
                log::trace!(
                    "frame: {} shapes in {} groups, {}x{} workgroups",
                    stats.shapes,
                    stats.groups,
                    stats.workgroups.x,
                    stats.workgroups.y
                );
                FrameOutcome::Rendered(stats)
            }
            Err(err) => {
                host.composite(inputs.source);
                let fence = host.submit();
                self.scene_buffer.retire(&fence);

                if self.last_skip.as_ref() != Some(&err) {
                    log::warn!("raymarch skipped, passing source through: {err}");
                    self.last_skip = Some(err.clone());
                }
                FrameOutcome::PassedThrough(err)
            }
        }
    }

    /// Releases GPU resources once the device is done with them.
    pub fn dispose(&mut self, host: &mut H) {
        self.scene_buffer.dispose(host);
        self.destination = None;
        self.kernel = KernelState::Unloaded;
    }

    fn record<R: SceneGraphReader>(
        &mut self,
        host: &mut H,
        scene: &R,
        inputs: &FrameInputs<'_, H::Image>,
    ) -> Result<FrameStats, RenderError> {
        let kernel = ensure_kernel(&mut self.kernel, self.kernel_source.as_ref(), host)?;
        let destination =
            ensure_destination(&mut self.destination, host, inputs.width, inputs.height)?;

        let records = self.compiler.compile(scene);
        self.scene_buffer.ensure_capacity(host, records.len())?;
        self.scene_buffer.upload(host, records);
        let Some(shapes) = self.scene_buffer.current() else {
            return Err(RenderError::AllocationFailure { what: "scene buffer", bytes: 0 });
        };

        if inputs.light.is_none() && !self.warned_missing_light {
            log::warn!("no light supplied; using a straight-down directional light");
            self.warned_missing_light = true;
        }
        let params = FrameParams::bind(inputs.camera, inputs.light, self.compiler.count());

        let groups = WorkgroupCount::for_resolution(inputs.width, inputs.height);
        host.dispatch(
            kernel,
            &KernelBindings {
                source: inputs.source,
                destination: &destination.image,
                shapes,
                params: &params,
            },
            groups,
        );
        host.composite(&destination.image);

        Ok(FrameStats {
            shapes: self.compiler.count(),
            groups: self.compiler.groups(),
            workgroups: groups,
        })
    }
}

fn ensure_kernel<'k, H: ComputeHost>(
    state: &'k mut KernelState<H::Kernel>,
    source: Option<&KernelSource>,
    host: &mut H,
) -> Result<&'k H::Kernel, RenderError> {
    if matches!(state, KernelState::Unloaded) {
        *state = match source {
            None => KernelState::Failed(RenderError::MissingKernel),
            Some(source) => match host.create_kernel(source) {
                Ok(kernel) => KernelState::Ready(kernel),
                Err(err) => {
                    log::error!("{err}");
                    KernelState::Failed(err)
                }
            },
        };
    }

    match state {
        KernelState::Ready(kernel) => Ok(kernel),
        KernelState::Failed(err) => Err(err.clone()),
        KernelState::Unloaded => Err(RenderError::MissingKernel),
    }
}

fn ensure_destination<'d, H: ComputeHost>(
    slot: &'d mut Option<Destination<H::Image>>,
    host: &mut H,
    width: u32,
    height: u32,
) -> Result<&'d Destination<H::Image>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }

    let matches = slot
        .as_ref()
        .is_some_and(|d| d.width == width && d.height == height);
    if !matches {
        *slot = None;
        let image = host.create_image("umbra destination", width, height)?;
        log::debug!("destination image allocated at {width}x{height}");
        *slot = Some(Destination { image, width, height });
    }

    slot.as_ref()
        .ok_or(RenderError::InvalidResolution { width, height })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::gpu::mock::{HostEvent, MockHost, MockImage};
    use crate::scene::{
        Operation, Rgb, SHAPE_RECORD_STRIDE, SceneGraph, ShapeDescriptor, ShapeRecord,
    };

    fn inputs<'a>(source: &'a MockImage, camera: &'a Camera, light: Option<&'a Light>) -> FrameInputs<'a, MockImage> {
        FrameInputs {
            source,
            width: source.width,
            height: source.height,
            camera,
            light,
        }
    }

    fn orchestrator() -> DispatchOrchestrator<MockHost> {
        DispatchOrchestrator::new(RaymarchConfig::default())
    }

    fn scene_with(n: usize) -> SceneGraph {
        let mut g = SceneGraph::new();
        for i in 0..n {
            g.add(ShapeDescriptor::sphere().at(Vec3::splat(i as f32)));
        }
        g
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn empty_scene_still_dispatches() {
        let mut host = MockHost::new();
        let source = host.source_image(64, 48);
        let camera = Camera::default();
        let light = Light::default();
        let mut orch = orchestrator();

        let outcome = orch.render_frame(&mut host, &SceneGraph::new(), inputs(&source, &camera, Some(&light)));

        assert_eq!(
            outcome,
            FrameOutcome::Rendered(FrameStats {
                shapes: 0,
                groups: 0,
                workgroups: WorkgroupCount { x: 8, y: 6, z: 1 },
            })
        );
        let dispatches = host.dispatches();
        assert_eq!(dispatches.len(), 1);
        match dispatches[0] {
            HostEvent::Dispatch { num_shapes, source: src, .. } => {
                assert_eq!(*num_shapes, 0);
                assert_eq!(*src, source.id);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn count_change_reallocates_before_upload() {
        let mut host = MockHost::new();
        let source = host.source_image(16, 16);
        let camera = Camera::default();
        let mut orch = DispatchOrchestrator::new(RaymarchConfig { frames_in_flight: 1, ..Default::default() });

        assert!(orch.render_frame(&mut host, &scene_with(3), inputs(&source, &camera, None)).is_rendered());
        host.clear_events();

        let second = scene_with(5);
        assert!(orch.render_frame(&mut host, &second, inputs(&source, &camera, None)).is_rendered());

        let events = host.events();
        let alloc = events
            .iter()
            .position(|e| matches!(e, HostEvent::CreateBuffer { size, .. } if *size == 5 * SHAPE_RECORD_STRIDE as u64))
            .expect("no reallocation for the new count");
        let write = events
            .iter()
            .position(|e| matches!(e, HostEvent::WriteBuffer { len, .. } if *len == 5 * SHAPE_RECORD_STRIDE))
            .expect("no upload");
        assert!(alloc < write);

        let expected = orch.compiler().records().to_vec();
        assert_eq!(expected.len(), 5);
        match host.dispatches()[0] {
            HostEvent::Dispatch { shapes_bytes, num_shapes, .. } => {
                assert_eq!(shapes_bytes.as_slice(), bytemuck::cast_slice::<ShapeRecord, u8>(&expected));
                assert_eq!(*num_shapes, 5);
            }
            _ => unreachable!(),
        }
        assert!(host.violations().is_empty());
    }

    #[test]
    fn ring_never_touches_buffers_in_flight() {
        let mut host = MockHost::new();
        host.set_auto_complete(false);
        let source = host.source_image(32, 32);
        let camera = Camera::default();
        let mut orch = orchestrator();

        for n in [3, 5, 5, 2, 7, 7, 0, 4] {
            let outcome = orch.render_frame(&mut host, &scene_with(n), inputs(&source, &camera, None));
            assert!(outcome.is_rendered());
        }
        orch.dispose(&mut host);

        assert!(host.violations().is_empty(), "{:?}", host.violations());
        assert_eq!(host.created_buffers(), host.released_buffers());
    }

    // ── pass-through ──────────────────────────────────────────────────────

    #[test]
    fn missing_kernel_passes_source_through() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = DispatchOrchestrator::new(RaymarchConfig { kernel: None, ..Default::default() });

        let outcome = orch.render_frame(&mut host, &scene_with(2), inputs(&source, &camera, None));

        assert_eq!(outcome, FrameOutcome::PassedThrough(RenderError::MissingKernel));
        assert!(host.dispatches().is_empty());
        assert_eq!(host.created_buffers(), 0);
        assert!(host.events().contains(&HostEvent::Composite { image: source.id }));
        assert!(host.events().contains(&HostEvent::Submit));
    }

    #[test]
    fn kernel_failure_passes_through_every_frame() {
        let mut host = MockHost::new();
        host.fail_kernel();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();

        for _ in 0..3 {
            let outcome = orch.render_frame(&mut host, &scene_with(1), inputs(&source, &camera, None));
            assert!(matches!(outcome, FrameOutcome::PassedThrough(RenderError::KernelCompilation { .. })));
        }
        assert!(!host.events().iter().any(|e| matches!(e, HostEvent::CreateKernel { .. })));
    }

    #[test]
    fn invalid_custom_kernel_passes_through() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();
        orch.set_kernel(Some(KernelSource::Wgsl {
            label: "broken".into(),
            source: "@compute fn main( {".into(),
            entry_point: "main".into(),
        }));

        let outcome = orch.render_frame(&mut host, &scene_with(1), inputs(&source, &camera, None));
        match outcome {
            FrameOutcome::PassedThrough(RenderError::KernelCompilation { label, .. }) => {
                assert_eq!(label, "broken")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn allocation_failure_skips_frame_then_recovers() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();
        let scene = scene_with(4);

        host.fail_next_buffer();
        let first = orch.render_frame(&mut host, &scene, inputs(&source, &camera, None));
        assert!(matches!(first, FrameOutcome::PassedThrough(RenderError::AllocationFailure { .. })));
        assert!(host.dispatches().is_empty());

        let second = orch.render_frame(&mut host, &scene, inputs(&source, &camera, None));
        assert!(second.is_rendered());
        assert_eq!(host.dispatches().len(), 1);
    }

    #[test]
    fn zero_resolution_passes_through() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();

        let outcome = orch.render_frame(
            &mut host,
            &scene_with(1),
            FrameInputs { source: &source, width: 0, height: 8, camera: &camera, light: None },
        );
        assert_eq!(
            outcome,
            FrameOutcome::PassedThrough(RenderError::InvalidResolution { width: 0, height: 8 })
        );
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn missing_light_binds_default() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();

        orch.render_frame(&mut host, &scene_with(1), inputs(&source, &camera, None));

        match host.dispatches()[0] {
            HostEvent::Dispatch { light, position_light, .. } => {
                assert_eq!(*light, [0.0, -1.0, 0.0]);
                assert_eq!(*position_light, 0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn point_light_binds_position() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let light = Light::point(Vec3::new(1.0, 5.0, 0.0));
        let mut orch = orchestrator();

        orch.render_frame(&mut host, &scene_with(1), inputs(&source, &camera, Some(&light)));

        match host.dispatches()[0] {
            HostEvent::Dispatch { light, position_light, .. } => {
                assert_eq!(*light, [1.0, 5.0, 0.0]);
                assert_eq!(*position_light, 1);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn destination_reallocated_only_on_resize() {
        let mut host = MockHost::new();
        let small = host.source_image(8, 8);
        let large = host.source_image(20, 10);
        let camera = Camera::default();
        let mut orch = orchestrator();
        let scene = scene_with(1);

        orch.render_frame(&mut host, &scene, inputs(&small, &camera, None));
        orch.render_frame(&mut host, &scene, inputs(&small, &camera, None));
        assert_eq!(host.created_images(), 1);

        let outcome = orch.render_frame(&mut host, &scene, inputs(&large, &camera, None));
        assert_eq!(host.created_images(), 2);
        match outcome {
            FrameOutcome::Rendered(stats) => {
                assert_eq!(stats.workgroups, WorkgroupCount { x: 3, y: 2, z: 1 })
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn destination_is_composited_after_dispatch() {
        let mut host = MockHost::new();
        let source = host.source_image(8, 8);
        let camera = Camera::default();
        let mut orch = orchestrator();

        let mut g = SceneGraph::new();
        let cube = g.add(ShapeDescriptor::cube().with_operation(Operation::Blend));
        g.add_child(cube, ShapeDescriptor::sphere().colored(Rgb::new(1.0, 0.0, 0.0)));
        orch.render_frame(&mut host, &g, inputs(&source, &camera, None));

        let events = host.events();
        let dispatch = events.iter().position(|e| matches!(e, HostEvent::Dispatch { .. })).unwrap();
        let composite = events.iter().position(|e| matches!(e, HostEvent::Composite { .. })).unwrap();
        let submit = events.iter().position(|e| *e == HostEvent::Submit).unwrap();
        assert!(dispatch < composite && composite < submit);

        let HostEvent::Dispatch { destination, .. } = &events[dispatch] else { unreachable!() };
        assert_eq!(events[composite], HostEvent::Composite { image: *destination });
        assert_ne!(*destination, source.id);
    }
}
