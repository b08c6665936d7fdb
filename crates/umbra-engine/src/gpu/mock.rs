//! Recording host for lifecycle tests.

use std::collections::HashMap;

use crate::render::RenderError;

use super::{ComputeHost, FrameFence, KernelBindings, KernelSource, WorkgroupCount, kernel};

#[derive(Debug, PartialEq, Eq)]
pub struct MockBuffer {
    pub id: u32,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockImage {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct MockKernel {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    CreateKernel { label: String },
    CreateBuffer { id: u32, size: u64 },
    WriteBuffer { id: u32, len: usize },
    ReleaseBuffer { id: u32 },
    CreateImage { id: u32, width: u32, height: u32 },
    Dispatch {
        source: u32,
        destination: u32,
        shapes: u32,
        /// Contents of the shapes buffer when the dispatch was recorded.
        shapes_bytes: Vec<u8>,
        num_shapes: i32,
        position_light: u32,
        light: [f32; 3],
        groups: WorkgroupCount,
    },
    Composite { image: u32 },
    Submit,
    Poll { wait: bool },
}

struct Submission {
    fence: FrameFence,
    buffers: Vec<u32>,
}

/// [`ComputeHost`] that executes nothing and records everything.
///
/// Submitted work completes immediately unless auto-complete is turned off, in
/// which case it stays pending until a blocking poll (or forever, when stalled).
/// Touching a buffer that pending work references is recorded as a violation.
pub struct MockHost {
    events: Vec<HostEvent>,
    violations: Vec<String>,
    next_id: u32,
    contents: HashMap<u32, Vec<u8>>,
    recording: Vec<u32>,
    pending: Vec<Submission>,
    auto_complete: bool,
    stalled: bool,
    fail_next_buffer: bool,
    fail_kernel: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            violations: Vec::new(),
            next_id: 0,
            contents: HashMap::new(),
            recording: Vec::new(),
            pending: Vec::new(),
            auto_complete: true,
            stalled: false,
            fail_next_buffer: false,
            fail_kernel: false,
        }
    }

    pub fn set_auto_complete(&mut self, on: bool) {
        self.auto_complete = on;
    }

    pub fn set_stalled(&mut self, on: bool) {
        self.stalled = on;
    }

    pub fn fail_next_buffer(&mut self) {
        self.fail_next_buffer = true;
    }

    pub fn fail_kernel(&mut self) {
        self.fail_kernel = true;
    }

    /// An image owned by the caller (camera target); not recorded.
    pub fn source_image(&mut self, width: u32, height: u32) -> MockImage {
        MockImage { id: self.alloc_id(), width, height }
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn created_buffers(&self) -> usize {
        self.count(|e| matches!(e, HostEvent::CreateBuffer { .. }))
    }

    pub fn released_buffers(&self) -> usize {
        self.count(|e| matches!(e, HostEvent::ReleaseBuffer { .. }))
    }

    pub fn created_images(&self) -> usize {
        self.count(|e| matches!(e, HostEvent::CreateImage { .. }))
    }

    pub fn dispatches(&self) -> Vec<&HostEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Dispatch { .. }))
            .collect()
    }

    fn count(&self, f: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_not_in_flight(&mut self, id: u32, action: &str) {
        let busy = self
            .pending
            .iter()
            .any(|s| !s.fence.is_signalled() && s.buffers.contains(&id));
        if busy {
            self.violations.push(format!("{action} buffer {id} while in flight"));
        }
    }
}

impl ComputeHost for MockHost {
    type Buffer = MockBuffer;
    type Image = MockImage;
    type Kernel = MockKernel;

    fn create_kernel(&mut self, source: &KernelSource) -> Result<MockKernel, RenderError> {
        if self.fail_kernel {
            return Err(RenderError::KernelCompilation {
                label: source.label().to_string(),
                message: "rejected by mock".into(),
            });
        }
        if matches!(source, KernelSource::Wgsl { .. }) {
            kernel::validate_kernel(source)?;
        }
        self.events.push(HostEvent::CreateKernel { label: source.label().to_string() });
        Ok(MockKernel { label: source.label().to_string() })
    }

    fn create_buffer(&mut self, label: &'static str, size: u64) -> Result<MockBuffer, RenderError> {
        if std::mem::take(&mut self.fail_next_buffer) {
            return Err(RenderError::AllocationFailure { what: label, bytes: size });
        }
        let id = self.alloc_id();
        self.contents.insert(id, vec![0; size as usize]);
        self.events.push(HostEvent::CreateBuffer { id, size });
        Ok(MockBuffer { id, size })
    }

    fn write_buffer(&mut self, buffer: &MockBuffer, data: &[u8]) {
        self.check_not_in_flight(buffer.id, "wrote");
        if data.len() as u64 > buffer.size {
            self.violations.push(format!("overflowed buffer {}", buffer.id));
        }
        if let Some(bytes) = self.contents.get_mut(&buffer.id) {
            let n = data.len().min(bytes.len());
            bytes[..n].copy_from_slice(&data[..n]);
        }
        self.recording.push(buffer.id);
        self.events.push(HostEvent::WriteBuffer { id: buffer.id, len: data.len() });
    }

    fn release_buffer(&mut self, buffer: MockBuffer) {
        self.check_not_in_flight(buffer.id, "released");
        self.contents.remove(&buffer.id);
        self.events.push(HostEvent::ReleaseBuffer { id: buffer.id });
    }

    fn create_image(
        &mut self,
        _label: &'static str,
        width: u32,
        height: u32,
    ) -> Result<MockImage, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }
        let id = self.alloc_id();
        self.events.push(HostEvent::CreateImage { id, width, height });
        Ok(MockImage { id, width, height })
    }

    fn dispatch(
        &mut self,
        _kernel: &MockKernel,
        bindings: &KernelBindings<'_, Self>,
        groups: WorkgroupCount,
    ) {
        let shapes = bindings.shapes.id;
        if !self.contents.contains_key(&shapes) {
            self.violations.push(format!("dispatched with released buffer {shapes}"));
        }
        self.recording.push(shapes);
        self.events.push(HostEvent::Dispatch {
            source: bindings.source.id,
            destination: bindings.destination.id,
            shapes,
            shapes_bytes: self.contents.get(&shapes).cloned().unwrap_or_default(),
            num_shapes: bindings.params.num_shapes,
            position_light: bindings.params.position_light,
            light: bindings.params.light,
            groups,
        });
    }

    fn composite(&mut self, image: &MockImage) {
        self.events.push(HostEvent::Composite { image: image.id });
    }

    fn submit(&mut self) -> FrameFence {
        self.events.push(HostEvent::Submit);
        let fence = FrameFence::new();
        let buffers = std::mem::take(&mut self.recording);
        if self.auto_complete {
            fence.signal();
        } else {
            self.pending.push(Submission { fence: fence.clone(), buffers });
        }
        fence
    }

    fn poll(&mut self, wait: bool) {
        self.events.push(HostEvent::Poll { wait });
        if wait && !self.stalled {
            for submission in self.pending.drain(..) {
                submission.fence.signal();
            }
        }
    }
}
