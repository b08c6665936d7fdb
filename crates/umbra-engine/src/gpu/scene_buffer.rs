use crate::render::RenderError;
use crate::scene::{SHAPE_RECORD_STRIDE, ShapeRecord};

use super::{ComputeHost, FrameFence};

struct Slot<B> {
    buffer: Option<B>,
    /// Record capacity of `buffer`.
    capacity: usize,
    /// Completion of the last submission that read `buffer`.
    fence: Option<FrameFence>,
}

impl<B> Slot<B> {
    fn empty() -> Self {
        Self { buffer: None, capacity: 0, fence: None }
    }

    fn in_flight(&self) -> bool {
        self.fence.as_ref().is_some_and(|f| !f.is_signalled())
    }
}

/// Ring of `shapes` storage buffers, one per frame in flight.
///
/// Each frame takes the next slot. A slot is never written, resized or released
/// while the submission that last read it is pending; if its fence has not
/// signalled the host is polled, then waited on.
///
/// Capacity policy is exact: a slot is reallocated whenever the record count
/// differs from its capacity, and reused otherwise.
pub struct SceneBuffer<B> {
    slots: Vec<Slot<B>>,
    cursor: usize,
    /// Slot acquired for the frame being recorded.
    current: Option<usize>,
}

impl<B> SceneBuffer<B> {
    pub fn new(frames_in_flight: usize) -> Self {
        let slots = (0..frames_in_flight.max(1)).map(|_| Slot::empty()).collect();
        Self { slots, cursor: 0, current: None }
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Buffer acquired by the last successful [`ensure_capacity`](Self::ensure_capacity).
    pub fn current(&self) -> Option<&B> {
        self.slots.get(self.current?)?.buffer.as_ref()
    }

    /// Acquires the next slot and sizes it for `count` records.
    ///
    /// A slot still held from a previous call that was never [`retire`](Self::retire)d
    /// is assumed to have no pending work.
    ///
    /// An empty scene still gets a one-record buffer so the kernel's binding is
    /// always valid; `num_shapes` tells the kernel to ignore it.
    pub fn ensure_capacity<H>(&mut self, host: &mut H, count: usize) -> Result<&B, RenderError>
    where
        H: ComputeHost<Buffer = B>,
    {
        if let Some(orphan) = self.current.take() {
            log::warn!("scene buffer slot {orphan} was never retired; treating it as complete");
            self.slots[orphan].fence = Some(FrameFence::signalled());
        }

        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.slots.len();

        let slot = &mut self.slots[index];
        if slot.in_flight() {
            host.poll(false);
            if slot.in_flight() {
                log::trace!("scene buffer slot {index} busy; waiting on device");
                host.poll(true);
            }
            if slot.in_flight() {
                return Err(RenderError::BufferInFlight);
            }
        }
        slot.fence = None;

        let wanted = count.max(1);
        let buffer = match slot.buffer.take() {
            Some(buffer) if slot.capacity == wanted => buffer,
            old => {
                if let Some(old) = old {
                    host.release_buffer(old);
                }
                slot.capacity = 0;

                let bytes = (wanted * SHAPE_RECORD_STRIDE) as u64;
                let buffer = host.create_buffer("umbra shapes", bytes)?;
                log::debug!("scene buffer slot {index}: allocated {wanted} records ({bytes} bytes)");

                slot.capacity = wanted;
                buffer
            }
        };

        self.current = Some(index);
        Ok(slot.buffer.insert(buffer))
    }

    /// Writes `records` into the current slot.
    pub fn upload<H>(&mut self, host: &mut H, records: &[ShapeRecord])
    where
        H: ComputeHost<Buffer = B>,
    {
        let Some(slot) = self.current.map(|i| &self.slots[i]) else {
            debug_assert!(false, "upload without an acquired slot");
            return;
        };
        let Some(buffer) = slot.buffer.as_ref() else { return };
        debug_assert!(records.len() <= slot.capacity);

        if !records.is_empty() {
            host.write_buffer(buffer, bytemuck::cast_slice(records));
        }
    }

    /// Ties the current slot to the submission that reads it.
    pub fn retire(&mut self, fence: &FrameFence) {
        if let Some(index) = self.current.take() {
            self.slots[index].fence = Some(fence.clone());
        }
    }

    /// Releases every slot once the device no longer references it.
    pub fn dispose<H>(&mut self, host: &mut H)
    where
        H: ComputeHost<Buffer = B>,
    {
        if self.slots.iter().any(Slot::in_flight) {
            host.poll(true);
        }
        self.current = None;

        for slot in &mut self.slots {
            debug_assert!(!slot.in_flight(), "disposing a buffer still in flight");
            if let Some(buffer) = slot.buffer.take() {
                host.release_buffer(buffer);
            }
            slot.capacity = 0;
            slot.fence = None;
        }
    }
}
