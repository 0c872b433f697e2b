//! Recording doubles for the machine, frame host and surface.

use std::{cell::RefCell, num::NonZeroU32, rc::Rc};

use winit::keyboard::PhysicalKey;

use super::{FrameHost, Machine, ScheduleHandle, Surface};

/// One observable interaction, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Reset,
    LoadGame(Vec<u8>),
    Tick,
    TickTimers,
    Keypress(PhysicalKey, bool),
    DrawScreen(u32),
    RequestFrame(u64),
    CancelFrame(u64),
}

type Journal = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, thiserror::Error)]
#[error("mock machine failure")]
pub struct MockError;

#[derive(Default)]
pub struct MockMachine {
    journal: Journal,
    reject_load: bool,
    ticks_before_failure: Option<usize>,
}

impl MockMachine {
    /// A machine and a host writing to the same journal.
    pub fn with_host() -> (Self, MockHost) {
        let machine = Self::default();
        let host = MockHost {
            journal: machine.journal.clone(),
            ..MockHost::default()
        };
        (machine, host)
    }

    pub fn reject_load(&mut self) {
        self.reject_load = true;
    }

    /// Lets `count` ticks succeed, then fails every later one.
    pub fn fail_tick_after(&mut self, count: usize) {
        self.ticks_before_failure = Some(count);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }
}

impl Machine for MockMachine {
    type Error = MockError;

    fn reset(&mut self) {
        self.record(Call::Reset);
    }

    fn load_game(&mut self, rom: &[u8]) -> Result<(), MockError> {
        self.record(Call::LoadGame(rom.to_vec()));
        if self.reject_load {
            return Err(MockError);
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), MockError> {
        self.record(Call::Tick);
        match &mut self.ticks_before_failure {
            Some(0) => Err(MockError),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn tick_timers(&mut self) {
        self.record(Call::TickTimers);
    }

    fn keypress(&mut self, key: PhysicalKey, pressed: bool) {
        self.record(Call::Keypress(key, pressed));
    }

    fn draw_screen(&self, surface: &mut dyn Surface, scale: NonZeroU32) {
        self.record(Call::DrawScreen(scale.get()));
        surface.fill_rect(0, 0, scale.get(), scale.get());
    }
}

/// Frame host that hands out sequential handles and tracks which are pending.
#[derive(Default)]
pub struct MockHost {
    journal: Journal,
    next_id: u64,
    outstanding: Vec<ScheduleHandle>,
}

impl MockHost {
    pub fn journal(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn outstanding(&self) -> &[ScheduleHandle] {
        &self.outstanding
    }

    /// Consumes a pending request the way the host does right before
    /// invoking its callback.
    pub fn fire(&mut self, handle: ScheduleHandle) {
        self.outstanding.retain(|&h| h != handle);
    }
}

impl FrameHost for MockHost {
    fn request_frame(&mut self) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle::new(self.next_id);
        self.outstanding.push(handle);
        self.journal
            .borrow_mut()
            .push(Call::RequestFrame(handle.id()));
        handle
    }

    fn cancel_frame(&mut self, handle: ScheduleHandle) {
        self.outstanding.retain(|&h| h != handle);
        self.journal
            .borrow_mut()
            .push(Call::CancelFrame(handle.id()));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    Clear,
    Fill(u32, u32, u32, u32),
}

#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.ops.push(SurfaceOp::Fill(x, y, width, height));
    }
}
