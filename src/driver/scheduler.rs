use log::trace;

use super::{DriverConfig, Machine, Surface, repaint};

/// Token for one pending frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Host side of the frame loop: delivers one callback per presented frame.
pub trait FrameHost {
    /// Asks for one callback on the next frame.
    fn request_frame(&mut self) -> ScheduleHandle;

    /// Withdraws a request. Cancelling a handle that already fired or was
    /// already cancelled does nothing.
    fn cancel_frame(&mut self, handle: ScheduleHandle);
}

pub enum Quantum {
    /// The batch ran and the next frame is scheduled.
    Ran,
    /// The callback did not carry the outstanding handle and was ignored.
    Stale,
}

/// Fixed-rate drive loop: per frame, a batch of instruction steps, one timer
/// step and a repaint.
pub struct Scheduler {
    config: DriverConfig,
    pending: Option<ScheduleHandle>,
}

impl Scheduler {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<ScheduleHandle> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests the first frame of a new loop.
    pub fn start(&mut self, host: &mut dyn FrameHost) -> ScheduleHandle {
        debug_assert!(self.pending.is_none(), "previous loop was not cancelled");

        let handle = host.request_frame();
        self.pending = Some(handle);
        handle
    }

    /// Withdraws the outstanding frame request, if any.
    pub fn cancel(&mut self, host: &mut dyn FrameHost) {
        if let Some(handle) = self.pending.take() {
            trace!("Cancelling frame {}", handle.id());
            host.cancel_frame(handle);
        }
    }

    /// Runs the quantum for `handle`.
    ///
    /// A failed `tick` ends the quantum on the spot: the remaining steps are
    /// skipped, nothing is repainted and no further frame is requested.
    pub fn run_quantum<M: Machine>(
        &mut self,
        handle: ScheduleHandle,
        machine: &mut M,
        surface: &mut dyn Surface,
        host: &mut dyn FrameHost,
    ) -> Result<Quantum, M::Error> {
        if self.pending != Some(handle) {
            trace!("Ignoring stale frame {}", handle.id());
            return Ok(Quantum::Stale);
        }
        self.pending = None;

        for _ in 0..self.config.ticks_per_frame.get() {
            machine.tick()?;
        }
        machine.tick_timers();

        repaint(machine, surface, self.config.scale);

        self.pending = Some(host.request_frame());
        Ok(Quantum::Ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{Call, MockMachine, RecordingSurface};

    fn config(ticks: u32) -> DriverConfig {
        DriverConfig::new(ticks, 1).unwrap()
    }

    fn count(calls: &[Call], wanted: &Call) -> usize {
        calls.iter().filter(|call| *call == wanted).count()
    }

    #[test]
    fn quantum_runs_k_ticks_then_timers_then_draw() {
        let (mut machine, mut host) = MockMachine::with_host();
        let mut surface = RecordingSurface::default();
        let mut scheduler = Scheduler::new(config(3));

        let first = scheduler.start(&mut host);
        host.fire(first);
        scheduler
            .run_quantum(first, &mut machine, &mut surface, &mut host)
            .unwrap();

        let second = scheduler.pending().unwrap();
        assert_eq!(
            host.journal(),
            [
                Call::RequestFrame(first.id()),
                Call::Tick,
                Call::Tick,
                Call::Tick,
                Call::TickTimers,
                Call::DrawScreen(1),
                Call::RequestFrame(second.id()),
            ]
        );
    }

    #[test]
    fn tick_count_follows_configuration() {
        for ticks in [1, 7, 64] {
            let (mut machine, mut host) = MockMachine::with_host();
            let mut surface = RecordingSurface::default();
            let mut scheduler = Scheduler::new(config(ticks));

            let handle = scheduler.start(&mut host);
            host.fire(handle);
            scheduler
                .run_quantum(handle, &mut machine, &mut surface, &mut host)
                .unwrap();

            let calls = host.journal();
            assert_eq!(count(&calls, &Call::Tick), ticks as usize);
            assert_eq!(count(&calls, &Call::TickTimers), 1);
        }
    }

    #[test]
    fn stale_handle_makes_no_machine_calls() {
        let (mut machine, mut host) = MockMachine::with_host();
        let mut surface = RecordingSurface::default();
        let mut scheduler = Scheduler::new(config(10));

        let handle = scheduler.start(&mut host);
        let result = scheduler
            .run_quantum(
                ScheduleHandle::new(handle.id() + 100),
                &mut machine,
                &mut surface,
                &mut host,
            )
            .unwrap();

        assert!(matches!(result, Quantum::Stale));
        assert_eq!(host.journal(), [Call::RequestFrame(handle.id())]);
        assert_eq!(scheduler.pending(), Some(handle));
    }

    #[test]
    fn cancel_is_idempotent() {
        let (_machine, mut host) = MockMachine::with_host();
        let mut scheduler = Scheduler::new(config(10));

        let handle = scheduler.start(&mut host);
        scheduler.cancel(&mut host);
        scheduler.cancel(&mut host);
        host.cancel_frame(handle);

        assert!(!scheduler.is_running());
        assert!(host.outstanding().is_empty());
    }

    #[test]
    fn failing_tick_stops_the_loop() {
        let (mut machine, mut host) = MockMachine::with_host();
        machine.fail_tick_after(2);
        let mut surface = RecordingSurface::default();
        let mut scheduler = Scheduler::new(config(10));

        let handle = scheduler.start(&mut host);
        host.fire(handle);
        let result = scheduler.run_quantum(handle, &mut machine, &mut surface, &mut host);

        assert!(result.is_err());
        assert!(!scheduler.is_running());
        assert!(host.outstanding().is_empty());

        let calls = host.journal();
        assert_eq!(count(&calls, &Call::Tick), 3);
        assert_eq!(count(&calls, &Call::TickTimers), 0);
        assert!(surface.ops.is_empty());
    }
}
