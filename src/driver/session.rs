use log::{debug, error, info, trace, warn};
use winit::keyboard::PhysicalKey;

use super::{DriverConfig, FrameHost, Machine, Quantum, Rom, ScheduleHandle, Scheduler, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No machine attached yet.
    Uninitialized,
    /// Machine attached, nothing loaded.
    Ready,
    /// A loop is driving the given generation.
    Running { generation: u64 },
    /// The last load or the running program failed; waiting for another ROM.
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError<E> {
    #[error("No machine is attached")]
    NotReady,

    #[error("A machine is already attached")]
    AlreadyAttached,

    #[error("The machine rejected the ROM: {0}")]
    Rejected(#[source] E),

    #[error("Execution halted: {0}")]
    Halted(#[source] E),
}

/// Owns the single machine and the loop driving it.
pub struct Session<M: Machine> {
    machine: Option<M>,
    scheduler: Scheduler,
    state: SessionState,
    generation: u64,
}

impl<M: Machine> Session<M> {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            machine: None,
            scheduler: Scheduler::new(config),
            state: SessionState::Uninitialized,
            generation: 0,
        }
    }

    /// Attaches the machine this session drives for the rest of its life.
    pub fn attach(&mut self, machine: M) -> Result<(), SessionError<M::Error>> {
        if self.machine.is_some() {
            return Err(SessionError::AlreadyAttached);
        }

        self.machine = Some(machine);
        self.state = SessionState::Ready;
        debug!("Machine attached");
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn machine(&self) -> Option<&M> {
        self.machine.as_ref()
    }

    /// The handle of the next quantum, if a loop is running.
    pub fn pending_frame(&self) -> Option<ScheduleHandle> {
        self.scheduler.pending()
    }

    /// Forwards a host key event. Dropped while no machine is attached.
    pub fn keypress(&mut self, key: PhysicalKey, pressed: bool) {
        match &mut self.machine {
            Some(machine) => machine.keypress(key, pressed),
            None => trace!("Dropping key event {key:?}, no machine attached"),
        }
    }

    /// Starts a new generation running `rom`.
    ///
    /// The previous loop is cancelled before the machine is reset, the ROM is
    /// loaded into the freshly reset machine, and only then is the new loop
    /// started. If the machine rejects the ROM the session is left stopped
    /// with no loop running.
    pub fn load(
        &mut self,
        rom: Rom,
        host: &mut dyn FrameHost,
    ) -> Result<u64, SessionError<M::Error>> {
        let Some(machine) = &mut self.machine else {
            return Err(SessionError::NotReady);
        };

        self.scheduler.cancel(host);
        machine.reset();

        if let Err(e) = machine.load_game(rom.bytes()) {
            error!("Failed to load ROM: {e}");
            self.state = SessionState::Stopped;
            return Err(SessionError::Rejected(e));
        }

        self.generation += 1;
        let handle = self.scheduler.start(host);
        self.state = SessionState::Running {
            generation: self.generation,
        };

        info!(
            "Loaded {} byte ROM as generation {}, first frame {}",
            rom.bytes().len(),
            self.generation,
            handle.id()
        );
        Ok(self.generation)
    }

    /// Host frame callback.
    pub fn on_frame(
        &mut self,
        handle: ScheduleHandle,
        surface: &mut dyn Surface,
        host: &mut dyn FrameHost,
    ) -> Result<(), SessionError<M::Error>> {
        let Some(machine) = &mut self.machine else {
            warn!("Frame {} arrived with no machine attached", handle.id());
            return Ok(());
        };

        match self.scheduler.run_quantum(handle, machine, surface, host) {
            Ok(Quantum::Ran | Quantum::Stale) => Ok(()),
            Err(e) => {
                error!("Generation {} halted: {e}", self.generation);
                self.state = SessionState::Stopped;
                Err(SessionError::Halted(e))
            }
        }
    }
}
