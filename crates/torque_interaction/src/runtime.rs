//! Physics task and channel boundary
//!
//! All surfaces live in a single [`PhysicsTask`] that owns them exclusively.
//! The input side talks to it through a cloneable [`PhysicsHandle`] and gets
//! callbacks and per-frame snapshots back on an output channel:
//!
//! ```text
//! host input ──PhysicsCommand──► PhysicsTask ──PhysicsOutput──► host UI
//!     ▲                          (surfaces)                       │
//!     └──────────── Frame { dt } from the host clock ◄────────────┘
//! ```
//!
//! Both channels are unbounded, so nothing on either side ever blocks on the
//! other. Outputs are fire-and-forget: a dropped output receiver is logged
//! once and the task keeps stepping.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use torque_interaction::{runtime, InteractionConfig, PhysicsOutput, PointerInput};
//!
//! let (handle, mut task, mut outputs) = runtime::channel();
//! let card = handle.mount(InteractionConfig::card()).unwrap();
//! handle.pointer(card, PointerInput::down(50.0, 50.0, 0.0)).unwrap();
//! handle.pointer(card, PointerInput::up(50.0, 50.0, 30.0)).unwrap();
//! handle.frame(Duration::from_millis(16)).unwrap();
//!
//! // Drive the task synchronously instead of spawning `run()`
//! assert!(task.drain().is_continue());
//!
//! while let Ok(output) = outputs.try_recv() {
//!     if let PhysicsOutput::Callback { callback, .. } = output {
//!         println!("{:?}", callback);
//!     }
//! }
//! ```

use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use torque_core::InteractionCallback;

use crate::config::InteractionConfig;
use crate::error::{PhysicsError, Result};
use crate::gesture::PointerInput;
use crate::state::SurfaceSnapshot;
use crate::surface::Surface;

/// Identifies a mounted surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Input side to physics task
#[derive(Debug, Clone)]
pub enum PhysicsCommand {
    Mount {
        surface: SurfaceId,
        config: Box<InteractionConfig>,
    },
    Unmount(SurfaceId),
    Pointer {
        surface: SurfaceId,
        input: PointerInput,
    },
    SetBounds {
        surface: SurfaceId,
        min: f32,
        max: f32,
    },
    SetAxisLength {
        surface: SurfaceId,
        length: f32,
    },
    /// Step every surface
    Frame { dt: Duration },
    /// App lost focus: every surface goes to rest
    Suspend,
    Reset(SurfaceId),
    Shutdown,
}

/// Physics task to host
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsOutput {
    Callback {
        surface: SurfaceId,
        callback: InteractionCallback,
    },
    Snapshot {
        surface: SurfaceId,
        snapshot: SurfaceSnapshot,
    },
}

/// Cloneable sender side of the physics task
#[derive(Debug, Clone)]
pub struct PhysicsHandle {
    commands: mpsc::UnboundedSender<PhysicsCommand>,
    next_id: Arc<AtomicU64>,
}

impl PhysicsHandle {
    /// Mount a surface. The id is allocated here, so no reply is needed.
    pub fn mount(&self, config: InteractionConfig) -> Result<SurfaceId> {
        let surface = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.send(PhysicsCommand::Mount {
            surface,
            config: Box::new(config),
        })?;
        Ok(surface)
    }

    pub fn unmount(&self, surface: SurfaceId) -> Result<()> {
        self.send(PhysicsCommand::Unmount(surface))
    }

    pub fn pointer(&self, surface: SurfaceId, input: PointerInput) -> Result<()> {
        self.send(PhysicsCommand::Pointer { surface, input })
    }

    pub fn set_bounds(&self, surface: SurfaceId, min: f32, max: f32) -> Result<()> {
        self.send(PhysicsCommand::SetBounds { surface, min, max })
    }

    pub fn set_axis_length(&self, surface: SurfaceId, length: f32) -> Result<()> {
        self.send(PhysicsCommand::SetAxisLength { surface, length })
    }

    pub fn frame(&self, dt: Duration) -> Result<()> {
        self.send(PhysicsCommand::Frame { dt })
    }

    pub fn suspend(&self) -> Result<()> {
        self.send(PhysicsCommand::Suspend)
    }

    pub fn reset(&self, surface: SurfaceId) -> Result<()> {
        self.send(PhysicsCommand::Reset(surface))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(PhysicsCommand::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub fn send(&self, command: PhysicsCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PhysicsError::Disconnected)
    }
}

/// Owns every mounted surface and steps them on `Frame`
#[derive(Debug)]
pub struct PhysicsTask {
    commands: mpsc::UnboundedReceiver<PhysicsCommand>,
    outputs: mpsc::UnboundedSender<PhysicsOutput>,
    surfaces: FxHashMap<SurfaceId, Surface>,
    outputs_closed: bool,
}

/// Create the two channels and the task that sits between them
pub fn channel() -> (
    PhysicsHandle,
    PhysicsTask,
    mpsc::UnboundedReceiver<PhysicsOutput>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (output_tx, output_rx) = mpsc::unbounded_channel();

    let handle = PhysicsHandle {
        commands: command_tx,
        next_id: Arc::new(AtomicU64::new(1)),
    };
    let task = PhysicsTask {
        commands: command_rx,
        outputs: output_tx,
        surfaces: FxHashMap::default(),
        outputs_closed: false,
    };
    (handle, task, output_rx)
}

/// Spawn the physics task on the current tokio runtime
pub fn spawn() -> (
    PhysicsHandle,
    mpsc::UnboundedReceiver<PhysicsOutput>,
    JoinHandle<()>,
) {
    let (handle, task, outputs) = channel();
    let join = tokio::spawn(task.run());
    (handle, outputs, join)
}

/// Send `Frame` commands every `period` for hosts without their own clock.
/// Stops once the physics task is gone.
pub fn spawn_frame_clock(handle: PhysicsHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last = ticker.tick().await;
        loop {
            let now = ticker.tick().await;
            if handle.frame(now - last).is_err() {
                tracing::debug!("Frame clock stopping: physics task is gone");
                break;
            }
            last = now;
        }
    })
}

impl PhysicsTask {
    /// Process commands until `Shutdown` or until every handle is dropped
    pub async fn run(mut self) {
        tracing::debug!("Physics task started");
        while let Some(command) = self.commands.recv().await {
            if self.process(command).is_break() {
                break;
            }
        }
        tracing::debug!(
            "Physics task stopped with {} surfaces mounted",
            self.surfaces.len()
        );
    }

    /// Process every queued command without waiting
    pub fn drain(&mut self) -> ControlFlow<()> {
        while let Ok(command) = self.commands.try_recv() {
            if self.process(command).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    pub fn process(&mut self, command: PhysicsCommand) -> ControlFlow<()> {
        match command {
            PhysicsCommand::Mount { surface, config } => {
                if self.surfaces.insert(surface, Surface::new(*config)).is_some() {
                    tracing::warn!("{} mounted twice; state replaced", surface);
                } else {
                    tracing::debug!("Mounted {}", surface);
                }
            }

            PhysicsCommand::Unmount(surface) => {
                if self.surfaces.remove(&surface).is_none() {
                    tracing::warn!("{}", PhysicsError::UnknownSurface(surface));
                } else {
                    tracing::debug!("Unmounted {}", surface);
                }
            }

            PhysicsCommand::Pointer { surface, input } => {
                self.with_surface(surface, |s| s.handle_pointer(input));
            }

            PhysicsCommand::SetBounds { surface, min, max } => {
                self.with_surface(surface, |s| {
                    s.set_bounds(min, max);
                    Default::default()
                });
            }

            PhysicsCommand::SetAxisLength { surface, length } => {
                self.with_surface(surface, |s| {
                    s.set_axis_length(length);
                    Default::default()
                });
            }

            PhysicsCommand::Frame { dt } => self.frame(dt.as_secs_f32()),

            PhysicsCommand::Suspend => {
                tracing::debug!("Suspending {} surfaces", self.surfaces.len());
                for surface in self.surface_ids() {
                    self.with_surface(surface, Surface::suspend);
                }
            }

            PhysicsCommand::Reset(surface) => {
                self.with_surface(surface, Surface::reset);
            }

            PhysicsCommand::Shutdown => {
                tracing::debug!("Physics task shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&surface)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn frame(&mut self, dt: f32) {
        tracing::trace!("Frame dt={:.4}s for {} surfaces", dt, self.surfaces.len());
        for surface in self.surface_ids() {
            self.with_surface(surface, |s| s.tick(dt));
            if let Some(snapshot) = self.surfaces.get(&surface).map(Surface::snapshot) {
                self.emit(PhysicsOutput::Snapshot { surface, snapshot });
            }
        }
    }

    /// Mounted ids in mount order, so output order is deterministic
    fn surface_ids(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<SurfaceId> = self.surfaces.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn with_surface<F>(&mut self, surface: SurfaceId, f: F)
    where
        F: FnOnce(&mut Surface) -> torque_core::Callbacks,
    {
        let Some(state) = self.surfaces.get_mut(&surface) else {
            tracing::warn!("{}", PhysicsError::UnknownSurface(surface));
            return;
        };
        for callback in f(state) {
            tracing::trace!("{} -> {:?}", surface, callback);
            self.emit(PhysicsOutput::Callback { surface, callback });
        }
    }

    fn emit(&mut self, output: PhysicsOutput) {
        if self.outputs.send(output).is_err() && !self.outputs_closed {
            tracing::warn!("Physics output receiver dropped; outputs are discarded");
            self.outputs_closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torque_core::Point;

    const FRAME: Duration = Duration::from_millis(16);

    fn callbacks(outputs: &mut mpsc::UnboundedReceiver<PhysicsOutput>) -> Vec<InteractionCallback> {
        let mut found = Vec::new();
        while let Ok(output) = outputs.try_recv() {
            if let PhysicsOutput::Callback { callback, .. } = output {
                found.push(callback);
            }
        }
        found
    }

    #[test]
    fn test_ids_are_unique_across_clones() {
        let (handle, _task, _outputs) = channel();
        let other = handle.clone();
        let a = handle.mount(InteractionConfig::default()).unwrap();
        let b = other.mount(InteractionConfig::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), format!("surface#{}", a.raw()));
    }

    #[test]
    fn test_tap_round_trip() {
        let (handle, mut task, mut outputs) = channel();
        let card = handle.mount(InteractionConfig::card()).unwrap();
        handle.pointer(card, PointerInput::down(50.0, 50.0, 0.0)).unwrap();
        handle.pointer(card, PointerInput::up(50.0, 50.0, 30.0)).unwrap();
        assert!(task.drain().is_continue());
        assert_eq!(task.surface_count(), 1);

        let fired = callbacks(&mut outputs);
        assert!(matches!(fired[0], InteractionCallback::Haptic(_)));
        assert_eq!(
            fired[1],
            InteractionCallback::Press {
                position: Point::new(50.0, 50.0)
            }
        );
    }

    #[test]
    fn test_frame_publishes_snapshot_per_surface() {
        let (handle, mut task, mut outputs) = channel();
        let first = handle.mount(InteractionConfig::default()).unwrap();
        let second = handle.mount(InteractionConfig::scroll_container()).unwrap();
        handle.frame(FRAME).unwrap();
        assert!(task.drain().is_continue());

        let mut seen = Vec::new();
        while let Ok(PhysicsOutput::Snapshot { surface, snapshot }) = outputs.try_recv() {
            assert!(!snapshot.dismissed);
            seen.push(surface);
        }
        assert_eq!(seen, vec![first, second]);
    }

    #[test]
    fn test_unknown_surface_is_ignored() {
        let (handle, mut task, mut outputs) = channel();
        let card = handle.mount(InteractionConfig::card()).unwrap();
        handle.unmount(card).unwrap();
        handle.pointer(card, PointerInput::down(0.0, 0.0, 0.0)).unwrap();
        handle.reset(card).unwrap();
        assert!(task.drain().is_continue());
        assert_eq!(task.surface_count(), 0);
        assert!(outputs.try_recv().is_err());
    }

    #[test]
    fn test_dropped_output_receiver_is_tolerated() {
        let (handle, mut task, outputs) = channel();
        drop(outputs);
        let card = handle.mount(InteractionConfig::card()).unwrap();
        handle.pointer(card, PointerInput::down(0.0, 0.0, 0.0)).unwrap();
        handle.frame(FRAME).unwrap();
        assert!(task.drain().is_continue());
        assert!(task.surface(card).is_some());
    }

    #[test]
    fn test_shutdown_stops_processing() {
        let (handle, mut task, _outputs) = channel();
        handle.shutdown().unwrap();
        handle.mount(InteractionConfig::default()).unwrap();
        assert!(task.drain().is_break());
        assert_eq!(task.surface_count(), 0);
    }

    #[tokio::test]
    async fn test_run_forwards_in_order_and_disconnects() {
        let (handle, mut outputs, join) = spawn();
        let card = handle.mount(InteractionConfig::card()).unwrap();
        handle.pointer(card, PointerInput::down(10.0, 10.0, 0.0)).unwrap();
        handle.pointer(card, PointerInput::up(10.0, 10.0, 20.0)).unwrap();
        handle.frame(FRAME).unwrap();
        handle.shutdown().unwrap();
        join.await.unwrap();

        let mut order = Vec::new();
        while let Some(output) = outputs.recv().await {
            order.push(match output {
                PhysicsOutput::Callback { callback, .. } => format!("{:?}", callback.kind()),
                PhysicsOutput::Snapshot { .. } => "Snapshot".to_string(),
            });
        }
        assert_eq!(order, vec!["Haptic", "Press", "Snapshot"]);

        assert_eq!(handle.frame(FRAME), Err(PhysicsError::Disconnected));
        assert!(handle.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_clock_drives_frames() {
        let (handle, mut outputs, join) = spawn();
        handle.mount(InteractionConfig::default()).unwrap();
        let clock = spawn_frame_clock(handle.clone(), FRAME);

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.shutdown().unwrap();
        join.await.unwrap();
        clock.await.unwrap();

        let mut snapshots = 0;
        while let Some(output) = outputs.recv().await {
            if let PhysicsOutput::Snapshot { snapshot, .. } = output {
                assert_eq!(snapshot.state.velocity, torque_core::Vec2::ZERO);
                snapshots += 1;
            }
        }
        assert!(snapshots >= 3, "only {} frames", snapshots);
    }
}
