//! Asynchronous section builds: snapshots are captured on the caller's
//! thread, built on a worker pool, and applied to section buffers on the
//! render thread.
//!
//! Per section the lifecycle is `Idle -> Building -> Uploading -> Idle`.
//! Workers never touch section buffers; finished builds queue up until the
//! render thread calls [`BuildCoordinator::apply_finished`], which uploads
//! them and then signals each requester's completion channel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use thiserror::Error;

use tessera_config::MeshingConfig;
use tessera_voxel::{BlockRegistry, BlockSnapshot, SectionPos, VoxelSource, capture_section};

use crate::build::{SectionMesh, build_section};
use crate::buffers::{SectionStore, UploadError};
use crate::surface::SurfaceTable;

/// Identifies a finished build, independent of completion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildToken {
    pub chunk_x: i32,
    pub section_y: i32,
    pub chunk_z: i32,
}

impl BuildToken {
    pub fn pos(self) -> SectionPos {
        SectionPos::new(self.chunk_x, self.section_y, self.chunk_z)
    }
}

impl From<SectionPos> for BuildToken {
    fn from(pos: SectionPos) -> Self {
        Self {
            chunk_x: pos.chunk_x,
            section_y: pos.section_y,
            chunk_z: pos.chunk_z,
        }
    }
}

/// Where a section is in its build lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildState {
    Idle,
    /// A worker owns the snapshot and is building.
    Building,
    /// The build finished and waits for the render thread.
    Uploading,
}

/// Errors returned when a build cannot be started.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build coordinator has shut down")]
    ShutDown,
    #[error("build budget exhausted ({0} builds in flight)")]
    BudgetExhausted(usize),
    #[error("failed to spawn build worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result of one [`BuildCoordinator::apply_finished`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Builds uploaded into their section.
    pub applied: usize,
    /// Builds dropped at upload time ([`UploadError`]).
    pub discarded: usize,
    /// Builds whose worker panicked.
    pub failed: usize,
    /// Vertices uploaded by the applied builds.
    pub opaque_vertices: u64,
    pub translucent_vertices: u64,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.applied + self.discarded + self.failed
    }

    /// Adds another summary's counts to this one.
    pub fn merge(&mut self, other: ApplySummary) {
        self.applied += other.applied;
        self.discarded += other.discarded;
        self.failed += other.failed;
        self.opaque_vertices += other.opaque_vertices;
        self.translucent_vertices += other.translucent_vertices;
    }
}

struct BuildTask {
    pos: SectionPos,
    snapshot: BlockSnapshot,
    completion: Sender<BuildToken>,
}

enum BuildOutcome {
    Built(Box<SectionMesh>),
    Failed(String),
}

struct FinishedBuild {
    pos: SectionPos,
    outcome: BuildOutcome,
    completion: Sender<BuildToken>,
}

/// Builds per section in each stage. Overlapping requests for one section
/// are allowed, so these are counts.
#[derive(Clone, Copy, Debug, Default)]
struct Progress {
    building: u32,
    uploading: u32,
}

fn update_progress(
    progress: &DashMap<SectionPos, Progress>,
    pos: SectionPos,
    f: impl FnOnce(&mut Progress),
) {
    if let Some(mut entry) = progress.get_mut(&pos) {
        f(entry.value_mut());
    }
    progress.remove_if(&pos, |_, p| p.building == 0 && p.uploading == 0);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Worker pool plus the render-thread hop for section builds.
///
/// The budget counts builds from submission until they are applied, so it
/// also bounds the number of finished meshes waiting for upload.
pub struct BuildCoordinator {
    task_sender: Option<Sender<BuildTask>>,
    result_receiver: Receiver<FinishedBuild>,
    worker_handles: Vec<JoinHandle<()>>,
    budget: usize,
    uploads_per_frame: usize,
    in_flight: Arc<AtomicUsize>,
    progress: Arc<DashMap<SectionPos, Progress>>,
}

impl BuildCoordinator {
    /// Spawns the worker pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Spawn`] if a worker thread cannot be created.
    pub fn new(
        config: &MeshingConfig,
        registry: Arc<BlockRegistry>,
        surfaces: SurfaceTable,
    ) -> Result<Self, BuildError> {
        let worker_count = config.effective_workers();
        let budget = config.task_budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<BuildTask>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let progress: Arc<DashMap<SectionPos, Progress>> = Arc::new(DashMap::new());

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let registry = Arc::clone(&registry);
            let progress = Arc::clone(&progress);

            let handle = std::thread::Builder::new()
                .name(format!("section-build-{i}"))
                .spawn(move || {
                    while let Ok(BuildTask {
                        pos,
                        snapshot,
                        completion,
                    }) = rx.recv()
                    {
                        let built = panic::catch_unwind(AssertUnwindSafe(|| {
                            build_section(pos, &snapshot, &registry, &surfaces)
                        }));
                        let outcome = match built {
                            Ok(mesh) => BuildOutcome::Built(Box::new(mesh)),
                            Err(payload) => BuildOutcome::Failed(panic_message(payload.as_ref())),
                        };
                        update_progress(&progress, pos, |p| {
                            p.building = p.building.saturating_sub(1);
                            p.uploading += 1;
                        });
                        let finished = FinishedBuild {
                            pos,
                            outcome,
                            completion,
                        };
                        if tx.send(finished).is_err() {
                            break;
                        }
                    }
                })?;
            handles.push(handle);
        }

        tracing::info!(workers = worker_count, budget, "section build pool started");

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            uploads_per_frame: config.uploads_per_frame,
            in_flight: Arc::new(AtomicUsize::new(0)),
            progress,
        })
    }

    fn check_capacity(&self) -> Result<&Sender<BuildTask>, BuildError> {
        let sender = self.task_sender.as_ref().ok_or(BuildError::ShutDown)?;
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return Err(BuildError::BudgetExhausted(self.budget));
        }
        Ok(sender)
    }

    /// Captures the snapshot for `pos` from `source` on the calling thread and
    /// queues the build. `completion` receives a [`BuildToken`] once the
    /// result has been applied, discarded, or has failed.
    ///
    /// # Errors
    ///
    /// [`BuildError::BudgetExhausted`] or [`BuildError::ShutDown`]; nothing
    /// is captured in either case.
    pub fn request_build<V: VoxelSource + ?Sized>(
        &self,
        source: &V,
        pos: SectionPos,
        completion: Sender<BuildToken>,
    ) -> Result<(), BuildError> {
        self.check_capacity()?;
        let snapshot = capture_section(source, pos);
        self.submit_snapshot(pos, snapshot, completion)
    }

    /// Queues a build from an already captured snapshot.
    ///
    /// # Errors
    ///
    /// [`BuildError::BudgetExhausted`] or [`BuildError::ShutDown`].
    pub fn submit_snapshot(
        &self,
        pos: SectionPos,
        snapshot: BlockSnapshot,
        completion: Sender<BuildToken>,
    ) -> Result<(), BuildError> {
        let sender = self.check_capacity()?;
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.progress.entry(pos).or_default().building += 1;

        let task = BuildTask {
            pos,
            snapshot,
            completion,
        };
        if sender.send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            update_progress(&self.progress, pos, |p| {
                p.building = p.building.saturating_sub(1);
            });
            return Err(BuildError::ShutDown);
        }
        tracing::trace!(?pos, "queued section build");
        Ok(())
    }

    /// Uploads finished builds into `store`. Call once per frame on the
    /// render thread.
    ///
    /// At most `uploads_per_frame` results are handled per call (all of them
    /// when that is `0`). Every handled result signals its completion
    /// channel, whether it was applied or not.
    pub fn apply_finished<S: SectionStore + ?Sized>(&self, store: &mut S) -> ApplySummary {
        let limit = match self.uploads_per_frame {
            0 => usize::MAX,
            n => n,
        };
        let mut summary = ApplySummary::default();
        while summary.total() < limit {
            let Ok(finished) = self.result_receiver.try_recv() else {
                break;
            };
            self.apply_one(finished, store, &mut summary);
        }
        summary
    }

    fn apply_one<S: SectionStore + ?Sized>(
        &self,
        finished: FinishedBuild,
        store: &mut S,
        summary: &mut ApplySummary,
    ) {
        let FinishedBuild {
            pos,
            outcome,
            completion,
        } = finished;

        match outcome {
            BuildOutcome::Built(mesh) => {
                let uploaded = match store.section_buffer(pos) {
                    Some(buffer) => mesh.upload_to(buffer),
                    None => Err(UploadError::SectionNotResident(pos)),
                };
                match uploaded {
                    Ok(()) => {
                        summary.applied += 1;
                        summary.opaque_vertices += u64::from(mesh.stats.opaque_vertices);
                        summary.translucent_vertices += u64::from(mesh.stats.translucent_vertices);
                    }
                    Err(error) => {
                        tracing::warn!(?pos, %error, "discarding section build");
                        summary.discarded += 1;
                    }
                }
            }
            BuildOutcome::Failed(message) => {
                tracing::error!(?pos, %message, "section build panicked");
                summary.failed += 1;
            }
        }

        update_progress(&self.progress, pos, |p| {
            p.uploading = p.uploading.saturating_sub(1);
        });
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        if completion.send(BuildToken::from(pos)).is_err() {
            tracing::debug!(?pos, "build requester went away");
        }
    }

    /// Lifecycle state of the section at `pos`.
    pub fn state(&self, pos: SectionPos) -> BuildState {
        match self.progress.get(&pos).map(|p| *p) {
            Some(p) if p.building > 0 => BuildState::Building,
            Some(p) if p.uploading > 0 => BuildState::Uploading,
            _ => BuildState::Idle,
        }
    }

    /// Builds submitted and not yet applied.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Finished builds waiting for [`apply_finished`](Self::apply_finished).
    pub fn pending_uploads(&self) -> usize {
        self.result_receiver.len()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Stops accepting builds and joins the workers. Results not yet applied
    /// are dropped without signalling completion.
    pub fn shutdown(&mut self) {
        if self.task_sender.take().is_none() {
            return;
        }
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
        tracing::info!("section build pool stopped");
    }
}

impl Drop for BuildCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
