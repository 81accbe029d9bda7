//! Drives a batch of section builds to completion.
//!
//! Plays the role of the render loop: submits as many builds as the budget
//! allows, applies finished results once per "frame", and counts completion
//! tokens until every requested section has reported back.

use std::time::{Duration, Instant};

use tessera_mesh::{ApplySummary, BuildCoordinator, BuildError, BuildToken, SectionStore};
use tessera_voxel::{SectionPos, VoxelSource};
use thiserror::Error;

const FRAME_SLEEP: Duration = Duration::from_millis(1);

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("section build failed to start: {0}")]
    Build(#[from] BuildError),
    #[error("timed out with {remaining} of {total} sections outstanding")]
    TimedOut { remaining: usize, total: usize },
}

/// Outcome of [`build_area`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Sections requested.
    pub sections: usize,
    /// Completion tokens received.
    pub completed: usize,
    /// Accumulated upload results.
    pub summary: ApplySummary,
    /// Number of `apply_finished` calls made.
    pub frames: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn sections_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Builds every section in `positions` from `world` into `store`.
///
/// The store decides residency: positions it has no buffer for are built but
/// their results are discarded.
///
/// # Errors
///
/// [`RunError::Build`] if the coordinator shuts down, or
/// [`RunError::TimedOut`] if no completion arrives within `timeout`.
pub fn build_area<V, S>(
    coordinator: &BuildCoordinator,
    world: &V,
    positions: &[SectionPos],
    store: &mut S,
    timeout: Duration,
) -> Result<RunReport, RunError>
where
    V: VoxelSource + ?Sized,
    S: SectionStore + ?Sized,
{
    let start = Instant::now();
    let (done_tx, done_rx) = crossbeam_channel::unbounded::<BuildToken>();
    let mut report = RunReport {
        sections: positions.len(),
        ..RunReport::default()
    };
    let mut next = 0;
    let mut last_progress = Instant::now();

    while report.completed < positions.len() {
        while let Some(&pos) = positions.get(next) {
            match coordinator.request_build(world, pos, done_tx.clone()) {
                Ok(()) => next += 1,
                Err(BuildError::BudgetExhausted(_)) => break,
                Err(error) => return Err(error.into()),
            }
        }

        let frame = coordinator.apply_finished(store);
        report.summary.merge(frame);
        report.frames += 1;

        let tokens = done_rx.try_iter().count();
        report.completed += tokens;

        if tokens > 0 {
            last_progress = Instant::now();
        } else if last_progress.elapsed() > timeout {
            return Err(RunError::TimedOut {
                remaining: positions.len() - report.completed,
                total: positions.len(),
            });
        } else {
            std::thread::sleep(FRAME_SLEEP);
        }
    }

    report.elapsed = start.elapsed();
    tracing::info!(
        sections = report.sections,
        applied = report.summary.applied,
        discarded = report.summary.discarded,
        failed = report.summary.failed,
        frames = report.frames,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "area build finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rustc_hash::FxHashMap;
    use tessera_config::MeshingConfig;
    use tessera_mesh::{CpuSectionBuffer, CullBits, SurfaceTable};
    use tessera_voxel::{BlockRegistry, SectionWorld};

    use super::*;
    use crate::blocks::register_palette;
    use crate::terrain::{TerrainGenerator, sections_in_radius};

    fn setup(budget: usize) -> (BuildCoordinator, SectionWorld) {
        let mut registry = BlockRegistry::new();
        let palette = register_palette(&mut registry).unwrap();
        let mut world = SectionWorld::new();
        TerrainGenerator::new(9, 8, palette).generate_area(&mut world, 1);
        let config = MeshingConfig {
            worker_count: 2,
            task_budget: budget,
            uploads_per_frame: 3,
        };
        let coordinator =
            BuildCoordinator::new(&config, Arc::new(registry), SurfaceTable::default()).unwrap();
        (coordinator, world)
    }

    fn resident(positions: &[SectionPos]) -> FxHashMap<SectionPos, CpuSectionBuffer> {
        positions
            .iter()
            .map(|&pos| (pos, CpuSectionBuffer::new()))
            .collect()
    }

    #[test]
    fn test_build_area_completes_every_section() {
        let (coordinator, world) = setup(4);
        let positions = sections_in_radius(1, 8);
        let mut store = resident(&positions);

        let report = build_area(
            &coordinator,
            &world,
            &positions,
            &mut store,
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(report.completed, positions.len());
        assert_eq!(report.summary.applied, positions.len());
        assert_eq!(report.summary.failed, 0);
        assert!(report.summary.opaque_vertices > 0);
        assert!(report.frames >= positions.len() / 3);
        assert_eq!(coordinator.in_flight_count(), 0);
        assert!(store.values().all(|b| b.generation == 1));
        // The top section is open sky.
        assert_eq!(store[&SectionPos::new(0, 7, 0)].cull_bits, CullBits::ALL);
    }

    #[test]
    fn test_non_resident_sections_are_discarded() {
        let (coordinator, world) = setup(8);
        let positions = sections_in_radius(0, 4);
        let mut store = resident(&positions[..2]);

        let report = build_area(
            &coordinator,
            &world,
            &positions,
            &mut store,
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(report.completed, 4);
        assert_eq!(report.summary.applied, 2);
        assert_eq!(report.summary.discarded, 2);
    }

    #[test]
    fn test_shut_down_coordinator_is_an_error() {
        let (mut coordinator, world) = setup(4);
        coordinator.shutdown();
        let positions = sections_in_radius(0, 1);
        let mut store = resident(&positions);

        let result = build_area(
            &coordinator,
            &world,
            &positions,
            &mut store,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(RunError::Build(BuildError::ShutDown))));
    }

    #[test]
    fn test_empty_batch_is_immediate() {
        let (coordinator, world) = setup(4);
        let mut store = resident(&[]);
        let report =
            build_area(&coordinator, &world, &[], &mut store, Duration::from_secs(1)).unwrap();
        assert_eq!(report.sections, 0);
        assert_eq!(report.frames, 0);
    }
}
