//! Headless section mesher.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p tessera-app -- --view-radius 2` to build a 5x5 column area.
//! Add `--gpu` to upload into buffers on a headless wgpu device.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rustc_hash::FxHashMap;
use tessera_app::{RunReport, TerrainGenerator, build_area, register_palette, sections_in_radius};
use tessera_config::{CliArgs, Config, default_config_dir};
use tessera_mesh::{BuildCoordinator, CpuSectionBuffer, SurfaceTable};
use tessera_render::{GpuContext, GpuSectionBuffer};
use tessera_voxel::{BlockRegistry, SectionPos, SectionWorld};
use tracing::{error, info, warn};

const STALL_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions) || config.debug.log_to_file,
        Some(&config),
    );

    match run(&config, args.gpu) {
        Ok(report) => {
            info!(
                sections = report.completed,
                opaque_vertices = report.summary.opaque_vertices,
                translucent_vertices = report.summary.translucent_vertices,
                per_second = format!("{:.1}", report.sections_per_second()),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, gpu: bool) -> Result<RunReport, Box<dyn std::error::Error>> {
    let mut registry = BlockRegistry::new();
    let palette = register_palette(&mut registry)?;

    let world_config = &config.world;
    let terrain = TerrainGenerator::new(world_config.seed, world_config.section_height, palette);
    let mut world = SectionWorld::new();
    terrain.generate_area(&mut world, world_config.view_radius);

    let positions = sections_in_radius(world_config.view_radius, world_config.section_height);
    let coordinator =
        BuildCoordinator::new(&config.meshing, Arc::new(registry), SurfaceTable::default())?;
    info!(
        sections = positions.len(),
        workers = coordinator.worker_count(),
        gpu,
        "building view area"
    );

    let context = if gpu {
        GpuContext::new_headless_blocking()
            .map_err(|e| warn!("GPU unavailable ({e}), falling back to memory buffers"))
            .ok()
    } else {
        None
    };

    let report = match context {
        Some(ctx) => {
            let mut store: HashMap<SectionPos, GpuSectionBuffer> = positions
                .iter()
                .map(|&pos| (pos, GpuSectionBuffer::new(ctx.clone())))
                .collect();
            let report = build_area(&coordinator, &world, &positions, &mut store, STALL_TIMEOUT)?;
            let gpu_bytes: u64 = store.values().map(GpuSectionBuffer::gpu_bytes).sum();
            info!(gpu_bytes, "section buffers resident on GPU");
            report
        }
        None => {
            let mut store: FxHashMap<SectionPos, CpuSectionBuffer> = positions
                .iter()
                .map(|&pos| (pos, CpuSectionBuffer::new()))
                .collect();
            let report = build_area(&coordinator, &world, &positions, &mut store, STALL_TIMEOUT)?;
            let visible = store.values().filter(|b| b.cull_bits.0 != 0).count();
            info!(visible, "sections with a visible path");
            report
        }
    };

    Ok(report)
}
