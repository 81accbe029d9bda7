//! Headless driver for the section build pipeline.
//!
//! Registers a small block palette, generates terrain into a
//! [`SectionWorld`](tessera_voxel::SectionWorld), and pushes every section of
//! the view area through the [`BuildCoordinator`](tessera_mesh::BuildCoordinator).

pub mod blocks;
pub mod runner;
pub mod terrain;

pub use blocks::{Palette, register_palette};
pub use runner::{RunError, RunReport, build_area};
pub use terrain::{SEA_LEVEL, TerrainGenerator, column_rng, derive_column_seed, sections_in_radius};
