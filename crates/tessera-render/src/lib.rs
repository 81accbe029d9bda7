//! wgpu side of section rendering: a headless device for off-screen uploads
//! and the GPU-resident section buffer that finished builds are applied to.

pub mod context;
pub mod gpu_section;

pub use context::{GpuContext, GpuContextError};
pub use gpu_section::GpuSectionBuffer;
