//! # Voxel World
//!
//! The sparse voxel world and everything needed to populate it.
//!
//! ## Architecture
//!
//! * **GridKey**: Integer cell coordinate used as the map key
//! * **Block**: Materials and the six faces of a cube
//! * **Registry**: The single source of truth mapping cells to voxels, kept in step
//!   with the render surface
//! * **Terrain**: One-shot procedural generation of the startup world
//!
//! ## Data Flow
//!
//! 1. The terrain generator fills a new registry at startup
//! 2. Edits insert into or remove from the registry
//! 3. Each insert or removal adds or releases exactly one cube on the render surface

pub mod block;
pub mod grid_key;
pub mod registry;
pub mod terrain;
