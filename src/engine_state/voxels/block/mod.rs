//! # Block Module
//!
//! This module provides the block-related vocabulary of the voxel world: the
//! materials a block can be made of and the faces of a block.

pub mod block_side;
pub mod block_type;

pub use block_side::BlockSide;
pub use block_type::MaterialKind;
