//! # Grid Key
//!
//! Canonical addressing for voxel cells. A `GridKey` is the structured integer triple
//! of a cell and is hashed directly, so it can be used as a map key without any
//! string formatting. The string form `"x,y,z"` exists for logging, display, and
//! parsing; because it is comma delimited it stays injective for negative values.
//!
//! The voxel at `(x, y, z)` is the unit cube centred on that point, spanning
//! `[x - 0.5, x + 0.5]` on every axis.

use std::{fmt, num::ParseIntError, str::FromStr};

use cgmath::{Point3, Vector3};

/// Integer address of a single voxel cell.
///
/// Every `i32` value is supported on every axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    /// X coordinate of the cell
    pub x: i32,
    /// Y coordinate of the cell (up)
    pub y: i32,
    /// Z coordinate of the cell
    pub z: i32,
}

impl GridKey {
    /// Encodes a coordinate triple into its canonical key.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the neighbouring key displaced by `offset` cells.
    ///
    /// `None` if any component would leave the `i32` range.
    pub fn offset(&self, offset: Vector3<i32>) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(offset.x)?,
            y: self.y.checked_add(offset.y)?,
            z: self.z.checked_add(offset.z)?,
        })
    }

    /// World-space centre of the cell.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Error returned when a string is not a valid `"x,y,z"` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseGridKeyError {
    /// The string did not contain exactly three comma separated components
    ComponentCount(usize),
    /// One of the components was not a valid `i32`
    InvalidComponent(ParseIntError),
}

impl fmt::Display for ParseGridKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseGridKeyError::ComponentCount(count) => {
                write!(f, "expected 3 components in grid key, found {count}")
            }
            ParseGridKeyError::InvalidComponent(err) => {
                write!(f, "invalid grid key component: {err}")
            }
        }
    }
}

impl std::error::Error for ParseGridKeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseGridKeyError::InvalidComponent(err) => Some(err),
            ParseGridKeyError::ComponentCount(_) => None,
        }
    }
}

impl FromStr for GridKey {
    type Err = ParseGridKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s.split(',').collect();
        if components.len() != 3 {
            return Err(ParseGridKeyError::ComponentCount(components.len()));
        }

        let parse = |component: &str| {
            component
                .trim()
                .parse::<i32>()
                .map_err(ParseGridKeyError::InvalidComponent)
        };

        Ok(Self::new(
            parse(components[0])?,
            parse(components[1])?,
            parse(components[2])?,
        ))
    }
}
