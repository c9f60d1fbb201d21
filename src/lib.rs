//! Element-local operator assembly and boundary resolution for (mixed) finite element elasticity.
//!
//! The crate is organized around the data flow of a single analysis run:
//!
//! - [`problem`] holds the PDE problem definitions and the [`ProblemRegistry`](problem::ProblemRegistry)
//!   that maps a problem name to a fresh instance.
//! - [`boundary`] resolves the symbolic boundary tags of a problem into constrained degrees of freedom.
//! - [`assembly`] contains the per-element assembly context, the local assembler contracts and
//!   a parallel driver that turns local blocks into global triplets.
//!
//! The concrete elasticity operators and materials live in the `mixfem-solid` crate.
use nalgebra::{DimMin, DimName, RealField};

pub mod allocators;
pub mod assembly;
pub mod autodiff;
pub mod basis;
pub mod boundary;
pub mod error;
pub mod mesh;
pub mod problem;
pub mod quadrature;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::{Error, Result};

/// A real scalar type that is cheap to copy.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// A small, fixed-size dimension.
///
/// Used as a trait alias for various traits frequently needed by generic `mixfem` routines.
pub trait SmallDim: DimName + DimMin<Self, Output = Self> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> {}
