//! Local operators of linear and mixed (displacement/pressure) incompressible elasticity.
//!
//! - [`materials`] converts and stores per-element material parameters.
//! - [`assemblers`] provides the displacement, mixed and pressure blocks together with the
//!   right-hand sides induced by manufactured solutions.
//! - [`stress`] evaluates stress tensors and von Mises stresses of displacement fields.
pub mod assemblers;
pub mod materials;
pub mod stress;

pub use assemblers::{DisplacementAssembler, Formulation, MixedAssembler, MixedTransposeAssembler, PressureAssembler};
pub use materials::{LameParameters, MaterialParameters, YoungPoisson};
