use crate::assembly::local::RhsAssembler;
use crate::error::{Error, Result};
use crate::mesh::BoundaryTag;
use crate::problem::{check_points, check_tagged_points, evaluate_rows, zero_values, BoundaryTags, Problem};
use log::info;
use nalgebra::DMatrix;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct DirichletEntry {
    id: BoundaryTag,
    value: Vec<f64>,
    #[serde(default)]
    dimension: Option<Vec<bool>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct NeumannEntry {
    id: BoundaryTag,
    value: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct GenericTensorParameters {
    #[serde(default)]
    dirichlet_boundary: Option<Vec<DirichletEntry>>,
    #[serde(default)]
    neumann_boundary: Option<Vec<NeumannEntry>>,
    #[serde(default)]
    pressure_boundary: Option<Vec<BoundaryTag>>,
    #[serde(default)]
    rhs: Option<Vec<f64>>,
    #[serde(default)]
    n_incremental_load_steps: Option<usize>,
}

/// Constant Dirichlet value with per-dimension activation.
#[derive(Debug, Clone, PartialEq)]
struct DirichletValue {
    value: Vec<f64>,
    active: Vec<bool>,
}

fn check_vector_value(what: &str, tag: BoundaryTag, value: &[f64]) -> Result<()> {
    match value.len() {
        2 | 3 => Ok(()),
        n => Err(Error::configuration(format!(
            "{} value for tag {} must have 2 or 3 components, got {}",
            what, tag, n
        ))),
    }
}

/// A vector-valued problem configured entirely from a JSON document.
///
/// ```json
/// {
///     "dirichlet_boundary": [{ "id": 1, "value": [0.0, 0.0], "dimension": [true, false] }],
///     "neumann_boundary": [{ "id": 2, "value": [0.0, -1.0] }],
///     "pressure_boundary": [3],
///     "rhs": [0.0, -9.81],
///     "n_incremental_load_steps": 4
/// }
/// ```
///
/// Every key is optional. A key that is present replaces the corresponding part of the current
/// configuration, so applying the same document twice is the same as applying it once. Dirichlet
/// entries without `dimension` constrain every dimension.
#[derive(Debug, Clone)]
pub struct GenericTensorProblem {
    tags: BoundaryTags,
    dirichlet: BTreeMap<BoundaryTag, DirichletValue>,
    neumann: BTreeMap<BoundaryTag, Vec<f64>>,
    body_force: Option<Vec<f64>>,
    load_steps: usize,
}

impl Default for GenericTensorProblem {
    fn default() -> Self {
        Self {
            tags: BoundaryTags::default(),
            dirichlet: BTreeMap::new(),
            neumann: BTreeMap::new(),
            body_force: None,
            load_steps: 1,
        }
    }
}

impl GenericTensorProblem {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_dirichlet(entries: Vec<DirichletEntry>) -> Result<BTreeMap<BoundaryTag, DirichletValue>> {
        let mut dirichlet = BTreeMap::new();
        for entry in entries {
            check_vector_value("Dirichlet", entry.id, &entry.value)?;
            let active = entry.dimension.unwrap_or_else(|| vec![true; entry.value.len()]);
            if active.len() != entry.value.len() {
                return Err(Error::configuration(format!(
                    "Dirichlet tag {} has {} values but {} dimension flags",
                    entry.id,
                    entry.value.len(),
                    active.len()
                )));
            }
            let value = DirichletValue {
                value: entry.value,
                active,
            };
            if dirichlet.insert(entry.id, value).is_some() {
                return Err(Error::configuration(format!("duplicate Dirichlet tag {}", entry.id)));
            }
        }
        Ok(dirichlet)
    }

    fn parse_neumann(entries: Vec<NeumannEntry>) -> Result<BTreeMap<BoundaryTag, Vec<f64>>> {
        let mut neumann = BTreeMap::new();
        for entry in entries {
            check_vector_value("Neumann", entry.id, &entry.value)?;
            if neumann.insert(entry.id, entry.value).is_some() {
                return Err(Error::configuration(format!("duplicate Neumann tag {}", entry.id)));
            }
        }
        Ok(neumann)
    }

    fn tagged_values<'a>(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        lookup: impl Fn(BoundaryTag) -> Option<&'a [f64]>,
    ) -> Result<DMatrix<f64>> {
        let dim = check_tagged_points(tags, pts)?;
        evaluate_rows(pts, dim, |i, _| match lookup(tags[i]) {
            Some(value) if value.len() == dim => Ok(value.to_vec()),
            Some(value) => Err(Error::domain(format!(
                "value for tag {} has {} components, but points are {}D",
                tags[i],
                value.len(),
                dim
            ))),
            None => Ok(vec![0.0; dim]),
        })
    }
}

impl Problem for GenericTensorProblem {
    fn name(&self) -> &str {
        "GenericTensor"
    }

    fn boundary_tags(&self) -> &BoundaryTags {
        &self.tags
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn has_exact_sol(&self) -> bool {
        false
    }

    fn is_rhs_zero(&self) -> bool {
        self.body_force
            .as_ref()
            .map_or(true, |f| f.iter().all(|&f_k| f_k == 0.0))
    }

    fn rhs(&self, _assembler: &dyn RhsAssembler<f64>, pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        match &self.body_force {
            Some(force) if force.len() == dim => evaluate_rows(pts, dim, |_, _| Ok(force.clone())),
            Some(force) => Err(Error::domain(format!(
                "body force has {} components, but points are {}D",
                force.len(),
                dim
            ))),
            None => Ok(zero_values(pts, dim)),
        }
    }

    fn bc(&self, tags: &[BoundaryTag], pts: &DMatrix<f64>, _t: f64) -> Result<DMatrix<f64>> {
        self.tagged_values(tags, pts, |tag| self.dirichlet.get(&tag).map(|d| d.value.as_slice()))
    }

    fn neumann_bc(
        &self,
        tags: &[BoundaryTag],
        pts: &DMatrix<f64>,
        _normals: &DMatrix<f64>,
        _t: f64,
    ) -> Result<DMatrix<f64>> {
        self.tagged_values(tags, pts, |tag| self.neumann.get(&tag).map(Vec::as_slice))
    }

    fn initial_solution(&self, pts: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let dim = check_points(pts)?;
        Ok(zero_values(pts, dim))
    }

    fn set_parameters(&mut self, params: &serde_json::Value) -> Result<()> {
        let params = GenericTensorParameters::deserialize(params)
            .map_err(|err| Error::configuration(format!("invalid GenericTensor parameters: {}", err)))?;

        // Validate everything before touching the current state
        let dirichlet = params.dirichlet_boundary.map(Self::parse_dirichlet).transpose()?;
        let neumann = params.neumann_boundary.map(Self::parse_neumann).transpose()?;
        if let Some(force) = params.rhs.as_ref().filter(|f| f.len() != 2 && f.len() != 3) {
            return Err(Error::configuration(format!(
                "body force must have 2 or 3 components, got {}",
                force.len()
            )));
        }
        if params.n_incremental_load_steps == Some(0) {
            return Err(Error::configuration("n_incremental_load_steps must be positive"));
        }

        if let Some(dirichlet) = dirichlet {
            self.tags.dirichlet = dirichlet.keys().copied().collect();
            self.dirichlet = dirichlet;
        }
        if let Some(neumann) = neumann {
            self.tags.neumann = neumann.keys().copied().collect();
            self.neumann = neumann;
        }
        if let Some(pressure) = params.pressure_boundary {
            self.tags.pressure = pressure.into_iter().collect();
        }
        if let Some(force) = params.rhs {
            self.body_force = Some(force);
        }
        if let Some(steps) = params.n_incremental_load_steps {
            self.load_steps = steps;
        }

        info!(
            "Configured GenericTensor with {} Dirichlet, {} Neumann and {} pressure tags",
            self.tags.dirichlet.len(),
            self.tags.neumann.len(),
            self.tags.pressure.len()
        );
        Ok(())
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn is_dimension_dirichlet(&self, tag: BoundaryTag, dim: usize) -> bool {
        self.dirichlet
            .get(&tag)
            .and_then(|d| d.active.get(dim).copied())
            .unwrap_or(true)
    }

    fn all_dimensions_dirichlet(&self) -> bool {
        self.dirichlet
            .values()
            .all(|d| d.active.iter().all(|&active| active))
    }

    fn might_have_no_dirichlet(&self) -> bool {
        true
    }

    fn n_incremental_load_steps(&self, _diag: f64) -> usize {
        self.load_steps
    }
}
