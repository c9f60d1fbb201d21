use log::info;
use mixfem::error::{Error, Result};
use mixfem::nalgebra::convert;
use mixfem::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

/// Converts Young's modulus and Poisson's ratio to Lamé parameters.
///
/// The shear modulus is $\mu = E / (2 (1 + \nu))$. For volumes,
/// $\lambda = E \nu / ((1 + \nu)(1 - 2 \nu))$; for surfaces the plane stress relation
/// $\lambda = E \nu / (1 - \nu^2)$ is used.
///
/// Poisson ratios $\nu \geq 0.5$ are only accepted when `incompressible` is set. Such a material is
/// in the incompressible limit: $\lambda$ is meaningless, reported as zero, and the returned flag
/// is `true`.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn lame_from_young_poisson<T: Real>(
    params: YoungPoisson<T>,
    is_volume: bool,
    incompressible: bool,
) -> Result<(LameParameters<T>, bool)> {
    let YoungPoisson { young, poisson } = params;
    if young <= 0.0 {
        return Err(Error::configuration(format!(
            "Young's modulus must be positive, got {}",
            young
        )));
    }
    if poisson <= -1.0 || poisson >= 1.0 {
        return Err(Error::configuration(format!(
            "Poisson's ratio must be in (-1, 1), got {}",
            poisson
        )));
    }
    let limit = poisson >= 0.5;
    if limit && !incompressible {
        return Err(Error::configuration(format!(
            "Poisson's ratio {} requires an incompressible formulation",
            poisson
        )));
    }

    let mu = young / (2.0 * (1.0 + poisson));
    let lambda = if limit {
        0.0
    } else if is_volume {
        young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson))
    } else {
        young * poisson / (1.0 - poisson * poisson)
    };
    Ok((LameParameters { mu, lambda }, limit))
}

impl<T: Real> TryFrom<YoungPoisson<T>> for LameParameters<T> {
    type Error = Error;

    /// Converts with the three-dimensional relations, rejecting incompressible materials.
    fn try_from(params: YoungPoisson<T>) -> Result<Self> {
        lame_from_young_poisson(params, true, false).map(|(lame, _)| lame)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage<T> {
    Unset,
    Uniform {
        params: LameParameters<T>,
        incompressible_limit: bool,
    },
    PerElement {
        params: Vec<LameParameters<T>>,
        incompressible_limit: Vec<bool>,
    },
}

/// Material parameters of a mesh, either uniform or given per element.
///
/// Per-element parameters are stored as dense arrays indexed by element id. Queries for an
/// element outside the configured range are domain errors; queries before any parameters were
/// set are configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParameters<T> {
    storage: Storage<T>,
    size: Option<usize>,
}

impl<T> Default for MaterialParameters<T> {
    fn default() -> Self {
        Self {
            storage: Storage::Unset,
            size: None,
        }
    }
}

/// The keys accepted by [`MaterialParameters::set_parameters`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MaterialDocument {
    lambda: Option<f64>,
    mu: Option<f64>,
    #[serde(rename = "E")]
    young_short: Option<f64>,
    nu: Option<f64>,
    young: Option<f64>,
    poisson: Option<f64>,
    incompressible: bool,
}

impl<T: Real> MaterialParameters<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(params: LameParameters<T>) -> Self {
        let mut material = Self::new();
        material.set_uniform(params);
        material
    }

    /// Uses the same parameters for every element.
    pub fn set_uniform(&mut self, params: LameParameters<T>) {
        self.storage = Storage::Uniform {
            params,
            incompressible_limit: false,
        };
    }

    /// Restricts uniform parameters to elements `0..num_elements`.
    pub fn set_size(&mut self, num_elements: usize) {
        self.size = Some(num_elements);
    }

    /// The number of elements parameters are defined for, if bounded.
    pub fn num_elements(&self) -> Option<usize> {
        match &self.storage {
            Storage::PerElement { params, .. } => Some(params.len()),
            _ => self.size,
        }
    }

    /// Sets per-element parameters from Young's moduli and Poisson ratios.
    ///
    /// See [`lame_from_young_poisson`] for the conversion.
    pub fn init_multimaterial(&mut self, is_volume: bool, young: &[T], poisson: &[T], incompressible: bool) -> Result<()> {
        if young.len() != poisson.len() {
            return Err(Error::configuration(format!(
                "got {} Young's moduli but {} Poisson ratios",
                young.len(),
                poisson.len()
            )));
        }
        if young.is_empty() {
            return Err(Error::configuration("multimaterial parameters must not be empty"));
        }

        let (params, incompressible_limit) = young
            .iter()
            .zip(poisson)
            .enumerate()
            .map(|(el, (&young, &poisson))| {
                lame_from_young_poisson(YoungPoisson { young, poisson }, is_volume, incompressible)
                    .map_err(|err| match err {
                        Error::Configuration(msg) => Error::configuration(format!("element {}: {}", el, msg)),
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        self.storage = Storage::PerElement {
            params,
            incompressible_limit,
        };
        self.size = Some(young.len());
        info!("Initialized multimaterial with {} elements", young.len());
        Ok(())
    }

    /// Sets uniform parameters from a JSON document.
    ///
    /// Accepts `{"lambda", "mu"}`, `{"E", "nu"}` or `{"young", "poisson"}`, plus an optional
    /// `"incompressible"` flag that admits Poisson ratios of at least `0.5`. The flag is rejected
    /// together with lambda/mu, which cannot describe the limit. Young/Poisson
    /// pairs are converted with the three-dimensional relations. The element bound set by
    /// [`set_size`](Self::set_size) is kept.
    pub fn set_parameters(&mut self, params: &serde_json::Value) -> Result<()> {
        let doc = MaterialDocument::deserialize(params)
            .map_err(|err| Error::configuration(format!("invalid material parameters: {}", err)))?;

        let young_poisson = match (doc.young_short.or(doc.young), doc.nu.or(doc.poisson)) {
            (Some(young), Some(poisson)) => Some(YoungPoisson { young, poisson }),
            (None, None) => None,
            _ => {
                return Err(Error::configuration(
                    "Young's modulus and Poisson's ratio must be given together",
                ))
            }
        };

        let (params, incompressible_limit) = match (doc.lambda, doc.mu, young_poisson) {
            (Some(lambda), Some(mu), None) => {
                if mu <= 0.0 {
                    return Err(Error::configuration(format!("mu must be positive, got {}", mu)));
                }
                if doc.incompressible {
                    return Err(Error::configuration(
                        "the incompressible limit must be given as Young/Poisson, not as lambda/mu",
                    ));
                }
                let params = LameParameters {
                    mu: convert(mu),
                    lambda: convert(lambda),
                };
                (params, false)
            }
            (None, None, Some(YoungPoisson { young, poisson })) => {
                let yp = YoungPoisson {
                    young: convert::<f64, T>(young),
                    poisson: convert::<f64, T>(poisson),
                };
                lame_from_young_poisson(yp, true, doc.incompressible)?
            }
            (None, None, None) => return Err(Error::configuration("material parameters are missing")),
            _ => {
                return Err(Error::configuration(
                    "material parameters must be given either as lambda/mu or as Young/Poisson",
                ))
            }
        };

        info!("Material parameters set to mu = {}, lambda = {}", params.mu, params.lambda);
        self.storage = Storage::Uniform {
            params,
            incompressible_limit,
        };
        Ok(())
    }

    fn check_element(&self, el: usize) -> Result<()> {
        match self.num_elements() {
            Some(n) if el >= n => Err(Error::domain(format!(
                "element {} is out of range for material parameters of {} elements",
                el, n
            ))),
            _ => Ok(()),
        }
    }

    /// The Lamé parameters of element `el`.
    pub fn lambda_mu(&self, el: usize) -> Result<LameParameters<T>> {
        self.check_element(el)?;
        match &self.storage {
            Storage::Unset => Err(Error::configuration("material parameters have not been set")),
            Storage::Uniform { params, .. } => Ok(*params),
            Storage::PerElement { params, .. } => Ok(params[el]),
        }
    }

    /// Whether element `el` is in the incompressible limit, where $\lambda$ is unused.
    pub fn is_incompressible_limit(&self, el: usize) -> Result<bool> {
        self.check_element(el)?;
        match &self.storage {
            Storage::Unset => Err(Error::configuration("material parameters have not been set")),
            Storage::Uniform {
                incompressible_limit, ..
            } => Ok(*incompressible_limit),
            Storage::PerElement {
                incompressible_limit, ..
            } => Ok(incompressible_limit[el]),
        }
    }

    /// The volumetric compliance $1 / \lambda$ of element `el`, or zero in the incompressible limit.
    pub fn volumetric_compliance(&self, el: usize) -> Result<T> {
        if self.is_incompressible_limit(el)? {
            return Ok(T::zero());
        }
        let LameParameters { lambda, .. } = self.lambda_mu(el)?;
        if lambda == T::zero() {
            return Err(Error::configuration(format!(
                "element {} has lambda = 0, so its volumetric compliance is unbounded",
                el
            )));
        }
        Ok(T::one() / lambda)
    }
}
