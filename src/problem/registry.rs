use crate::error::{Error, Result};
use crate::problem::{
    DrivenCavityProblem, ElasticExactProblem, ElasticProblem, FrankeProblem, GenericTensorProblem, LinearProblem,
    Problem, QuadraticProblem, TimeDependentScalarProblem, ZeroBCProblem,
};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;

/// Creates a fresh problem instance.
pub type ProblemFactory = Box<dyn Fn() -> Box<dyn Problem> + Send + Sync>;

/// An immutable map from problem names to factories.
///
/// The registry is built once with a [`ProblemRegistryBuilder`] and then passed to whatever
/// needs to look up problems by name. Every lookup produces a new instance, so configuring one
/// problem through [`Problem::set_parameters`] never affects another lookup.
pub struct ProblemRegistry {
    factories: BTreeMap<String, ProblemFactory>,
}

impl fmt::Debug for ProblemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProblemRegistry {
    pub fn builder() -> ProblemRegistryBuilder {
        ProblemRegistryBuilder::new()
    }

    /// A registry containing every problem defined in this crate.
    pub fn with_default_problems() -> Self {
        let registry = ProblemRegistryBuilder::new()
            .with_problem("Linear", || Box::new(LinearProblem::new()))
            .with_problem("Quadratic", || Box::new(QuadraticProblem::new()))
            .with_problem("Franke", || Box::new(FrankeProblem::new()))
            .with_problem("Franke3D", || Box::new(FrankeProblem::new_3d()))
            .with_problem("ZeroBC", || Box::new(ZeroBCProblem::new()))
            .with_problem("Elastic", || Box::new(ElasticProblem::new()))
            .with_problem("ElasticExact", || Box::new(ElasticExactProblem::new()))
            .with_problem("DrivenCavity", || Box::new(DrivenCavityProblem::new()))
            .with_problem("TimeDependentScalar", || Box::new(TimeDependentScalarProblem::new()))
            .with_problem("GenericTensor", || Box::new(GenericTensorProblem::new()));
        debug_assert!(registry.duplicates.is_empty());
        Self {
            factories: registry.factories,
        }
    }

    /// Creates a new instance of the problem with the given name.
    ///
    /// Names are matched exactly. Unknown names are a configuration error.
    pub fn get(&self, name: &str) -> Result<Box<dyn Problem>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::configuration(format!("unknown problem {}", name)))?;
        info!("Selected problem {}", name);
        Ok(factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Collects problem factories and checks that their names are unique.
#[derive(Default)]
pub struct ProblemRegistryBuilder {
    factories: BTreeMap<String, ProblemFactory>,
    duplicates: Vec<String>,
}

impl ProblemRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_problem<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Problem> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.factories.insert(name, Box::new(factory));
        }
        self
    }

    /// Finishes the registry. Fails if any name was registered more than once.
    pub fn build(self) -> Result<ProblemRegistry> {
        if !self.duplicates.is_empty() {
            return Err(Error::configuration(format!(
                "problems registered more than once: {}",
                self.duplicates.join(", ")
            )));
        }
        debug!("Built problem registry with {} problems", self.factories.len());
        Ok(ProblemRegistry {
            factories: self.factories,
        })
    }
}
