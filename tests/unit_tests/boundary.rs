use crate::unit_tests::{unit_square_bases, unit_square_boundary, BOTTOM, LEFT, RIGHT, TOP};
use mixfem::basis::SimplexP1Bases;
use mixfem::boundary::setup_bc;
use mixfem::mesh::{BoundaryFacet, BoundaryMesh, TaggedBoundary};
use mixfem::nalgebra::{Point3, U2, U3};
use mixfem::problem::{GenericTensorProblem, Problem, ProblemRegistry};
use serde_json::json;
use std::collections::BTreeSet;

fn no_pressure() -> Vec<SimplexP1Bases<f64, U2>> {
    Vec::new()
}

fn set(values: &[usize]) -> BTreeSet<usize> {
    values.iter().copied().collect()
}

fn generic_problem(params: serde_json::Value) -> GenericTensorProblem {
    let mut problem = GenericTensorProblem::new();
    problem.set_parameters(&params).unwrap();
    problem
}

#[test]
fn empty_dirichlet_set_constrains_whole_boundary() {
    let registry = ProblemRegistry::with_default_problems();
    let mesh = unit_square_boundary();
    let bases = unit_square_bases();

    let cavity = registry.get("DrivenCavity").unwrap();
    let constraints = setup_bc(&mesh, cavity.as_ref(), &bases, &no_pressure()).unwrap();
    assert_eq!(constraints.field_dim(), 2);
    assert_eq!(constraints.displacement(0), Some(&set(&[0, 2, 4, 6])));
    assert_eq!(constraints.displacement(1), Some(&set(&[1, 3, 5, 7])));
    assert_eq!(constraints.displacement_dofs(), (0..8).collect());
    assert_eq!(constraints.dirichlet_facets(), mesh.boundary_facets());
    assert!(constraints.neumann_facets().is_empty());
    assert!(constraints.pressure_dofs().is_empty());

    let linear = registry.get("Linear").unwrap();
    let constraints = setup_bc(&mesh, linear.as_ref(), &bases, &no_pressure()).unwrap();
    assert_eq!(constraints.field_dim(), 1);
    assert_eq!(constraints.displacement(0), Some(&set(&[0, 1, 2, 3])));
}

#[test]
fn elastic_problem_constrains_tagged_sides() {
    let problem = ProblemRegistry::with_default_problems().get("Elastic").unwrap();
    let mesh = unit_square_boundary();
    let constraints = setup_bc(&mesh, problem.as_ref(), &unit_square_bases(), &no_pressure()).unwrap();

    // Bottom (nodes 0, 1) and right (nodes 1, 2)
    assert_eq!(constraints.displacement(0), Some(&set(&[0, 2, 4])));
    assert_eq!(constraints.displacement(1), Some(&set(&[1, 3, 5])));
    assert!(constraints.is_constrained(4));
    assert!(!constraints.is_constrained(6));
    assert!(!constraints.is_constrained(7));

    assert_eq!(
        constraints.dirichlet_facets(),
        &[BoundaryFacet::new(0, 2, BOTTOM), BoundaryFacet::new(0, 0, RIGHT)]
    );
    assert_eq!(constraints.neumann_facets(), &[BoundaryFacet::new(1, 0, TOP)]);
}

#[test]
fn inactive_dimensions_are_free() {
    let problem = generic_problem(json!({
        "dirichlet_boundary": [{ "id": BOTTOM, "value": [0.0, 0.0], "dimension": [true, false] }]
    }));
    let constraints = setup_bc(&unit_square_boundary(), &problem, &unit_square_bases(), &no_pressure()).unwrap();
    assert_eq!(constraints.displacement(0), Some(&set(&[0, 2])));
    assert!(constraints.displacement(1).unwrap().is_empty());
    assert!(constraints.displacement(2).is_none());
    assert_eq!(constraints.dirichlet_facets(), &[BoundaryFacet::new(0, 2, BOTTOM)]);
}

#[test]
fn tetrahedron_constrains_three_components() {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let bases = vec![SimplexP1Bases::<f64, U3>::from_vertices(vec![0, 1, 2, 3], vertices).unwrap()];
    // Facet k is opposite to vertex k and carries tag k + 1
    let mesh = TaggedBoundary::new(true, 1, (0..4).map(|k| BoundaryFacet::new(0, k, k as i32 + 1)).collect());
    let no_pressure: Vec<SimplexP1Bases<f64, U3>> = Vec::new();

    let cavity = ProblemRegistry::with_default_problems().get("DrivenCavity").unwrap();
    let constraints = setup_bc(&mesh, cavity.as_ref(), &bases, &no_pressure).unwrap();
    assert_eq!(constraints.field_dim(), 3);
    assert_eq!(constraints.displacement_dofs(), (0..12).collect());

    let problem = generic_problem(json!({
        "dirichlet_boundary": [{ "id": 1, "value": [0.0, 0.0, 0.0], "dimension": [true, false, true] }]
    }));
    let constraints = setup_bc(&mesh, &problem, &bases, &no_pressure).unwrap();
    assert_eq!(constraints.field_dim(), 3);
    assert_eq!(constraints.displacement(0), Some(&set(&[3, 6, 9])));
    assert!(constraints.displacement(1).unwrap().is_empty());
    assert_eq!(constraints.displacement(2), Some(&set(&[5, 8, 11])));
    assert!(constraints.displacement(3).is_none());
    assert!(!constraints.is_constrained(0));
    assert!(!constraints.is_constrained(7));
    assert_eq!(constraints.dirichlet_facets(), &[BoundaryFacet::new(0, 0, 1)]);
}

#[test]
fn setup_bc_is_idempotent() {
    let problem = generic_problem(json!({
        "dirichlet_boundary": [{ "id": BOTTOM, "value": [0.0, 0.0] }],
        "neumann_boundary": [{ "id": TOP, "value": [0.0, -1.0] }]
    }));
    let mesh = unit_square_boundary();
    let bases = unit_square_bases();
    let first = setup_bc(&mesh, &problem, &bases, &no_pressure()).unwrap();
    let second = setup_bc(&mesh, &problem, &bases, &no_pressure()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn pressure_tags_constrain_pressure_dofs() {
    let problem = generic_problem(json!({
        "dirichlet_boundary": [{ "id": BOTTOM, "value": [0.0, 0.0] }],
        "pressure_boundary": [LEFT]
    }));
    let bases = unit_square_bases();
    let constraints = setup_bc(&unit_square_boundary(), &problem, &bases, &bases).unwrap();
    assert_eq!(constraints.pressure_dofs(), &set(&[0, 3]));
    // The pressure tag does not make the facet Dirichlet for the displacement
    assert_eq!(constraints.displacement(0), Some(&set(&[0, 2])));
    assert_eq!(constraints.displacement(1), Some(&set(&[1, 3])));

    // Without pressure bases the pressure tags are ignored
    let constraints = setup_bc(&unit_square_boundary(), &problem, &bases, &no_pressure()).unwrap();
    assert!(constraints.pressure_dofs().is_empty());
}

#[test]
fn dirichlet_and_neumann_on_the_same_tag_is_rejected() {
    let problem = generic_problem(json!({
        "dirichlet_boundary": [{ "id": TOP, "value": [0.0, 0.0] }],
        "neumann_boundary": [{ "id": TOP, "value": [0.0, -1.0] }]
    }));
    let err = setup_bc(&unit_square_boundary(), &problem, &unit_square_bases(), &no_pressure()).unwrap_err();
    assert!(err.is_configuration());

    // A tag whose Dirichlet part is inactive in every dimension may carry a traction
    let problem = generic_problem(json!({
        "dirichlet_boundary": [
            { "id": BOTTOM, "value": [0.0, 0.0] },
            { "id": TOP, "value": [0.0, 0.0], "dimension": [false, false] }
        ],
        "neumann_boundary": [{ "id": TOP, "value": [0.0, -1.0] }]
    }));
    let constraints = setup_bc(&unit_square_boundary(), &problem, &unit_square_bases(), &no_pressure()).unwrap();
    assert_eq!(constraints.displacement_dofs(), set(&[0, 1, 2, 3]));
    assert_eq!(constraints.neumann_facets(), &[BoundaryFacet::new(1, 0, TOP)]);
}

#[test]
fn neumann_without_dirichlet_is_rejected() {
    let problem = generic_problem(json!({
        "neumann_boundary": [{ "id": TOP, "value": [0.0, -1.0] }]
    }));
    let err = setup_bc(&unit_square_boundary(), &problem, &unit_square_bases(), &no_pressure()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn inconsistent_mesh_data_is_a_domain_error() {
    let problem = ProblemRegistry::with_default_problems().get("Linear").unwrap();
    let bases = unit_square_bases();

    let out_of_range = TaggedBoundary::new(false, 2, vec![BoundaryFacet::new(5, 0, BOTTOM)]);
    let err = setup_bc(&out_of_range, problem.as_ref(), &bases, &no_pressure()).unwrap_err();
    assert!(err.is_domain());

    let bad_facet = TaggedBoundary::new(false, 2, vec![BoundaryFacet::new(0, 7, BOTTOM)]);
    let err = setup_bc(&bad_facet, problem.as_ref(), &bases, &no_pressure()).unwrap_err();
    assert!(err.is_domain());

    let err = setup_bc(&unit_square_boundary(), problem.as_ref(), &bases[..1], &no_pressure()).unwrap_err();
    assert!(err.is_domain());

    let err = setup_bc(&unit_square_boundary(), problem.as_ref(), &bases, &bases[..1]).unwrap_err();
    assert!(err.is_domain());
}
