//! Parallel assembly of local blocks into global triplet lists.
//!
//! Each element only reads its own assembly values and the (shared, read-only) assembler, so
//! elements are processed independently on the rayon thread pool. Every element produces its
//! own list of `(row, col, value)` triplets; the lists are concatenated without combining
//! duplicates. A degree of freedom shared by several elements therefore appears once per incident
//! element, and the consumer (sparse matrix construction) must *sum* duplicate entries.
use crate::allocators::DimAllocator;
use crate::assembly::local::{ElementAssemblyValues, LocalBlockAssembler};
use crate::error::Error;
use crate::{Real, SmallDim};
use eyre::WrapErr;
use log::debug;
use nalgebra::allocator::Allocator;
use nalgebra::{DMatrix, DefaultAllocator, DimName};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// A single entry of a sparse matrix in coordinate format.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triplet<T> {
    pub row: usize,
    pub col: usize,
    pub value: T,
}

/// Offsets of a block within a larger (e.g. saddle-point) system.
///
/// For a displacement/pressure system with `n_u` displacement DOFs, the pressure rows and
/// columns start at `n_u`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BlockOffset {
    pub row: usize,
    pub col: usize,
}

impl BlockOffset {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Assembles the triplets of one block of a bilinear form over all elements in parallel.
///
/// `test_values[e]` and `trial_values[e]` must describe the same element with the same
/// quadrature; for a block on a single field (e.g. displacement-displacement) pass the same slice
/// twice. Global row indices are `offset.row + test_node * BlockRows + r` and analogously for
/// columns.
///
/// Any error of the local assembler aborts the whole pass; the returned report wraps the
/// underlying [`Error`], which can be recovered with `downcast_ref`.
pub fn assemble_block_triplets<T, D, A>(
    assembler: &A,
    test_values: &[ElementAssemblyValues<T, D>],
    trial_values: &[ElementAssemblyValues<T, D>],
    offset: BlockOffset,
) -> eyre::Result<Vec<Triplet<T>>>
where
    T: Real,
    D: SmallDim,
    A: LocalBlockAssembler<T, D>,
    DefaultAllocator: DimAllocator<T, D> + Allocator<T, A::BlockRows, A::BlockCols>,
    ElementAssemblyValues<T, D>: Sync,
{
    if test_values.len() != trial_values.len() {
        return Err(Error::domain(format!(
            "test space has {} elements but trial space has {}",
            test_values.len(),
            trial_values.len()
        ))
        .into());
    }

    let per_element = test_values
        .par_iter()
        .zip(trial_values.par_iter())
        .map(|(test, trial)| {
            assemble_element_triplets(assembler, test, trial, offset)
                .wrap_err_with(|| format!("failed to assemble element {}", test.element_id()))
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    let triplets: Vec<_> = per_element.into_iter().flatten().collect();
    debug!(
        "Assembled {} triplets from {} elements at offset ({}, {})",
        triplets.len(),
        test_values.len(),
        offset.row,
        offset.col
    );
    Ok(triplets)
}

/// Assembles all triplets of a single element.
pub fn assemble_element_triplets<T, D, A>(
    assembler: &A,
    test: &ElementAssemblyValues<T, D>,
    trial: &ElementAssemblyValues<T, D>,
    offset: BlockOffset,
) -> Result<Vec<Triplet<T>>, Error>
where
    T: Real,
    D: SmallDim,
    A: LocalBlockAssembler<T, D>,
    DefaultAllocator: DimAllocator<T, D> + Allocator<T, A::BlockRows, A::BlockCols>,
{
    if test.element_id() != trial.element_id() {
        return Err(Error::domain(format!(
            "test values of element {} paired with trial values of element {}",
            test.element_id(),
            trial.element_id()
        )));
    }
    if test.quadrature_vector().len() != trial.quadrature_vector().len() {
        return Err(Error::domain(format!(
            "test and trial values of element {} use different quadratures",
            test.element_id()
        )));
    }

    let r = A::BlockRows::dim();
    let c = A::BlockCols::dim();
    let da = test.quadrature_vector().as_slice();
    let mut triplets = Vec::with_capacity(test.num_bases() * trial.num_bases() * r * c);
    for i in 0..test.num_bases() {
        let row_node = test.basis(i).global_index();
        for j in 0..trial.num_bases() {
            let col_node = trial.basis(j).global_index();
            let block = assembler.assemble_block(test, trial, i, j, da)?;
            for b in 0..c {
                for a in 0..r {
                    triplets.push(Triplet {
                        row: offset.row + row_node * r + a,
                        col: offset.col + col_node * c + b,
                        value: block[(a, b)],
                    });
                }
            }
        }
    }
    Ok(triplets)
}

/// Sums triplets into a dense matrix. Intended for small systems and tests.
pub fn triplets_to_dense<T: Real>(
    nrows: usize,
    ncols: usize,
    triplets: &[Triplet<T>],
) -> eyre::Result<DMatrix<T>> {
    let mut matrix = DMatrix::from_element(nrows, ncols, T::zero());
    for t in triplets {
        if t.row >= nrows || t.col >= ncols {
            return Err(Error::domain(format!(
                "triplet ({}, {}) out of bounds for a {}x{} matrix",
                t.row, t.col, nrows, ncols
            ))
            .into());
        }
        matrix[(t.row, t.col)] += t.value;
    }
    Ok(matrix)
}
