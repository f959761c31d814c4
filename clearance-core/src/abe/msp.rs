//! Monotone span programs.
//!
//! Each row of the matrix is labelled with an attribute. A set of attributes
//! satisfies the program when the rows it owns span the target vector
//! `(1, 0, ..., 0)`.

use super::Error;
use crate::{
    crypto::{Scalar, pairing::scalar_from_i64},
    policy::{AccessPolicy, QualifiedAttribute},
};
use bls12_381_plus::ff::Field;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msp {
    pub(crate) matrix: Vec<Vec<i64>>,
    pub(crate) labels: Vec<QualifiedAttribute>,
}

impl Msp {
    /// Lewko-Waters conversion of a boolean formula.
    ///
    /// OR nodes copy the parent vector to both children; AND nodes split it
    /// into `(v | 1)` and `(0, ..., 0 | -1)` on a fresh column.
    #[must_use]
    pub fn from_policy(policy: &AccessPolicy) -> Self {
        fn build(
            node: &AccessPolicy,
            vector: Vec<i64>,
            columns: &mut usize,
            rows: &mut Vec<(Vec<i64>, QualifiedAttribute)>,
        ) {
            match node {
                AccessPolicy::Term(attr) => rows.push((vector, attr.clone())),
                AccessPolicy::Disjunction(lhs, rhs) => {
                    build(lhs, vector.clone(), columns, rows);
                    build(rhs, vector, columns, rows);
                },
                AccessPolicy::Conjunction(lhs, rhs) => {
                    let mut left = vector;
                    left.resize(*columns, 0);
                    left.push(1);
                    let mut right = vec![0; *columns];
                    right.push(-1);
                    *columns += 1;
                    build(lhs, left, columns, rows);
                    build(rhs, right, columns, rows);
                },
            }
        }

        let mut columns = 1;
        let mut rows = Vec::new();
        build(policy, vec![1], &mut columns, &mut rows);

        let (matrix, labels) = rows
            .into_iter()
            .map(|(mut row, label)| {
                row.resize(columns, 0);
                (row, label)
            })
            .unzip();
        Self { matrix, labels }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.matrix.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn label(&self, row: usize) -> &QualifiedAttribute {
        &self.labels[row]
    }

    /// Shares `M_i · v` of the secret vector `v` (`v[0]` is the secret).
    pub fn shares(&self, v: &[Scalar]) -> Result<Vec<Scalar>, Error> {
        if v.len() != self.columns() {
            return Err(Error::Deserialization(format!(
                "share vector has {} entries, the program has {} columns",
                v.len(),
                self.columns()
            )));
        }
        Ok(self
            .matrix
            .iter()
            .map(|row| {
                row.iter()
                    .zip(v)
                    .fold(Scalar::ZERO, |acc, (m, x)| acc + scalar_from_i64(*m) * x)
            })
            .collect())
    }

    /// Reconstruction coefficients over the rows whose labels are `owned`.
    ///
    /// Returns `(row, ω)` pairs with `Σ ω·M_row = (1, 0, ..., 0)`, or `None`
    /// when the owned rows do not span the target.
    #[must_use]
    pub fn solve(&self, owned: &HashSet<QualifiedAttribute>) -> Option<Vec<(usize, Scalar)>> {
        let candidates = (0..self.rows())
            .filter(|i| owned.contains(&self.labels[*i]))
            .collect::<Vec<_>>();
        let unknowns = candidates.len();
        let equations = self.columns();

        // augmented system Mᵀ·ω = e₁, one equation per column
        let mut system = (0..equations)
            .map(|j| {
                let mut eq = candidates
                    .iter()
                    .map(|i| scalar_from_i64(self.matrix[*i][j]))
                    .collect::<Vec<_>>();
                eq.push(if j == 0 { Scalar::ONE } else { Scalar::ZERO });
                eq
            })
            .collect::<Vec<_>>();

        let mut pivots = Vec::new();
        let mut row = 0;
        for col in 0..unknowns {
            let Some(p) = (row..equations).find(|r| !bool::from(system[*r][col].is_zero())) else {
                continue;
            };
            system.swap(row, p);

            let inv = Option::<Scalar>::from(system[row][col].invert())?;
            for x in system[row].iter_mut() {
                *x *= inv;
            }
            for r in 0..equations {
                if r != row && !bool::from(system[r][col].is_zero()) {
                    let factor = system[r][col];
                    for c in col..=unknowns {
                        let delta = factor * system[row][c];
                        system[r][c] -= delta;
                    }
                }
            }
            pivots.push(col);
            row += 1;
            if row == equations {
                break;
            }
        }

        // a remaining equation 0 = b with b ≠ 0 means the target is not spanned
        if system[row..].iter().any(|eq| !bool::from(eq[unknowns].is_zero())) {
            return None;
        }

        Some(
            pivots
                .into_iter()
                .enumerate()
                .filter(|(r, _)| !bool::from(system[*r][unknowns].is_zero()))
                .map(|(r, col)| (candidates[col], system[r][unknowns]))
                .collect(),
        )
    }
}
