//! Demo tight-binding models for the command line tool.

use clap::ValueEnum;
use num_complex::{Complex32, Complex64};
use rng::SeedRng;
use sparse::{Hamiltonian, SparseMatrix};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// Open chain of `size` sites
    Chain,
    /// `size` x `size` square lattice with open edges
    Square,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    F32,
    F64,
}

#[derive(Clone, Debug)]
pub struct ModelParams {
    pub model: Model,
    pub size: usize,
    pub hopping: f64,
    /// Uniform onsite disorder in [-W/2, W/2]
    pub disorder: f64,
    /// Peierls phase per plaquette, square lattice only
    pub flux: f64,
    pub seed: String,
}

impl ModelParams {
    pub fn sites(&self) -> usize {
        match self.model {
            Model::Chain => self.size,
            Model::Square => self.size * self.size,
        }
    }

    /// Site index at the middle of the sample.
    pub fn center(&self) -> usize {
        match self.model {
            Model::Chain => self.size / 2,
            Model::Square => (self.size / 2) * self.size + self.size / 2,
        }
    }

    fn triplets(&self) -> Vec<(usize, usize, Complex64)> {
        let mut rng = SeedRng::new(format!("{}-disorder", self.seed).as_bytes());
        let t = Complex64::new(self.hopping, 0.0);
        let mut out = Vec::new();

        let bond = |out: &mut Vec<(usize, usize, Complex64)>, i, j, t: Complex64| {
            out.push((i, j, t));
            out.push((j, i, t.conj()));
        };

        match self.model {
            Model::Chain => {
                for i in 0..self.size.saturating_sub(1) {
                    bond(&mut out, i, i + 1, t);
                }
            }
            Model::Square => {
                let n = self.size;
                for y in 0..n {
                    for x in 0..n {
                        let i = y * n + x;
                        if x + 1 < n {
                            bond(&mut out, i, i + 1, t);
                        }
                        if y + 1 < n {
                            let phase = Complex64::from_polar(1.0, self.flux * x as f64);
                            bond(&mut out, i, i + n, t * phase);
                        }
                    }
                }
            }
        }

        if self.disorder != 0.0 {
            for i in 0..self.sites() {
                let w = self.disorder * (rng.next_f64(b"onsite") - 0.5);
                out.push((i, i, Complex64::new(w, 0.0)));
            }
        }
        out
    }

    pub fn build(&self, precision: Precision, complex: bool) -> Result<Hamiltonian, String> {
        if self.sites() == 0 {
            return Err("the model has no sites".to_string());
        }
        if self.flux != 0.0 && !complex {
            return Err("--flux needs --complex".to_string());
        }

        let n = self.sites();
        let triplets = self.triplets();
        let h = match (precision, complex) {
            (Precision::F64, true) => SparseMatrix::from_triplets(n, n, triplets).into(),
            (Precision::F32, true) => SparseMatrix::from_triplets(
                n,
                n,
                triplets
                    .into_iter()
                    .map(|(i, j, v)| (i, j, Complex32::new(v.re as f32, v.im as f32))),
            )
            .into(),
            (Precision::F64, false) => {
                SparseMatrix::from_triplets(n, n, triplets.into_iter().map(|(i, j, v)| (i, j, v.re)))
                    .into()
            }
            (Precision::F32, false) => SparseMatrix::from_triplets(
                n,
                n,
                triplets.into_iter().map(|(i, j, v)| (i, j, v.re as f32)),
            )
            .into(),
        };
        Ok(h)
    }
}
