use num_complex::Complex64;
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub fn write_density(path: &str, energy: &[f64], values: &[f64]) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "energy,density")?;
    for (e, v) in energy.iter().zip(values) {
        writeln!(f, "{},{}", e, v)?;
    }
    f.flush()
}

pub fn write_greens(
    path: &str,
    row: usize,
    cols: &[usize],
    energy: &[f64],
    values: &[Vec<Complex64>],
) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "row,col,energy,re,im")?;
    for (col, g) in cols.iter().zip(values) {
        for (e, v) in energy.iter().zip(g) {
            writeln!(f, "{},{},{},{},{}", row, col, e, v.re, v.im)?;
        }
    }
    f.flush()
}

/// One line per (broadening, energy) point of a broadening sweep.
pub struct SweepRow {
    pub broadening: f64,
    pub num_moments: usize,
    pub energy: f64,
    pub density: f64,
}

pub fn write_sweep(path: &str, rows: &[SweepRow]) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "broadening,num_moments,energy,density")?;
    for r in rows {
        writeln!(f, "{},{},{},{}", r.broadening, r.num_moments, r.energy, r.density)?;
    }
    f.flush()
}
