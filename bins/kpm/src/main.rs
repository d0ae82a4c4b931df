use clap::{Parser, ValueEnum};
use kpm::{kpm, Config, DomainPolicy, Kernel, Kpm, MatrixFormat};
use std::fs::File;
use std::io::BufReader;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

mod lattice;
mod output;

use lattice::{Model, ModelParams, Precision};
use output::SweepRow;

/// Kernel Polynomial Method spectra of tight-binding demo models
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Quantity to compute
    #[arg(long, value_enum, default_value_t = Mode::Ldos)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = Model::Square)]
    model: Model,

    /// Chain length or square lattice side
    #[arg(long, default_value_t = 64)]
    size: usize,

    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    hopping: f64,

    /// Width of the uniform onsite disorder
    #[arg(long, default_value_t = 0.0)]
    disorder: f64,

    /// Peierls phase per plaquette (needs --complex)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    flux: f64,

    #[arg(long, value_enum, default_value_t = Precision::F64)]
    precision: Precision,

    /// Store the Hamiltonian with complex scalars
    #[arg(long)]
    complex: bool,

    /// Target site for ldos, row for greens (default: sample center)
    #[arg(long)]
    index: Option<usize>,

    /// Comma-separated Green's function columns (default: the row itself)
    #[arg(long)]
    cols: Option<String>,

    /// Energy resolution; comma-separated list in sweep mode
    #[arg(long, default_value = "0.05")]
    broadening: String,

    /// Number of energy points
    #[arg(long, default_value_t = 200)]
    points: usize,

    /// Explicit spectrum bounds, given together
    #[arg(long, allow_hyphen_values = true)]
    emin: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    emax: Option<f64>,

    #[arg(long, value_enum)]
    kernel: Option<KernelChoice>,

    /// Lorentz kernel resolution parameter
    #[arg(long, default_value_t = 4.0)]
    lambda: f64,

    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Random starters for the total DOS
    #[arg(long)]
    num_random: Option<usize>,

    /// Evaluate out-of-range energies at the domain edge instead of failing
    #[arg(long)]
    clamp: bool,

    /// JSON strategy configuration; flags override its fields
    #[arg(long)]
    config: Option<String>,

    /// RNG seed for disorder, starters and Lanczos (default: the config's)
    #[arg(long)]
    seed: Option<String>,

    /// Number of Rayon worker threads (0 = Rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output CSV path
    #[arg(long, default_value = "kpm.csv")]
    out: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Dos,
    Ldos,
    Greens,
    /// LDOS at every broadening of the list
    Sweep,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KernelChoice {
    Jackson,
    Lorentz,
    Dirichlet,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Csr,
    Ell,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    if args.threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
        {
            eprintln!("failed to build Rayon thread pool: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let params = ModelParams {
        model: args.model,
        size: args.size,
        hopping: args.hopping,
        disorder: args.disorder,
        flux: args.flux,
        seed: config.seed.clone(),
    };
    let h = params.build(args.precision, args.complex)?;
    info!(
        model = ?args.model,
        sites = h.rows(),
        nnz = h.nnz(),
        kind = %h.kind(),
        "hamiltonian built"
    );

    let mut strategy = kpm(&h, config)?;
    let energy = energy_grid(strategy.as_ref(), args.points);
    let broadenings = parse_list::<f64>(&args.broadening)?;
    let index = args.index.unwrap_or_else(|| params.center());

    match args.mode {
        Mode::Dos => {
            let dos = strategy.dos(&energy, first(&broadenings)?)?;
            output::write_density(&args.out, &energy, &dos)?;
        }
        Mode::Ldos => {
            let ldos = strategy.ldos(index, &energy, first(&broadenings)?)?;
            output::write_density(&args.out, &energy, &ldos)?;
        }
        Mode::Greens => {
            let cols = match &args.cols {
                Some(list) => parse_list::<usize>(list)?,
                None => vec![index],
            };
            if cols.is_empty() {
                return Err("cols must contain at least one index".into());
            }
            let g = strategy.greens_vector(index, &cols, &energy, first(&broadenings)?)?;
            output::write_greens(&args.out, index, &cols, &energy, &g)?;
        }
        Mode::Sweep => {
            let mut rows = Vec::new();
            for &broadening in &broadenings {
                let ldos = strategy.ldos(index, &energy, broadening)?;
                let num_moments = strategy.stats().num_moments;
                println!("{:>8} {}", broadening, strategy.report(true));
                rows.extend(energy.iter().zip(ldos).map(|(&e, d)| SweepRow {
                    broadening,
                    num_moments,
                    energy: e,
                    density: d,
                }));
            }
            output::write_sweep(&args.out, &rows)?;
        }
    }

    if !matches!(args.mode, Mode::Sweep) {
        println!("{}", strategy.report(true));
    }
    print!("{}", strategy.report(false));
    info!(out = %args.out, points = energy.len(), "results written");
    Ok(())
}

fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config: Config = match &args.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => Config::default(),
    };
    if let Some(seed) = &args.seed {
        config.seed = seed.clone();
    }

    match (args.emin, args.emax) {
        (Some(min), Some(max)) => {
            config.min_energy = min;
            config.max_energy = max;
        }
        (None, None) => {}
        _ => return Err("--emin and --emax must be given together".into()),
    }
    if let Some(kernel) = args.kernel {
        config.kernel = match kernel {
            KernelChoice::Jackson => Kernel::Jackson,
            KernelChoice::Lorentz => Kernel::lorentz(args.lambda),
            KernelChoice::Dirichlet => Kernel::Dirichlet,
        };
    }
    if let Some(format) = args.format {
        config.matrix_format = match format {
            Format::Csr => MatrixFormat::Csr,
            Format::Ell => MatrixFormat::Ell,
        };
    }
    if let Some(n) = args.num_random {
        config.num_random = n;
    }
    if args.clamp {
        config.domain = DomainPolicy::Clamp;
    }
    config.validate()?;
    Ok(config)
}

/// `points` energies at the cell centers of the spectrum bounds.
fn energy_grid(strategy: &dyn Kpm, points: usize) -> Vec<f64> {
    let bounds = strategy.bounds();
    let (min, max) = (bounds.min(), bounds.max());
    let step = (max - min) / points as f64;
    (0..points).map(|i| min + step * (i as f64 + 0.5)).collect()
}

fn first(values: &[f64]) -> Result<f64, String> {
    values
        .first()
        .copied()
        .ok_or_else(|| "broadening must contain at least one value".to_string())
}

fn parse_list<T: std::str::FromStr>(s: &str) -> Result<Vec<T>, String>
where
    T::Err: std::fmt::Display,
{
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| format!("invalid list value '{}': {}", v, e))
        })
        .collect()
}
