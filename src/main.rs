use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;

use dotterel::constants::*;
use dotterel::exec::Backend;
use dotterel::fields::FieldSamples;
use dotterel::geometry::ThreeVector;
use dotterel::input::{Config, InputError};
use dotterel::particles::Particles;
use dotterel::radiation::*;
use dotterel::tables::{CrossSection, NielH, RadiationTables};
use dotterel::units::Normalization;

/// Parameters of the run that are not specific to the radiation model
struct Control {
    dt: f64,
    steps: usize,
    backend: Backend,
    seed: u64,
}

impl Control {
    fn from_config(input: &Config) -> Result<Self, InputError> {
        let dt: f64 = input.read("control:dt")?;
        if !(dt > 0.0) {
            return Err(InputError::invalid("control:dt", "must be positive"));
        }

        let steps: usize = input.read("control:steps")?;

        let lanes: Option<usize> = input.read_optional("control:lanes")?;
        let backend = match input.read_optional::<String, _>("control:backend")?.as_deref() {
            None | Some("threads") => lanes.map(|lanes| Backend::Threads { lanes }).unwrap_or_else(Backend::threads),
            Some("accelerator") => Backend::Accelerator,
            Some(other) => return Err(InputError::invalid("control:backend", &format!("'{}' is neither 'threads' nor 'accelerator'", other))),
        };

        if backend == (Backend::Threads { lanes: 0 }) {
            return Err(InputError::invalid("control:lanes", "must be at least 1"));
        }

        let seed = input.read_optional("control:seed")?.unwrap_or(0);

        Ok(Control { dt, steps, backend, seed })
    }
}

/// A monoenergetic (or Gaussian-distributed) beam moving along x.
struct Beam {
    n: usize,
    gamma: f64,
    sigma: f64,
    weight: f64,
    charge: i16,
    mass: f64,
    photons: bool,
}

impl Beam {
    fn from_config(input: &Config) -> Result<Self, InputError> {
        let n: usize = input.read("beam:n")?;
        let gamma: f64 = input.read("beam:gamma")?;
        if !(gamma >= 1.0) {
            return Err(InputError::invalid("beam:gamma", "must be at least 1"));
        }

        let sigma: f64 = input.read_optional("beam:sigma")?.unwrap_or(0.0);
        if !(sigma >= 0.0) {
            return Err(InputError::invalid("beam:sigma", "must be non-negative"));
        }

        let weight: f64 = input.read_optional("beam:weight")?.unwrap_or(1.0);
        if !(weight > 0.0) {
            return Err(InputError::invalid("beam:weight", "must be positive"));
        }

        let charge: i64 = input.read_optional("beam:charge")?.unwrap_or(-1);
        if charge == 0 || charge.abs() > i16::MAX as i64 {
            return Err(InputError::invalid("beam:charge", "must be a non-zero multiple of the elementary charge"));
        }

        let mass: f64 = input.read_optional("beam:mass")?.unwrap_or(1.0);
        if !(mass > 0.0) {
            return Err(InputError::invalid("beam:mass", "must be positive"));
        }

        let photons = input.read_optional("beam:photons")?.unwrap_or(false);

        Ok(Beam { n, gamma, sigma, weight, charge: charge as i16, mass, photons })
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Particles {
        let mut particles = Particles::new(3, self.mass);
        for _ in 0..self.n {
            let gamma = (self.gamma + self.sigma * rng.sample::<f64,_>(StandardNormal)).max(1.0);
            let p = (gamma * gamma - 1.0).sqrt();
            particles.push(ThreeVector::zero(), ThreeVector::new(p, 0.0, 0.0), self.weight, self.charge);
        }
        particles
    }
}

fn relative_to(input_path: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        file.to_owned()
    } else {
        input_path.parent().unwrap_or_else(|| Path::new(".")).join(file)
    }
}

fn run(path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(path);
    let mut input = Config::from_file(path)?;
    input.with_context("constants")?;

    let control = Control::from_config(&input)?;
    let wavelength: f64 = input.read("units:wavelength")?;
    let norm = Normalization::from_wavelength(wavelength);

    let tables_path: String = input.read("radiation:tables")?;
    let tables_path = relative_to(path, &tables_path);
    println!("{} radiation tables from {}...", "Loading".bold().cyan(), tables_path.display().to_string().bold().blue());
    let mut tables = RadiationTables::from_file(&tables_path, norm)?;

    let chi_cont: Option<f64> = input.read_optional("radiation:minimum_chi_continuous")?;
    let chi_disc: Option<f64> = input.read_optional("radiation:minimum_chi_discontinuous")?;
    if chi_cont.is_some() || chi_disc.is_some() {
        let chi_cont = chi_cont.unwrap_or_else(|| tables.minimum_chi_continuous());
        let chi_disc = chi_disc.unwrap_or_else(|| tables.minimum_chi_discontinuous());
        tables = tables.try_with_thresholds(chi_cont, chi_disc)?;
    }

    let config = RadiationConfig::from_config(&input)?;
    if config.niel_h == NielH::Table && !tables.has_niel_table() {
        eprintln!("{} no h(χ) table in {}, falling back to the fit.", "Warning:".bold().yellow(), tables_path.display());
    }
    let model = Model::new(&config);

    let beam = Beam::from_config(&input)?;
    if beam.photons && !model.kind().is_discontinuous() {
        eprintln!("{} the {} model does not create photons.", "Warning:".bold().yellow(), model.kind());
    }
    let e: ThreeVector = input.read("field:E")?;
    let b: ThreeVector = input.read("field:B")?;
    let output: Option<String> = input.read_optional("output:photons")?;

    let mut master = Xoshiro256StarStar::seed_from_u64(control.seed);
    let mut particles = beam.generate(&mut master);
    let mut photons = Particles::photons(3, beam.mass);
    let fields = FieldSamples::uniform(e, b, particles.len());

    println!(
        "{} {} particles with the {} model, {} steps of dt = {:.3e}, using {:?}.",
        "Running".bold().cyan(), particles.len(), model.kind().to_string().bold(),
        control.steps, control.dt, control.backend,
    );

    let initial_energy = particles.total_energy();
    let mut radiated_energy = 0.0;
    let start = Instant::now();

    let pb = ProgressBar::new(control.steps as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} steps")?
            .progress_chars("##-")
    );

    for _ in 0..control.steps {
        let streams = control.backend.split_streams(&mut master);
        let range = 0..particles.len();
        let batch = Batch {
            particles: &mut particles,
            range,
            fields: &fields,
            photons: if beam.photons { Some(&mut photons) } else { None },
            dt: control.dt,
            backend: control.backend,
        };
        model.apply(batch, &tables, &streams, &mut radiated_energy);
        pb.inc(1);
    }

    pb.finish_and_clear();
    let elapsed = start.elapsed();

    let radiated_energy = radiated_energy * beam.mass * ELECTRON_MASS_MEV;
    let final_energy = particles.total_energy();
    println!("{} in {:.3} s.", "Completed".bold().bright_green(), elapsed.as_secs_f64());
    println!("\tparticle energy: {:.6e} -> {:.6e} MeV", initial_energy, final_energy);
    println!("\tradiated energy: {:.6e} MeV", radiated_energy);
    println!("\tphoton energy:   {:.6e} MeV in {} macrophotons", photons.total_energy(), photons.len());

    if let Some(file) = output {
        let file = relative_to(path, &file);
        let mut writer = BufWriter::new(File::create(&file)?);
        writeln!(writer, "# E (MeV)\tx\ty\tz\tp_x\tp_y\tp_z (m c)\tweight\tchi")?;
        for i in 0..photons.len() {
            writeln!(writer, "{}", photons.entry(i))?;
        }
        writer.flush()?;
        println!("{} {} photons to {}.", "Wrote".bold().cyan(), photons.len(), file.display().to_string().bold().blue());
    }

    Ok(())
}

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("{} dotterel <input.yml>", "Usage:".bold());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&path) {
        eprintln!("{} {}", "Error:".bold().red(), e);
        std::process::exit(1);
    }
}
