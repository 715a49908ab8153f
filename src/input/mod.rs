//! Parse input configuration file

use std::path::Path;
use yaml_rust::{YamlLoader, yaml::Yaml};
use evalexpr::*;

use crate::constants::*;

mod error;
mod types;

pub use error::*;
pub use types::*;

/// Represents the input configuration, which defines values
/// for simulation parameters, and any automatic values
/// for those parameters.
pub struct Config {
    input: Yaml,
    ctx: HashMapContext,
}

impl Config {
    /// Loads a configuration file.
    /// Fails if the file cannot be opened or if it is not
    /// YAML-formatted.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let name = path.display().to_string();
        let contents = std::fs::read_to_string(path)
            .map_err(|_| InputError::file(&name))?;
        Self::parse(&contents, &name)
    }

    /// Loads a YAML configuration from a string.
    /// Fails if the string is not formatted correctly.
    pub fn from_string(s: &str) -> Result<Self, InputError> {
        Self::parse(s, "<string>")
    }

    fn parse(s: &str, name: &str) -> Result<Self, InputError> {
        let input = YamlLoader::load_from_str(s)
            .map_err(|_| InputError::file(name))?;
        let input = input.first()
            .ok_or_else(|| InputError::file(name))?;

        Ok(Config {
            input: input.clone(),
            ctx: HashMapContext::new(),
        })
    }

    /// Loads automatic values for constants, special functions
    /// and keywords.
    /// Also loads and evaluates mathematical expressions
    /// that are given in the specified `section`.
    pub fn with_context(&mut self, section: &str) -> Result<&mut Self, InputError> {
        use helper::context_function;

        let mut ctx = context_map! {
            "m" => ELECTRON_MASS,
            "me" => ELECTRON_MASS,
            "mp" => PROTON_MASS,
            "c" => SPEED_OF_LIGHT,
            "e" => ELECTRON_CHARGE,
            "qe" => ELECTRON_CHARGE,
            "eV" => ELEMENTARY_CHARGE,
            "keV" => 1.0e3 * ELEMENTARY_CHARGE,
            "MeV" => 1.0e6 * ELEMENTARY_CHARGE,
            "GeV" => 1.0e9 * ELEMENTARY_CHARGE,
            "alpha" => ALPHA_FINE,
            "femto" => 1.0e-15,
            "pico" => 1.0e-12,
            "nano" => 1.0e-9,
            "micro" => 1.0e-6,
            "milli" => 1.0e-3,
            "pi" => std::f64::consts::PI,
        }.map_err(|_| InputError::conversion(section, "built-in constants"))?;

        context_function!(ctx, section, "sqrt",   f64::sqrt);
        context_function!(ctx, section, "cbrt",   f64::cbrt);
        context_function!(ctx, section, "abs",    f64::abs);
        context_function!(ctx, section, "exp",    f64::exp);
        context_function!(ctx, section, "ln",     f64::ln);
        context_function!(ctx, section, "log10",  f64::log10);
        context_function!(ctx, section, "sinh",   f64::sinh);
        context_function!(ctx, section, "cosh",   f64::cosh);
        context_function!(ctx, section, "tanh",   f64::tanh);
        context_function!(ctx, section, "floor",  f64::floor);
        context_function!(ctx, section, "ceil",   f64::ceil);

        // angular frequency [s^-1] for given wavelength [m]
        context_function!(ctx, section, "omega", |wavelength: f64| 2.0 * std::f64::consts::PI * SPEED_OF_LIGHT / wavelength);
        // normalized field amplitude for given SI field [V/m] and wavelength [m]
        context_function!(ctx, section, "a0", |field: f64, wavelength: f64| {
            let omega = 2.0 * std::f64::consts::PI * SPEED_OF_LIGHT / wavelength;
            ELEMENTARY_CHARGE * field / (ELECTRON_MASS * SPEED_OF_LIGHT * omega)
        }, 2);

        self.ctx = ctx;

        // Read in from 'constants' block if it exists
        if self.input[section].is_badvalue() {
            return Ok(self);
        }

        let block = self.input[section].as_hash()
            .ok_or_else(|| InputError::conversion(section, section))?;

        for (a, b) in block {
            // grab the value, if possible
            let (key, value) = match (a, b) {
                (Yaml::String(k), Yaml::Integer(i)) => (Some(k), Some(*i as f64)),
                (Yaml::String(k), Yaml::Real(s)) => (Some(k), s.parse::<f64>().ok()),
                (Yaml::String(k), Yaml::String(s)) => (Some(k), eval_number_with_context(s, &self.ctx).ok()),
                _ => (None, None),
            };

            // insert it into the context so it's available for the next read
            match (key, value) {
                (Some(k), Some(v)) => {
                    self.ctx.set_value(k.clone(), Value::from(v))
                        .map_err(|_| {
                            eprintln!("Failed to insert {} = {} from constants block into context.", k, v);
                            InputError::conversion(section, k)
                        })?
                },
                // found a key, value pair but parsing failed
                (Some(k), None) => return Err(InputError::conversion(section, k)),
                _ => {},
            }
        }

        Ok(self)
    }

    /// Locates a key-value pair in the configuration file and attempts
    /// to parse the value as the specified type.
    /// The path to the key-value pair is specified by a string of colon-separated
    /// sections, e.g. `'section:subsection:subsubsection:key'`.
    pub fn read<T, S>(&self, path: S) -> Result<T, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        let path = path.as_ref();
        let address: Vec<&str> = path.split(':').collect();
        let value = address.iter()
          .try_fold(&self.input, |y, s| {
              if y[*s].is_badvalue() {
                  Err(InputError::location(path, s))
              } else {
                  Ok(&y[*s])
              }
          })?;
        let key = address.last().copied().unwrap_or(path);
        T::from_yaml(value.clone(), &self.ctx)
            .map_err(|_| InputError::conversion(path, key))
    }

    /// Like `Config::read`, but a missing key yields `Ok(None)`.
    /// A key that is present but cannot be converted is still an error.
    pub fn read_optional<T, S>(&self, path: S) -> Result<Option<T>, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        match self.read(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == InputErrorKind::Location => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parses a string argument and evaluates it using the default context. Extends
    /// ```
    /// let arg = "2.0";
    /// let val = arg.parse::<f64>().unwrap();
    /// ```
    /// to handle mathematical expressions, e.g.
    /// ```ignore
    /// let arg = "2.0 / (1.0 + gamma)";
    /// let val = input.evaluate(arg).unwrap();
    /// ```
    /// where 'gamma' is specified in the input file.
    pub fn evaluate<S: AsRef<str>>(&self, arg: S) -> Option<f64> {
        eval_number_with_context(arg.as_ref(), &self.ctx).ok()
    }
}

mod helper {
    macro_rules! context_function {
        ($ctx:expr, $section:expr, $name:literal, $func:expr) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let x = arg.as_number()?;
                    Ok(Value::Float($func(x)))
                })
            ).map_err(|_| InputError::conversion($section, $name))?
        };
        ($ctx:expr, $section:expr, $name:literal, $func:expr, 2) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let arg = arg.as_fixed_len_tuple(2)?;
                    let x = arg[0].as_number()?;
                    let y = arg[1].as_number()?;
                    Ok(Value::Float($func(x, y)))
                })
            ).map_err(|_| InputError::conversion($section, $name))?
        };
    }

    pub(super) use context_function;
}
