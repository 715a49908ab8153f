//! Reads a table set from a YAML file

use std::path::Path;

use crate::input::{Config, InputError};
use crate::units::Normalization;
use super::*;

impl RadiationTables {
    /// Loads the yield table, the photon χ distribution and, if present,
    /// the Niel h(χ) table and the regime thresholds from the YAML file
    /// at `path`.
    pub fn from_file(path: &Path, norm: Normalization) -> Result<Self, InputError> {
        let config = Config::from_file(path)?;
        Self::from_config(&config, norm)
    }

    /// As `RadiationTables::from_file`, but the table set is given as a string.
    pub fn from_string(s: &str, norm: Normalization) -> Result<Self, InputError> {
        let config = Config::from_string(s)?;
        Self::from_config(&config, norm)
    }

    fn from_config(config: &Config, norm: Normalization) -> Result<Self, InputError> {
        let production = read_table1d(config, "yield")?;

        let log10_min: f64 = config.read("photon_chi:log10_chi_min")?;
        let log10_max: f64 = config.read("photon_chi:log10_chi_max")?;
        let columns: usize = config.read("photon_chi:size_photon_chi")?;
        let mins: Vec<f64> = config.read("photon_chi:log10_min_photon_chi")?;
        let cdf: Vec<f64> = config.read("photon_chi:cdf")?;
        let photon_chi = CumulativeTable::new(log10_min, log10_max, columns, mins, cdf)
            .map_err(|e| InputError::invalid("photon_chi", &e.to_string()))?;

        let mut tables = RadiationTables::new(norm, production, photon_chi);

        if config.read_optional::<f64, _>("niel:log10_chi_min")?.is_some() {
            let niel = read_table1d(config, "niel")?;
            tables = tables.with_niel_table(niel);
        }

        let chi_cont = config.read_optional("thresholds:minimum_chi_continuous")?
            .unwrap_or(DEFAULT_MINIMUM_CHI_CONTINUOUS);
        let chi_disc = config.read_optional("thresholds:minimum_chi_discontinuous")?
            .unwrap_or(DEFAULT_MINIMUM_CHI_DISCONTINUOUS);

        tables.try_with_thresholds(chi_cont, chi_disc)
    }

    /// As `RadiationTables::with_thresholds`, but fails unless
    /// 0 <= `minimum_chi_continuous` <= `minimum_chi_discontinuous`.
    /// NaN thresholds are rejected.
    pub fn try_with_thresholds(self, minimum_chi_continuous: f64, minimum_chi_discontinuous: f64) -> Result<Self, InputError> {
        if !(minimum_chi_continuous >= 0.0 && minimum_chi_discontinuous >= minimum_chi_continuous) {
            return Err(InputError::invalid(
                "thresholds",
                &format!("require 0 <= minimum_chi_continuous ({}) <= minimum_chi_discontinuous ({})", minimum_chi_continuous, minimum_chi_discontinuous)
            ));
        }
        Ok(self.with_thresholds(minimum_chi_continuous, minimum_chi_discontinuous))
    }
}

fn read_table1d(config: &Config, section: &str) -> Result<Table1D, InputError> {
    let log10_min: f64 = config.read(format!("{}:log10_chi_min", section))?;
    let log10_max: f64 = config.read(format!("{}:log10_chi_max", section))?;
    let values: Vec<f64> = config.read(format!("{}:values", section))?;
    Table1D::new(section, log10_min, log10_max, values)
        .map_err(|e| InputError::invalid(section, &e.to_string()))
}
