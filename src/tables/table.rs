//! Tabulated functions of the particle quantum parameter

use super::TableError;

/// Uniformly spaced sample points in log10(χ).
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    log10_min: f64,
    delta: f64,
    len: usize,
}

impl Axis {
    pub fn new(name: &str, log10_min: f64, log10_max: f64, len: usize) -> Result<Self, TableError> {
        if !log10_min.is_finite() || !log10_max.is_finite() || log10_max <= log10_min {
            return Err(TableError::domain(name, log10_min, log10_max));
        }

        if len < 2 {
            return Err(TableError::dimension(name, 2, len));
        }

        Ok(Axis {
            log10_min,
            delta: (log10_max - log10_min) / ((len - 1) as f64),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Bounds of the axis, as (log10 χ_min, log10 χ_max)
    pub fn log10_bounds(&self) -> (f64, f64) {
        (self.log10_min, self.log10_min + self.delta * ((self.len - 1) as f64))
    }

    /// Returns the index of the sample point immediately below `log10_x`
    /// and the weight of the one above it. Points outside the axis are
    /// clamped to the nearest edge.
    pub fn locate(&self, log10_x: f64) -> (usize, f64) {
        let index = (log10_x - self.log10_min) / self.delta;
        if !(index > 0.0) {
            (0, 0.0)
        } else if index >= (self.len - 1) as f64 {
            (self.len - 2, 1.0)
        } else {
            let weight = index.fract(); // of upper entry
            (index.floor() as usize, weight)
        }
    }
}

/// A function f(χ), tabulated at points uniformly spaced in log10(χ)
/// and linearly interpolated between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Table1D {
    axis: Axis,
    values: Vec<f64>,
}

impl Table1D {
    pub fn new(name: &str, log10_min: f64, log10_max: f64, values: Vec<f64>) -> Result<Self, TableError> {
        let axis = Axis::new(name, log10_min, log10_max, values.len())?;
        Ok(Table1D { axis, values })
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    /// Domain of the table, as (χ_min, χ_max)
    pub fn domain(&self) -> (f64, f64) {
        let (min, max) = self.axis.log10_bounds();
        (10f64.powf(min), 10f64.powf(max))
    }

    pub fn contains(&self, chi: f64) -> bool {
        let (min, max) = self.domain();
        chi >= min && chi <= max
    }

    /// Returns f(χ), clamped to the edges of the table.
    pub fn at(&self, chi: f64) -> f64 {
        self.at_log10(chi.log10())
    }

    pub fn at_log10(&self, log10_chi: f64) -> f64 {
        let (i, weight) = self.axis.locate(log10_chi);
        (1.0 - weight) * self.values[i] + weight * self.values[i+1]
    }
}

/// The cumulative distribution of photon quantum parameter, χ_γ,
/// conditional on the particle quantum parameter, χ.
///
/// Each row corresponds to a tabulated χ. The columns of a row are
/// spaced uniformly in log10(χ_γ) between the smallest photon quantum
/// parameter worth sampling, χ_γ,min(χ), and χ itself.
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeTable {
    rows: Axis,
    columns: usize,
    log10_min_photon_chi: Vec<f64>,
    cdf: Vec<f64>,
}

impl CumulativeTable {
    /// Constructs the table from the row-major cumulative distribution `cdf`,
    /// which has `columns` entries per row, and the lower bounds
    /// log10(χ_γ,min) of each row.
    pub fn new(log10_min: f64, log10_max: f64, columns: usize, log10_min_photon_chi: Vec<f64>, cdf: Vec<f64>) -> Result<Self, TableError> {
        let rows = Axis::new("photon_chi", log10_min, log10_max, log10_min_photon_chi.len())?;

        if columns < 2 {
            return Err(TableError::dimension("photon_chi:cdf", 2 * rows.len(), columns * rows.len()));
        }

        if cdf.len() != rows.len() * columns {
            return Err(TableError::dimension("photon_chi:cdf", rows.len() * columns, cdf.len()));
        }

        for (i, row) in cdf.chunks(columns).enumerate() {
            let monotonic = row.windows(2).all(|w| w[1] >= w[0]);
            if !monotonic || !row.iter().all(|f| f.is_finite()) {
                return Err(TableError::monotonicity("photon_chi:cdf", i));
            }
        }

        Ok(CumulativeTable { rows, columns, log10_min_photon_chi, cdf })
    }

    /// Number of (particle χ, photon χ) sample points
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.columns)
    }

    /// Domain of the particle χ axis
    pub fn domain(&self) -> (f64, f64) {
        let (min, max) = self.rows.log10_bounds();
        (10f64.powf(min), 10f64.powf(max))
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.cdf[i * self.columns..(i + 1) * self.columns]
    }

    /// Solves cdf(x) = `rand` in row `i`, returning the fractional
    /// column index x, 0 <= x <= columns - 1.
    fn invert_row(&self, i: usize, rand: f64) -> f64 {
        let row = self.row(i);
        let j = row.partition_point(|&f| f <= rand);
        if j == 0 {
            0.0
        } else if j >= row.len() {
            (row.len() - 1) as f64
        } else {
            // row[j-1] <= rand < row[j]
            let (lower, upper) = (row[j-1], row[j]);
            (j - 1) as f64 + (rand - lower) / (upper - lower)
        }
    }

    /// log10 of the smallest photon quantum parameter that is sampled
    /// for particle quantum parameter `chi`, interpolated and clamped.
    pub fn log10_min_photon_chi(&self, chi: f64) -> f64 {
        let (i, weight) = self.rows.locate(chi.log10());
        (1.0 - weight) * self.log10_min_photon_chi[i] + weight * self.log10_min_photon_chi[i+1]
    }

    /// Pseudorandomly samples the photon quantum parameter, given the
    /// particle quantum parameter `chi` and a uniformly distributed
    /// `rand` in [0, 1).
    ///
    /// The inverse of the distribution is obtained in the two rows that
    /// bracket `chi`, linearly interpolating between columns, and the
    /// results combined. Particle χ outside the table uses the nearest row.
    /// The result satisfies χ_γ,min(χ) <= χ_γ <= χ.
    pub fn sample(&self, chi: f64, rand: f64) -> f64 {
        let log10_chi = chi.log10();
        let (i, weight) = self.rows.locate(log10_chi);

        let lower = self.invert_row(i, rand);
        let upper = self.invert_row(i + 1, rand);
        let column = (1.0 - weight) * lower + weight * upper;
        let frac = column / ((self.columns - 1) as f64);

        let log10_min = (1.0 - weight) * self.log10_min_photon_chi[i] + weight * self.log10_min_photon_chi[i+1];
        let log10_min = log10_min.min(log10_chi);

        10f64.powf(log10_min + frac * (log10_chi - log10_min))
    }
}
