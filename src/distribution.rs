// Tabulated probability distributions.
//
// Secondary-particle spectra arrive as tabulated pdf values on an energy or
// cosine grid. `TabularDistribution` stores one such table together with a
// precomputed cdf and inverts it exactly under a linear in-bin pdf;
// evaluation between grid points follows the interpolation policy the table
// was generated with. `TwoDDistribution` stacks tabular rows on a primary
// (incident energy) grid and provides unit-base evaluation plus correlated
// conditional sampling between bracketing rows.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::grid::TwoDGridPolicy;
use crate::interpolation::{InterpolationPolicy, LinLin};
use crate::rng::RandomStream;
use crate::tuple::{binary_lower_bound_index, is_sorted_ascending, First, Second};

/// Raw tabulated pdf, as read from a data library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabulatedPdf {
    pub indep: Vec<f64>,
    pub pdf: Vec<f64>,
}

/// Raw two-dimensional table: one pdf row per primary grid point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TwoDTable {
    pub primary: Vec<f64>,
    pub rows: Vec<TabulatedPdf>,
}

/// A tabulated univariate distribution with interpolation policy `P`.
#[derive(Clone, Debug)]
pub struct TabularDistribution<P: InterpolationPolicy> {
    // (independent value, unnormalized pdf value)
    points: Vec<(f64, f64)>,
    // Normalized cdf at each grid point; cdf[0] = 0, cdf[last] = 1
    cdf: Vec<f64>,
    // Integral of the unnormalized pdf
    norm: f64,
    _policy: PhantomData<P>,
}

impl<P: InterpolationPolicy> TabularDistribution<P> {
    /// Build from parallel grids of independent values and pdf values.
    ///
    /// Panics if the grid is shorter than two points, not strictly
    /// ascending, or carries a negative or all-zero pdf.
    pub fn new(indep: Vec<f64>, pdf: Vec<f64>) -> Self {
        assert!(indep.len() >= 2, "tabular distribution needs two points");
        assert_eq!(indep.len(), pdf.len(), "grid length mismatch");
        assert!(pdf.iter().all(|&p| p >= 0.0), "pdf values must be nonnegative");

        let points: Vec<(f64, f64)> = indep.into_iter().zip(pdf).collect();
        assert!(
            is_sorted_ascending::<First, _>(&points),
            "independent grid must be strictly ascending"
        );

        // Trapezoidal cdf, exact for a pdf that is linear within each bin
        let mut cdf = Vec::with_capacity(points.len());
        cdf.push(0.0);
        for w in points.windows(2) {
            let area = 0.5 * (w[1].1 + w[0].1) * (w[1].0 - w[0].0);
            cdf.push(cdf[cdf.len() - 1] + area);
        }
        let norm = cdf[points.len() - 1];
        assert!(norm > 0.0, "pdf integrates to zero");
        for value in cdf.iter_mut() {
            *value /= norm;
        }

        Self {
            points,
            cdf,
            norm,
            _policy: PhantomData,
        }
    }

    pub fn from_table(table: TabulatedPdf) -> Self {
        Self::new(table.indep, table.pdf)
    }

    pub fn lower_bound_of_indep_var(&self) -> f64 {
        self.points[0].0
    }

    pub fn upper_bound_of_indep_var(&self) -> f64 {
        self.points[self.points.len() - 1].0
    }

    /// The grid points as (independent, pdf) pairs.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Unnormalized pdf value at `x`, interpolated with the policy. Zero
    /// outside the grid.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x < self.lower_bound_of_indep_var() || x > self.upper_bound_of_indep_var() {
            return 0.0;
        }

        P::recover_processed_dep_var(
            TwoDGridPolicy::<P, P>::interpolate_and_process_on_y_grid::<First, Second, _>(
                x,
                &self.points,
            ),
        )
    }

    /// Normalized pdf value at `x`.
    pub fn evaluate_pdf(&self, x: f64) -> f64 {
        self.evaluate(x) / self.norm
    }

    /// Cdf value at `x`: 0 below the grid, 1 above it.
    pub fn evaluate_cdf(&self, x: f64) -> f64 {
        if x <= self.lower_bound_of_indep_var() {
            return 0.0;
        }
        if x >= self.upper_bound_of_indep_var() {
            return 1.0;
        }

        let bin = binary_lower_bound_index::<First, _>(&self.points, x);
        let (x_low, pdf_low) = self.points[bin];
        let (x_high, pdf_high) = self.points[bin + 1];
        let slope = (pdf_high - pdf_low) / (x_high - x_low);
        let dx = x - x_low;
        let area = (pdf_low + 0.5 * slope * dx) * dx;

        self.cdf[bin] + area / self.norm
    }

    /// Invert the cdf at a fixed random number in [0, 1].
    pub fn sample_with_random_number(&self, random_number: f64) -> f64 {
        debug_assert!((0.0..=1.0).contains(&random_number));

        if random_number >= 1.0 {
            return self.upper_bound_of_indep_var();
        }

        // Last grid point with cdf <= the draw
        let mut low = 0usize;
        let mut high = self.cdf.len();
        while high - low > 1 {
            let mid = (low + high) >> 1;
            if self.cdf[mid] <= random_number {
                low = mid;
            } else {
                high = mid;
            }
        }
        if low == self.cdf.len() - 1 {
            return self.upper_bound_of_indep_var();
        }

        let (x_low, pdf_low) = self.points[low];
        let (x_high, pdf_high) = self.points[low + 1];
        let target = (random_number - self.cdf[low]) * self.norm;
        let slope = (pdf_high - pdf_low) / (x_high - x_low);

        // Exact inversion of the linear in-bin pdf
        let x = if slope == 0.0 {
            x_low + target / pdf_low
        } else {
            x_low + ((pdf_low * pdf_low + 2.0 * slope * target).max(0.0).sqrt() - pdf_low) / slope
        };

        x.clamp(x_low, x_high)
    }

    pub fn sample<S: RandomStream>(&self, stream: &mut S) -> f64 {
        self.sample_with_random_number(stream.sample())
    }
}

/// A discrete distribution over tabulated values.
#[derive(Clone, Debug)]
pub struct DiscreteDistribution {
    values: Vec<f64>,
    // Normalized cumulative weights; last entry is 1
    cdf: Vec<f64>,
}

impl DiscreteDistribution {
    /// Panics on empty input or nonpositive total weight.
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "discrete distribution needs a value");
        assert_eq!(values.len(), weights.len(), "value/weight length mismatch");
        assert!(weights.iter().all(|&w| w >= 0.0), "weights must be nonnegative");

        let mut cdf = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for w in &weights {
            running += w;
            cdf.push(running);
        }
        assert!(running > 0.0, "weights sum to zero");
        for value in cdf.iter_mut() {
            *value /= running;
        }

        Self { values, cdf }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the sampled value at a fixed random number.
    pub fn sample_index_with_random_number(&self, random_number: f64) -> usize {
        debug_assert!((0.0..=1.0).contains(&random_number));

        self.cdf
            .iter()
            .position(|&c| random_number < c)
            .unwrap_or(self.values.len() - 1)
    }

    pub fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.values[self.sample_index_with_random_number(random_number)]
    }

    pub fn sample<S: RandomStream>(&self, stream: &mut S) -> f64 {
        self.sample_with_random_number(stream.sample())
    }
}

/// A bivariate distribution: tabular conditional distributions on a primary
/// grid. `ZY` interpolates within a row, `ZX` across rows.
#[derive(Clone, Debug)]
pub struct TwoDDistribution<
    ZY: InterpolationPolicy = LinLin,
    ZX: InterpolationPolicy = LinLin,
> {
    primary_grid: Vec<f64>,
    rows: Vec<TabularDistribution<ZY>>,
    _cross: PhantomData<ZX>,
}

impl<ZY: InterpolationPolicy, ZX: InterpolationPolicy> TwoDDistribution<ZY, ZX> {
    /// Panics if the table is empty, ragged, or unsorted in the primary
    /// grid.
    pub fn new(table: TwoDTable) -> Self {
        assert!(!table.primary.is_empty(), "empty primary grid");
        assert_eq!(
            table.primary.len(),
            table.rows.len(),
            "one pdf row per primary grid point"
        );
        assert!(
            table.primary.windows(2).all(|w| w[0] < w[1]),
            "primary grid must be strictly ascending"
        );

        Self {
            primary_grid: table.primary,
            rows: table.rows.into_iter().map(TabularDistribution::from_table).collect(),
            _cross: PhantomData,
        }
    }

    pub fn lower_bound_of_primary_indep_var(&self) -> f64 {
        self.primary_grid[0]
    }

    pub fn upper_bound_of_primary_indep_var(&self) -> f64 {
        self.primary_grid[self.primary_grid.len() - 1]
    }

    /// Bracketing row index for a primary value within the grid.
    fn primary_bin(&self, x: f64) -> usize {
        let mut low = 0usize;
        let mut high = self.primary_grid.len();
        while high - low > 1 {
            let mid = (low + high) >> 1;
            if self.primary_grid[mid] <= x {
                low = mid;
            } else {
                high = mid;
            }
        }
        low.min(self.primary_grid.len() - 2)
    }

    /// Unnormalized pdf at (x, y), unit-base interpolated between the
    /// bracketing rows. Outside the primary grid the nearest row is used;
    /// outside the intermediate secondary limits the result is zero.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        if x <= self.lower_bound_of_primary_indep_var() {
            return self.rows[0].evaluate(y);
        }
        if x >= self.upper_bound_of_primary_indep_var() {
            return self.rows[self.rows.len() - 1].evaluate(y);
        }

        let bin = self.primary_bin(x);
        let x0 = self.primary_grid[bin];
        let x1 = self.primary_grid[bin + 1];
        let row_0 = &self.rows[bin];
        let row_1 = &self.rows[bin + 1];

        let y_min = TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            x0,
            x1,
            x,
            row_0.lower_bound_of_indep_var(),
            row_1.lower_bound_of_indep_var(),
        );
        let y_max = TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            x0,
            x1,
            x,
            row_0.upper_bound_of_indep_var(),
            row_1.upper_bound_of_indep_var(),
        );
        if y < y_min || y > y_max {
            return 0.0;
        }

        TwoDGridPolicy::<ZY, ZX>::interpolate_unit_base::<First, Second, _>(
            x0,
            x1,
            x,
            y,
            row_0.points(),
            row_1.points(),
        )
    }

    /// Normalized conditional pdf at (x, y): each bracketing row's pdf at
    /// its unit-base mapped secondary value, rescaled onto the intermediate
    /// range. Zero outside the intermediate secondary limits.
    pub fn evaluate_secondary_conditional_pdf(&self, x: f64, y: f64) -> f64 {
        self.evaluate_unit_base_row_function(x, y, 0.0, 0.0, true, |row, y| row.evaluate_pdf(y))
    }

    /// Conditional cdf at (x, y): 0 below the intermediate secondary range,
    /// 1 above it. The unit-base mapping makes the cdf agree at the range
    /// ends regardless of how ragged the rows are.
    pub fn evaluate_secondary_conditional_cdf(&self, x: f64, y: f64) -> f64 {
        self.evaluate_unit_base_row_function(x, y, 0.0, 1.0, false, |row, y| row.evaluate_cdf(y))
    }

    /// Evaluate a per-row function at the unit-base mapped y of each
    /// bracketing row and blend the results linearly against the processed
    /// primary axis. Densities are rescaled by each row's share of the
    /// intermediate grid length.
    fn evaluate_unit_base_row_function<F>(
        &self,
        x: f64,
        y: f64,
        below_range: f64,
        above_range: f64,
        rescale_density: bool,
        row_function: F,
    ) -> f64
    where
        F: Fn(&TabularDistribution<ZY>, f64) -> f64,
    {
        if x <= self.lower_bound_of_primary_indep_var() {
            return row_function(&self.rows[0], y);
        }
        if x >= self.upper_bound_of_primary_indep_var() {
            return row_function(&self.rows[self.rows.len() - 1], y);
        }

        let bin = self.primary_bin(x);
        let x0 = self.primary_grid[bin];
        let x1 = self.primary_grid[bin + 1];
        let row_0 = &self.rows[bin];
        let row_1 = &self.rows[bin + 1];

        let y_x_min = TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            x0,
            x1,
            x,
            row_0.lower_bound_of_indep_var(),
            row_1.lower_bound_of_indep_var(),
        );
        let y_x_max = TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            x0,
            x1,
            x,
            row_0.upper_bound_of_indep_var(),
            row_1.upper_bound_of_indep_var(),
        );
        if y < y_x_min {
            return below_range;
        }
        if y > y_x_max {
            return above_range;
        }

        let length_0 = TwoDGridPolicy::<ZY, ZX>::calculate_grid_length::<First, _>(row_0.points());
        let length_1 = TwoDGridPolicy::<ZY, ZX>::calculate_grid_length::<First, _>(row_1.points());
        let length_x =
            TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_length(x0, x1, x, length_0, length_1);

        let eta = ZY::calculate_unit_base_indep_var(y, y_x_min, length_x);
        let y_0 = ZY::calculate_indep_var(eta, row_0.lower_bound_of_indep_var(), length_0);
        let y_1 = ZY::calculate_indep_var(eta, row_1.lower_bound_of_indep_var(), length_1);

        let mut value_0 = row_function(row_0, y_0);
        let mut value_1 = row_function(row_1, y_1);
        if rescale_density {
            value_0 *= length_0 / length_x;
            value_1 *= length_1 / length_x;
        }

        let px0 = ZX::process_indep_var(x0);
        let px1 = ZX::process_indep_var(x1);
        let px = ZX::process_indep_var(x);

        value_0 + (value_1 - value_0) * (px - px0) / (px1 - px0)
    }

    /// Sample the conditional distribution at `x` with a fixed random
    /// number, correlating the bracketing rows: both rows are inverted at
    /// the same number and the results interpolated in the secondary
    /// processing against the processed primary axis.
    pub fn sample_secondary_conditional_with_random_number(
        &self,
        x: f64,
        random_number: f64,
    ) -> f64 {
        if x <= self.lower_bound_of_primary_indep_var() {
            return self.rows[0].sample_with_random_number(random_number);
        }
        if x >= self.upper_bound_of_primary_indep_var() {
            return self.rows[self.rows.len() - 1].sample_with_random_number(random_number);
        }

        let bin = self.primary_bin(x);
        let y_0 = self.rows[bin].sample_with_random_number(random_number);
        let y_1 = self.rows[bin + 1].sample_with_random_number(random_number);

        TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            self.primary_grid[bin],
            self.primary_grid[bin + 1],
            x,
            y_0,
            y_1,
        )
    }

    pub fn sample_secondary_conditional<S: RandomStream>(&self, x: f64, stream: &mut S) -> f64 {
        self.sample_secondary_conditional_with_random_number(x, stream.sample())
    }

    /// Smallest secondary value reachable at `x`.
    pub fn lower_bound_of_secondary_conditional(&self, x: f64) -> f64 {
        self.secondary_limit(x, |row| row.lower_bound_of_indep_var())
    }

    /// Largest secondary value reachable at `x`.
    pub fn upper_bound_of_secondary_conditional(&self, x: f64) -> f64 {
        self.secondary_limit(x, |row| row.upper_bound_of_indep_var())
    }

    fn secondary_limit<F>(&self, x: f64, limit: F) -> f64
    where
        F: Fn(&TabularDistribution<ZY>) -> f64,
    {
        if x <= self.lower_bound_of_primary_indep_var() {
            return limit(&self.rows[0]);
        }
        if x >= self.upper_bound_of_primary_indep_var() {
            return limit(&self.rows[self.rows.len() - 1]);
        }

        let bin = self.primary_bin(x);
        TwoDGridPolicy::<ZY, ZX>::calculate_intermediate_grid_limit(
            self.primary_grid[bin],
            self.primary_grid[bin + 1],
            x,
            limit(&self.rows[bin]),
            limit(&self.rows[bin + 1]),
        )
    }
}
