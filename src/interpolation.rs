// One-dimensional interpolation policies.
//
// A policy fixes how the independent and dependent axes are processed
// before linear interpolation in the processed space: identity (Lin),
// natural log (Log), or log of the delta-cosine (LogCos, for bounded
// cosine-like variables stored as ln(1 - mu)). The named aliases follow
// the dependent-independent convention, e.g. `LogLin` interpolates a
// log-processed dependent variable against a linear independent variable.
//
// The unit-base helpers rescale an independent axis onto [0, 1] so that
// grids with different extents can be blended; the 1e-3 tolerance absorbs
// the roundoff introduced by processing and recovering grid limits.

use std::marker::PhantomData;

/// Roundoff tolerance used by the unit-base mapping.
pub const UNIT_BASE_TOL: f64 = 1e-3;

/// Processing applied to a single axis.
pub trait AxisTransform {
    const NAME: &'static str;

    fn process(value: f64) -> f64;
    fn recover(processed: f64) -> f64;
    fn in_valid_range(value: f64) -> bool;
}

/// Identity axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lin;

impl AxisTransform for Lin {
    const NAME: &'static str = "Lin";

    #[inline(always)]
    fn process(value: f64) -> f64 {
        value
    }

    #[inline(always)]
    fn recover(processed: f64) -> f64 {
        processed
    }

    #[inline(always)]
    fn in_valid_range(value: f64) -> bool {
        value.is_finite()
    }
}

/// Natural-log axis. Values must be positive.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl AxisTransform for Log {
    const NAME: &'static str = "Log";

    #[inline(always)]
    fn process(value: f64) -> f64 {
        value.ln()
    }

    #[inline(always)]
    fn recover(processed: f64) -> f64 {
        processed.exp()
    }

    #[inline(always)]
    fn in_valid_range(value: f64) -> bool {
        value > 0.0 && value.is_finite()
    }
}

/// Delta-cosine log axis: a cosine-like variable mu in [-1, 1) is stored
/// as ln(1 - mu). Processing is monotonically decreasing in mu, so grids
/// supplied on this axis must ascend in processed space (descend in mu).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCos;

impl AxisTransform for LogCos {
    const NAME: &'static str = "LogCos";

    #[inline(always)]
    fn process(value: f64) -> f64 {
        (1.0 - value).ln()
    }

    #[inline(always)]
    fn recover(processed: f64) -> f64 {
        1.0 - processed.exp()
    }

    #[inline(always)]
    fn in_valid_range(value: f64) -> bool {
        (-1.0..1.0).contains(&value)
    }
}

/// An interpolation scheme: dependent-axis transform `D` against
/// independent-axis transform `I`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interp<D: AxisTransform, I: AxisTransform>(PhantomData<(D, I)>);

pub type LinLin = Interp<Lin, Lin>;
pub type LogLin = Interp<Log, Lin>;
pub type LinLog = Interp<Lin, Log>;
pub type LogLog = Interp<Log, Log>;
pub type LogCosLin = Interp<LogCos, Lin>;
pub type LogCosLog = Interp<LogCos, Log>;
pub type LogLogCos = Interp<Log, LogCos>;

/// The operations every interpolation policy provides.
pub trait InterpolationPolicy {
    fn name() -> String;

    fn process_indep_var(value: f64) -> f64;
    fn recover_processed_indep_var(processed: f64) -> f64;
    fn process_dep_var(value: f64) -> f64;
    fn recover_processed_dep_var(processed: f64) -> f64;
    fn indep_var_in_valid_range(value: f64) -> bool;
    fn dep_var_in_valid_range(value: f64) -> bool;

    /// Interpolate between two points.
    fn interpolate(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        Self::recover_processed_dep_var(Self::interpolate_and_process(x0, x1, x, y0, y1))
    }

    /// Interpolate between two points, returning the processed dependent
    /// value.
    fn interpolate_and_process(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        debug_assert!(Self::indep_var_in_valid_range(x0));
        debug_assert!(Self::indep_var_in_valid_range(x1));
        debug_assert!(Self::indep_var_in_valid_range(x));
        debug_assert!(Self::dep_var_in_valid_range(y0));
        debug_assert!(Self::dep_var_in_valid_range(y1));

        let px0 = Self::process_indep_var(x0);
        let px1 = Self::process_indep_var(x1);
        let px = Self::process_indep_var(x);
        let py0 = Self::process_dep_var(y0);
        let py1 = Self::process_dep_var(y1);

        py0 + (py1 - py0) * (px - px0) / (px1 - px0)
    }

    /// Interpolate between two already-processed points.
    fn interpolate_processed(
        processed_x0: f64,
        processed_x: f64,
        processed_y0: f64,
        processed_slope: f64,
    ) -> f64 {
        Self::recover_processed_dep_var(Self::interpolate_processed_and_process(
            processed_x0,
            processed_x,
            processed_y0,
            processed_slope,
        ))
    }

    /// Interpolate between two already-processed points, returning the
    /// processed dependent value.
    #[inline]
    fn interpolate_processed_and_process(
        processed_x0: f64,
        processed_x: f64,
        processed_y0: f64,
        processed_slope: f64,
    ) -> f64 {
        debug_assert!(processed_x0.is_finite());
        debug_assert!(processed_x.is_finite());
        debug_assert!(processed_y0.is_finite());
        debug_assert!(processed_slope.is_finite());

        processed_y0 + processed_slope * (processed_x - processed_x0)
    }

    /// Unit-base grid length L of the independent axis.
    fn calculate_unit_base_grid_length(lower: f64, upper: f64) -> f64 {
        debug_assert!(Self::indep_var_in_valid_range(lower));

        Self::calculate_unit_base_grid_length_processed(
            Self::process_indep_var(lower),
            Self::process_indep_var(upper),
        )
    }

    /// Unit-base grid length from processed limits.
    #[inline]
    fn calculate_unit_base_grid_length_processed(
        processed_lower: f64,
        processed_upper: f64,
    ) -> f64 {
        debug_assert!(processed_lower <= processed_upper);

        processed_upper - processed_lower
    }

    /// Unit-base coordinate eta in [0, 1] of an independent value.
    fn calculate_unit_base_indep_var(value: f64, grid_min: f64, grid_length: f64) -> f64 {
        debug_assert!(Self::indep_var_in_valid_range(grid_min));
        debug_assert!(Self::indep_var_in_valid_range(value));
        debug_assert!(grid_length > 0.0);

        Self::calculate_unit_base_indep_var_processed(
            Self::process_indep_var(value),
            Self::process_indep_var(grid_min),
            grid_length,
        )
    }

    /// Unit-base coordinate eta from a processed value, clamping roundoff
    /// within the unit-base tolerance.
    fn calculate_unit_base_indep_var_processed(
        processed_value: f64,
        processed_grid_min: f64,
        grid_length: f64,
    ) -> f64 {
        debug_assert!(grid_length > 0.0);
        debug_assert!(processed_value >= calculate_fuzzy_lower_bound(processed_grid_min, UNIT_BASE_TOL));

        let mut eta = (processed_value - processed_grid_min) / grid_length;

        // Correct rounding errors at the boundaries
        if eta > 1.0 {
            if eta - 1.0 < UNIT_BASE_TOL {
                eta = 1.0;
            }
        } else if eta < 0.0 && eta > -UNIT_BASE_TOL {
            eta = 0.0;
        }

        debug_assert!((0.0..=1.0).contains(&eta));

        eta
    }

    /// Independent value corresponding to a unit-base coordinate.
    fn calculate_indep_var(eta: f64, grid_min: f64, grid_length: f64) -> f64 {
        debug_assert!((0.0..=1.0).contains(&eta));
        debug_assert!(Self::indep_var_in_valid_range(grid_min));
        debug_assert!(grid_length >= 0.0);

        let mut value = Self::recover_processed_indep_var(
            Self::process_indep_var(grid_min) + grid_length * eta,
        );

        // Process/recover roundoff can land a hair below the grid minimum
        if value < grid_min && value >= calculate_fuzzy_lower_bound(grid_min, UNIT_BASE_TOL) {
            value = grid_min;
        }

        value
    }

    /// Processed independent value corresponding to a unit-base coordinate.
    #[inline]
    fn calculate_processed_indep_var(
        eta: f64,
        processed_grid_min: f64,
        grid_length: f64,
    ) -> f64 {
        debug_assert!((0.0..=1.0).contains(&eta));
        debug_assert!(grid_length >= 0.0);

        processed_grid_min + grid_length * eta
    }
}

impl<D: AxisTransform, I: AxisTransform> InterpolationPolicy for Interp<D, I> {
    fn name() -> String {
        format!("{}{}", D::NAME, I::NAME)
    }

    #[inline(always)]
    fn process_indep_var(value: f64) -> f64 {
        I::process(value)
    }

    #[inline(always)]
    fn recover_processed_indep_var(processed: f64) -> f64 {
        I::recover(processed)
    }

    #[inline(always)]
    fn process_dep_var(value: f64) -> f64 {
        D::process(value)
    }

    #[inline(always)]
    fn recover_processed_dep_var(processed: f64) -> f64 {
        D::recover(processed)
    }

    #[inline(always)]
    fn indep_var_in_valid_range(value: f64) -> bool {
        I::in_valid_range(value)
    }

    #[inline(always)]
    fn dep_var_in_valid_range(value: f64) -> bool {
        D::in_valid_range(value)
    }
}

/// Lower bound with a relative roundoff allowance.
#[inline]
pub fn calculate_fuzzy_lower_bound(value: f64, tol: f64) -> f64 {
    if value < 0.0 {
        value * (1.0 + tol)
    } else {
        value * (1.0 - tol)
    }
}

/// Upper bound with a relative roundoff allowance.
#[inline]
pub fn calculate_fuzzy_upper_bound(value: f64, tol: f64) -> f64 {
    if value < 0.0 {
        value * (1.0 - tol)
    } else {
        value * (1.0 + tol)
    }
}
