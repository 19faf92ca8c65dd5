// Two-dimensional grid interpolation.
//
// A secondary grid (a slice of tuples holding a secondary independent value
// y and a dependent value z, tagged by `Member` markers) is attached to each
// point of a primary x grid. `TwoDGridPolicy<ZY, ZX>` interpolates z between
// two bracketing secondary grids: `ZY` fixes the in-slice scheme (z against
// y) and `ZX` the cross-slice scheme (z against x). The named aliases spell
// the axis processing in z-y-x order, e.g. `LinLogLin` is linear z against a
// log y axis against a linear x axis.
//
// The unit-base entry points rescale each secondary grid onto [0, 1] before
// blending, so ragged grids with different y ranges interpolate without
// extrapolating either slice. Grids must ascend in the processed y
// coordinate; for a delta-cosine y axis that means descending raw cosines.

use std::marker::PhantomData;

use crate::interpolation::{
    self, calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, InterpolationPolicy,
    UNIT_BASE_TOL,
};
use crate::tuple::Member;

pub struct TwoDGridPolicy<ZY: InterpolationPolicy, ZX: InterpolationPolicy>(PhantomData<(ZY, ZX)>);

pub type LinLinLin = TwoDGridPolicy<interpolation::LinLin, interpolation::LinLin>;
pub type LinLogLin = TwoDGridPolicy<interpolation::LinLog, interpolation::LinLin>;
pub type LinLinLog = TwoDGridPolicy<interpolation::LinLin, interpolation::LinLog>;
pub type LinLogLog = TwoDGridPolicy<interpolation::LinLog, interpolation::LinLog>;
pub type LogLinLin = TwoDGridPolicy<interpolation::LogLin, interpolation::LogLin>;
pub type LogLogLin = TwoDGridPolicy<interpolation::LogLog, interpolation::LogLin>;
pub type LogLinLog = TwoDGridPolicy<interpolation::LogLin, interpolation::LogLog>;
pub type LogLogLog = TwoDGridPolicy<interpolation::LogLog, interpolation::LogLog>;
pub type LogLogCosLog = TwoDGridPolicy<interpolation::LogLogCos, interpolation::LogLog>;

impl<ZY: InterpolationPolicy, ZX: InterpolationPolicy> TwoDGridPolicy<ZY, ZX> {
    pub fn name() -> String {
        format!("{}{{{},{}}}", "TwoDGrid", ZY::name(), ZX::name())
    }

    /// Interpolate z at (x, y) between two secondary grids sharing the y
    /// range of the query point.
    pub fn interpolate<YM, ZM, T>(
        x0: f64,
        x1: f64,
        x: f64,
        y: f64,
        grid_0: &[T],
        grid_1: &[T],
    ) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(x0 < x1);
        debug_assert!((x0..=x1).contains(&x));

        let pz0 = Self::interpolate_and_process_on_y_grid::<YM, ZM, T>(y, grid_0);
        let pz1 = Self::interpolate_and_process_on_y_grid::<YM, ZM, T>(y, grid_1);

        let px0 = ZX::process_indep_var(x0);
        let px1 = ZX::process_indep_var(x1);
        let px = ZX::process_indep_var(x);
        let slope = (pz1 - pz0) / (px1 - px0);

        ZX::interpolate_processed(px0, px, pz0, slope)
    }

    /// Interpolate z at (x, y) between two secondary grids with different y
    /// ranges, rescaling each grid onto the unit base first.
    pub fn interpolate_unit_base<YM, ZM, T>(
        x0: f64,
        x1: f64,
        x: f64,
        y: f64,
        grid_0: &[T],
        grid_1: &[T],
    ) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(x0 < x1);
        debug_assert!((x0..=x1).contains(&x));

        let length_0 = Self::calculate_grid_length::<YM, T>(grid_0);
        let length_1 = Self::calculate_grid_length::<YM, T>(grid_1);
        let length_x = Self::calculate_intermediate_grid_length(x0, x1, x, length_0, length_1);

        let y_x_min = Self::calculate_intermediate_grid_limit(
            x0,
            x1,
            x,
            YM::get(&grid_0[0]),
            YM::get(&grid_1[0]),
        );
        let eta = ZY::calculate_unit_base_indep_var(y, y_x_min, length_x);

        let y_0 = ZY::calculate_indep_var(eta, YM::get(&grid_0[0]), length_0);
        let y_1 = ZY::calculate_indep_var(eta, YM::get(&grid_1[0]), length_1);

        let scaled_z0 = Self::interpolate_and_process_on_y_grid::<YM, ZM, T>(y_0, grid_0) * length_0;
        let scaled_z1 = Self::interpolate_and_process_on_y_grid::<YM, ZM, T>(y_1, grid_1) * length_1;

        let px0 = ZX::process_indep_var(x0);
        let px1 = ZX::process_indep_var(x1);
        let px = ZX::process_indep_var(x);
        let slope = (scaled_z1 - scaled_z0) / (px1 - px0);

        ZX::recover_processed_dep_var(
            ZX::interpolate_processed_and_process(px0, px, scaled_z0, slope) / length_x,
        )
    }

    /// `interpolate` on grids whose y and z members are already processed.
    /// Bit-compatible with the raw entry point given exactly processed
    /// inputs.
    pub fn interpolate_processed<YM, ZM, T>(
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        processed_y: f64,
        grid_0: &[T],
        grid_1: &[T],
    ) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(processed_x0 < processed_x1);
        debug_assert!((processed_x0..=processed_x1).contains(&processed_x));

        let pz0 = Self::interpolate_on_processed_y_grid::<YM, ZM, T>(processed_y, grid_0);
        let pz1 = Self::interpolate_on_processed_y_grid::<YM, ZM, T>(processed_y, grid_1);

        let slope = (pz1 - pz0) / (processed_x1 - processed_x0);

        ZX::interpolate_processed(processed_x0, processed_x, pz0, slope)
    }

    /// `interpolate_unit_base` on grids whose y and z members are already
    /// processed.
    pub fn interpolate_processed_unit_base<YM, ZM, T>(
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        processed_y: f64,
        grid_0: &[T],
        grid_1: &[T],
    ) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(processed_x0 < processed_x1);
        debug_assert!((processed_x0..=processed_x1).contains(&processed_x));

        let length_0 = Self::calculate_grid_length_processed::<YM, T>(grid_0);
        let length_1 = Self::calculate_grid_length_processed::<YM, T>(grid_1);
        let length_x = Self::calculate_intermediate_grid_length_processed(
            processed_x0,
            processed_x1,
            processed_x,
            length_0,
            length_1,
        );

        let processed_y_x_min = Self::calculate_intermediate_processed_grid_limit(
            processed_x0,
            processed_x1,
            processed_x,
            YM::get(&grid_0[0]),
            YM::get(&grid_1[0]),
        );
        let eta = ZY::calculate_unit_base_indep_var_processed(
            processed_y,
            processed_y_x_min,
            length_x,
        );

        let py_0 = ZY::calculate_processed_indep_var(eta, YM::get(&grid_0[0]), length_0);
        let py_1 = ZY::calculate_processed_indep_var(eta, YM::get(&grid_1[0]), length_1);

        let scaled_z0 =
            Self::interpolate_on_processed_y_grid::<YM, ZM, T>(py_0, grid_0) * length_0;
        let scaled_z1 =
            Self::interpolate_on_processed_y_grid::<YM, ZM, T>(py_1, grid_1) * length_1;

        let slope = (scaled_z1 - scaled_z0) / (processed_x1 - processed_x0);

        ZX::recover_processed_dep_var(
            ZX::interpolate_processed_and_process(processed_x0, processed_x, scaled_z0, slope)
                / length_x,
        )
    }

    /// Unit-base length of one secondary grid.
    pub fn calculate_grid_length<YM, T>(grid: &[T]) -> f64
    where
        YM: Member<T, Value = f64>,
    {
        debug_assert!(grid.len() >= 2);

        ZY::calculate_unit_base_grid_length(YM::get(&grid[0]), YM::get(&grid[grid.len() - 1]))
    }

    /// Unit-base length of one secondary grid with processed y members.
    pub fn calculate_grid_length_processed<YM, T>(grid: &[T]) -> f64
    where
        YM: Member<T, Value = f64>,
    {
        debug_assert!(grid.len() >= 2);

        ZY::calculate_unit_base_grid_length_processed(
            YM::get(&grid[0]),
            YM::get(&grid[grid.len() - 1]),
        )
    }

    /// Grid length at an intermediate x, interpolated linearly against the
    /// processed x axis.
    pub fn calculate_intermediate_grid_length(
        x0: f64,
        x1: f64,
        x: f64,
        length_0: f64,
        length_1: f64,
    ) -> f64 {
        Self::calculate_intermediate_grid_length_processed(
            ZX::process_indep_var(x0),
            ZX::process_indep_var(x1),
            ZX::process_indep_var(x),
            length_0,
            length_1,
        )
    }

    pub fn calculate_intermediate_grid_length_processed(
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        length_0: f64,
        length_1: f64,
    ) -> f64 {
        debug_assert!(processed_x0 < processed_x1);
        debug_assert!(length_0 >= 0.0 && length_1 >= 0.0);

        length_0
            + (length_1 - length_0) * (processed_x - processed_x0) / (processed_x1 - processed_x0)
    }

    /// Lower y limit at an intermediate x, interpolated with the in-slice
    /// policy's y processing against the processed x axis.
    pub fn calculate_intermediate_grid_limit(
        x0: f64,
        x1: f64,
        x: f64,
        y0_limit: f64,
        y1_limit: f64,
    ) -> f64 {
        ZY::recover_processed_indep_var(Self::calculate_intermediate_processed_grid_limit(
            ZX::process_indep_var(x0),
            ZX::process_indep_var(x1),
            ZX::process_indep_var(x),
            ZY::process_indep_var(y0_limit),
            ZY::process_indep_var(y1_limit),
        ))
    }

    pub fn calculate_intermediate_processed_grid_limit(
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        processed_y0_limit: f64,
        processed_y1_limit: f64,
    ) -> f64 {
        debug_assert!(processed_x0 < processed_x1);

        processed_y0_limit
            + (processed_y1_limit - processed_y0_limit) * (processed_x - processed_x0)
                / (processed_x1 - processed_x0)
    }

    /// Evaluate one secondary grid at y, returning the processed dependent
    /// value. A query at (or a hair beyond) either end returns the end
    /// point's dependent value with no interpolation roundoff.
    pub fn interpolate_and_process_on_y_grid<YM, ZM, T>(y: f64, grid: &[T]) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(grid.len() >= 2);
        debug_assert!(ZY::indep_var_in_valid_range(y));

        let py = ZY::process_indep_var(y);
        let p_first = ZY::process_indep_var(YM::get(&grid[0]));
        let p_last = ZY::process_indep_var(YM::get(&grid[grid.len() - 1]));
        debug_assert!(py >= calculate_fuzzy_lower_bound(p_first, UNIT_BASE_TOL));
        debug_assert!(py <= calculate_fuzzy_upper_bound(p_last, UNIT_BASE_TOL));

        if py >= p_last {
            return ZY::process_dep_var(ZM::get(&grid[grid.len() - 1]));
        }
        if py <= p_first {
            return ZY::process_dep_var(ZM::get(&grid[0]));
        }

        // Last bin whose processed y start is <= py
        let mut low = 0usize;
        let mut high = grid.len();
        while high - low > 1 {
            let mid = (low + high) >> 1;
            if ZY::process_indep_var(YM::get(&grid[mid])) <= py {
                low = mid;
            } else {
                high = mid;
            }
        }

        ZY::interpolate_and_process(
            YM::get(&grid[low]),
            YM::get(&grid[low + 1]),
            y,
            ZM::get(&grid[low]),
            ZM::get(&grid[low + 1]),
        )
    }

    /// `interpolate_and_process_on_y_grid` over an already-processed grid.
    pub fn interpolate_on_processed_y_grid<YM, ZM, T>(processed_y: f64, grid: &[T]) -> f64
    where
        YM: Member<T, Value = f64>,
        ZM: Member<T, Value = f64>,
    {
        debug_assert!(grid.len() >= 2);

        let p_first = YM::get(&grid[0]);
        let p_last = YM::get(&grid[grid.len() - 1]);
        debug_assert!(processed_y >= calculate_fuzzy_lower_bound(p_first, UNIT_BASE_TOL));
        debug_assert!(processed_y <= calculate_fuzzy_upper_bound(p_last, UNIT_BASE_TOL));

        if processed_y >= p_last {
            return ZM::get(&grid[grid.len() - 1]);
        }
        if processed_y <= p_first {
            return ZM::get(&grid[0]);
        }

        let low = crate::tuple::binary_lower_bound_index::<YM, T>(grid, processed_y);
        let py_low = YM::get(&grid[low]);
        let py_high = YM::get(&grid[low + 1]);
        let pz_low = ZM::get(&grid[low]);
        let pz_high = ZM::get(&grid[low + 1]);

        pz_low + (pz_high - pz_low) * (processed_y - py_low) / (py_high - py_low)
    }
}
