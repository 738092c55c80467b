//! Per-recording feature normalization

use ndarray::{ArrayViewMut2, Axis};

/// Standard deviations below this are treated as a constant column
pub const STD_EPSILON: f64 = 1e-8;

/// Z-score each column in place: `(x - mean) / std`
///
/// Statistics are population statistics over all rows of the recording. A
/// column whose std falls below [`STD_EPSILON`] is only mean-centered.
pub fn normalize_columns(mut features: ArrayViewMut2<'_, f32>) {
    let n_rows = features.nrows();
    if n_rows == 0 {
        return;
    }

    for mut column in features.axis_iter_mut(Axis(1)) {
        let mean = column.iter().map(|&x| x as f64).sum::<f64>() / n_rows as f64;
        let variance = column
            .iter()
            .map(|&x| {
                let d = x as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n_rows as f64;
        let std = variance.sqrt();
        let std = if std < STD_EPSILON { 1.0 } else { std };

        column.mapv_inplace(|x| ((x as f64 - mean) / std) as f32);
    }
}
