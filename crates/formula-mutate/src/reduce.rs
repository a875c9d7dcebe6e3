//! Numeric reductions over one group of one column.
//!
//! Every reducer returns `Option<f64>`: `None` is a missing result, while `Some(f64::NAN)` is a
//! (present) not-a-number result. `DROP_MISSING` selects whether missing elements are excluded
//! or make the whole result missing.

use formula_frame::SlicingIndex;

/// Element types the reducers are specialized for.
pub trait Element: Copy {
    fn to_f64(self) -> f64;
}

impl Element for bool {
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

impl Element for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Neumaier-compensated accumulator, standing in for an extended-precision running sum.
///
/// Compensation is suspended once the sum leaves the finite range so infinities propagate
/// instead of turning into NaN through the correction term.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CompensatedSum {
    sum: f64,
    c: f64,
}

impl CompensatedSum {
    pub(crate) fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if t.is_finite() {
            if self.sum.abs() >= x.abs() {
                self.c += (self.sum - t) + x;
            } else {
                self.c += (x - t) + self.sum;
            }
        }
        self.sum = t;
    }

    pub(crate) fn value(self) -> f64 {
        if self.sum.is_finite() {
            self.sum + self.c
        } else {
            self.sum
        }
    }
}

/// Arithmetic mean of the group.
///
/// For a summary column the group's stored value is returned as-is. Otherwise the mean is
/// refined with a second pass adding the mean residual, which recovers the last bits lost by the
/// first division.
pub fn mean<T: Element, const DROP_MISSING: bool>(
    data: &[Option<T>],
    index: &SlicingIndex<'_>,
    is_summary: bool,
) -> Option<f64> {
    if is_summary {
        return data[index.group()].map(Element::to_f64);
    }

    let mut sum = CompensatedSum::default();
    let mut count = index.len();
    for row in index.iter() {
        match data[row] {
            Some(value) => sum.add(value.to_f64()),
            None if DROP_MISSING => count -= 1,
            None => return None,
        }
    }
    if count == 0 {
        return Some(f64::NAN);
    }

    let n = count as f64;
    let mut res = sum.value() / n;
    if res.is_finite() {
        let mut residual = CompensatedSum::default();
        for row in index.iter() {
            if let Some(value) = data[row] {
                let (diff, err) = two_diff(value.to_f64(), res);
                residual.add(diff);
                if diff.is_finite() {
                    residual.add(err);
                }
            }
        }
        res += residual.value() / n;
    }
    Some(res)
}

/// `a - b` with its rounding error: `a - b == diff + err` exactly (Knuth's TwoSum).
fn two_diff(a: f64, b: f64) -> (f64, f64) {
    let diff = a - b;
    let bb = diff - a;
    let err = (a - (diff - bb)) + (-b - bb);
    (diff, err)
}

/// Sample variance (denominator `count - 1`) of the group.
///
/// Missing for summary columns and groups with fewer than two included elements. A non-finite
/// mean is returned unchanged.
pub fn variance<T: Element, const DROP_MISSING: bool>(
    data: &[Option<T>],
    index: &SlicingIndex<'_>,
    is_summary: bool,
) -> Option<f64> {
    if is_summary || index.len() <= 1 {
        return None;
    }

    let mean = mean::<T, DROP_MISSING>(data, index, false)?;
    if !mean.is_finite() {
        return Some(mean);
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for row in index.iter() {
        // Without DROP_MISSING a missing element already made `mean` return early.
        let Some(value) = data[row] else {
            continue;
        };
        sum += square(value.to_f64() - mean);
        count += 1;
    }
    if count <= 1 {
        return None;
    }
    Some(sum / (count - 1) as f64)
}

pub fn std_dev<T: Element, const DROP_MISSING: bool>(
    data: &[Option<T>],
    index: &SlicingIndex<'_>,
    is_summary: bool,
) -> Option<f64> {
    variance::<T, DROP_MISSING>(data, index, is_summary).map(f64::sqrt)
}

fn square(x: f64) -> f64 {
    x * x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn compensated_sum_propagates_infinity() {
        let mut sum = CompensatedSum::default();
        sum.add(1.0);
        sum.add(f64::INFINITY);
        sum.add(2.0);
        assert_eq!(sum.value(), f64::INFINITY);
    }

    #[test]
    fn compensated_sum_recovers_cancellation() {
        let mut sum = CompensatedSum::default();
        for x in [1e100, 1.0, -1e100] {
            sum.add(x);
        }
        assert_eq!(sum.value(), 1.0);
    }

    #[test]
    fn two_diff_recovers_the_rounding_error() {
        let (diff, err) = two_diff(1.0, 1e-20);
        assert_eq!(diff, 1.0);
        assert_eq!(err, -1e-20);
    }

    #[test]
    fn refinement_keeps_a_correctly_rounded_mean() {
        let values: Vec<Option<f64>> = (0..37_i64)
            .map(|i| Some(((i * 271_829) % 2_000_001 - 1_000_000) as f64))
            .collect();
        let exact = values.iter().flatten().sum::<f64>() / 37.0;
        let rows = all_rows(37);
        let idx = SlicingIndex::new(&rows, 0);
        assert_eq!(mean::<f64, false>(&values, &idx, false), Some(exact));
    }

    #[test]
    fn mean_of_infinite_values_skips_refinement() {
        let data = [Some(1.0), Some(f64::INFINITY)];
        let rows = all_rows(2);
        let idx = SlicingIndex::new(&rows, 0);
        assert_eq!(mean::<f64, false>(&data, &idx, false), Some(f64::INFINITY));
    }

    #[test]
    fn variance_of_constant_group_is_zero() {
        let data = [Some(3_i64), Some(3), Some(3)];
        let rows = all_rows(3);
        let idx = SlicingIndex::new(&rows, 0);
        assert_eq!(variance::<i64, false>(&data, &idx, false), Some(0.0));
    }
}
