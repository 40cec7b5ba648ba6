//! Domain-specific assertion macros for vizstream harnesses.
//!
//! These wrap `pretty_assertions` and compare series values with NaN treated
//! as equal to NaN, which plain `assert_eq!` on `f64` cannot express.

// ---------------------------------------------------------------------------
// Series assertions
// ---------------------------------------------------------------------------

/// Assert a [`Series`](vizstream_core::Series) matches `(label, value)` pairs
/// in order. `f64::NAN` in the expectation matches a NaN value.
///
/// ```rust
/// assert_series!(series, [("N", 30.0), ("S", 5.0)]);
/// ```
#[macro_export]
macro_rules! assert_series {
    ($series:expr, [$(($label:expr, $value:expr)),* $(,)?]) => {{
        let series: &vizstream_core::Series = &$series;
        let expected: Vec<(&str, f64)> = vec![$(($label, $value as f64)),*];
        let actual: Vec<(&str, f64)> = series.iter().collect();
        let same = actual.len() == expected.len()
            && actual.iter().zip(&expected).all(|((al, av), (el, ev))| {
                al == el && (av == ev || (av.is_nan() && ev.is_nan()))
            });
        if !same {
            pretty_assertions::assert_eq!(
                format!("{:?}", actual),
                format!("{:?}", expected),
                "assert_series! failed"
            );
        }
    }};
}

/// Assert that two series serialize to byte-identical JSON.
#[macro_export]
macro_rules! assert_same_json {
    ($left:expr, $right:expr) => {{
        let left = serde_json::to_string(&$left).expect("left serializes");
        let right = serde_json::to_string(&$right).expect("right serializes");
        pretty_assertions::assert_eq!(left, right, "assert_same_json! failed");
    }};
}
