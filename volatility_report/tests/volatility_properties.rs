use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use volatility_report::analysis::{compute_returns, compute_volatility};

fn with_timestamps(values: &[f64]) -> Vec<(NaiveDateTime, f64)> {
    let origin = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (origin + Duration::days(i as i64), *v))
        .collect()
}

proptest! {
    #[test]
    fn constant_prices_have_zero_returns(price in 0.01f64..1e6, len in 1usize..60) {
        let returns = compute_returns("AAA", &with_timestamps(&vec![price; len]));
        prop_assert_eq!(returns.points.len(), len);
        prop_assert!(returns.points[0].1.is_none());
        for (_, r) in &returns.points[1..] {
            prop_assert_eq!(*r, Some(0.0));
        }
    }

    #[test]
    fn volatility_defined_exactly_once_window_is_full(
        prices in prop::collection::vec(1.0f64..1000.0, 2..80),
        window in 2usize..25,
    ) {
        let returns = compute_returns("AAA", &with_timestamps(&prices));
        let vol = compute_volatility(&returns, window);
        prop_assert_eq!(vol.points.len(), prices.len());

        for (t, (_, v)) in vol.points.iter().enumerate() {
            // The first return is undefined, so the first full window ends at t = window.
            if t < window {
                prop_assert!(v.is_none(), "t={} window={} v={:?}", t, window, v);
            } else {
                let v = v.unwrap();
                prop_assert!(v.is_finite() && v >= 0.0);
            }
        }
    }

    #[test]
    fn gap_free_returns_define_volatility_from_window_minus_one(
        tail in prop::collection::vec(-0.5f64..0.5, 1..60),
        window in 2usize..20,
    ) {
        let mut returns = compute_returns("AAA", &with_timestamps(&vec![1.0; tail.len()]));
        for (point, r) in returns.points.iter_mut().zip(&tail) {
            point.1 = Some(*r);
        }
        let vol = compute_volatility(&returns, window);
        for (t, (_, v)) in vol.points.iter().enumerate() {
            if t + 1 < window {
                prop_assert!(v.is_none());
            } else {
                prop_assert!(v.is_some_and(|v| v.is_finite() && v >= 0.0));
            }
        }
    }
}
