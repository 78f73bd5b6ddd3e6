//! Bearing and time distances

/// Shortest angular distance between two bearings (degrees, wrap-aware)
pub fn angle_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Absolute timestamp difference (seconds)
pub fn time_distance(t_camera: f64, t_ranging: f64) -> f64 {
    (t_camera - t_ranging).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_angle_distance_wraps() {
        assert_eq!(angle_distance(359.0, 2.0), 3.0);
        assert_eq!(angle_distance(2.0, 359.0), 3.0);
        assert_eq!(angle_distance(10.0, 200.0), 170.0);
        assert_eq!(angle_distance(0.0, 180.0), 180.0);
        assert_eq!(angle_distance(720.0, 0.0), 0.0);
    }

    #[test]
    fn test_time_distance() {
        assert!((time_distance(100.0, 100.01) - 0.01).abs() < 1e-9);
        assert_eq!(time_distance(5.0, 3.0), 2.0);
    }

    proptest! {
        #[test]
        fn identical_bearings_have_zero_distance(x in 0.0f64..360.0) {
            prop_assert_eq!(angle_distance(x, x), 0.0);
        }

        #[test]
        fn distance_is_symmetric_and_bounded(a in 0.0f64..360.0, b in 0.0f64..360.0) {
            let d = angle_distance(a, b);
            prop_assert!((0.0..=180.0).contains(&d));
            prop_assert!((d - angle_distance(b, a)).abs() < 1e-9);
        }
    }
}
