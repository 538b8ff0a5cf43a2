//rolling indicator helpers shared by the signal generator and the engine
//all functions are pure over an ordered input series

//trailing mean of the absolute day-over-day change, a true-range proxy for
//a series with a single daily observation
//the window shrinks at the start of the series (minimum one observation);
//index 0 has no prior value and is returned as NaN, callers treat
//non-finite values as "no indicator"
pub fn rolling_true_range_mean(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = vec![f64::NAN; series.len()];

    for i in 1..series.len() {
        //the first defined change sits at index 1
        let start = if i + 1 > window { i + 1 - window } else { 1 };
        let mut sum = 0.0;
        let mut count = 0usize;
        for j in start..=i {
            let tr = (series[j] - series[j - 1]).abs();
            if tr.is_finite() {
                sum += tr;
                count += 1;
            }
        }
        if count > 0 {
            out[i] = sum / count as f64;
        }
    }

    out
}

//trailing simple moving average with the same shrinking-window behavior
pub fn simple_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = vec![f64::NAN; series.len()];

    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let mut sum = 0.0;
        let mut count = 0usize;
        for &value in &series[start..=i] {
            if value.is_finite() {
                sum += value;
                count += 1;
            }
        }
        if count > 0 {
            out[i] = sum / count as f64;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_range_mean_first_element_is_undefined() {
        let atr = rolling_true_range_mean(&[100.0, 110.0, 105.0], 20);
        assert!(atr[0].is_nan());
        assert!((atr[1] - 10.0).abs() < 1e-12);
        assert!((atr[2] - 7.5).abs() < 1e-12);
    }

    #[test]
    fn true_range_mean_uses_shrinking_then_full_window() {
        //changes: 10, 10, 10, 40
        let series = [100.0, 110.0, 120.0, 130.0, 170.0];
        let atr = rolling_true_range_mean(&series, 2);
        assert!((atr[1] - 10.0).abs() < 1e-12);
        assert!((atr[2] - 10.0).abs() < 1e-12);
        //full window of two changes: (10 + 40) / 2
        assert!((atr[4] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn true_range_mean_of_flat_series_is_zero() {
        let atr = rolling_true_range_mean(&[100.0; 6], 3);
        assert!(atr[0].is_nan());
        for value in &atr[1..] {
            assert_eq!(*value, 0.0);
        }
    }

    #[test]
    fn sma_shrinks_at_start() {
        let series = [2.0, 4.0, 6.0, 8.0];
        let ma = simple_moving_average(&series, 3);
        assert!((ma[0] - 2.0).abs() < 1e-12);
        assert!((ma[1] - 3.0).abs() < 1e-12);
        assert!((ma[2] - 4.0).abs() < 1e-12);
        assert!((ma[3] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn window_of_zero_is_treated_as_one() {
        let ma = simple_moving_average(&[5.0, 7.0], 0);
        assert_eq!(ma, vec![5.0, 7.0]);
    }
}
