#![forbid(unsafe_code)]

/// Compensated running sum.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct KahanSum {
    sum: f64,
    c: f64,
}

impl KahanSum {
    pub(crate) fn add(&mut self, x: f64) {
        let y = x - self.c;
        let t = self.sum + y;
        self.c = (t - self.sum) - y;
        self.sum = t;
    }

    pub(crate) fn value(self) -> f64 {
        self.sum
    }
}

/// Welford's online mean and second central moment.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    pub(crate) fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Population variance; `None` before the first value.
    pub(crate) fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }
}

/// Running sums for a Pearson coefficient over paired values.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Comoments {
    n: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl Comoments {
    pub(crate) fn push(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    pub(crate) fn pearson(&self) -> f64 {
        let numerator = self.n * self.sum_xy - self.sum_x * self.sum_y;
        let denominator = (self.n * self.sum_xx - self.sum_x * self.sum_x).sqrt()
            * (self.n * self.sum_yy - self.sum_y * self.sum_y).sqrt();
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kahan_keeps_small_terms() {
        let mut naive = 0.0f64;
        let mut sum = KahanSum::default();
        sum.add(1e16);
        naive += 1e16;
        for _ in 0..10 {
            sum.add(1.0);
            naive += 1.0;
        }
        assert_eq!(sum.value(), 1e16 + 10.0);
        assert_ne!(naive, 1e16 + 10.0);
    }

    #[test]
    fn welford_matches_population_variance() {
        let mut acc = Welford::default();
        assert_eq!(acc.variance(), None);
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.push(x);
        }
        assert!((acc.variance().unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn welford_is_stable_under_a_large_offset() {
        let mut acc = Welford::default();
        for x in [1e9 + 4.0, 1e9 + 7.0, 1e9 + 13.0, 1e9 + 16.0] {
            acc.push(x);
        }
        assert!((acc.variance().unwrap() - 22.5).abs() < 1e-6);
    }

    #[test]
    fn pearson_of_a_line_is_one() {
        let mut acc = Comoments::default();
        for x in 0..5 {
            acc.push(x as f64, 3.0 * x as f64 - 1.0);
        }
        assert!((acc.pearson() - 1.0).abs() < 1e-12);

        let mut flat = Comoments::default();
        flat.push(1.0, 2.0);
        flat.push(1.0, 3.0);
        assert!(flat.pearson().is_nan());
    }
}
