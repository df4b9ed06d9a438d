//! Modified Bessel functions of the first kind, orders 0 and 1.
//!
//! Polynomial approximations from Abramowitz & Stegun 9.8.1-9.8.4 (relative
//! error below 2e-7), switching to the Hankel asymptotic series for large
//! arguments. The `*e` variants are scaled by `exp(-|x|)` so large arguments
//! stay finite.

const SMALL_ARGUMENT_LIMIT: f64 = 3.75;
const ASYMPTOTIC_LIMIT: f64 = 20.0;
const ASYMPTOTIC_MAX_TERMS: usize = 40;

pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < SMALL_ARGUMENT_LIMIT {
        small_i0(ax)
    } else {
        large_i0_scaled(ax) * ax.exp()
    }
}

pub fn bessel_i0e(x: f64) -> f64 {
    let ax = x.abs();
    if ax < SMALL_ARGUMENT_LIMIT {
        small_i0(ax) * (-ax).exp()
    } else {
        large_i0_scaled(ax)
    }
}

pub fn bessel_i1(x: f64) -> f64 {
    let ax = x.abs();
    let magnitude = if ax < SMALL_ARGUMENT_LIMIT {
        small_i1(ax)
    } else {
        large_i1_scaled(ax) * ax.exp()
    };
    magnitude.copysign(x)
}

pub fn bessel_i1e(x: f64) -> f64 {
    let ax = x.abs();
    let magnitude = if ax < SMALL_ARGUMENT_LIMIT {
        small_i1(ax) * (-ax).exp()
    } else {
        large_i1_scaled(ax)
    };
    magnitude.copysign(x)
}

fn small_i0(ax: f64) -> f64 {
    let t = (ax / SMALL_ARGUMENT_LIMIT).powi(2);
    1.0 + t
        * (3.515_622_9
            + t * (3.089_942_4
                + t * (1.206_749_2 + t * (0.265_973_2 + t * (0.036_076_8 + t * 0.004_581_3)))))
}

fn small_i1(ax: f64) -> f64 {
    let t = (ax / SMALL_ARGUMENT_LIMIT).powi(2);
    ax * (0.5
        + t * (0.878_905_94
            + t * (0.514_988_69
                + t * (0.150_849_34
                    + t * (0.026_587_33 + t * (0.003_015_32 + t * 0.000_324_11))))))
}

fn large_i0_scaled(ax: f64) -> f64 {
    if ax >= ASYMPTOTIC_LIMIT {
        return asymptotic_scaled(0.0, ax);
    }
    let u = SMALL_ARGUMENT_LIMIT / ax;
    let series = 0.398_942_28
        + u * (0.013_285_92
            + u * (0.002_253_19
                + u * (-0.001_575_65
                    + u * (0.009_162_81
                        + u * (-0.020_577_06
                            + u * (0.026_355_37 + u * (-0.016_476_33 + u * 0.003_923_77)))))));
    series / ax.sqrt()
}

fn large_i1_scaled(ax: f64) -> f64 {
    if ax >= ASYMPTOTIC_LIMIT {
        return asymptotic_scaled(1.0, ax);
    }
    let u = SMALL_ARGUMENT_LIMIT / ax;
    let series = 0.398_942_28
        + u * (-0.039_880_24
            + u * (-0.003_620_18
                + u * (0.001_638_01
                    + u * (-0.010_315_55
                        + u * (0.022_829_67
                            + u * (-0.028_953_12 + u * (0.017_876_54 - u * 0.004_200_59)))))));
    series / ax.sqrt()
}

/// `exp(-x) I_nu(x) ~ (2 pi x)^-1/2 * sum_k (-1)^k prod_j (4 nu^2 - (2j-1)^2) / (k! (8x)^k)`.
fn asymptotic_scaled(order: f64, ax: f64) -> f64 {
    let mu = 4.0 * order * order;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..=ASYMPTOTIC_MAX_TERMS {
        let odd = (2 * k - 1) as f64;
        term *= -(mu - odd * odd) / (k as f64 * 8.0 * ax);
        sum += term;
        if term.abs() <= f64::EPSILON * sum.abs() {
            break;
        }
    }
    sum / (2.0 * std::f64::consts::PI * ax).sqrt()
}
