//! Distribution sampler for coded random parameters.
//!
//! Parameter values in an input file may be distribution codes of the form
//! `<Letter>(<comma-separated args>)`:
//!
//! - `U(lo,hi)`: uniform continuous draw in [lo, hi)
//! - `N(mean,sd)`: normal draw (Box-Muller standard normal, scaled/shifted)
//! - `C(k)`: uniform discrete choice in [0, k)
//! - `G(mean,sd[,min])`: Gamma reparameterized to mean 1 with
//!   shape = rate = 1/sd², rescaled as draw × (mean − min) + min
//!
//! # The NaN sentinel
//!
//! [`sample`] returns `f64::NAN` for anything that is not a well-formed
//! code: malformed syntax, unknown letter, wrong arity, non-numeric
//! argument. NaN deliberately distinguishes "not a random parameter" from
//! "malformed random parameter" without aborting; the caller decides the
//! fallback. No ordinary control flow uses errors here.

use serde::{Deserialize, Serialize};

use crate::rng::RngManager;

/// A parsed distribution code.
///
/// Produced by [`DistributionCode::parse`]; drawing from one consumes the
/// provided RNG stream via [`DistributionCode::draw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DistributionCode {
    /// `U(lo,hi)`: uniform continuous in [lo, hi)
    Uniform { lo: f64, hi: f64 },

    /// `N(mean,sd)`: normal with mean and standard deviation
    Normal { mean: f64, sd: f64 },

    /// `C(k)`: uniform discrete choice in [0, k)
    Choice { options: u32 },

    /// `G(mean,sd,min)`: mean/sd-parameterized Gamma with a floor
    Gamma { mean: f64, sd: f64, min: f64 },
}

impl DistributionCode {
    /// Parse a distribution code from text.
    ///
    /// Whitespace is stripped first, so `N( 0, 1 )` is accepted. Returns
    /// `None` for malformed syntax, an unknown letter, wrong arity, or a
    /// non-numeric argument.
    pub fn parse(text: &str) -> Option<DistributionCode> {
        let code: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut chars = code.chars();
        let letter = chars.next()?;

        // Require the full <Letter>(<args>) shape before treating anything
        // as a draw instruction.
        let bytes = code.as_bytes();
        if bytes.len() < 4 || bytes[1] != b'(' || bytes[bytes.len() - 1] != b')' {
            return None;
        }
        let args: Vec<&str> = code[2..code.len() - 1].split(',').collect();

        match letter {
            'U' => {
                let [lo, hi] = parse_args::<2>(&args)?;
                Some(DistributionCode::Uniform { lo, hi })
            }
            'N' => {
                let [mean, sd] = parse_args::<2>(&args)?;
                Some(DistributionCode::Normal { mean, sd })
            }
            'C' => {
                if args.len() != 1 {
                    return None;
                }
                let options: u32 = args[0].parse().ok()?;
                if options == 0 {
                    return None;
                }
                Some(DistributionCode::Choice { options })
            }
            'G' => {
                // The minimum is optional and defaults to 0.
                if args.len() == 2 {
                    let [mean, sd] = parse_args::<2>(&args)?;
                    Some(DistributionCode::Gamma { mean, sd, min: 0.0 })
                } else {
                    let [mean, sd, min] = parse_args::<3>(&args)?;
                    Some(DistributionCode::Gamma { mean, sd, min })
                }
            }
            _ => None,
        }
    }

    /// Draw one value from this distribution.
    pub fn draw(&self, rng: &mut RngManager) -> f64 {
        match *self {
            DistributionCode::Uniform { lo, hi } => rng.next_f64() * (hi - lo) + lo,
            DistributionCode::Normal { mean, sd } => standard_normal(rng) * sd + mean,
            DistributionCode::Choice { options } => rng.range(0, options as i64) as f64,
            DistributionCode::Gamma { mean, sd, min } => {
                unit_mean_gamma(rng, sd) * (mean - min) + min
            }
        }
    }
}

/// Parse exactly N numeric arguments, or give up.
fn parse_args<const N: usize>(args: &[&str]) -> Option<[f64; N]> {
    if args.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().ok()?;
    }
    Some(out)
}

/// Parse-and-draw in one step.
///
/// Returns `f64::NAN` when `text` is not a well-formed code (the sentinel,
/// not a fatal error). The RNG is only advanced when the code parses.
pub fn sample(text: &str, rng: &mut RngManager) -> f64 {
    match DistributionCode::parse(text) {
        Some(code) => code.draw(rng),
        None => f64::NAN,
    }
}

/// Sample from the standard normal distribution using the Box-Muller
/// transform.
pub fn standard_normal(rng: &mut RngManager) -> f64 {
    let u1 = rng.next_f64().max(f64::MIN_POSITIVE); // guard ln(0)
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Draw from a Gamma distribution normalized to mean 1.0 with the given
/// standard deviation (shape = rate = 1/sd²).
///
/// When sd == 0 the distribution is degenerate and the draw is the
/// constant 1.0; an infinite-shape Gamma draw is never attempted.
pub fn unit_mean_gamma(rng: &mut RngManager, sd: f64) -> f64 {
    if sd == 0.0 {
        return 1.0;
    }
    let shape = 1.0 / (sd * sd);
    // rate equals shape, so dividing the unit-rate draw by the shape
    // brings the mean back to 1.0
    gamma_draw(rng, shape) / shape
}

/// Draw from Gamma(shape, 1) via Marsaglia-Tsang squeeze.
///
/// Shapes below 1 are boosted to shape+1 and corrected with
/// u^(1/shape), the standard transformation.
fn gamma_draw(rng: &mut RngManager, shape: f64) -> f64 {
    if shape < 1.0 {
        let u = rng.next_f64().max(f64::MIN_POSITIVE);
        return gamma_draw(rng, shape + 1.0) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let v = (1.0 + c * x).powi(3);
        if v <= 0.0 {
            continue;
        }
        let u = rng.next_f64();
        if u < 1.0 - 0.0331 * x.powi(4) {
            return d * v;
        }
        if u.max(f64::MIN_POSITIVE).ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// Rejection-sample a normal perturbation of `val` with standard deviation
/// `var` until `val + draw` lands in [min, max].
///
/// Must terminate: callers keep `var` small relative to the range, so the
/// acceptance region retains substantial probability mass.
pub fn draw_range(rng: &mut RngManager, val: f64, var: f64, min: f64, max: f64) -> f64 {
    loop {
        let draw = standard_normal(rng) * var;
        if val + draw >= min && val + draw <= max {
            return val + draw;
        }
    }
}

/// Draw from a Beta distribution parameterized by mean and an inverse
/// square-root sample size (keeps the result in (0, 1)).
///
/// With var below 1e-4 the mean is returned unchanged; the mean is clamped
/// to [1e-4, 1 − 1e-4] before shaping. Shape a = mean/var²,
/// b = (1 − mean)/var².
pub fn draw_beta(rng: &mut RngManager, mean: f64, var: f64) -> f64 {
    if var < 1e-4 {
        return mean;
    }
    let mean = mean.clamp(1e-4, 1.0 - 1e-4);
    let a = mean / (var * var);
    let b = (1.0 - mean) / (var * var);
    beta_draw(rng, a, b)
}

/// Draw from a Beta distribution parameterized by mode and concentration.
pub fn draw_beta_mode(rng: &mut RngManager, mode: f64, conc: f64) -> f64 {
    let a = mode * (500.0 * conc) + 1.0;
    let b = (1.0 - mode) * (500.0 * conc) + 1.0;
    beta_draw(rng, a, b)
}

/// Beta(a, b) via two Gamma draws.
fn beta_draw(rng: &mut RngManager, a: f64, b: f64) -> f64 {
    let x = gamma_draw(rng, a);
    let y = gamma_draw(rng, b);
    x / (x + y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uniform() {
        assert_eq!(
            DistributionCode::parse("U(2,4)"),
            Some(DistributionCode::Uniform { lo: 2.0, hi: 4.0 })
        );
    }

    #[test]
    fn test_parse_strips_whitespace() {
        assert_eq!(
            DistributionCode::parse(" N( 0 , 1.5 ) "),
            Some(DistributionCode::Normal { mean: 0.0, sd: 1.5 })
        );
    }

    #[test]
    fn test_parse_gamma_optional_min() {
        assert_eq!(
            DistributionCode::parse("G(10,0.5)"),
            Some(DistributionCode::Gamma {
                mean: 10.0,
                sd: 0.5,
                min: 0.0
            })
        );
        assert_eq!(
            DistributionCode::parse("G(10,0.5,2)"),
            Some(DistributionCode::Gamma {
                mean: 10.0,
                sd: 0.5,
                min: 2.0
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        // missing argument
        assert_eq!(DistributionCode::parse("N(1)"), None);
        // unknown letter
        assert_eq!(DistributionCode::parse("X(1,2)"), None);
        // no parentheses
        assert_eq!(DistributionCode::parse("N1,2"), None);
        // non-numeric argument
        assert_eq!(DistributionCode::parse("U(a,b)"), None);
        // plain values are not codes
        assert_eq!(DistributionCode::parse("0.5"), None);
        assert_eq!(DistributionCode::parse(""), None);
    }

    #[test]
    fn test_sample_malformed_is_nan_not_fatal() {
        let mut rng = RngManager::new(1);
        assert!(sample("N(1)", &mut rng).is_nan());
        assert!(sample("hello", &mut rng).is_nan());
    }

    #[test]
    fn test_uniform_support() {
        let mut rng = RngManager::new(7);
        for _ in 0..1000 {
            let v = sample("U(2,4)", &mut rng);
            assert!((2.0..4.0).contains(&v), "U(2,4) produced {}", v);
        }
    }

    #[test]
    fn test_uniform_sample_mean() {
        let mut rng = RngManager::new(11);
        let n = 10_000;
        let total: f64 = (0..n).map(|_| sample("U(2,4)", &mut rng)).sum();
        let mean = total / n as f64;
        assert!(
            (mean - 3.0).abs() < 0.05,
            "U(2,4) sample mean {} too far from 3.0",
            mean
        );
    }

    #[test]
    fn test_choice_support() {
        let mut rng = RngManager::new(3);
        for _ in 0..1000 {
            let v = sample("C(5)", &mut rng);
            assert!(v >= 0.0 && v < 5.0 && v.fract() == 0.0, "C(5) produced {}", v);
        }
    }

    #[test]
    fn test_gamma_degenerate_sd_zero() {
        // draw = 1 exactly, so G(10,0,2) = 1*(10-2)+2 = 10 for any rng
        let mut rng = RngManager::new(99);
        for _ in 0..100 {
            assert_eq!(sample("G(10,0,2)", &mut rng), 10.0);
        }
        let mut rng2 = RngManager::new(1234);
        assert_eq!(sample("G(10,0,2)", &mut rng2), 10.0);
    }

    #[test]
    fn test_gamma_respects_min() {
        let mut rng = RngManager::new(5);
        for _ in 0..1000 {
            let v = sample("G(10,0.5,2)", &mut rng);
            assert!(v >= 2.0, "G(10,0.5,2) produced {} below the floor", v);
        }
    }

    #[test]
    fn test_unit_mean_gamma_mean_near_one() {
        let mut rng = RngManager::new(21);
        let n = 10_000;
        let total: f64 = (0..n).map(|_| unit_mean_gamma(&mut rng, 0.3)).sum();
        let mean = total / n as f64;
        assert!((mean - 1.0).abs() < 0.05, "unit-mean Gamma mean {}", mean);
    }

    #[test]
    fn test_draw_range_stays_in_bounds() {
        let mut rng = RngManager::new(8);
        for _ in 0..500 {
            let v = draw_range(&mut rng, 0.5, 0.1, 0.0, 1.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_draw_beta_low_var_passthrough() {
        let mut rng = RngManager::new(8);
        assert_eq!(draw_beta(&mut rng, 0.7, 0.0), 0.7);
        // even an out-of-range mean passes through untouched below the cutoff
        assert_eq!(draw_beta(&mut rng, 1.3, 5e-5), 1.3);
    }

    #[test]
    fn test_draw_beta_support() {
        let mut rng = RngManager::new(17);
        for _ in 0..1000 {
            let v = draw_beta(&mut rng, 0.3, 0.2);
            assert!((0.0..=1.0).contains(&v), "Beta draw {} out of (0,1)", v);
        }
    }

    #[test]
    fn test_draw_deterministic() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);
        for code in ["U(0,1)", "N(5,2)", "C(10)", "G(3,0.4,1)"] {
            assert_eq!(sample(code, &mut a), sample(code, &mut b));
        }
    }
}
