//! Tolerances and numerical solvers used by the curve math.
//!
//! The root solvers follow the usual vector-graphics approach: coefficients
//! are normalized towards unit magnitude before testing the discriminant,
//! and the real root of a cubic is polished with a monotone Newton loop
//! before the remaining quadratic is deflated out.

/// Generic tolerance for values that should be treated as zero.
pub const EPSILON: f64 = 1e-12;
/// Smallest relative difference representable in an `f64` around 1.
pub const MACHINE_EPSILON: f64 = 1.12e-16;
/// Tolerance on curve-time parameters.
pub const CURVETIME_EPSILON: f64 = 1e-8;
/// Tolerance on distances between points.
pub const GEOMETRIC_EPSILON: f64 = 1e-7;
/// Tolerance on normalized cross products (sine of an angle).
pub const TRIGONOMETRIC_EPSILON: f64 = 1e-8;
/// Width below which fat-line clipping stops narrowing.
pub const CLIPPING_EPSILON: f64 = 1e-9;
/// Handle length factor for approximating a quarter circle with a cubic.
pub const KAPPA: f64 = 0.552_284_749_830_793_6;

const NEWTON_MAX_ITERATIONS: usize = 100;

// Gauss-Legendre abscissae and weights on [-1, 1].
const GAUSS_ABSCISSAE: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.0,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

/// Returns true if `value` is within [`EPSILON`] of zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// Returns true if `value` is within [`MACHINE_EPSILON`] of zero.
pub fn is_machine_zero(value: f64) -> bool {
    value.abs() <= MACHINE_EPSILON
}

/// Clamps `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Power-of-two factor that brings the largest coefficient near 1.
///
/// Returns 0 when no scaling is needed or possible.
fn normalization_factor(values: &[f64]) -> f64 {
    let norm = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if norm != 0.0 && !(1e-8..=1e8).contains(&norm) {
        2f64.powi(-(norm.log2().round() as i32))
    } else {
        0.0
    }
}

fn discriminant(a: f64, b: f64, c: f64) -> f64 {
    b.mul_add(b, -a * c)
}

fn push_root(roots: &mut Vec<f64>, root: f64, bounds: Option<(f64, f64)>) {
    if !root.is_finite() {
        return;
    }
    let root = match bounds {
        Some((min, max)) => {
            if root < min - EPSILON || root > max + EPSILON {
                return;
            }
            clamp(root, min, max)
        }
        None => root,
    };
    if !roots.contains(&root) {
        roots.push(root);
    }
}

/// Solves `a·x² + b·x + c = 0`.
///
/// Real roots are returned in no particular order. With `bounds`, roots
/// outside the interval (beyond [`EPSILON`]) are dropped and the rest are
/// clamped into it. A zero polynomial yields no roots.
pub fn solve_quadratic(a: f64, b: f64, c: f64, bounds: Option<(f64, f64)>) -> Vec<f64> {
    let mut roots = Vec::with_capacity(2);
    let (mut a, mut b, mut c) = (a, b, c);
    let mut x1 = f64::INFINITY;
    let mut x2 = f64::INFINITY;

    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return roots;
        }
        x1 = -c / b;
    } else {
        b *= -0.5;
        let mut d = discriminant(a, b, c);
        if d != 0.0 && d.abs() < MACHINE_EPSILON {
            let factor = normalization_factor(&[a, b, c]);
            if factor != 0.0 {
                a *= factor;
                b *= factor;
                c *= factor;
                d = discriminant(a, b, c);
            }
        }
        if d >= -MACHINE_EPSILON {
            let q = if d < 0.0 { 0.0 } else { d.sqrt() };
            let r = b + if b < 0.0 { -q } else { q };
            if r == 0.0 {
                x1 = c / a;
                x2 = -x1;
            } else {
                x1 = r / a;
                x2 = c / r;
            }
        }
    }

    push_root(&mut roots, x1, bounds);
    push_root(&mut roots, x2, bounds);
    roots
}

/// Solves `a·x³ + b·x² + c·x + d = 0`.
///
/// One real root is located with a Newton iteration that approaches it
/// monotonically from a safe bound; the remaining quadratic is then solved
/// with [`solve_quadratic`]. `bounds` behaves as for [`solve_quadratic`].
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64, bounds: Option<(f64, f64)>) -> Vec<f64> {
    let factor = normalization_factor(&[a, b, c, d]);
    let (mut a, b, c, d) = if factor != 0.0 {
        (a * factor, b * factor, c * factor, d * factor)
    } else {
        (a, b, c, d)
    };

    let mut x = f64::INFINITY;
    let mut b1;
    let mut c2;

    if a.abs() < EPSILON {
        // Degenerates to b·x² + c·x + d.
        a = b;
        b1 = c;
        c2 = d;
    } else if d.abs() < EPSILON {
        b1 = b;
        c2 = c;
        x = 0.0;
    } else {
        // Evaluates the polynomial and its derivative at x0, keeping the
        // deflated coefficients.
        let evaluate = |x0: f64| {
            let tmp = a * x0;
            let b1 = tmp + b;
            let c2 = b1 * x0 + c;
            let qd = (tmp + b1) * x0 + c2;
            let q = c2 * x0 + d;
            (b1, c2, qd, q)
        };

        x = -(b / a) / 3.0;
        let (eb1, ec2, qd, q) = evaluate(x);
        b1 = eb1;
        c2 = ec2;
        let t = q / a;
        let r = t.abs().cbrt();
        let s = if t < 0.0 { -1.0 } else { 1.0 };
        let td = -qd / a;
        let rd = if td > 0.0 {
            1.324_717_957_244_746 * r.max(td.sqrt())
        } else {
            r
        };
        let mut x0 = x - s * rd;
        if x0 != x {
            for _ in 0..NEWTON_MAX_ITERATIONS {
                let (eb1, ec2, qd, q) = evaluate(x0);
                b1 = eb1;
                c2 = ec2;
                x = x0;
                let x1 = if qd == 0.0 {
                    x0
                } else {
                    x0 - q / qd / (1.0 + MACHINE_EPSILON)
                };
                if s * x1 > s * x0 {
                    x0 = x1;
                } else {
                    break;
                }
            }
            if a.abs() * x * x > (d / x).abs() {
                c2 = -d / x;
                b1 = (c2 - c) / x;
            }
        }
    }

    let mut roots = solve_quadratic(a, b1, c2, bounds);
    if x.is_finite() {
        push_root(&mut roots, x, bounds);
    }
    roots
}

/// Finds a root of an increasing function `f` with derivative `df` inside
/// `[a, b]`, starting from `x`.
///
/// Newton steps that leave the bracket fall back to bisection, so the
/// result always stays inside the interval.
pub fn find_root(
    f: impl Fn(f64) -> f64,
    df: impl Fn(f64) -> f64,
    x: f64,
    a: f64,
    b: f64,
    max_iterations: usize,
    tolerance: f64,
) -> f64 {
    let (mut a, mut b, mut x) = (a, b, x);
    for _ in 0..max_iterations {
        let fx = f(x);
        let slope = df(x);
        let dx = if slope == 0.0 { 0.0 } else { fx / slope };
        let nx = x - dx;
        if dx.abs() < tolerance {
            x = nx;
            break;
        }
        if fx > 0.0 {
            b = x;
            x = if nx <= a { (a + b) * 0.5 } else { nx };
        } else {
            a = x;
            x = if nx >= b { (a + b) * 0.5 } else { nx };
        }
    }
    clamp(x, a, b)
}

fn gauss_legendre(f: &impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let half = (b - a) * 0.5;
    let mid = (a + b) * 0.5;
    GAUSS_ABSCISSAE
        .iter()
        .zip(GAUSS_WEIGHTS.iter())
        .map(|(x, w)| w * f(mid + half * x))
        .sum::<f64>()
        * half
}

/// Integrates `f` over `[a, b]` by recursive subdivision.
///
/// An interval is accepted once the estimate over the whole interval and
/// the sum of its two halves agree within `tolerance` (relative), or when
/// `max_depth` is reached.
pub fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64, tolerance: f64, max_depth: u32) -> f64 {
    fn recurse(
        f: &impl Fn(f64) -> f64,
        a: f64,
        b: f64,
        whole: f64,
        tolerance: f64,
        depth: u32,
    ) -> f64 {
        let mid = (a + b) * 0.5;
        let left = gauss_legendre(f, a, mid);
        let right = gauss_legendre(f, mid, b);
        let halves = left + right;
        if depth == 0 || (halves - whole).abs() <= tolerance * halves.abs().max(EPSILON) {
            return halves;
        }
        recurse(f, a, mid, left, tolerance, depth - 1)
            + recurse(f, mid, b, right, tolerance, depth - 1)
    }

    if a == b {
        return 0.0;
    }
    let whole = gauss_legendre(&f, a, b);
    recurse(&f, a, b, whole, tolerance, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sorted(mut roots: Vec<f64>) -> Vec<f64> {
        roots.sort_by(|a, b| a.total_cmp(b));
        roots
    }

    #[test]
    fn test_solve_quadratic_two_roots() {
        let roots = sorted(solve_quadratic(1.0, -3.0, 2.0, None));
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(roots[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_quadratic_linear_and_empty() {
        assert_eq!(solve_quadratic(0.0, 2.0, -1.0, None), vec![0.5]);
        assert!(solve_quadratic(0.0, 0.0, 1.0, None).is_empty());
        assert!(solve_quadratic(1.0, 0.0, 1.0, None).is_empty());
    }

    #[test]
    fn test_solve_quadratic_bounds() {
        let roots = solve_quadratic(1.0, -3.0, 2.0, Some((0.0, 1.0)));
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_cubic_three_roots() {
        // (x - 1)(x - 2)(x - 3)
        let roots = sorted(solve_cubic(1.0, -6.0, 11.0, -6.0, None));
        assert_eq!(roots.len(), 3);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert_relative_eq!(*root, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_solve_cubic_single_root() {
        // x³ + x + 1 has a single real root near -0.6823
        let roots = solve_cubic(1.0, 0.0, 1.0, 1.0, None);
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], -0.682_327_803_828_019_3, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_cubic_zero_constant() {
        let roots = sorted(solve_cubic(1.0, -1.0, 0.0, 0.0, None));
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(roots[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_find_root_bracketed() {
        let root = find_root(|x| x * x - 2.0, |x| 2.0 * x, 1.0, 0.0, 2.0, 32, 1e-12);
        assert_relative_eq!(root, 2f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_integrate_polynomial() {
        let value = integrate(|x| 3.0 * x * x, 0.0, 2.0, 1e-6, 8);
        assert_relative_eq!(value, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_integrate_quarter_circle() {
        let value = integrate(|x| (1.0 - x * x).max(0.0).sqrt(), 0.0, 1.0, 1e-10, 16);
        assert_relative_eq!(value, std::f64::consts::FRAC_PI_4, epsilon = 1e-5);
    }
}
