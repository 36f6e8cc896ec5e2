//! Easing functions for animations
//!
//! Every curve maps normalized progress `x` to a scaled output and is shaped
//! by a power exponent `p`.

use std::f64::consts::PI;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// `(e^(p·x) − 1) / (e^p − 1)`: slow start, fast finish
    #[default]
    Pop,
    /// `sin(x·π/2)^p`: fast start, soft landing
    SoftPop,
    /// `sin(x·π)^p`: rises to the target and returns to the start
    Peek,
}

impl Easing {
    /// Look up a style by name; unknown names fall back to [`Easing::Pop`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "softPop" | "soft_pop" => Easing::SoftPop,
            "peek" => Easing::Peek,
            _ => Easing::Pop,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Pop => "pop",
            Easing::SoftPop => "softPop",
            Easing::Peek => "peek",
        }
    }

    /// Apply the easing function to a progress value with exponent `power`
    pub fn apply(&self, x: f64, power: f64) -> f64 {
        match self {
            Easing::Pop => pop(x, power),
            Easing::SoftPop => (x * PI / 2.0).sin().powf(power),
            Easing::Peek => peek(x, power),
        }
    }
}

fn pop(x: f64, power: f64) -> f64 {
    // the limit of the curve as p -> 0 is linear
    if power == 0.0 {
        return x;
    }
    (power * x).exp_m1() / power.exp_m1()
}

fn peek(x: f64, power: f64) -> f64 {
    // sin(π) is ~1.2e-16, not 0
    if x == 1.0 {
        return 0.0;
    }
    (x * PI).sin().powf(power)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_boundaries() {
        for power in [1.0, 2.0, 3.5] {
            assert!(Easing::Pop.apply(0.0, power).abs() < EPS);
            assert!((Easing::Pop.apply(1.0, power) - 1.0).abs() < EPS);
            assert!(Easing::SoftPop.apply(0.0, power).abs() < EPS);
            assert!((Easing::SoftPop.apply(1.0, power) - 1.0).abs() < EPS);
            assert!(Easing::Peek.apply(0.0, power).abs() < EPS);
            assert!(Easing::Peek.apply(1.0, power).abs() < EPS);
        }
    }

    #[test]
    fn test_peek_tops_out_halfway() {
        assert!((Easing::Peek.apply(0.5, 1.0) - 1.0).abs() < EPS);
        assert!((Easing::Peek.apply(0.5, 3.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_pop_is_slow_then_fast() {
        let quarter = Easing::Pop.apply(0.25, 3.0);
        assert!(quarter < 0.25);
        assert!(Easing::Pop.apply(0.75, 3.0) > quarter);
        // power 1 stays close to, but below, linear
        assert!(Easing::Pop.apply(0.5, 1.0) < 0.5);
    }

    #[test]
    fn test_soft_pop_is_fast_then_slow() {
        assert!(Easing::SoftPop.apply(0.25, 1.0) > 0.25);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Easing::from_name("pop"), Easing::Pop);
        assert_eq!(Easing::from_name("softPop"), Easing::SoftPop);
        assert_eq!(Easing::from_name("peek"), Easing::Peek);
        assert_eq!(Easing::from_name("bounce"), Easing::Pop);
        assert_eq!(Easing::from_name(Easing::SoftPop.name()), Easing::SoftPop);
    }
}
