//! Element types and their arithmetic
//!
//! `Element` binds a type to the generic containers. A type without an
//! `Element` implementation cannot be stored, which the compiler reports at
//! build time. `Arith` adds the Octave arithmetic rules:
//!
//! - integers saturate and division rounds to nearest, with `x/0` giving the
//!   type's max, min or zero depending on the sign of `x`
//! - reals follow IEEE 754
//! - complex division follows C99 Annex G, so `(1+0i)/(0+0i)` is `Inf+NaN*i`

use std::cmp::Ordering;
use std::fmt;

use nalgebra::Complex;
use num_traits::{Float, FloatConst};

/// A type storable in `Array`, `DiagArray2` and `SparseArray`
pub trait Element: Clone + fmt::Debug + Send + Sync + 'static {
    /// Fill value for grown regions and off-diagonal reads
    fn zero() -> Self;
}

/// Numeric element with Octave arithmetic
pub trait Arith: Element + Copy + PartialEq {
    fn one() -> Self;
    fn plus(self, rhs: Self) -> Self;
    fn minus(self, rhs: Self) -> Self;
    fn times(self, rhs: Self) -> Self;
    fn divide(self, rhs: Self) -> Self;
    fn negate(self) -> Self;
    fn power(self, rhs: Self) -> Self;

    fn conjugate(self) -> Self {
        self
    }

    fn is_zero(&self) -> bool;

    fn is_nan(&self) -> bool {
        false
    }

    /// Octave ordering; `None` when either side is NaN
    fn octave_cmp(&self, other: &Self) -> Option<Ordering>;
}

/// Real element convertible through `f64`
pub trait RealElement: Arith + PartialOrd {
    fn to_f64(self) -> f64;

    /// Integers round to nearest and saturate, NaN becomes zero
    fn from_f64(x: f64) -> Self;
}

/// Integer element with exact conversions between widths
pub trait IntegerElement: RealElement + Eq + Ord {
    const MIN_WIDE: i128;
    const MAX_WIDE: i128;

    fn to_i128(self) -> i128;

    fn from_i128_saturating(v: i128) -> Self;
}

impl Element for bool {
    fn zero() -> Self {
        false
    }
}

impl Element for char {
    fn zero() -> Self {
        '\0'
    }
}

/// Rounded integer quotient, half away from zero
fn rounded_div(a: i128, b: i128, min: i128, max: i128) -> i128 {
    if b == 0 {
        return match a.cmp(&0) {
            Ordering::Greater => max,
            Ordering::Less => min,
            Ordering::Equal => 0,
        };
    }
    let mut q = a / b;
    let r = a % b;
    if 2 * r.abs() >= b.abs() {
        q += if (a < 0) == (b < 0) { 1 } else { -1 };
    }
    q.clamp(min, max)
}

macro_rules! integer_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                fn zero() -> Self {
                    0
                }
            }

            impl Arith for $t {
                fn one() -> Self {
                    1
                }

                fn plus(self, rhs: Self) -> Self {
                    Self::from_i128_saturating(self as i128 + rhs as i128)
                }

                fn minus(self, rhs: Self) -> Self {
                    Self::from_i128_saturating(self as i128 - rhs as i128)
                }

                fn times(self, rhs: Self) -> Self {
                    let (a, b) = (self as i128, rhs as i128);
                    // u64 products can exceed i128
                    let wide = a.checked_mul(b).unwrap_or(if (a < 0) != (b < 0) {
                        i128::MIN
                    } else {
                        i128::MAX
                    });
                    Self::from_i128_saturating(wide)
                }

                fn divide(self, rhs: Self) -> Self {
                    rounded_div(self as i128, rhs as i128, Self::MIN_WIDE, Self::MAX_WIDE) as $t
                }

                fn negate(self) -> Self {
                    Self::from_i128_saturating(-(self as i128))
                }

                fn power(self, rhs: Self) -> Self {
                    Self::from_f64((self as f64).powf(rhs as f64))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn octave_cmp(&self, other: &Self) -> Option<Ordering> {
                    Some(self.cmp(other))
                }
            }

            impl RealElement for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(x: f64) -> Self {
                    // float-to-int `as` saturates and maps NaN to 0
                    x.round() as $t
                }
            }

            impl IntegerElement for $t {
                const MIN_WIDE: i128 = <$t>::MIN as i128;
                const MAX_WIDE: i128 = <$t>::MAX as i128;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128_saturating(v: i128) -> Self {
                    v.clamp(Self::MIN_WIDE, Self::MAX_WIDE) as $t
                }
            }
        )*
    };
}

integer_element!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! float_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                fn zero() -> Self {
                    0.0
                }
            }

            impl Arith for $t {
                fn one() -> Self {
                    1.0
                }

                fn plus(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn minus(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn times(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn divide(self, rhs: Self) -> Self {
                    self / rhs
                }

                fn negate(self) -> Self {
                    -self
                }

                fn power(self, rhs: Self) -> Self {
                    self.powf(rhs)
                }

                fn is_zero(&self) -> bool {
                    *self == 0.0
                }

                fn is_nan(&self) -> bool {
                    <$t>::is_nan(*self)
                }

                fn octave_cmp(&self, other: &Self) -> Option<Ordering> {
                    self.partial_cmp(other)
                }
            }

            impl RealElement for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(x: f64) -> Self {
                    x as $t
                }
            }
        )*
    };
}

float_element!(f32, f64);

impl<T> Element for Complex<T>
where
    T: Float + fmt::Debug + Send + Sync + 'static,
{
    fn zero() -> Self {
        Complex::new(T::zero(), T::zero())
    }
}

impl<T> Arith for Complex<T>
where
    T: Float + FloatConst + fmt::Debug + Send + Sync + 'static,
{
    fn one() -> Self {
        Complex::new(T::one(), T::zero())
    }

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn divide(self, rhs: Self) -> Self {
        annex_g_div(self, rhs)
    }

    fn negate(self) -> Self {
        -self
    }

    fn power(self, rhs: Self) -> Self {
        if rhs.re.is_zero() && rhs.im.is_zero() {
            return Self::one();
        }
        if self.re.is_zero() && self.im.is_zero() && rhs.im.is_zero() && rhs.re > T::zero() {
            return <Self as Element>::zero();
        }
        if rhs.im.is_zero() && rhs.re == rhs.re.round() && rhs.re.abs() <= T::from(1024).unwrap_or(T::zero()) {
            return integer_power(self, rhs.re);
        }
        self.powc(rhs)
    }

    fn conjugate(self) -> Self {
        self.conj()
    }

    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    fn is_nan(&self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    fn octave_cmp(&self, other: &Self) -> Option<Ordering> {
        if Arith::is_nan(self) || Arith::is_nan(other) {
            return None;
        }
        match self.norm().partial_cmp(&other.norm())? {
            Ordering::Equal => octave_arg(*self).partial_cmp(&octave_arg(*other)),
            ord => Some(ord),
        }
    }
}

/// Argument in `(-pi, pi]`, so negative reals sort after positive ones
fn octave_arg<T: Float + FloatConst>(z: Complex<T>) -> T {
    let t = z.im.atan2(z.re);
    if t == -T::PI() {
        T::PI()
    } else {
        t
    }
}

/// Exact powers for small integral exponents
fn integer_power<T>(base: Complex<T>, exponent: T) -> Complex<T>
where
    T: Float + FloatConst + fmt::Debug + Send + Sync + 'static,
{
    let mut n = exponent.abs().to_u32().unwrap_or(0);
    let mut acc = Complex::<T>::one();
    let mut b = base;
    while n > 0 {
        if n & 1 == 1 {
            acc = acc * b;
        }
        b = b * b;
        n >>= 1;
    }
    if exponent < T::zero() {
        annex_g_div(Complex::<T>::one(), acc)
    } else {
        acc
    }
}

fn logb<T: Float>(x: T) -> T {
    let x = x.abs();
    if x.is_zero() {
        T::neg_infinity()
    } else if !x.is_finite() {
        T::infinity()
    } else {
        x.log2().floor()
    }
}

fn scalbn<T: Float>(x: T, n: i32) -> T {
    let two = T::one() + T::one();
    let half = n / 2;
    x * two.powi(half) * two.powi(n - half)
}

/// Complex division per C99 Annex G (`_Cdivd`)
pub fn annex_g_div<T: Float>(num: Complex<T>, den: Complex<T>) -> Complex<T> {
    let (mut a, mut b) = (num.re, num.im);
    let (mut c, mut d) = (den.re, den.im);
    let zero = T::zero();
    let one = T::one();

    let logbw = logb(c.abs().max(d.abs()));
    let mut ilogbw = 0;
    if logbw.is_finite() {
        ilogbw = logbw.to_i32().unwrap_or(0);
        c = scalbn(c, -ilogbw);
        d = scalbn(d, -ilogbw);
    }
    let denom = c * c + d * d;
    let mut x = scalbn((a * c + b * d) / denom, -ilogbw);
    let mut y = scalbn((b * c - a * d) / denom, -ilogbw);

    if x.is_nan() && y.is_nan() {
        if denom == zero && (!a.is_nan() || !b.is_nan()) {
            x = T::infinity().copysign(c) * a;
            y = T::infinity().copysign(c) * b;
        } else if (a.is_infinite() || b.is_infinite()) && c.is_finite() && d.is_finite() {
            a = (if a.is_infinite() { one } else { zero }).copysign(a);
            b = (if b.is_infinite() { one } else { zero }).copysign(b);
            x = T::infinity() * (a * c + b * d);
            y = T::infinity() * (b * c - a * d);
        } else if logbw == T::infinity() && a.is_finite() && b.is_finite() {
            c = (if c.is_infinite() { one } else { zero }).copysign(c);
            d = (if d.is_infinite() { one } else { zero }).copysign(d);
            x = zero * (a * c + b * d);
            y = zero * (b * c - a * d);
        }
    }
    Complex::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_saturation() {
        assert_eq!(100i8.plus(100), 127);
        assert_eq!((-100i8).minus(100), -128);
        assert_eq!(3u8.minus(5), 0);
        assert_eq!(i32::MIN.negate(), i32::MAX);
        assert_eq!(16i16.times(4096), i16::MAX);
    }

    #[test]
    fn test_uint64_multiply_saturates() {
        assert_eq!(u64::MAX.times(u64::MAX), u64::MAX);
        assert_eq!(u64::MAX.times(0), 0);
        assert_eq!(i64::MAX.times(i64::MAX), i64::MAX);
        assert_eq!(i64::MIN.times(i64::MAX), i64::MIN);
        assert_eq!(i64::MIN.times(i64::MIN), i64::MAX);
    }

    #[test]
    fn test_integer_division_rounds() {
        assert_eq!(7i32.divide(2), 4);
        assert_eq!((-7i32).divide(2), -4);
        assert_eq!(5i32.divide(3), 2);
        assert_eq!(5i8.divide(0), i8::MAX);
        assert_eq!((-5i8).divide(0), i8::MIN);
        assert_eq!(0u8.divide(0), 0);
        assert_eq!(i64::MIN.divide(-1), i64::MAX);
    }

    #[test]
    fn test_integer_from_f64() {
        assert_eq!(i8::from_f64(2.5), 3);
        assert_eq!(i8::from_f64(-2.5), -3);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(i16::from_f64(f64::NAN), 0);
        assert_eq!(i32::from_f64(f64::INFINITY), i32::MAX);
    }

    #[test]
    fn test_complex_division_by_zero() {
        let q = Complex::new(1.0f64, 0.0).divide(Complex::new(0.0, 0.0));
        assert!(q.re.is_infinite() && q.re > 0.0);
        assert!(q.im.is_nan());
    }

    #[test]
    fn test_complex_division_regular() {
        let q = Complex::new(1.0f64, 2.0).divide(Complex::new(3.0, 4.0));
        assert!((q.re - 0.44).abs() < 1e-12);
        assert!((q.im - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_complex_ordering() {
        let a = Complex::new(1.0f64, 0.0);
        let b = Complex::new(0.0f64, 2.0);
        assert_eq!(a.octave_cmp(&b), Some(Ordering::Less));
        // equal modulus: -1 has arg pi, which sorts after +1
        let neg = Complex::new(-1.0f64, 0.0);
        assert_eq!(a.octave_cmp(&neg), Some(Ordering::Less));
        let nan = Complex::new(f64::NAN, 0.0);
        assert_eq!(a.octave_cmp(&nan), None);
    }

    #[test]
    fn test_complex_power() {
        let i = Complex::new(0.0f64, 1.0);
        let sq = i.power(Complex::new(2.0, 0.0));
        assert_eq!(sq, Complex::new(-1.0, 0.0));
        assert_eq!(i.power(Complex::new(0.0, 0.0)), Complex::new(1.0, 0.0));
    }
}
