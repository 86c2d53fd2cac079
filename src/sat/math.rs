//! The floating-point backend of the orbital predictor
//!
//! The default backend forwards to `libm`. With the `small-math` feature the
//! predictor instead uses the compact kernels below: range-reduced
//! Horner-form polynomials for the trigonometric functions and a
//! Newton-refined square root. They trade the last bits of precision for
//! code size; pass times stay within the ±30 s acceptance window.

#[cfg(not(feature = "small-math"))]
pub(crate) use libm::{asin, atan, cos, fabs, fmod, round, sin, sqrt, tan};

#[cfg(feature = "small-math")]
pub(crate) use small::{asin, atan, cos, fabs, fmod, round, sin, sqrt, tan};

#[cfg(feature = "small-math")]
mod small {
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    /// High part of π/2 for argument reduction
    const PIO2_HI: f64 = 1.570_796_326_794_896_558e0;
    /// Low part of π/2 for argument reduction
    const PIO2_LO: f64 = 6.123_233_995_736_766_036e-17;

    /// Sine kernel coefficients on [-π/4, π/4]
    const S: [f64; 6] = [
        -1.666_666_666_666_663_24e-1,
        8.333_333_333_322_489_46e-3,
        -1.984_126_982_985_794_93e-4,
        2.755_731_370_707_006_77e-6,
        -2.505_076_025_340_686_34e-8,
        1.589_690_995_211_550_10e-10,
    ];

    /// Cosine kernel coefficients on [-π/4, π/4]
    const C: [f64; 6] = [
        4.166_666_666_666_660_19e-2,
        -1.388_888_888_887_410_96e-3,
        2.480_158_728_947_672_94e-5,
        -2.755_731_435_139_066_33e-7,
        2.087_572_321_298_174_83e-9,
        -1.135_964_755_778_819_48e-11,
    ];

    /// Arctangent kernel coefficients on the reduced range
    const AT: [f64; 11] = [
        3.333_333_333_333_293_18e-1,
        -1.999_999_999_987_648_32e-1,
        1.428_571_427_250_346_64e-1,
        -1.111_111_040_546_235_58e-1,
        9.090_887_133_436_506_56e-2,
        -7.691_876_205_044_830_0e-2,
        6.661_073_137_387_531_21e-2,
        -5.833_570_133_790_573_49e-2,
        4.976_877_994_615_932_36e-2,
        -3.653_157_274_421_691_55e-2,
        1.628_582_011_536_578_24e-2,
    ];

    pub(crate) fn fabs(x: f64) -> f64 {
        f64::from_bits(x.to_bits() & 0x7FFF_FFFF_FFFF_FFFF)
    }

    /// Truncation toward zero; arguments are bounded well below 2^63
    fn trunc(x: f64) -> f64 {
        (x as i64) as f64
    }

    pub(crate) fn round(x: f64) -> f64 {
        if x >= 0.0 {
            trunc(x + 0.5)
        } else {
            trunc(x - 0.5)
        }
    }

    pub(crate) fn fmod(x: f64, y: f64) -> f64 {
        if y == 0.0 || x.is_nan() || y.is_nan() || x.is_infinite() {
            return f64::NAN;
        }
        x - trunc(x / y) * y
    }

    pub(crate) fn sqrt(x: f64) -> f64 {
        if x < 0.0 {
            return f64::NAN;
        }
        if x == 0.0 || !x.is_finite() {
            return x;
        }

        // Exponent-halving estimate, then Newton-Raphson refinement
        let mut y = f64::from_bits((x.to_bits() >> 1) + 0x1FF8_0000_0000_0000);
        for _ in 0..4 {
            y = 0.5 * (y + x / y);
        }
        y
    }

    /// The sine kernel on [-π/4, π/4]
    fn sin_kernel(x: f64) -> f64 {
        let z = x * x;
        let p = S[0] + z * (S[1] + z * (S[2] + z * (S[3] + z * (S[4] + z * S[5]))));
        x + x * z * p
    }

    /// The cosine kernel on [-π/4, π/4]
    fn cos_kernel(x: f64) -> f64 {
        let z = x * x;
        let p = C[0] + z * (C[1] + z * (C[2] + z * (C[3] + z * (C[4] + z * C[5]))));
        1.0 - 0.5 * z + z * z * p
    }

    /// Reduces `x` to `[-π/4, π/4]` and returns the quadrant count
    fn reduce(x: f64) -> (i64, f64) {
        let k = round(x / FRAC_PI_2);
        let r = (x - k * PIO2_HI) - k * PIO2_LO;
        (k as i64, r)
    }

    pub(crate) fn sin(x: f64) -> f64 {
        let (k, r) = reduce(x);
        match k.rem_euclid(4) {
            0 => sin_kernel(r),
            1 => cos_kernel(r),
            2 => -sin_kernel(r),
            _ => -cos_kernel(r),
        }
    }

    pub(crate) fn cos(x: f64) -> f64 {
        let (k, r) = reduce(x);
        match k.rem_euclid(4) {
            0 => cos_kernel(r),
            1 => -sin_kernel(r),
            2 => -cos_kernel(r),
            _ => sin_kernel(r),
        }
    }

    pub(crate) fn tan(x: f64) -> f64 {
        sin(x) / cos(x)
    }

    /// The arctangent kernel on the reduced range
    fn atan_kernel(x: f64) -> f64 {
        let z = x * x;
        let w = z * z;
        let s1 = z * (AT[0] + w * (AT[2] + w * (AT[4] + w * (AT[6] + w * (AT[8] + w * AT[10])))));
        let s2 = w * (AT[1] + w * (AT[3] + w * (AT[5] + w * (AT[7] + w * AT[9]))));
        x - x * (s1 + s2)
    }

    pub(crate) fn atan(x: f64) -> f64 {
        let t = fabs(x);
        let result = if t <= 0.4375 {
            atan_kernel(t)
        } else if t <= 1.0 {
            FRAC_PI_4 + atan_kernel((t - 1.0) / (t + 1.0))
        } else {
            let inv = 1.0 / t;
            let inner = if inv <= 0.4375 {
                atan_kernel(inv)
            } else {
                FRAC_PI_4 + atan_kernel((inv - 1.0) / (inv + 1.0))
            };
            FRAC_PI_2 - inner
        };
        if x < 0.0 {
            -result
        } else {
            result
        }
    }

    pub(crate) fn asin(x: f64) -> f64 {
        if fabs(x) > 1.0 {
            return f64::NAN;
        }
        if fabs(x) == 1.0 {
            return FRAC_PI_2 * x;
        }
        atan(x / sqrt(1.0 - x * x))
    }
}
