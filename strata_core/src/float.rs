// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `libm`-backed float math for builds without `std`.

/// The `f64` methods missing from `core` that easing needs.
#[cfg_attr(
    test,
    allow(
        dead_code,
        reason = "test builds link `std`, whose inherent float methods take precedence"
    )
)]
pub(crate) trait FloatExt {
    fn powi(self, n: i32) -> Self;
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn powi(self, n: i32) -> Self {
        libm::pow(self, f64::from(n))
    }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("strata_core requires either the `std` or `libm` feature");
