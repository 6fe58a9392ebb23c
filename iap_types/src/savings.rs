// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Subscription savings math: how much a yearly product saves compared to
//! paying the monthly price twelve times.

use crate::Product;

/// The savings of a yearly price over twelve monthly payments, as a raw
/// 0–1 fraction.
///
/// Returns `None` when either amount is zero. The result is negative when
/// the yearly price is the worse deal.
pub fn yearly_savings_fraction(yearly_minor: u64, monthly_minor: u64) -> Option<f64> {
    if yearly_minor == 0 || monthly_minor == 0 {
        return None;
    }
    Some(1.0 - yearly_minor as f64 / (12.0 * monthly_minor as f64))
}

/// The savings of a yearly price over twelve monthly payments, as a
/// rounded 0–100 display percentage.
pub fn yearly_savings_display_percentage(yearly_minor: u64, monthly_minor: u64) -> Option<i32> {
    yearly_savings_fraction(yearly_minor, monthly_minor)
        .map(|fraction| (100.0 * fraction).round() as i32)
}

/// The display savings percentage for a yearly product compared to a
/// monthly one.
///
/// Returns `None` when the prices are in different currencies.
pub fn yearly_savings_display_percentage_for(yearly: &Product, monthly: &Product) -> Option<i32> {
    if yearly.price.currency != monthly.price.currency {
        return None;
    }
    yearly_savings_display_percentage(yearly.price.amount_minor, monthly.price.amount_minor)
}
