//! Linear interior-work pricing.
//!
//! `rate = base[category] + Σ surcharge[selected option]` (만원 per 평), then
//! `low = ⌊rate·area / 10⌋·10` and `high = ⌊rate·area·1.3 / 10⌋·10`.

use crate::domain::model::{AreaUnits, BusinessCategory, EstimateInput, EstimateResult, OptionSelection};

/// Upper band multiplier, expressed in percent so the math stays integral.
pub const HIGH_BAND_PERCENT: u64 = 130;

/// Both bounds are floored to this unit.
pub const ROUNDING_UNIT: u64 = 10;

pub fn per_unit_rate(category: BusinessCategory, options: &OptionSelection) -> u64 {
    category.base_rate() + options.selected().map(|o| o.surcharge()).sum::<u64>()
}

/// `{0, 0}` while no category has been chosen.
pub fn estimate(
    category: Option<BusinessCategory>,
    area: AreaUnits,
    options: &OptionSelection,
) -> EstimateResult {
    let Some(category) = category else {
        return EstimateResult::default();
    };

    let subtotal = per_unit_rate(category, options) * u64::from(area.get());
    let low = subtotal / ROUNDING_UNIT * ROUNDING_UNIT;
    // ⌊subtotal·1.3/10⌋·10 == ⌊subtotal·130 / (100·10)⌋·10
    let high = subtotal * HIGH_BAND_PERCENT / (100 * ROUNDING_UNIT) * ROUNDING_UNIT;

    EstimateResult { low, high }
}

pub fn estimate_for(input: &EstimateInput) -> EstimateResult {
    estimate(input.category, input.area, &input.options)
}
