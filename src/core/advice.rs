use super::plan::RetirementPlan;

/// Typical ranges the plan inputs are compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryRanges {
    pub savings_rate: [f64; 2],
    pub growth_rate_pre_retirement: [f64; 2],
    pub growth_rate_intra_retirement: [f64; 2],
    pub annual_income: f64,
    pub age_retirement: [i32; 2],
    pub life_expectancy: [i32; 2],
    pub years_in_go_go: [i32; 2],
}

impl Default for IndustryRanges {
    fn default() -> Self {
        Self {
            savings_rate: [15.0, 25.0],
            growth_rate_pre_retirement: [7.0, 10.0],
            growth_rate_intra_retirement: [3.0, 6.0],
            annual_income: 70_000.0,
            age_retirement: [58, 67],
            life_expectancy: [70, 85],
            years_in_go_go: [8, 14],
        }
    }
}

/// Final balance at or above which the plan counts as over-funded.
pub const SURPLUS_THRESHOLD: f64 = 50_000.0;

fn range<T: std::fmt::Display>(bounds: [T; 2], suffix: &str) -> String {
    format!("{}{suffix} - {}{suffix}", bounds[0], bounds[1])
}

fn dollars(amount: f64) -> String {
    let whole = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if amount < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Suggestions for a plan whose last-stage balance is `final_balance`.
///
/// A depleted plan gets ways to save more or spend less; a plan ending with a
/// large surplus gets ways to loosen it. Anything in between gets none.
pub fn recommendations(
    plan: &RetirementPlan,
    final_balance: f64,
    ranges: &IndustryRanges,
) -> Vec<String> {
    let mut recs = Vec::new();
    let go_go = plan.phase_years().go_go;

    if final_balance < 0.0 {
        if plan.savings_rate < ranges.savings_rate[0] {
            recs.push(format!(
                "Consider increasing your savings/contribution rate ({})",
                range(ranges.savings_rate, "%")
            ));
        }
        if plan.growth_rate_pre_retirement < ranges.growth_rate_pre_retirement[0] {
            recs.push(format!(
                "Increase the pre-retirement growth rate to a more likely level ({})",
                range(ranges.growth_rate_pre_retirement, "%")
            ));
        }
        if plan.annual_income < ranges.annual_income {
            recs.push(format!(
                "Brainstorm avenues to increase your annual income closer to the US median ({})",
                dollars(ranges.annual_income)
            ));
        }
        if plan.growth_rate_intra_retirement < ranges.growth_rate_intra_retirement[0] {
            recs.push(format!(
                "Increase the intra-retirement growth rate to a more reasonable range ({})",
                range(ranges.growth_rate_intra_retirement, "%")
            ));
        }
        if plan.age_retirement < ranges.age_retirement[0] {
            recs.push(format!(
                "Consider shifting the target retirement age back so you have more time to save ({})",
                range(ranges.age_retirement, "")
            ));
        }
        if plan.life_expectancy > ranges.life_expectancy[1] {
            recs.push(format!(
                "Re-think how many years you anticipate living ({})",
                range(ranges.life_expectancy, "")
            ));
        }
        if go_go > ranges.years_in_go_go[1] {
            recs.push(format!(
                "Adjust your plan for years in the \"Go-Go\" stage ({})",
                range(ranges.years_in_go_go, "")
            ));
        }
    } else if final_balance >= SURPLUS_THRESHOLD {
        if plan.growth_rate_pre_retirement > ranges.growth_rate_pre_retirement[1] {
            recs.push(format!(
                "Decrease the pre-retirement growth rate to a more likely level ({})",
                range(ranges.growth_rate_pre_retirement, "%")
            ));
        }
        if plan.savings_rate > ranges.savings_rate[1] {
            recs.push(format!(
                "Consider lowering your savings/contribution rate ({})",
                range(ranges.savings_rate, "%")
            ));
        }
        if plan.growth_rate_intra_retirement > ranges.growth_rate_intra_retirement[1] {
            recs.push(format!(
                "Reduce the intra-retirement growth rate to a more reasonable range ({})",
                range(ranges.growth_rate_intra_retirement, "%")
            ));
        }
        if go_go < ranges.years_in_go_go[0] {
            recs.push(format!(
                "Consider increasing your plan for years in the \"Go-Go\" stage ({})",
                range(ranges.years_in_go_go, "")
            ));
        }
        if plan.life_expectancy < ranges.life_expectancy[0] {
            recs.push(format!(
                "You may want to plan for a longer life expectancy ({})",
                range(ranges.life_expectancy, "")
            ));
        }
        if plan.age_retirement > ranges.age_retirement[1] {
            recs.push(format!(
                "Consider moving up your target retirement age ({})",
                range(ranges.age_retirement, "")
            ));
        }
    }

    recs
}
