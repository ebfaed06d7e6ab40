use log::warn;
use serde::Serialize;

use super::engine::assemble;
use super::types::{FullProjection, InflationAdjustment, ProjectionError, Stage};

pub const PRE_RETIREMENT: &str = "Pre-retirement";
pub const GO_GO: &str = "Go-Go Years";
pub const SLOW_GO: &str = "Slow-Go Years";
pub const NO_GO: &str = "No-Go Years";

/// User-facing retirement parameters. Rates and replacement ratios are percents.
#[derive(Debug, Clone, PartialEq)]
pub struct RetirementPlan {
    pub age_today: i32,
    pub age_retirement: i32,
    pub life_expectancy: i32,
    pub annual_income: f64,
    pub income_replacement_go_go: f64,
    pub income_replacement_slow_go: f64,
    pub income_replacement_no_go: f64,
    pub current_balance: f64,
    pub annual_raises: f64,
    pub savings_rate: f64,
    pub growth_rate_pre_retirement: f64,
    pub growth_rate_intra_retirement: f64,
    pub annual_inflation: f64,
    /// Ages at which Go-Go ends and Slow-Go ends.
    pub boundary_override: Option<[i32; 2]>,
}

impl Default for RetirementPlan {
    fn default() -> Self {
        Self {
            age_today: 25,
            age_retirement: 60,
            life_expectancy: 90,
            annual_income: 100_000.0,
            income_replacement_go_go: 125.0,
            income_replacement_slow_go: 100.0,
            income_replacement_no_go: 75.0,
            current_balance: 10_000.0,
            annual_raises: 1.0,
            savings_rate: 15.0,
            growth_rate_pre_retirement: 8.0,
            growth_rate_intra_retirement: 4.0,
            annual_inflation: 2.5,
            boundary_override: None,
        }
    }
}

/// Year counts per phase, derived from ages and boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseYears {
    pub until_retirement: i32,
    pub in_retirement: i32,
    pub go_go: i32,
    pub slow_go: i32,
    pub no_go: i32,
}

impl RetirementPlan {
    pub fn years_until_retirement(&self) -> i32 {
        self.age_retirement - self.age_today
    }

    pub fn years_in_retirement(&self) -> i32 {
        self.life_expectancy - self.age_retirement
    }

    /// Go-Go and Slow-Go end ages. Defaults split the first four fifths of
    /// retirement evenly; an override outside `[age_retirement, life_expectancy]`
    /// is ignored.
    pub fn retirement_boundaries(&self) -> [i32; 2] {
        if let Some([first, second]) = self.boundary_override {
            if first >= self.age_retirement && second <= self.life_expectancy {
                return [first, second];
            }
            warn!(
                "boundary override [{first}, {second}] outside {}..={}, using defaults",
                self.age_retirement, self.life_expectancy
            );
        }

        let base = (self.years_in_retirement() as f64 * 2.0 / 5.0).floor() as i32;
        [self.age_retirement + base, self.age_retirement + base * 2]
    }

    pub fn phase_years(&self) -> PhaseYears {
        let [first, second] = self.retirement_boundaries();
        let in_retirement = self.years_in_retirement();
        let go_go = first - self.age_retirement;
        let slow_go = second - (self.age_retirement + go_go);
        PhaseYears {
            until_retirement: self.years_until_retirement(),
            in_retirement,
            go_go,
            slow_go,
            no_go: in_retirement - go_go - slow_go,
        }
    }

    pub fn first_monthly_contribution(&self) -> f64 {
        self.annual_income * (self.savings_rate / 100.0) / 12.0
    }

    /// Raises accumulate linearly, not compounded.
    pub fn annual_income_at_retirement(&self) -> f64 {
        let total_raises = self.years_until_retirement() as f64 * self.annual_raises;
        self.annual_income * (1.0 + total_raises / 100.0)
    }

    /// Negative monthly amount replacing `replacement` percent of final income.
    pub fn monthly_withdrawal(&self, replacement: f64) -> f64 {
        -(self.annual_income_at_retirement() / 12.0 * (replacement / 100.0))
    }

    pub fn stages(&self) -> Vec<Stage> {
        let years = self.phase_years();
        let retirement_stage = |name: &str, years: i32, replacement: f64| Stage {
            name: name.to_string(),
            growth_rate: self.growth_rate_intra_retirement,
            years,
            monthly_flow: self.monthly_withdrawal(replacement),
            escalation_rate: 0.0,
        };

        vec![
            Stage {
                name: PRE_RETIREMENT.to_string(),
                growth_rate: self.growth_rate_pre_retirement,
                years: years.until_retirement,
                monthly_flow: self.first_monthly_contribution(),
                escalation_rate: self.annual_raises,
            },
            retirement_stage(GO_GO, years.go_go, self.income_replacement_go_go),
            retirement_stage(SLOW_GO, years.slow_go, self.income_replacement_slow_go),
            retirement_stage(NO_GO, years.no_go, self.income_replacement_no_go),
        ]
    }

    pub fn project(
        &self,
        adjustment: InflationAdjustment,
    ) -> Result<FullProjection, ProjectionError> {
        assemble(
            &self.stages(),
            self.current_balance,
            self.annual_inflation,
            adjustment,
        )
    }
}
