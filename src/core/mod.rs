mod advice;
mod engine;
mod plan;
mod summary;
mod types;

pub use advice::{IndustryRanges, SURPLUS_THRESHOLD, recommendations};
pub use engine::{CumulativeInflation, assemble, project_stage, project_stage_real};
pub use plan::{GO_GO, NO_GO, PRE_RETIREMENT, PhaseYears, RetirementPlan, SLOW_GO};
pub use summary::{
    BalancePoint, StageSummary, average_monthly_withdrawal, balance_series, find_summary,
    stage_summaries,
};
pub use types::{
    AnnualProjection, FullProjection, InflationAdjustment, MAX_PROJECTION_YEARS, Perspective,
    ProjectionError, Stage,
};
