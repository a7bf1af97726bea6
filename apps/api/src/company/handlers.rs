use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::company::brief::{brief_html, format_brief};
use crate::company::salary::{calculate, format_breakdown, SalaryBreakdown, SalaryInput};
use crate::company::source::CompanyInfo;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CompanyBriefResponse {
    pub company: CompanyInfo,
    pub brief: String,
    pub html: String,
}

/// GET /api/v1/companies/:name/brief
pub async fn handle_company_brief(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CompanyBriefResponse>, AppError> {
    let info = state.companies.lookup(&name).await?;
    Ok(Json(CompanyBriefResponse {
        brief: format_brief(&info),
        html: brief_html(&info),
        company: info.as_ref().clone(),
    }))
}

#[derive(Serialize)]
pub struct SalaryResponse {
    #[serde(flatten)]
    pub breakdown: SalaryBreakdown,
    pub summary: String,
}

/// GET /api/v1/salary?annual=&dependents=&non_taxable=
pub async fn handle_salary(
    Query(input): Query<SalaryInput>,
) -> Result<Json<SalaryResponse>, AppError> {
    let breakdown = calculate(input)?;
    Ok(Json(SalaryResponse {
        summary: format_breakdown(&breakdown),
        breakdown,
    }))
}
