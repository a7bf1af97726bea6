//! Salary calculator: monthly take-home estimate for a Korean annual salary
//! offer, shown next to the company brief while writing a cover letter.
//!
//! Four social insurances are withheld at the employee rate and income tax
//! follows the annual year-end formula divided by twelve. The official
//! withholding table rounds differently, so results can differ from a real
//! payslip by a few thousand won. All arithmetic is integer won; every
//! withheld amount is truncated to 10 won.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::company::brief::group_thousands;

/// Monthly meal allowance that is not taxed.
pub const DEFAULT_NON_TAXABLE: u64 = 200_000;
pub const MAX_ANNUAL_SALARY: u64 = 10_000_000_000;
pub const MAX_DEPENDENTS: u32 = 20;

/// National pension monthly base bounds (기준소득월액 하한/상한).
const PENSION_BASE_MIN: u64 = 390_000;
const PENSION_BASE_MAX: u64 = 6_170_000;

const PERSONAL_DEDUCTION: u64 = 1_500_000;

/// (numerator, denominator)
type Rate = (u64, u64);

const PENSION_RATE: Rate = (45, 1_000);
const HEALTH_RATE: Rate = (3_545, 100_000);
/// Long-term care, as a share of the health premium.
const CARE_RATE: Rate = (1_295, 10_000);
const EMPLOYMENT_RATE: Rate = (9, 1_000);
const LOCAL_TAX_RATE: Rate = (1, 10);

/// Earned income deduction: (lower bound, base amount, rate over the bound).
const EARNED_INCOME_DEDUCTION: &[(u64, u64, Rate)] = &[
    (100_000_000, 14_750_000, (2, 100)),
    (45_000_000, 12_000_000, (5, 100)),
    (15_000_000, 7_500_000, (15, 100)),
    (5_000_000, 3_500_000, (40, 100)),
    (0, 0, (70, 100)),
];
const EARNED_INCOME_DEDUCTION_CAP: u64 = 20_000_000;

/// Progressive income tax: (lower bound, tax up to the bound, marginal rate).
const TAX_BRACKETS: &[(u64, u64, Rate)] = &[
    (1_000_000_000, 384_060_000, (45, 100)),
    (500_000_000, 174_060_000, (42, 100)),
    (300_000_000, 94_060_000, (40, 100)),
    (150_000_000, 37_060_000, (38, 100)),
    (88_000_000, 15_360_000, (35, 100)),
    (50_000_000, 6_240_000, (24, 100)),
    (14_000_000, 840_000, (15, 100)),
    (0, 0, (6, 100)),
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SalaryError {
    #[error("연봉은 1원 이상 100억원 이하로 입력해주세요.")]
    InvalidAnnual,

    #[error("부양가족 수는 본인 포함 1명 이상 20명 이하로 입력해주세요.")]
    InvalidDependents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SalaryInput {
    /// Annual gross salary in won.
    pub annual: u64,
    /// Dependents including the employee.
    #[serde(default = "default_dependents")]
    pub dependents: u32,
    /// Monthly non-taxable allowance in won.
    #[serde(default = "default_non_taxable")]
    pub non_taxable: u64,
}

fn default_dependents() -> u32 {
    1
}

fn default_non_taxable() -> u64 {
    DEFAULT_NON_TAXABLE
}

impl SalaryInput {
    pub fn new(annual: u64) -> Self {
        Self {
            annual,
            dependents: default_dependents(),
            non_taxable: DEFAULT_NON_TAXABLE,
        }
    }
}

/// Monthly figures in won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalaryBreakdown {
    pub annual: u64,
    pub monthly_gross: u64,
    pub non_taxable: u64,
    pub national_pension: u64,
    pub health_insurance: u64,
    pub long_term_care: u64,
    pub employment_insurance: u64,
    pub income_tax: u64,
    pub local_income_tax: u64,
    pub total_deductions: u64,
    pub monthly_net: u64,
}

fn apply(amount: u64, (num, den): Rate) -> u64 {
    amount * num / den
}

fn truncate_10(amount: u64) -> u64 {
    amount / 10 * 10
}

fn earned_income_deduction(total_pay: u64) -> u64 {
    EARNED_INCOME_DEDUCTION
        .iter()
        .find(|(bound, _, _)| total_pay > *bound)
        .map_or(0, |&(bound, base, rate)| base + apply(total_pay - bound, rate))
        .min(EARNED_INCOME_DEDUCTION_CAP)
}

fn progressive_tax(base: u64) -> u64 {
    TAX_BRACKETS
        .iter()
        .find(|(bound, _, _)| base > *bound)
        .map_or(0, |&(bound, tax, rate)| tax + apply(base - bound, rate))
}

/// Earned income tax credit (근로소득세액공제) with its pay-dependent cap.
fn earned_income_credit(computed_tax: u64, total_pay: u64) -> u64 {
    let credit = if computed_tax <= 1_300_000 {
        apply(computed_tax, (55, 100))
    } else {
        715_000 + apply(computed_tax - 1_300_000, (30, 100))
    };
    let cap = if total_pay <= 33_000_000 {
        740_000
    } else if total_pay <= 70_000_000 {
        740_000u64
            .saturating_sub(apply(total_pay - 33_000_000, (8, 1_000)))
            .max(660_000)
    } else {
        660_000u64
            .saturating_sub(apply(total_pay - 70_000_000, (1, 2)))
            .max(500_000)
    };
    credit.min(cap)
}

pub fn calculate(input: SalaryInput) -> Result<SalaryBreakdown, SalaryError> {
    if input.annual == 0 || input.annual > MAX_ANNUAL_SALARY {
        return Err(SalaryError::InvalidAnnual);
    }
    if input.dependents == 0 || input.dependents > MAX_DEPENDENTS {
        return Err(SalaryError::InvalidDependents);
    }

    let monthly_gross = input.annual / 12;
    let non_taxable = input.non_taxable.min(monthly_gross);
    let taxable = monthly_gross - non_taxable;

    let pension_base = taxable.clamp(PENSION_BASE_MIN, PENSION_BASE_MAX) / 1_000 * 1_000;
    let national_pension = truncate_10(apply(pension_base, PENSION_RATE));
    let health_insurance = truncate_10(apply(taxable, HEALTH_RATE));
    let long_term_care = truncate_10(apply(health_insurance, CARE_RATE));
    let employment_insurance = truncate_10(apply(taxable, EMPLOYMENT_RATE));

    let total_pay = taxable * 12;
    let earned_income = total_pay - earned_income_deduction(total_pay);
    let deductions = PERSONAL_DEDUCTION * u64::from(input.dependents)
        + (national_pension + health_insurance + long_term_care + employment_insurance) * 12;
    let tax_base = earned_income.saturating_sub(deductions);
    let computed_tax = progressive_tax(tax_base);
    let annual_tax = computed_tax - earned_income_credit(computed_tax, total_pay);

    let income_tax = truncate_10(annual_tax / 12);
    let local_income_tax = truncate_10(apply(income_tax, LOCAL_TAX_RATE));

    let total_deductions = national_pension
        + health_insurance
        + long_term_care
        + employment_insurance
        + income_tax
        + local_income_tax;

    Ok(SalaryBreakdown {
        annual: input.annual,
        monthly_gross,
        non_taxable,
        national_pension,
        health_insurance,
        long_term_care,
        employment_insurance,
        income_tax,
        local_income_tax,
        total_deductions,
        monthly_net: monthly_gross.saturating_sub(total_deductions),
    })
}

/// "연봉 5,000만원" style label; falls back to plain won below 10,000.
pub fn format_annual(annual: u64) -> String {
    if annual >= 10_000 && annual % 10_000 == 0 {
        format!("연봉 {}만원", group_thousands(annual / 10_000))
    } else {
        format!("연봉 {}원", group_thousands(annual))
    }
}

pub fn format_breakdown(b: &SalaryBreakdown) -> String {
    let won = |amount: u64| format!("{}원", group_thousands(amount));
    [
        format!("■ {}", format_annual(b.annual)),
        format!("월 급여: {}", won(b.monthly_gross)),
        format!("국민연금: {}", won(b.national_pension)),
        format!("건강보험: {}", won(b.health_insurance)),
        format!("장기요양: {}", won(b.long_term_care)),
        format!("고용보험: {}", won(b.employment_insurance)),
        format!("소득세: {}", won(b.income_tax)),
        format!("지방소득세: {}", won(b.local_income_tax)),
        format!("공제 합계: {}", won(b.total_deductions)),
        format!("예상 실수령액: {}", won(b.monthly_net)),
    ]
    .join("\n")
}
