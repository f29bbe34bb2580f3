//! Financial statement types and field normalization
//!
//! Alpha Vantage reports statement line items as PascalCase-ish JSON keys
//! with string values ("None" when absent). This module maps them onto a
//! stable snake_case vocabulary so downstream ratio math does not depend
//! on provider spelling.

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of financial statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl StatementKind {
    /// Wire name used in tool parameters and result payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }

    /// Alpha Vantage function name for this statement
    pub fn alpha_vantage_function(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "INCOME_STATEMENT",
            Self::BalanceSheet => "BALANCE_SHEET",
            Self::CashFlow => "CASH_FLOW",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income_statement" | "income" => Ok(Self::IncomeStatement),
            "balance_sheet" | "balance" => Ok(Self::BalanceSheet),
            "cash_flow" | "cashflow" => Ok(Self::CashFlow),
            other => Err(MarketError::Api(format!(
                "Unknown statement kind: {other} (expected income_statement, balance_sheet, or cash_flow)"
            ))),
        }
    }
}

/// One annual report with normalized line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementReport {
    /// Fiscal period end date (YYYY-MM-DD)
    pub fiscal_date_ending: String,
    /// Reporting currency, if known
    pub currency: Option<String>,
    /// Normalized line items; absent fields are simply missing
    pub fields: BTreeMap<String, f64>,
}

/// Field mapping from Alpha Vantage keys to the canonical vocabulary.
/// Order matters: for a canonical name listed twice, the first present
/// provider key wins.
fn field_map(kind: StatementKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StatementKind::IncomeStatement => &[
            ("totalRevenue", "revenue"),
            ("costOfRevenue", "cost_of_goods_sold"),
            ("costofGoodsAndServicesSold", "cost_of_goods_sold"),
            ("grossProfit", "gross_profit"),
            ("operatingIncome", "operating_income"),
            ("netIncome", "net_income"),
            ("ebit", "ebit"),
            ("ebitda", "ebitda"),
            ("depreciationAndAmortization", "depreciation_amortization"),
            ("depreciation", "depreciation"),
            ("incomeBeforeTax", "income_before_tax"),
            ("interestExpense", "interest_expense"),
        ],
        StatementKind::BalanceSheet => &[
            ("totalAssets", "total_assets"),
            ("totalLiabilities", "total_liabilities"),
            ("totalShareholderEquity", "shareholders_equity"),
            ("totalCurrentAssets", "current_assets"),
            ("totalCurrentLiabilities", "current_liabilities"),
            ("inventory", "inventory"),
            ("cashAndCashEquivalentsAtCarryingValue", "cash_and_equivalents"),
            ("longTermDebt", "long_term_debt"),
            ("commonStockSharesOutstanding", "shares_outstanding"),
        ],
        StatementKind::CashFlow => &[
            ("operatingCashflow", "operating_cash_flow"),
            ("capitalExpenditures", "capital_expenditures"),
            ("dividendPayout", "dividend_payout"),
            ("cashflowFromInvestment", "investing_cash_flow"),
            ("cashflowFromFinancing", "financing_cash_flow"),
            ("netIncome", "net_income"),
        ],
    }
}

/// Parse an Alpha Vantage numeric field; the API encodes numbers as
/// strings and absent values as the literal "None".
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

/// Normalize one raw annual report object into a `StatementReport`
pub fn normalize_report(kind: StatementKind, raw: &Value) -> Result<StatementReport> {
    let obj = raw.as_object().ok_or_else(|| {
        MarketError::AlphaVantage("Annual report entry is not a JSON object".to_string())
    })?;

    let fiscal_date_ending = obj
        .get("fiscalDateEnding")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MarketError::AlphaVantage("Annual report missing fiscalDateEnding".to_string())
        })?
        .to_string();

    let currency = obj
        .get("reportedCurrency")
        .and_then(Value::as_str)
        .filter(|s| !s.eq_ignore_ascii_case("none"))
        .map(ToString::to_string);

    let mut fields = BTreeMap::new();
    for (provider_key, canonical) in field_map(kind) {
        if fields.contains_key(*canonical) {
            continue;
        }
        if let Some(value) = obj.get(*provider_key).and_then(parse_number) {
            fields.insert((*canonical).to_string(), value);
        }
    }

    Ok(StatementReport {
        fiscal_date_ending,
        currency,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_kind_round_trip() {
        for kind in [
            StatementKind::IncomeStatement,
            StatementKind::BalanceSheet,
            StatementKind::CashFlow,
        ] {
            let parsed: StatementKind = kind.as_str().parse().expect("wire name should parse");
            assert_eq!(parsed, kind);
        }

        assert!("quarterly_report".parse::<StatementKind>().is_err());
    }

    #[test]
    fn test_normalize_income_statement() {
        let raw = json!({
            "fiscalDateEnding": "2023-12-31",
            "reportedCurrency": "USD",
            "totalRevenue": "383285000000",
            "costOfRevenue": "214137000000",
            "operatingIncome": "114301000000",
            "netIncome": "96995000000",
            "ebitda": "125820000000",
            "depreciationAndAmortization": "11519000000",
            "interestExpense": "None"
        });

        let report =
            normalize_report(StatementKind::IncomeStatement, &raw).expect("should normalize");
        assert_eq!(report.fiscal_date_ending, "2023-12-31");
        assert_eq!(report.currency.as_deref(), Some("USD"));
        assert_eq!(report.fields["revenue"], 383_285_000_000.0);
        assert_eq!(report.fields["cost_of_goods_sold"], 214_137_000_000.0);
        assert_eq!(report.fields["net_income"], 96_995_000_000.0);
        // "None" values are dropped, not zeroed
        assert!(!report.fields.contains_key("interest_expense"));
    }

    #[test]
    fn test_normalize_balance_sheet_fallback_keys() {
        let raw = json!({
            "fiscalDateEnding": "2023-12-31",
            "totalAssets": "352583000000",
            "totalLiabilities": "290437000000",
            "totalShareholderEquity": "62146000000",
            "totalCurrentAssets": "143566000000",
            "totalCurrentLiabilities": "145308000000",
            "inventory": "6331000000",
            "commonStockSharesOutstanding": "15550061000"
        });

        let report = normalize_report(StatementKind::BalanceSheet, &raw).expect("should normalize");
        assert_eq!(report.fields["shareholders_equity"], 62_146_000_000.0);
        assert_eq!(report.fields["shares_outstanding"], 15_550_061_000.0);
        assert!(report.currency.is_none());
    }

    #[test]
    fn test_normalize_rejects_malformed_report() {
        assert!(normalize_report(StatementKind::CashFlow, &json!("not an object")).is_err());
        assert!(normalize_report(StatementKind::CashFlow, &json!({"netIncome": "1"})).is_err());
    }
}
