//! Financial ratio metrics computed from statement line items
//!
//! Inputs arrive as flat per-statement sections (the normalized field
//! vocabulary produced by the data layer, plus an optional `market`
//! section with `price`, `shares_outstanding`, `dividends_per_share`).
//! Missing inputs or zero denominators yield a `None` value rather than
//! an error; only an unrecognized metric name fails.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Statement sections a metric may read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    Market,
}

/// Flat financial data grouped by statement section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialData {
    #[serde(default)]
    pub income_statement: BTreeMap<String, f64>,
    #[serde(default)]
    pub balance_sheet: BTreeMap<String, f64>,
    #[serde(default)]
    pub cash_flow: BTreeMap<String, f64>,
    #[serde(default)]
    pub market: BTreeMap<String, f64>,
}

impl FinancialData {
    fn section(&self, section: Section) -> &BTreeMap<String, f64> {
        match section {
            Section::IncomeStatement => &self.income_statement,
            Section::BalanceSheet => &self.balance_sheet,
            Section::CashFlow => &self.cash_flow,
            Section::Market => &self.market,
        }
    }

    /// Look up a field, trying sections in preference order
    pub fn extract(&self, key: &str, preferred: &[Section]) -> Option<f64> {
        preferred
            .iter()
            .find_map(|section| self.section(*section).get(key).copied())
    }
}

/// Supported financial metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    GrossMargin,
    OperatingMargin,
    NetProfitMargin,
    Ebitda,
    DebtToEquity,
    CurrentRatio,
    QuickRatio,
    BookValuePerShare,
    FreeCashFlow,
    CashFlowMargin,
    Roe,
    Roa,
    PeRatio,
    PbRatio,
    DividendYield,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrossMargin => "gross_margin",
            Self::OperatingMargin => "operating_margin",
            Self::NetProfitMargin => "net_profit_margin",
            Self::Ebitda => "ebitda",
            Self::DebtToEquity => "debt_to_equity",
            Self::CurrentRatio => "current_ratio",
            Self::QuickRatio => "quick_ratio",
            Self::BookValuePerShare => "book_value_per_share",
            Self::FreeCashFlow => "free_cash_flow",
            Self::CashFlowMargin => "cash_flow_margin",
            Self::Roe => "roe",
            Self::Roa => "roa",
            Self::PeRatio => "pe_ratio",
            Self::PbRatio => "pb_ratio",
            Self::DividendYield => "dividend_yield",
        }
    }

    /// All supported metric names, for tool documentation
    pub fn all() -> &'static [Metric] {
        &[
            Self::GrossMargin,
            Self::OperatingMargin,
            Self::NetProfitMargin,
            Self::Ebitda,
            Self::DebtToEquity,
            Self::CurrentRatio,
            Self::QuickRatio,
            Self::BookValuePerShare,
            Self::FreeCashFlow,
            Self::CashFlowMargin,
            Self::Roe,
            Self::Roa,
            Self::PeRatio,
            Self::PbRatio,
            Self::DividendYield,
        ]
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::all()
            .iter()
            .find(|m| m.as_str() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| AnalysisError::UnknownMetric(s.to_string()))
    }
}

/// A computed metric value; `None` when required inputs are missing
/// or a denominator is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricValue {
    pub metric: Metric,
    pub value: Option<f64>,
}

fn safe_div(num: Option<f64>, denom: Option<f64>) -> Option<f64> {
    match (num, denom) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Compute one financial metric from the provided statement data.
pub fn financial_metric(data: &FinancialData, metric: Metric) -> MetricValue {
    use Section::{BalanceSheet, CashFlow, IncomeStatement, Market};

    let value = match metric {
        Metric::GrossMargin => {
            let revenue = data.extract("revenue", &[IncomeStatement]);
            let cogs = data.extract("cost_of_goods_sold", &[IncomeStatement]);
            match (revenue, cogs) {
                (Some(r), Some(c)) => safe_div(Some(r - c), Some(r)),
                _ => None,
            }
        }
        Metric::OperatingMargin => safe_div(
            data.extract("operating_income", &[IncomeStatement]),
            data.extract("revenue", &[IncomeStatement]),
        ),
        Metric::NetProfitMargin => safe_div(
            data.extract("net_income", &[IncomeStatement]),
            data.extract("revenue", &[IncomeStatement]),
        ),
        Metric::Ebitda => data.extract("ebitda", &[IncomeStatement]).or_else(|| {
            let operating_income = data.extract("operating_income", &[IncomeStatement])?;
            let d_and_a = data
                .extract("depreciation_amortization", &[IncomeStatement, CashFlow])
                .or_else(|| {
                    let depreciation =
                        data.extract("depreciation", &[IncomeStatement, CashFlow])?;
                    let amortization =
                        data.extract("amortization", &[IncomeStatement, CashFlow])?;
                    Some(depreciation + amortization)
                })?;
            Some(operating_income + d_and_a)
        }),
        Metric::DebtToEquity => safe_div(
            data.extract("total_liabilities", &[BalanceSheet]),
            data.extract("shareholders_equity", &[BalanceSheet]),
        ),
        Metric::CurrentRatio => safe_div(
            data.extract("current_assets", &[BalanceSheet]),
            data.extract("current_liabilities", &[BalanceSheet]),
        ),
        Metric::QuickRatio => {
            let current_assets = data.extract("current_assets", &[BalanceSheet]);
            let inventory = data.extract("inventory", &[BalanceSheet]);
            let current_liabilities = data.extract("current_liabilities", &[BalanceSheet]);
            match (current_assets, inventory) {
                (Some(a), Some(i)) => safe_div(Some(a - i), current_liabilities),
                _ => None,
            }
        }
        Metric::BookValuePerShare => safe_div(
            data.extract("shareholders_equity", &[BalanceSheet]),
            data.extract("shares_outstanding", &[Market, BalanceSheet, IncomeStatement]),
        ),
        Metric::FreeCashFlow => {
            let operating = data.extract("operating_cash_flow", &[CashFlow]);
            let capex = data.extract("capital_expenditures", &[CashFlow]);
            match (operating, capex) {
                (Some(o), Some(c)) => Some(o - c),
                _ => None,
            }
        }
        Metric::CashFlowMargin => safe_div(
            data.extract("operating_cash_flow", &[CashFlow]),
            data.extract("revenue", &[IncomeStatement]),
        ),
        Metric::Roe => safe_div(
            data.extract("net_income", &[IncomeStatement]),
            data.extract("shareholders_equity", &[BalanceSheet]),
        ),
        Metric::Roa => safe_div(
            data.extract("net_income", &[IncomeStatement]),
            data.extract("total_assets", &[BalanceSheet]),
        ),
        Metric::PeRatio => {
            let price = data.extract("price", &[Market]);
            let eps = safe_div(
                data.extract("net_income", &[IncomeStatement]),
                data.extract("shares_outstanding", &[Market, BalanceSheet, IncomeStatement]),
            );
            match eps {
                Some(e) if e != 0.0 => safe_div(price, Some(e)),
                _ => None,
            }
        }
        Metric::PbRatio => {
            let price = data.extract("price", &[Market]);
            let book_value_per_share = safe_div(
                data.extract("shareholders_equity", &[BalanceSheet]),
                data.extract("shares_outstanding", &[Market, BalanceSheet, IncomeStatement]),
            );
            match book_value_per_share {
                Some(b) if b != 0.0 => safe_div(price, Some(b)),
                _ => None,
            }
        }
        Metric::DividendYield => safe_div(
            data.extract("dividends_per_share", &[IncomeStatement, Market]),
            data.extract("price", &[Market]),
        ),
    };

    MetricValue { metric, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> FinancialData {
        let mut data = FinancialData::default();
        for (k, v) in [
            ("revenue", 1000.0),
            ("cost_of_goods_sold", 600.0),
            ("operating_income", 250.0),
            ("net_income", 200.0),
            ("depreciation_amortization", 50.0),
        ] {
            data.income_statement.insert(k.to_string(), v);
        }
        for (k, v) in [
            ("total_assets", 2000.0),
            ("total_liabilities", 1200.0),
            ("shareholders_equity", 800.0),
            ("current_assets", 500.0),
            ("current_liabilities", 250.0),
            ("inventory", 100.0),
            ("shares_outstanding", 100.0),
        ] {
            data.balance_sheet.insert(k.to_string(), v);
        }
        for (k, v) in [("operating_cash_flow", 300.0), ("capital_expenditures", 80.0)] {
            data.cash_flow.insert(k.to_string(), v);
        }
        for (k, v) in [("price", 40.0), ("dividends_per_share", 1.2)] {
            data.market.insert(k.to_string(), v);
        }
        data
    }

    fn value_of(metric: Metric) -> f64 {
        financial_metric(&fixture(), metric)
            .value
            .unwrap_or_else(|| panic!("{metric} should be defined"))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_margin_metrics() {
        assert_close(value_of(Metric::GrossMargin), 0.4);
        assert_close(value_of(Metric::OperatingMargin), 0.25);
        assert_close(value_of(Metric::NetProfitMargin), 0.2);
    }

    #[test]
    fn test_ebitda_falls_back_to_components() {
        // No explicit ebitda in the fixture: operating_income + D&A
        assert_close(value_of(Metric::Ebitda), 300.0);

        let mut data = fixture();
        data.income_statement.insert("ebitda".to_string(), 320.0);
        let direct = financial_metric(&data, Metric::Ebitda);
        assert_close(direct.value.expect("defined"), 320.0);
    }

    #[test]
    fn test_balance_sheet_metrics() {
        assert_close(value_of(Metric::DebtToEquity), 1.5);
        assert_close(value_of(Metric::CurrentRatio), 2.0);
        assert_close(value_of(Metric::QuickRatio), 1.6);
        assert_close(value_of(Metric::BookValuePerShare), 8.0);
    }

    #[test]
    fn test_cash_flow_metrics() {
        assert_close(value_of(Metric::FreeCashFlow), 220.0);
        assert_close(value_of(Metric::CashFlowMargin), 0.3);
    }

    #[test]
    fn test_return_metrics() {
        assert_close(value_of(Metric::Roe), 0.25);
        assert_close(value_of(Metric::Roa), 0.1);
    }

    #[test]
    fn test_market_metrics() {
        // EPS = 200 / 100 = 2, P/E = 40 / 2 = 20
        assert_close(value_of(Metric::PeRatio), 20.0);
        // BVPS = 8, P/B = 5
        assert_close(value_of(Metric::PbRatio), 5.0);
        assert_close(value_of(Metric::DividendYield), 0.03);
    }

    #[test]
    fn test_missing_inputs_yield_none() {
        let empty = FinancialData::default();
        for &metric in Metric::all() {
            let result = financial_metric(&empty, metric);
            assert!(result.value.is_none(), "{metric} should be None without data");
        }
    }

    #[test]
    fn test_zero_denominator_yields_none() {
        let mut data = fixture();
        data.balance_sheet.insert("shareholders_equity".to_string(), 0.0);
        assert!(financial_metric(&data, Metric::DebtToEquity).value.is_none());
        assert!(financial_metric(&data, Metric::Roe).value.is_none());
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("roe".parse::<Metric>().expect("parses"), Metric::Roe);
        assert_eq!(
            "PE_RATIO".parse::<Metric>().expect("parses"),
            Metric::PeRatio
        );
        assert!("sharpe_ratio".parse::<Metric>().is_err());
    }

    #[test]
    fn test_section_preference_order() {
        let mut data = fixture();
        // Market-section shares take precedence over balance sheet
        data.market.insert("shares_outstanding".to_string(), 200.0);
        let bvps = financial_metric(&data, Metric::BookValuePerShare);
        assert_close(bvps.value.expect("defined"), 4.0);
    }
}
