//! Daily decision export (CSV / JSON)

use crate::decision::Decision;
use crate::error::{AllocatorError, Result};
use crate::types::{to_currency, Action};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// CSV column order
pub const CSV_HEADERS: [&str; 9] = [
    "date",
    "strategy",
    "action",
    "amount",
    "reasons",
    "targetNotional",
    "currentNotional",
    "gap",
    "impactBps",
];

/// Reasons kept per row
const REASONS_PER_ROW: usize = 2;

/// One exported decision, currency fields in whole units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRow {
    pub date: NaiveDate,
    pub strategy: String,
    pub action: Action,
    /// Signed adjustment
    pub amount: Decimal,
    pub reasons: String,
    pub target_notional: Decimal,
    pub current_notional: Decimal,
    pub gap: Decimal,
    pub impact_bps: f64,
}

pub fn build_rows(decisions: &[Decision], date: NaiveDate) -> Result<Vec<DecisionRow>> {
    decisions
        .iter()
        .map(|d| {
            Ok(DecisionRow {
                date,
                strategy: d.strategy_code.clone(),
                action: d.action,
                amount: to_currency(d.recommended_delta)?,
                reasons: d.primary_reasons(REASONS_PER_ROW).join("; "),
                target_notional: to_currency(d.target_notional)?,
                current_notional: to_currency(d.current_notional)?,
                gap: to_currency(d.gap)?,
                impact_bps: d.impact_cost_bps,
            })
        })
        .collect()
}

pub fn to_csv(rows: &[DecisionRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AllocatorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AllocatorError::Export(e.to_string()))
}

pub fn from_csv(data: &str) -> Result<Vec<DecisionRow>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let rows = reader.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn to_json(rows: &[DecisionRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn from_json(data: &str) -> Result<Vec<DecisionRow>> {
    Ok(serde_json::from_str(data)?)
}
