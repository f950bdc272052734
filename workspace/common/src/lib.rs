//! Transport-layer types shared between the compute crate and the API layer.
//! These structs mirror the shapes the handlers serialize, so the aggregation
//! code can produce them directly without duplicating definitions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One ledger entry annotated for display or export.
///
/// `balance` is this entry's own credit minus debit; `running_balance` is the
/// prefix sum of `balance` accumulated in chronological order. In a
/// newest-first listing the top row therefore carries the school's total.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LedgerLine {
    pub id: i32,
    pub date: NaiveDate,
    /// Good label as it was written at entry time.
    pub good: String,
    /// Description label as it was written at entry time.
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    /// Credit minus debit for this entry, a missing side counting as zero.
    pub balance: Decimal,
    /// Chronological prefix sum of `balance` up to and including this entry.
    pub running_balance: Decimal,
}

/// Net balance of one school.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SchoolBalance {
    pub school_id: i32,
    pub school: String,
    pub balance: Decimal,
}

/// Total quantity delivered for one good.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DeliveryTotal {
    pub good: String,
    pub total_quantity: i64,
}

/// A school's full ledger in chronological order, ready for the workbook
/// export. Schools without entries keep an empty `lines` vector.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SchoolStatement {
    pub school_id: i32,
    pub school: String,
    pub lines: Vec<LedgerLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_line_serializes_money_as_strings() {
        let line = LedgerLine {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            good: "Arroz".to_string(),
            description: "Compra mensal".to_string(),
            debit: None,
            credit: Some(Decimal::new(1050, 2)),
            balance: Decimal::new(1050, 2),
            running_balance: Decimal::new(1050, 2),
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["credit"], "10.50");
        assert_eq!(json["debit"], serde_json::Value::Null);
        assert_eq!(json["date"], "2024-01-15");
    }
}
