use common::{LedgerLine, SchoolBalance, SchoolStatement};
use model::entities::{ledger_entry, school};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

use crate::error::Result;

/// Balance of a single entry: credit minus debit, a missing side counting
/// as zero.
pub fn entry_balance(entry: &ledger_entry::Model) -> Decimal {
    entry.credit.unwrap_or(Decimal::ZERO) - entry.debit.unwrap_or(Decimal::ZERO)
}

/// Fetches a school's ledger entries in display order: date descending,
/// newest entry first within a day.
#[instrument(skip(db))]
pub async fn entries_for_school(
    db: &DatabaseConnection,
    owner_id: i32,
    school_id: i32,
) -> Result<Vec<ledger_entry::Model>> {
    let entries = ledger_entry::Entity::find()
        .filter(ledger_entry::Column::OwnerId.eq(owner_id))
        .filter(ledger_entry::Column::SchoolId.eq(school_id))
        .order_by_desc(ledger_entry::Column::Date)
        .order_by_desc(ledger_entry::Column::Id)
        .all(db)
        .await?;

    debug!(
        "Found {} ledger entries for school_id={} owner_id={}",
        entries.len(),
        school_id,
        owner_id
    );

    for entry in &entries {
        trace!(
            "Ledger entry: id={}, date={}, debit={:?}, credit={:?}",
            entry.id, entry.date, entry.debit, entry.credit
        );
    }

    Ok(entries)
}

/// Annotates entries with their per-row balance and the running balance,
/// returned in chronological order.
///
/// The running balance is a prefix sum accumulated ascending by date (and by
/// id within a day, so same-day entries keep insertion order). The last row
/// therefore carries the school's total balance.
pub fn running_balance_ascending(mut entries: Vec<ledger_entry::Model>) -> Vec<LedgerLine> {
    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut running = Decimal::ZERO;
    entries
        .into_iter()
        .map(|entry| {
            let balance = entry_balance(&entry);
            running += balance;
            LedgerLine {
                id: entry.id,
                date: entry.date,
                good: entry.good,
                description: entry.description,
                debit: entry.debit,
                credit: entry.credit,
                balance,
                running_balance: running,
            }
        })
        .collect()
}

/// The same annotation presented newest-first, the order the review screen
/// lists entries in. Each row keeps the prefix sum it had chronologically,
/// so the top row shows the total and the bottom row its own value alone.
pub fn running_balance_descending(entries: Vec<ledger_entry::Model>) -> Vec<LedgerLine> {
    let mut lines = running_balance_ascending(entries);
    lines.reverse();
    lines
}

/// SUM(credit - debit) over all of a school's entries; zero when none exist.
/// Independent of insertion order.
#[instrument(skip(db))]
pub async fn final_balance(
    db: &DatabaseConnection,
    owner_id: i32,
    school_id: i32,
) -> Result<Decimal> {
    let entries = ledger_entry::Entity::find()
        .filter(ledger_entry::Column::OwnerId.eq(owner_id))
        .filter(ledger_entry::Column::SchoolId.eq(school_id))
        .all(db)
        .await?;

    Ok(entries.iter().map(entry_balance).sum())
}

/// Net balance for every school of the owner that has at least one ledger
/// entry, ordered by school id. Source for the dashboard bar chart; entries
/// whose school was deleted drop out of the chart.
#[instrument(skip(db))]
pub async fn balance_by_school(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<SchoolBalance>> {
    let (schools, totals) = school_totals(db, owner_id).await?;

    Ok(schools
        .into_iter()
        .filter_map(|s| {
            totals.get(&s.id).map(|balance| SchoolBalance {
                school_id: s.id,
                school: s.name,
                balance: *balance,
            })
        })
        .collect())
}

/// Final balance for every school of the owner, zero when a school has no
/// entries. Backs the balance summary table and the export's "Resumo" sheet.
#[instrument(skip(db))]
pub async fn balance_summary(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<SchoolBalance>> {
    let (schools, totals) = school_totals(db, owner_id).await?;

    Ok(schools
        .into_iter()
        .map(|s| SchoolBalance {
            balance: totals.get(&s.id).copied().unwrap_or(Decimal::ZERO),
            school_id: s.id,
            school: s.name,
        })
        .collect())
}

/// One chronological, running-balance-annotated statement per school of the
/// owner, every school included even when it has no entries. The workbook
/// export writes one sheet per element.
#[instrument(skip(db))]
pub async fn school_statements(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<SchoolStatement>> {
    let schools = owned_schools(db, owner_id).await?;
    let entries = owned_entries(db, owner_id).await?;

    let mut by_school: HashMap<i32, Vec<ledger_entry::Model>> = HashMap::new();
    for entry in entries {
        by_school.entry(entry.school_id).or_default().push(entry);
    }

    Ok(schools
        .into_iter()
        .map(|s| SchoolStatement {
            lines: running_balance_ascending(by_school.remove(&s.id).unwrap_or_default()),
            school_id: s.id,
            school: s.name,
        })
        .collect())
}

async fn owned_schools(db: &DatabaseConnection, owner_id: i32) -> Result<Vec<school::Model>> {
    Ok(school::Entity::find()
        .filter(school::Column::OwnerId.eq(owner_id))
        .order_by_asc(school::Column::Id)
        .all(db)
        .await?)
}

async fn owned_entries(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<ledger_entry::Model>> {
    Ok(ledger_entry::Entity::find()
        .filter(ledger_entry::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?)
}

async fn school_totals(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<(Vec<school::Model>, HashMap<i32, Decimal>)> {
    let schools = owned_schools(db, owner_id).await?;
    let entries = owned_entries(db, owner_id).await?;

    let mut totals: HashMap<i32, Decimal> = HashMap::new();
    for entry in &entries {
        *totals.entry(entry.school_id).or_insert(Decimal::ZERO) += entry_balance(entry);
    }

    Ok((schools, totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_entry, insert_school, insert_user, setup_db};
    use chrono::NaiveDate;

    fn entry(id: i32, date: NaiveDate, debit: Option<i64>, credit: Option<i64>) -> ledger_entry::Model {
        ledger_entry::Model {
            id,
            school_id: 1,
            date,
            good: "Arroz".to_string(),
            description: "Compra".to_string(),
            debit: debit.map(Decimal::from),
            credit: credit.map(Decimal::from),
            owner_id: 1,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn entry_balance_treats_missing_sides_as_zero() {
        assert_eq!(entry_balance(&entry(1, date(1), None, None)), Decimal::ZERO);
        assert_eq!(entry_balance(&entry(1, date(1), Some(7), None)), Decimal::from(-7));
        assert_eq!(entry_balance(&entry(1, date(1), None, Some(3))), Decimal::from(3));
        assert_eq!(entry_balance(&entry(1, date(1), Some(2), Some(5))), Decimal::from(3));
    }

    #[test]
    fn running_balance_accumulates_forward_and_displays_backward() {
        // Entries on D1 < D2 < D3 with balances [10, -5, 20].
        let entries = vec![
            entry(3, date(3), None, Some(20)),
            entry(1, date(1), None, Some(10)),
            entry(2, date(2), Some(5), None),
        ];

        let ascending = running_balance_ascending(entries.clone());
        let ascending_sums: Vec<Decimal> =
            ascending.iter().map(|line| line.running_balance).collect();
        assert_eq!(
            ascending_sums,
            vec![Decimal::from(10), Decimal::from(5), Decimal::from(25)]
        );

        let descending = running_balance_descending(entries);
        let ids: Vec<i32> = descending.iter().map(|line| line.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        let descending_sums: Vec<Decimal> =
            descending.iter().map(|line| line.running_balance).collect();
        assert_eq!(
            descending_sums,
            vec![Decimal::from(25), Decimal::from(5), Decimal::from(10)]
        );
    }

    #[test]
    fn same_day_entries_keep_insertion_order() {
        let entries = vec![
            entry(2, date(1), Some(4), None),
            entry(1, date(1), None, Some(10)),
        ];

        let ascending = running_balance_ascending(entries);
        assert_eq!(ascending[0].id, 1);
        assert_eq!(ascending[0].running_balance, Decimal::from(10));
        assert_eq!(ascending[1].id, 2);
        assert_eq!(ascending[1].running_balance, Decimal::from(6));
    }

    #[tokio::test]
    async fn final_balance_is_insertion_order_independent() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;

        // Newest first, oldest last: order must not matter.
        insert_entry(&db, owner, school, date(3), None, Some(20)).await;
        insert_entry(&db, owner, school, date(1), None, Some(10)).await;
        insert_entry(&db, owner, school, date(2), Some(5), None).await;

        let balance = final_balance(&db, owner, school).await.unwrap();
        assert_eq!(balance, Decimal::from(25));
    }

    #[tokio::test]
    async fn final_balance_defaults_to_zero() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;

        let balance = final_balance(&db, owner, school).await.unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn balance_summary_includes_empty_schools_but_chart_does_not() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let with_entries = insert_school(&db, owner, "Escola Azul").await;
        let empty = insert_school(&db, owner, "Escola Verde").await;
        insert_entry(&db, owner, with_entries, date(1), None, Some(10)).await;

        let summary = balance_summary(&db, owner).await.unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].school_id, with_entries);
        assert_eq!(summary[0].balance, Decimal::from(10));
        assert_eq!(summary[1].school_id, empty);
        assert_eq!(summary[1].balance, Decimal::ZERO);

        let chart = balance_by_school(&db, owner).await.unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].school_id, with_entries);
    }

    #[tokio::test]
    async fn balances_are_scoped_to_the_owner() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let other = insert_user(&db, "b@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;
        let other_school = insert_school(&db, other, "Escola Azul").await;
        insert_entry(&db, owner, school, date(1), None, Some(10)).await;
        insert_entry(&db, other, other_school, date(1), None, Some(99)).await;

        let summary = balance_summary(&db, owner).await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].balance, Decimal::from(10));
    }

    #[tokio::test]
    async fn statements_are_chronological_per_school() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;
        let empty = insert_school(&db, owner, "Escola Verde").await;
        insert_entry(&db, owner, school, date(2), Some(5), None).await;
        insert_entry(&db, owner, school, date(1), None, Some(10)).await;

        let statements = school_statements(&db, owner).await.unwrap();
        assert_eq!(statements.len(), 2);

        let first = &statements[0];
        assert_eq!(first.school_id, school);
        assert_eq!(first.lines.len(), 2);
        assert_eq!(first.lines[0].date, date(1));
        assert_eq!(first.lines[1].running_balance, Decimal::from(5));

        let second = &statements[1];
        assert_eq!(second.school_id, empty);
        assert!(second.lines.is_empty());
    }
}
