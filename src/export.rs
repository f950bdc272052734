//! Workbook assembly for the export screen.

use common::{SchoolBalance, SchoolStatement};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::instrument;

/// Sheet names are capped by the xlsx format.
const MAX_SHEET_NAME: usize = 31;

const STATEMENT_HEADERS: [&str; 7] = [
    "Data",
    "Mercadoria",
    "Descrição",
    "Débito",
    "Crédito",
    "Saldo",
    "Saldo Acumulado",
];

fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME).collect()
}

fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Builds the export workbook: one sheet per school with its chronological
/// statement, then a "Resumo" sheet with every school's final balance.
/// A school without entries gets a header-only sheet.
#[instrument(skip(statements, summary))]
pub fn build_workbook(
    statements: &[SchoolStatement],
    summary: &[SchoolBalance],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let currency_format = Format::new().set_num_format("R$ #,##0.00");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for statement in statements {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&statement.school))?;

        for (col, header) in STATEMENT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, line) in statement.lines.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_datetime_with_format(row, 0, &line.date, &date_format)?;
            worksheet.write_string(row, 1, &line.good)?;
            worksheet.write_string(row, 2, &line.description)?;
            if let Some(debit) = line.debit {
                worksheet.write_number_with_format(row, 3, money(debit), &currency_format)?;
            }
            if let Some(credit) = line.credit {
                worksheet.write_number_with_format(row, 4, money(credit), &currency_format)?;
            }
            worksheet.write_number_with_format(row, 5, money(line.balance), &currency_format)?;
            worksheet.write_number_with_format(
                row,
                6,
                money(line.running_balance),
                &currency_format,
            )?;
        }
    }

    let resumo = workbook.add_worksheet();
    resumo.set_name("Resumo")?;
    resumo.write_string_with_format(0, 0, "Escola", &header_format)?;
    resumo.write_string_with_format(0, 1, "Saldo Final", &header_format)?;
    for (i, row) in summary.iter().enumerate() {
        let r = (i + 1) as u32;
        resumo.write_string(r, 0, &row.school)?;
        resumo.write_number_with_format(r, 1, money(row.balance), &currency_format)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::LedgerLine;

    fn statement(school: &str, lines: Vec<LedgerLine>) -> SchoolStatement {
        SchoolStatement {
            school_id: 1,
            school: school.to_string(),
            lines,
        }
    }

    fn line(day: u32, credit: i64) -> LedgerLine {
        LedgerLine {
            id: day as i32,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            good: "Arroz".to_string(),
            description: "Compra".to_string(),
            debit: None,
            credit: Some(Decimal::from(credit)),
            balance: Decimal::from(credit),
            running_balance: Decimal::from(credit),
        }
    }

    #[test]
    fn sheet_name_is_truncated_to_31_chars() {
        let long = "Escola Municipal Professora Maria das Dores";
        assert!(long.chars().count() > MAX_SHEET_NAME);
        assert_eq!(sheet_name(long).chars().count(), MAX_SHEET_NAME);
        assert_eq!(sheet_name("Curta"), "Curta");
    }

    #[test]
    fn builds_a_workbook_with_statement_and_summary_sheets() {
        let statements = vec![
            statement("Escola Azul", vec![line(1, 10), line(2, 5)]),
            statement("Escola Verde", vec![]),
        ];
        let summary = vec![
            SchoolBalance {
                school_id: 1,
                school: "Escola Azul".to_string(),
                balance: Decimal::from(15),
            },
            SchoolBalance {
                school_id: 2,
                school: "Escola Verde".to_string(),
                balance: Decimal::ZERO,
            },
        ];

        let bytes = build_workbook(&statements, &summary).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn builds_an_empty_workbook_when_there_are_no_schools() {
        let bytes = build_workbook(&[], &[]).unwrap();
        assert!(!bytes.is_empty());
    }
}
