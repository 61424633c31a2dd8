use super::{
    normalize::{normalize_amount, normalize_date},
    parser::{COLUMN_COUNT, DEFAULT_CATEGORY, RawRow, RecordParser, RowError, TxDraft, TxKind},
};

/// `Data;Importo;Categoria;Negozio;Descrizione` exports, `;` separated.
pub struct GenericFormatParser;

const HEADER: [&str; COLUMN_COUNT] = ["data", "importo", "categoria", "negozio", "descrizione"];

impl RecordParser for GenericFormatParser {
    fn delimiter(&self) -> char {
        ';'
    }

    fn header(&self) -> &[&'static str; COLUMN_COUNT] {
        &HEADER
    }

    fn parse_record(&self, row: RawRow) -> Result<TxDraft, RowError> {
        let date = normalize_date(row.date.as_deref().unwrap_or(""))?;
        let amount = normalize_amount(row.amount.as_deref().unwrap_or(""))?;

        Ok(TxDraft {
            date,
            amount: amount.abs(),
            kind: TxKind::from_signed_amount(amount),
            category: row.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            shop: row.shop.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
        })
    }
}
