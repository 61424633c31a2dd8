use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const COLUMN_COUNT: usize = 5;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn from_signed_amount(amount: f64) -> Self {
        if amount < 0.0 {
            TxKind::Expense
        } else {
            TxKind::Income
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(anyhow::anyhow!("unknown transaction type: {other}")),
        }
    }
}

/// One statement row in fixed column order. Missing trailing columns and
/// empty columns are both `None`.
#[derive(Debug, Default, PartialEq)]
pub struct RawRow {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub shop: Option<String>,
    pub description: Option<String>,
}

impl RawRow {
    pub fn from_fields(fields: Vec<String>) -> Self {
        let mut fields = fields
            .into_iter()
            .map(|field| if field.is_empty() { None } else { Some(field) });

        let mut next = || fields.next().flatten();

        RawRow {
            date: next(),
            amount: next(),
            category: next(),
            shop: next(),
            description: next(),
        }
    }
}

/// A validated row, ready to be stored. `amount` is never negative, the sign
/// lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxDraft {
    pub date: String,
    pub amount: f64,
    pub kind: TxKind,
    pub category: String,
    pub shop: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("invalid date")]
    InvalidDate,

    // Kept apart from InvalidAmount so a rejection says which one it was,
    // both still reject the row.
    #[error("zero amount")]
    ZeroAmount,

    #[error("invalid amount")]
    InvalidAmount,
}

pub trait RecordParser: Sync + Send {
    fn delimiter(&self) -> char;
    fn header(&self) -> &[&'static str; COLUMN_COUNT];
    fn parse_record(&self, row: RawRow) -> Result<TxDraft, RowError>;
}
