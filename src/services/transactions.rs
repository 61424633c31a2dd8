use std::collections::HashMap;

use anyhow::Context;

use crate::{
    data::{Data, Tx, TxFilters, TxKind},
    endpoints::transactions::{
        create::TransactionInput,
        get_stats::{CategoryTotal, Output},
    },
    error::{ApiError, ErrorDetails},
    statement_parsing::{
        normalize::{normalize_date, round_amount},
        parser::{DEFAULT_CATEGORY, TxDraft},
    },
};

const MAX_TEXT_LEN: usize = 250;

/// Checks a create/update payload and turns it into a storable draft.
/// Dates accept the same forms as statement imports.
pub fn validate(input: &TransactionInput) -> Result<TxDraft, ApiError> {
    let mut errors: HashMap<String, String> = HashMap::new();

    let date = match normalize_date(&input.date) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert(
                "date".to_owned(),
                "must be YYYY-MM-DD or DD/MM/YYYY".to_owned(),
            );
            None
        }
    };

    let amount = round_amount(input.amount);
    if !input.amount.is_finite() || amount <= 0.0 {
        errors.insert("amount".to_owned(), "must be greater than 0".to_owned());
    }

    let kind = match input.kind.parse::<TxKind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            errors.insert("type".to_owned(), "must be income or expense".to_owned());
            None
        }
    };

    let category = text_field(&mut errors, "category", input.category.as_deref())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
    let shop = text_field(&mut errors, "shop", input.shop.as_deref()).unwrap_or_default();
    let description =
        text_field(&mut errors, "description", input.description.as_deref()).unwrap_or_default();

    match (date, kind) {
        (Some(date), Some(kind)) if errors.is_empty() => Ok(TxDraft {
            date,
            amount,
            kind,
            category,
            shop,
            description,
        }),
        _ => Err(ApiError::BadRequestDetails(
            "invalid request".to_owned(),
            ErrorDetails(errors),
        )),
    }
}

fn text_field(
    errors: &mut HashMap<String, String>,
    name: &str,
    value: Option<&str>,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;

    if value.chars().count() > MAX_TEXT_LEN {
        errors.insert(
            name.to_owned(),
            format!("must be shorter than {MAX_TEXT_LEN}"),
        );
        return None;
    }

    Some(value.to_owned())
}

pub async fn stats(
    data: &Data,
    user_id: &str,
    start_date: Option<String>,
    end_date: Option<String>,
) -> anyhow::Result<Output> {
    let filters = TxFilters {
        start_date,
        end_date,
        ..Default::default()
    };

    let txs = data
        .transactions
        .query(user_id, &filters)
        .await
        .context("error getting transactions for stats")?;

    return Ok(compute(&txs));
}

fn compute(txs: &[Tx]) -> Output {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    let mut income_cats: HashMap<&str, f64> = HashMap::new();
    let mut expense_cats: HashMap<&str, f64> = HashMap::new();

    for tx in txs {
        let cat_name = match tx.category.trim() {
            "" => DEFAULT_CATEGORY,
            name => name,
        };

        match tx.kind {
            TxKind::Income => {
                total_income += tx.amount;
                *income_cats.entry(cat_name).or_default() += tx.amount;
            }
            TxKind::Expense => {
                total_expense += tx.amount;
                *expense_cats.entry(cat_name).or_default() += tx.amount;
            }
        }
    }

    return Output {
        total_income: round_amount(total_income),
        total_expense: round_amount(total_expense),
        balance: round_amount(total_income - total_expense),
        income_categories: sorted_totals(income_cats),
        expense_categories: sorted_totals(expense_cats),
    };
}

fn sorted_totals(amounts: HashMap<&str, f64>) -> Vec<CategoryTotal> {
    let mut totals = amounts
        .into_iter()
        .map(|(name, value)| CategoryTotal {
            name: name.to_owned(),
            value: round_amount(value),
        })
        .collect::<Vec<_>>();

    totals.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    totals
}
