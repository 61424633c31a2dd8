use std::future::Future;

use serde::Serialize;
use utoipa::ToSchema;

use crate::statement_parsing::{
    generic::GenericFormatParser,
    parser::TxDraft,
    statement::{ImportRejection, StatementError, parse_statement},
};

/// Where accepted drafts go. The whole batch is stored or nothing is.
pub trait TxStore: Sync {
    fn create_many(
        &self,
        user_id: &str,
        drafts: &[TxDraft],
    ) -> impl Future<Output = anyhow::Result<u64>> + Send;
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: usize,
    pub errors: Vec<ImportRejection>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error("no valid transactions found")]
    NothingImported(Vec<ImportRejection>),

    #[error("error saving imported transactions")]
    Storage(#[source] anyhow::Error),
}

pub async fn import_statement<S: TxStore>(
    store: &S,
    user_id: &str,
    content: &str,
) -> Result<ImportSummary, ImportError> {
    let parsed = parse_statement(&GenericFormatParser, content)?;

    if parsed.drafts.is_empty() {
        tracing::warn!(
            user_id,
            rejected = parsed.rejections.len(),
            "import had no usable rows"
        );
        return Err(ImportError::NothingImported(parsed.rejections));
    }

    let imported = store
        .create_many(user_id, &parsed.drafts)
        .await
        .map_err(ImportError::Storage)?;

    tracing::info!(
        user_id,
        imported,
        skipped = parsed.rejections.len(),
        "statement imported"
    );

    return Ok(ImportSummary {
        imported,
        skipped: parsed.rejections.len(),
        errors: parsed.rejections,
    });
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use anyhow::anyhow;

    use super::*;
    use crate::statement_parsing::parser::TxKind;

    const HEADER: &str = "Data;Importo;Categoria;Negozio;Descrizione";

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<(String, TxDraft)>>,
    }

    impl TxStore for MemoryStore {
        async fn create_many(&self, user_id: &str, drafts: &[TxDraft]) -> anyhow::Result<u64> {
            let mut rows = self.rows.lock().expect("lock");
            rows.extend(drafts.iter().map(|d| (user_id.to_owned(), d.clone())));
            Ok(drafts.len() as u64)
        }
    }

    struct BrokenStore;

    impl TxStore for BrokenStore {
        async fn create_many(&self, _: &str, _: &[TxDraft]) -> anyhow::Result<u64> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn imports_good_rows_and_reports_bad_ones() {
        let store = MemoryStore::default();
        let content = format!(
            "{HEADER}\n05/03/2024;-45,50;Spesa;Coop;Settimanale\n01/01/2024;0;Test;X;Y\ngarbage"
        );

        let summary = import_statement(&store, "user_1", &content)
            .await
            .expect("summary");

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(
            summary.errors.iter().map(|e| e.line).collect::<Vec<_>>(),
            vec![3, 4]
        );

        let rows = store.rows.lock().expect("lock");
        assert_eq!(rows.len(), 1);
        let (user_id, draft) = &rows[0];
        assert_eq!(user_id, "user_1");
        assert_eq!(draft.date, "2024-03-05");
        assert_eq!(draft.amount, 45.5);
        assert_eq!(draft.kind, TxKind::Expense);
        assert_eq!(draft.category, "Spesa");
        assert_eq!(draft.shop, "Coop");
        assert_eq!(draft.description, "Settimanale");
    }

    #[tokio::test]
    async fn nothing_usable_fails_with_all_rejections() {
        let store = MemoryStore::default();
        let content = format!("{HEADER}\n01/01/2024;0;a;b;c\nnope;1\n2024-01-01;x\n");

        let err = import_statement(&store, "user_1", &content)
            .await
            .expect_err("nothing imported");

        match err {
            ImportError::NothingImported(rejections) => assert_eq!(rejections.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.rows.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn header_only_statement_imports_nothing() {
        let err = import_statement(&MemoryStore::default(), "user_1", HEADER)
            .await
            .expect_err("nothing imported");

        assert!(matches!(err, ImportError::NothingImported(ref r) if r.is_empty()));
    }

    #[tokio::test]
    async fn bad_header_stops_before_any_row() {
        let store = MemoryStore::default();

        let err = import_statement(&store, "user_1", "a;b;c\n2024-01-01;5;x;y;z")
            .await
            .expect_err("bad header");

        assert!(matches!(err, ImportError::Statement(_)));
        assert!(store.rows.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn storage_failure_is_one_batch_error() {
        let content = format!("{HEADER}\n2024-01-01;5;a;b;c\n2024-01-02;6;a;b;c");

        let err = import_statement(&BrokenStore, "user_1", &content)
            .await
            .expect_err("storage");

        assert!(matches!(err, ImportError::Storage(_)));
    }
}
