use serde::Serialize;
use utoipa::ToSchema;

use super::{
    line::tokenize,
    parser::{RawRow, RecordParser, TxDraft},
};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ImportRejection {
    /// 1-based, the header is line 1
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ParsedStatement {
    pub drafts: Vec<TxDraft>,
    pub rejections: Vec<ImportRejection>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum StatementError {
    #[error("invalid header, expected: {expected}")]
    InvalidHeader { expected: String },
}

/// Splits a statement into drafts and rejected rows.
///
/// The first non-blank line must be the parser's header, compared case
/// insensitively. Every following non-blank line produces exactly one draft or
/// one rejection.
pub fn parse_statement(
    parser: &dyn RecordParser,
    content: &str,
) -> Result<ParsedStatement, StatementError> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let delimiter = parser.delimiter();

    let mut lines = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let header_matches = lines
        .next()
        .map(|(_, header)| tokenize(&header.to_lowercase(), delimiter) == parser.header())
        .unwrap_or(false);

    if !header_matches {
        return Err(StatementError::InvalidHeader {
            expected: expected_header(parser),
        });
    }

    let mut parsed = ParsedStatement::default();

    for (line, text) in lines {
        let row = RawRow::from_fields(tokenize(text, delimiter));

        match parser.parse_record(row) {
            Ok(draft) => parsed.drafts.push(draft),
            Err(err) => parsed.rejections.push(ImportRejection {
                line,
                reason: err.to_string(),
            }),
        }
    }

    Ok(parsed)
}

fn expected_header(parser: &dyn RecordParser) -> String {
    let delimiter = parser.delimiter().to_string();

    parser
        .header()
        .iter()
        .map(|column| {
            let mut chars = column.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement_parsing::{generic::GenericFormatParser, parser::TxKind};

    const HEADER: &str = "Data;Importo;Categoria;Negozio;Descrizione";

    #[test]
    fn partitions_rows_into_drafts_and_rejections() {
        let content = format!(
            "{HEADER}\n05/03/2024;-45,50;Spesa;Coop;Settimanale\n01/01/2024;0;Test;X;Y\ngarbage"
        );

        let parsed = parse_statement(&GenericFormatParser, &content).expect("parsed");

        assert_eq!(parsed.drafts.len(), 1);
        let draft = &parsed.drafts[0];
        assert_eq!(draft.date, "2024-03-05");
        assert_eq!(draft.amount, 45.5);
        assert_eq!(draft.kind, TxKind::Expense);
        assert_eq!(draft.category, "Spesa");
        assert_eq!(draft.shop, "Coop");

        assert_eq!(
            parsed.rejections,
            vec![
                ImportRejection {
                    line: 3,
                    reason: "zero amount".to_owned()
                },
                ImportRejection {
                    line: 4,
                    reason: "invalid date".to_owned()
                },
            ]
        );
    }

    #[test]
    fn strips_bom_and_handles_crlf() {
        let content = format!("\u{feff}{HEADER}\r\n2024-01-02;10,00;;;\r\n");

        let parsed = parse_statement(&GenericFormatParser, &content).expect("parsed");

        assert_eq!(parsed.drafts.len(), 1);
        assert_eq!(parsed.drafts[0].category, "Uncategorized");
        assert!(parsed.rejections.is_empty());
    }

    #[test]
    fn header_is_case_insensitive_and_may_follow_blank_lines() {
        let content = "\n  \nDATA; importo ;Categoria;NEGOZIO;descrizione\n\n2024-01-02;5;a;b;c\n";

        let parsed = parse_statement(&GenericFormatParser, content).expect("parsed");

        assert_eq!(parsed.drafts.len(), 1);
    }

    #[test]
    fn line_numbers_count_skipped_blank_lines() {
        let content = format!("{HEADER}\n\n2024-01-02;5;a;b;c\n\nbad;5\n");

        let parsed = parse_statement(&GenericFormatParser, &content).expect("parsed");

        assert_eq!(parsed.rejections[0].line, 5);
    }

    #[test]
    fn wrong_header_rejects_whole_statement() {
        let err = parse_statement(
            &GenericFormatParser,
            "Date;Amount;Category;Shop;Description\n2024-01-02;5;a;b;c",
        )
        .expect_err("header");

        assert_eq!(
            err,
            StatementError::InvalidHeader {
                expected: HEADER.to_owned()
            }
        );
    }

    #[test]
    fn header_with_extra_column_is_rejected() {
        let content = format!("{HEADER};Saldo\n2024-01-02;5;a;b;c");

        assert!(parse_statement(&GenericFormatParser, &content).is_err());
    }

    #[test]
    fn empty_content_has_no_header() {
        assert!(parse_statement(&GenericFormatParser, "").is_err());
        assert!(parse_statement(&GenericFormatParser, "\u{feff}\n\n").is_err());
    }

    #[test]
    fn every_failing_row_is_rejected() {
        let content = format!("{HEADER}\nx;1\n2024-01-01;abc\n3/3/2024;0\n");

        let parsed = parse_statement(&GenericFormatParser, &content).expect("parsed");

        assert!(parsed.drafts.is_empty());
        assert_eq!(parsed.rejections.len(), 3);
    }
}
