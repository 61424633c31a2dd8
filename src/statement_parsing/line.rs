pub const QUOTE: char = '"';

/// Splits one line into trimmed fields.
///
/// Delimiters inside double quotes are kept literally and a doubled quote
/// inside a quoted field yields one `"`. An unterminated quote does not fail,
/// the rest of the line becomes part of the last field.
pub fn tokenize(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            c => current.push(c),
        }
    }

    fields.push(current.trim().to_owned());

    fields
}
