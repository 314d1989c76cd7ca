//! Quote-aware field assembly
//!
//! The `csv` reader runs with quoting disabled and splits a line on every
//! delimiter. Fragments are joined back together while a double quote is
//! open, so a quote switches quoting on or off wherever it sits in a field.
//! Inside quotes, `""` stands for a literal quote.

const QUOTE: char = '"';

/// Fields of one line after quote handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledLine {
    /// Unquoted, trimmed field values
    pub fields: Vec<String>,

    /// The line ended while still inside quotes
    pub unterminated_quote: bool,
}

/// Join delimiter-split fragments back into fields, honoring quotes
pub fn assemble_fields<'a, I>(fragments: I, delimiter: char) -> AssembledLine
where
    I: IntoIterator<Item = &'a str>,
{
    let mut raw_fields: Vec<String> = Vec::new();
    let mut inside_quotes = false;

    for fragment in fragments {
        match raw_fields.last_mut() {
            Some(current) if inside_quotes => {
                current.push(delimiter);
                current.push_str(fragment);
            }
            _ => raw_fields.push(fragment.to_string()),
        }

        // `""` flips twice, so parity alone tracks the state
        if fragment.matches(QUOTE).count() % 2 == 1 {
            inside_quotes = !inside_quotes;
        }
    }

    AssembledLine {
        fields: raw_fields.iter().map(|raw| unquote(raw)).collect(),
        unterminated_quote: inside_quotes,
    }
}

/// Drop quote characters, keep escaped quotes, trim the result
pub fn unquote(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut inside_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != QUOTE {
            value.push(c);
        } else if inside_quotes && chars.peek() == Some(&QUOTE) {
            chars.next();
            value.push(QUOTE);
        } else {
            inside_quotes = !inside_quotes;
        }
    }

    value.trim().to_string()
}
