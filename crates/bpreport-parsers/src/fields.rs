//! Splitting of comma-separated bpdbjobs lines.

use thiserror::Error;

/// Error type for line splitting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("embedded newline at byte {0}")]
    EmbeddedNewline(usize),
    #[error("line ends with a dangling escape")]
    DanglingEscape,
}

/// Split one `bpdbjobs -report -all_columns` line into its fields.
///
/// Fields are separated by `,`. A backslash makes the following character
/// literal, which is how the report embeds commas in paths and status text.
/// A single trailing line terminator is ignored; any other raw `\n` or `\r`
/// means the line was broken by an embedded newline and is rejected.
pub fn split_record_line(line: &str) -> Result<Vec<String>, SplitError> {
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.char_indices();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((pos, '\n' | '\r')) => return Err(SplitError::EmbeddedNewline(pos)),
                Some((_, escaped)) => current.push(escaped),
                None => return Err(SplitError::DanglingEscape),
            },
            ',' => fields.push(std::mem::take(&mut current)),
            '\n' | '\r' => return Err(SplitError::EmbeddedNewline(pos)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    Ok(fields)
}
