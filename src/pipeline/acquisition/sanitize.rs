/// Sanitize OCR text before passing downstream.
/// Strips control characters and stray glyphs, trims lines, drops blank lines.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ','
                        | ';'
                        | ':'
                        | '-'
                        | '/'
                        | '('
                        | ')'
                        | '+'
                        | '&'
                        | '@'
                        | '#'
                        | '\''
                        | '"'
                        | '!'
                        | '?'
                        | '\u{2019}' // Right single quotation mark
                )
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
