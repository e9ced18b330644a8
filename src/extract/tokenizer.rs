#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Quoted,
}

impl QuoteState {
    fn toggle(self) -> Self {
        match self {
            QuoteState::Unquoted => QuoteState::Quoted,
            QuoteState::Quoted => QuoteState::Unquoted,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Tokens {
    pub fields: Vec<String>,
    /// False when the line ended inside a quoted span.
    pub balanced: bool,
}

/// Splits a line on commas that sit outside double quotes. Quote characters
/// only switch state and never reach the field text.
pub fn tokenize(line: &str) -> Tokens {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Unquoted;

    for ch in line.chars() {
        match (state, ch) {
            (_, '"') => state = state.toggle(),
            (QuoteState::Unquoted, ',') => fields.push(std::mem::take(&mut current)),
            (_, other) => current.push(other),
        }
    }
    fields.push(current);

    Tokens {
        fields,
        balanced: state == QuoteState::Unquoted,
    }
}

/// Text following the `n`th comma found outside quotes.
pub fn after_nth_unquoted_comma(line: &str, n: usize) -> Option<&str> {
    let mut state = QuoteState::Unquoted;
    let mut seen = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => state = state.toggle(),
            ',' if state == QuoteState::Unquoted => {
                seen += 1;
                if seen == n {
                    return Some(&line[idx + 1..]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the quote that closes the first quoted span in `text`.
pub fn first_quote_close(text: &str) -> Option<usize> {
    let mut state = QuoteState::Unquoted;
    for (idx, ch) in text.char_indices() {
        if ch == '"' {
            state = state.toggle();
            if state == QuoteState::Unquoted {
                return Some(idx);
            }
        }
    }
    None
}
