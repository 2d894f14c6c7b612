//! Detection of a trailing `(YYYY)` year annotation in a name.

/// Labels this short (after trimming) never carry a year.
const MIN_LABEL_LEN: usize = 6;

/// Width of the `(YYYY)` token.
const YEAR_TOKEN_LEN: usize = 6;

/// A name split into its text and an optional year annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAndYear {
    name: String,
    year: Option<String>,
}

impl NameAndYear {
    fn without_year(name: &str) -> Self {
        Self {
            name: name.to_string(),
            year: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }

    /// The raw year text that was cut from the label, if any.
    pub fn year_text(&self) -> Option<&str> {
        self.year.as_deref()
    }

    /// The annotated year.
    ///
    /// A year text that is present but not a number yields `Some(0)`.
    pub fn year(&self) -> Option<i64> {
        match self.year.as_deref() {
            None | Some("") => None,
            Some(text) => Some(text.parse().unwrap_or(0)),
        }
    }
}

/// Splits a trailing year annotation off `label`.
///
/// `label` should already have its extension removed. When the label, with
/// parentheses ignored, ends in four digits, the last six characters are
/// taken as the year token. Only a token of the form `(YYYY)` is cut from the
/// name; any other token still yields its inner four characters as the year
/// text while the name is left whole.
pub fn exclude_year(label: &str) -> NameAndYear {
    let trimmed = label.trim();
    let chars: Vec<char> = trimmed.chars().collect();

    if chars.len() <= MIN_LABEL_LEN || !has_year(&chars) {
        return NameAndYear::without_year(trimmed);
    }

    let split = chars.len() - YEAR_TOKEN_LEN;
    let token = &chars[split..];
    let year: String = token[1..YEAR_TOKEN_LEN - 1].iter().collect();

    let name = if token[0] == '(' && token[YEAR_TOKEN_LEN - 1] == ')' {
        chars[..split].iter().collect::<String>().trim().to_string()
    } else {
        trimmed.to_string()
    };

    NameAndYear {
        name,
        year: Some(year),
    }
}

fn has_year(chars: &[char]) -> bool {
    let bare: Vec<char> = chars
        .iter()
        .copied()
        .filter(|c| *c != '(' && *c != ')')
        .collect();

    bare.len() >= 4 && bare[bare.len() - 4..].iter().all(|c| c.is_ascii_digit())
}
