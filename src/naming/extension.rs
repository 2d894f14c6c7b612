//! Trailing file-extension removal for free-text names.

/// Longest suffix (dot included) that still counts as an extension.
///
/// No audio extension we care about has more than four characters.
pub const MAX_EXTENSION_WITH_DOT: usize = 5;

/// Strips a trailing extension such as `.mp3` from `name`.
///
/// The suffix after the last dot must be a short run of ASCII letters and
/// digits: between one and four characters. Anything else (a non-alphanumeric
/// character before the dot, a suffix that is too long, a bare trailing dot,
/// or no dot at all) leaves `name` untouched, so names like `"Mr. Smith"`
/// survive.
pub fn strip_extension(name: &str) -> &str {
    let mut suffix_len = 0;

    for (idx, c) in name.char_indices().rev() {
        suffix_len += 1;

        if c == '.' {
            if suffix_len < 2 {
                return name;
            }
            return &name[..idx];
        }

        if !c.is_ascii_alphanumeric() || suffix_len >= MAX_EXTENSION_WITH_DOT {
            return name;
        }
    }

    // No dot at all: short alphanumeric names like "track" are titles, not extensions
    name
}
