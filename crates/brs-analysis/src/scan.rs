//! Low-level text scanning shared by the resolvers.
//!
//! Everything here is regex-over-raw-text by design: the index is a
//! best-effort view of the source, not a parse of it. The boundary checks
//! are byte-level stand-ins for tokenization and treat non-ASCII bytes as
//! boundaries.

use regex::Regex;

/// One `receiver.name = rhs` assignment discovered in source text.
pub struct Assignment {
    /// The assigned property or member name.
    pub name: String,
    /// Whether the right-hand side contains a function literal.
    pub rhs_is_function: bool,
}

/// Whether `byte` can appear inside an identifier.
pub fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Collect `receiver.<name> = <rhs>` assignments from `text`, in
/// appearance order.
///
/// A match whose receiver token is directly preceded by an identifier
/// character is rejected, so a lookup for `iface` does not pick up
/// `myiface.x = 1`. Double-`=` comparisons are not assignments.
pub fn find_assignments(receiver: &str, text: &str) -> Vec<Assignment> {
    let pattern = format!(
        r"(?i){}\.([A-Za-z_][A-Za-z0-9_]*)\s*=([^\r\n]*)",
        regex::escape(receiver)
    );
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut assignments = Vec::new();
    for captures in regex.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > 0 && is_identifier_byte(text.as_bytes()[whole.start() - 1]) {
            continue;
        }

        let rhs = captures[2].trim_start();
        if rhs.starts_with('=') {
            continue;
        }

        assignments.push(Assignment {
            name: captures[1].to_string(),
            rhs_is_function: rhs.to_ascii_lowercase().contains("function"),
        });
    }
    assignments
}
