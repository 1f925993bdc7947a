use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category of entity that can be registered in the entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// A game object type (`defineObject`).
    ObjectType,
    /// A room (`defineRoom`).
    Room,
    /// A font resource (`loadFont`).
    Font,
    /// A sound resource (`loadSound`).
    Sound,
    /// A bitmap resource (`loadBitmap`).
    Bitmap,
    /// An interface (`defineInterface`).
    Interface,
}

impl DeclarationKind {
    /// All kinds, in the fixed order they are scanned and reported.
    pub const ALL: [DeclarationKind; 6] = [
        DeclarationKind::ObjectType,
        DeclarationKind::Room,
        DeclarationKind::Font,
        DeclarationKind::Sound,
        DeclarationKind::Bitmap,
        DeclarationKind::Interface,
    ];

    /// The declaration keyword recognized in source text for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::ObjectType => "defineObject",
            DeclarationKind::Room => "defineRoom",
            DeclarationKind::Font => "loadFont",
            DeclarationKind::Sound => "loadSound",
            DeclarationKind::Bitmap => "loadBitmap",
            DeclarationKind::Interface => "defineInterface",
        }
    }

    /// Whether declarations of this kind bind an implementation function
    /// as their second argument.
    pub fn binds_function(self) -> bool {
        matches!(
            self,
            DeclarationKind::ObjectType | DeclarationKind::Room | DeclarationKind::Interface
        )
    }
}

/// A single named declaration extracted from the entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Which kind of declaration this is.
    pub kind: DeclarationKind,
    /// The quoted name the declaration registers.
    pub name: String,
    /// The implementation function identifier, for kinds that bind one.
    pub impl_fn: Option<String>,
}

/// One compiled declaration pattern per kind.
///
/// The name is the first double-quoted argument; binding kinds additionally
/// require the unquoted identifier that follows it. A declaration whose
/// argument shape does not match (unterminated quote, missing function
/// argument) simply produces no match.
static DECLARATION_PATTERNS: Lazy<Vec<(DeclarationKind, Regex)>> = Lazy::new(|| {
    DeclarationKind::ALL
        .iter()
        .map(|&kind| {
            let mut pattern = format!(
                r#"(?i)\b{}\s*\([^"\r\n]*?"([^"\r\n]*)""#,
                kind.keyword()
            );
            if kind.binds_function() {
                pattern.push_str(r"\s*,\s*([A-Za-z_][A-Za-z0-9_]*)");
            }
            let regex = Regex::new(&pattern).expect("declaration pattern must compile");
            (kind, regex)
        })
        .collect()
});

/// Scan `text` for all well-formed declarations of `kind`.
///
/// This is the single place that knows how declarations look in source
/// text; the index and resolvers only consume its output. Matching is
/// case-insensitive and best-effort: malformed occurrences are skipped,
/// not reported. A name that appears more than once is kept at its
/// first-appearance position, but the last occurrence's function binding
/// wins.
pub fn scan_declarations(kind: DeclarationKind, text: &str) -> Vec<Declaration> {
    let regex = DECLARATION_PATTERNS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, r)| r)
        .expect("every kind has a pattern");

    let mut declarations: Vec<Declaration> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for captures in regex.captures_iter(text) {
        let name = captures[1].to_string();
        let impl_fn = captures.get(2).map(|m| m.as_str().to_string());

        match positions.get(&name) {
            Some(&index) => declarations[index].impl_fn = impl_fn,
            None => {
                positions.insert(name.clone(), declarations.len());
                declarations.push(Declaration {
                    kind,
                    name,
                    impl_fn,
                });
            }
        }
    }

    declarations
}

/// Index of all names declared in the project's entry file, per kind.
///
/// `refresh` replaces each kind's declaration set wholesale; readers that
/// interleave with a refresh see either the previous or the new set for a
/// kind, never a partially-updated one. Before the first refresh every
/// kind is empty, and every read degrades to an empty result.
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    sets: HashMap<DeclarationKind, Vec<Declaration>>,
}

impl DefinitionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescan `text` and replace every kind's declaration set.
    pub fn refresh(&mut self, text: &str) {
        for kind in DeclarationKind::ALL {
            let scanned = scan_declarations(kind, text);
            self.sets.insert(kind, scanned);
        }
    }

    /// All declarations of `kind`, in first-appearance order.
    pub fn declarations(&self, kind: DeclarationKind) -> &[Declaration] {
        self.sets.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Declared names of `kind`, in first-appearance order.
    pub fn names(&self, kind: DeclarationKind) -> Vec<&str> {
        self.declarations(kind)
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    /// The `"a","b","c"` form of a kind's names, used to populate
    /// selection-list snippet slots. Empty string when nothing is declared.
    pub fn quoted_csv(&self, kind: DeclarationKind) -> String {
        self.declarations(kind)
            .iter()
            .map(|d| format!("\"{}\"", d.name))
            .collect::<Vec<_>>()
            .join(",")
    }
}
