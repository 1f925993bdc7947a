use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::definitions::Declaration;
use crate::scan::find_assignments;

/// How an interface property is presented in suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// The synthetic `owner` back-reference every implementation exposes.
    Constant,
    /// A plain data property.
    Variable,
    /// A property whose assigned value is a function literal.
    Method,
}

/// A settable property inferred from an interface implementation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// The property name as written in the assignment.
    pub name: String,
    /// Classification derived from the assignment's right-hand side.
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    /// Whether this property holds a function.
    pub fn is_method(&self) -> bool {
        self.kind == PropertyKind::Method
    }
}

/// Inferred property sets for declared interfaces, keyed by interface name.
///
/// An interface's implementation function can live in any project file, so
/// every changed file is scanned against every declared interface. A file
/// that does not contain an interface's implementation leaves that
/// interface's previous set untouched; a file that does contain it
/// replaces the whole set at once.
#[derive(Debug, Default)]
pub struct InterfaceIndex {
    sets: HashMap<String, Vec<PropertyDescriptor>>,
}

impl InterfaceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one file's text against every declared interface.
    ///
    /// `declarations` is the current set of Interface declarations from the
    /// definition index; entries without a function binding are ignored.
    pub fn scan_file(&mut self, declarations: &[Declaration], text: &str) {
        for declaration in declarations {
            let Some(impl_fn) = declaration.impl_fn.as_deref() else {
                continue;
            };
            if let Some(properties) = resolve_properties(impl_fn, text) {
                self.sets.insert(declaration.name.clone(), properties);
            }
        }
    }

    /// Drop property sets whose interface is no longer declared.
    ///
    /// Run after every definition-index refresh so a removed or renamed
    /// interface does not keep serving stale suggestions.
    pub fn retain_declared(&mut self, declarations: &[Declaration]) {
        self.sets
            .retain(|name, _| declarations.iter().any(|d| &d.name == name));
    }

    /// The resolved property set for `name`, if its implementation has
    /// been located in some scanned file.
    pub fn properties(&self, name: &str) -> Option<&[PropertyDescriptor]> {
        self.sets.get(name).map(Vec::as_slice)
    }
}

/// Locate `impl_fn`'s definition in `text` and infer the properties it
/// assigns onto its receiver parameter.
///
/// Returns `None` when the file does not define the function; the caller
/// treats that as "implementation lives elsewhere". On a match the result
/// always starts with the synthetic `owner` constant.
fn resolve_properties(impl_fn: &str, text: &str) -> Option<Vec<PropertyDescriptor>> {
    let receiver = find_receiver_parameter(impl_fn, text)?;

    let mut properties = vec![PropertyDescriptor {
        name: "owner".to_string(),
        kind: PropertyKind::Constant,
    }];

    for assignment in find_assignments(&receiver, text) {
        if properties.iter().any(|p| p.name == assignment.name) {
            continue;
        }
        let kind = if assignment.rhs_is_function {
            PropertyKind::Method
        } else {
            PropertyKind::Variable
        };
        properties.push(PropertyDescriptor {
            name: assignment.name,
            kind,
        });
    }

    Some(properties)
}

/// Find the single formal parameter name of `function <impl_fn>(...)`.
///
/// Only a definition with exactly one formal parameter qualifies; that
/// parameter is the interface's local binding name inside its own
/// implementation.
fn find_receiver_parameter(impl_fn: &str, text: &str) -> Option<String> {
    let pattern = format!(
        r"(?i)\bfunction\s+{}\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)",
        regex::escape(impl_fn)
    );
    let regex = Regex::new(&pattern).ok()?;

    regex
        .captures(text)
        .map(|captures| captures[1].to_string())
}
