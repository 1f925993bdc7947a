use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{
    GAME_BUILTINS, GAME_DYNAMIC, INSTANCE_METHODS, INSTANCE_VARIABLES, INTERFACE_MEMBERSHIP,
    LIFECYCLE_CALLBACKS, SuggestionItem, SuggestionKind,
};
use crate::definitions::{DeclarationKind, DefinitionIndex};
use crate::interfaces::{InterfaceIndex, PropertyDescriptor, PropertyKind};
use crate::scan::{find_assignments, is_identifier_byte};

/// The namespace implied by the text immediately before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerNamespace {
    /// The `game.` root namespace.
    GameRoot,
    /// The `object.` override namespace of an object script.
    ObjectOverride,
    /// The `m.` current-instance-data namespace.
    InstanceData,
    /// A named interface's data namespace.
    Interface(String),
}

/// A resolved completion request: the matched namespace and its suggestions.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Which namespace matched.
    pub namespace: TriggerNamespace,
    /// The applicable suggestions, in presentation order.
    pub items: Vec<SuggestionItem>,
}

/// Captures the receiver token of a lifecycle entry-point assignment,
/// e.g. `object` in `object.onCreate = function(...)`.
static LIFECYCLE_RECEIVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Za-z_][A-Za-z0-9_]*)\.onCreate\s*=\s*function")
        .expect("lifecycle pattern must compile")
});

/// Classify the caret position and assemble the applicable suggestions.
///
/// The checks run in a fixed order (`game.`, `object.`, `m.`, then each
/// declared interface) and the first one whose suffix and preconditions
/// hold wins. `None` means the caret is in no known namespace; the caller
/// shows nothing rather than an error.
pub fn resolve(
    index: &DefinitionIndex,
    interfaces: &InterfaceIndex,
    line_prefix: &str,
    document: &str,
) -> Option<Completion> {
    if line_prefix.ends_with("game.") {
        return Some(Completion {
            namespace: TriggerNamespace::GameRoot,
            items: game_root_items(index),
        });
    }

    if ends_with_token(line_prefix, "object.") {
        let assigned = assigned_callbacks(document);
        if assigned.iter().any(|name| name == "oncreate") {
            return Some(Completion {
                namespace: TriggerNamespace::ObjectOverride,
                items: override_items(&assigned),
            });
        }
    }

    if ends_with_token(line_prefix, "m.")
        && let Some(receiver) = lifecycle_receiver(document)
    {
        return Some(Completion {
            namespace: TriggerNamespace::InstanceData,
            items: instance_items(index, document, &receiver),
        });
    }

    for declaration in index.declarations(DeclarationKind::Interface) {
        let suffix = format!(".{}.", declaration.name);
        if !line_prefix.ends_with(&suffix) {
            continue;
        }
        let Some(properties) = interfaces.properties(&declaration.name) else {
            continue;
        };
        if properties.is_empty() {
            continue;
        }
        return Some(Completion {
            namespace: TriggerNamespace::Interface(declaration.name.clone()),
            items: properties.iter().map(property_suggestion).collect(),
        });
    }

    None
}

/// True when `prefix` ends with `token` and the character before the token
/// (if any) cannot extend an identifier, so `myobject.` does not count as
/// an `object.` trigger while ` object.` and a line-initial `object.` do.
fn ends_with_token(prefix: &str, token: &str) -> bool {
    if !prefix.ends_with(token) {
        return false;
    }
    let head = prefix.len() - token.len();
    head == 0 || !is_identifier_byte(prefix.as_bytes()[head - 1])
}

fn game_root_items(index: &DefinitionIndex) -> Vec<SuggestionItem> {
    let mut items: Vec<SuggestionItem> = GAME_BUILTINS.clone();
    for (kind, template) in GAME_DYNAMIC {
        items.push(template.render(&index.quoted_csv(*kind)));
    }
    items
}

/// Lowercased names of callbacks this document already assigns a function
/// to on the `object` receiver.
fn assigned_callbacks(document: &str) -> Vec<String> {
    find_assignments("object", document)
        .into_iter()
        .filter(|a| a.rhs_is_function)
        .map(|a| a.name.to_ascii_lowercase())
        .collect()
}

fn override_items(assigned: &[String]) -> Vec<SuggestionItem> {
    LIFECYCLE_CALLBACKS
        .iter()
        .filter(|item| {
            let label = item.label.to_ascii_lowercase();
            !assigned.contains(&label)
        })
        .cloned()
        .collect()
}

/// The receiver token of this document's lifecycle entry point, if any.
fn lifecycle_receiver(document: &str) -> Option<String> {
    LIFECYCLE_RECEIVER
        .captures(document)
        .map(|captures| captures[1].to_string())
}

fn instance_items(index: &DefinitionIndex, document: &str, receiver: &str) -> Vec<SuggestionItem> {
    let mut items: Vec<SuggestionItem> = INSTANCE_VARIABLES.clone();
    items.extend(INSTANCE_METHODS.iter().cloned());

    let interface_csv = index.quoted_csv(DeclarationKind::Interface);
    for template in INTERFACE_MEMBERSHIP {
        items.push(template.render(&interface_csv));
    }

    let known: Vec<String> = items.iter().map(|i| i.label.to_ascii_lowercase()).collect();
    let mut seen: Vec<String> = Vec::new();
    for assignment in find_assignments(receiver, document) {
        let lower = assignment.name.to_ascii_lowercase();
        if known.contains(&lower) || seen.contains(&lower) {
            continue;
        }
        seen.push(lower);
        items.push(inferred_member(&assignment.name, assignment.rhs_is_function));
    }

    items
}

fn inferred_member(name: &str, is_function: bool) -> SuggestionItem {
    if is_function {
        SuggestionItem {
            label: name.to_string(),
            kind: SuggestionKind::Method,
            insert_text: format!("{name}($1)"),
            detail: format!("{name}(...) as Dynamic"),
            documentation: "Function assigned in this script.".to_string(),
        }
    } else {
        SuggestionItem {
            label: name.to_string(),
            kind: SuggestionKind::Variable,
            insert_text: name.to_string(),
            detail: format!("{name} as Dynamic"),
            documentation: "Member assigned in this script.".to_string(),
        }
    }
}

fn property_suggestion(property: &PropertyDescriptor) -> SuggestionItem {
    match property.kind {
        PropertyKind::Constant => SuggestionItem {
            label: property.name.clone(),
            kind: SuggestionKind::Constant,
            insert_text: property.name.clone(),
            detail: format!("{} as Object", property.name),
            documentation: "The instance this interface is attached to.".to_string(),
        },
        PropertyKind::Variable => SuggestionItem {
            label: property.name.clone(),
            kind: SuggestionKind::Variable,
            insert_text: property.name.clone(),
            detail: format!("{} as Dynamic", property.name),
            documentation: "Property assigned by the interface implementation.".to_string(),
        },
        PropertyKind::Method => SuggestionItem {
            label: property.name.clone(),
            kind: SuggestionKind::Method,
            insert_text: format!("{}($1)", property.name),
            detail: format!("{}(...) as Dynamic", property.name),
            documentation: "Function assigned by the interface implementation.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(entry: &str) -> DefinitionIndex {
        let mut index = DefinitionIndex::new();
        index.refresh(entry);
        index
    }

    const OBJECT_SCRIPT: &str = "object.onCreate = function(args)\n\
                                 end function\n";

    #[test]
    fn game_root_triggers_without_boundary_check() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "foo.game.", "").unwrap();
        assert_eq!(hit.namespace, TriggerNamespace::GameRoot);
        assert!(!hit.items.is_empty());
    }

    #[test]
    fn game_root_dynamic_item_carries_declared_names() {
        let index = indexed(
            r#"
            defineObject("enemy", createEnemy)
            defineObject("player", createPlayer)
        "#,
        );
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "game.", "").unwrap();
        let create = hit
            .items
            .iter()
            .find(|i| i.label == "createInstance")
            .unwrap();
        assert!(create.insert_text.contains(r#"${1|"enemy","player"|}"#));
    }

    #[test]
    fn game_root_dynamic_item_falls_back_without_names() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "game.", "").unwrap();
        let change = hit.items.iter().find(|i| i.label == "changeRoom").unwrap();
        assert_eq!(change.insert_text, "changeRoom(${1:room_name as String})");
    }

    #[test]
    fn object_trigger_requires_token_boundary() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        assert!(resolve(&index, &interfaces, "myobject.", OBJECT_SCRIPT).is_none());
        assert!(resolve(&index, &interfaces, " object.", OBJECT_SCRIPT).is_some());
        assert!(resolve(&index, &interfaces, "object.", OBJECT_SCRIPT).is_some());
    }

    #[test]
    fn object_trigger_requires_lifecycle_marker() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        assert!(resolve(&index, &interfaces, "object.", "print(1)\n").is_none());
    }

    #[test]
    fn object_suggestions_exclude_assigned_callbacks() {
        let document = "object.onCreate = function(args)\n\
                        end function\n\
                        object.onUpdate = function(dt)\n\
                        end function\n";
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "object.", document).unwrap();
        assert_eq!(hit.namespace, TriggerNamespace::ObjectOverride);

        let labels: Vec<&str> = hit.items.iter().map(|i| i.label.as_str()).collect();
        assert!(!labels.contains(&"onCreate"));
        assert!(!labels.contains(&"onUpdate"));
        assert!(labels.contains(&"onDraw"));
        assert!(labels.contains(&"onDestroy"));
    }

    #[test]
    fn instance_trigger_requires_boundary_and_marker() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        assert!(resolve(&index, &interfaces, "item.", OBJECT_SCRIPT).is_none());
        assert!(resolve(&index, &interfaces, "m.", "print(1)\n").is_none());
        assert!(resolve(&index, &interfaces, "m.", OBJECT_SCRIPT).is_some());
    }

    #[test]
    fn instance_suggestions_include_membership_and_inferred_members() {
        let document = "object.onCreate = function(args)\n\
                        \tobject.health = 100\n\
                        \tobject.takeDamage = function(amount)\n\
                        \tend function\n\
                        end function\n";
        let index = indexed(r#"defineInterface("movable", initMovable)"#);
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "m.", document).unwrap();
        assert_eq!(hit.namespace, TriggerNamespace::InstanceData);

        let add = hit.items.iter().find(|i| i.label == "addInterface").unwrap();
        assert!(add.insert_text.contains(r#"${1|"movable"|}"#));

        let health = hit.items.iter().find(|i| i.label == "health").unwrap();
        assert_eq!(health.kind, SuggestionKind::Variable);

        let take = hit.items.iter().find(|i| i.label == "takeDamage").unwrap();
        assert_eq!(take.kind, SuggestionKind::Method);
    }

    #[test]
    fn inferred_members_do_not_duplicate_static_catalog_entries() {
        let document = "object.onCreate = function(args)\n\
                        \tobject.x = 5\n\
                        \tobject.x = 6\n\
                        \tobject.speed = 1\n\
                        \tobject.speed = 2\n\
                        end function\n";
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        let hit = resolve(&index, &interfaces, "m.", document).unwrap();
        let x_count = hit.items.iter().filter(|i| i.label == "x").count();
        let speed_count = hit.items.iter().filter(|i| i.label == "speed").count();
        assert_eq!(x_count, 1);
        assert_eq!(speed_count, 1);
    }

    #[test]
    fn interface_namespace_serves_resolved_properties() {
        let index = indexed(r#"defineInterface("movable", initMovable)"#);
        let mut interfaces = InterfaceIndex::new();
        interfaces.scan_file(
            index.declarations(DeclarationKind::Interface),
            "function initMovable(iface)\n\
             \tiface.speed = 0\n\
             \tiface.accelerate = function(n)\n\
             \tend function\n\
             end function\n",
        );

        let hit = resolve(&index, &interfaces, "self.movable.", "").unwrap();
        assert_eq!(
            hit.namespace,
            TriggerNamespace::Interface("movable".to_string())
        );

        let labels: Vec<&str> = hit.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["owner", "speed", "accelerate"]);
        assert_eq!(hit.items[0].kind, SuggestionKind::Constant);
        assert_eq!(hit.items[2].kind, SuggestionKind::Method);
    }

    #[test]
    fn unresolved_interface_yields_nothing() {
        let index = indexed(r#"defineInterface("movable", initMovable)"#);
        let interfaces = InterfaceIndex::new();

        assert!(resolve(&index, &interfaces, "self.movable.", "").is_none());
    }

    #[test]
    fn bare_interface_name_without_leading_dot_does_not_trigger() {
        let index = indexed(r#"defineInterface("movable", initMovable)"#);
        let mut interfaces = InterfaceIndex::new();
        interfaces.scan_file(
            index.declarations(DeclarationKind::Interface),
            "function initMovable(iface)\n\tiface.speed = 0\nend function\n",
        );

        assert!(resolve(&index, &interfaces, "movable.", "").is_none());
    }

    #[test]
    fn no_trigger_resolves_to_none() {
        let index = indexed("");
        let interfaces = InterfaceIndex::new();

        assert!(resolve(&index, &interfaces, "print(", "").is_none());
        assert!(resolve(&index, &interfaces, "", "").is_none());
    }
}
