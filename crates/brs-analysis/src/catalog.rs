//! Static suggestion catalogs for the built-in namespaces.
//!
//! These tables are versioned configuration, not logic: each entry carries
//! its label, completion kind, snippet-syntax insertion text, a short
//! signature line, and documentation prose. Order within a catalog is the
//! order suggestions are presented in, so it is part of the contract.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::definitions::DeclarationKind;

/// The kind of a suggestion, mirrored onto the editor's completion kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// A callable operation.
    Method,
    /// A read-only value.
    Constant,
    /// A data member.
    Variable,
    /// A multi-line code template.
    Snippet,
}

/// One completion suggestion, static or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    /// The label shown in the completion list.
    pub label: String,
    /// Completion kind.
    pub kind: SuggestionKind,
    /// Snippet-syntax insertion text with ordered `$n` placeholders.
    pub insert_text: String,
    /// One-line signature shown next to the label.
    pub detail: String,
    /// Documentation prose.
    pub documentation: String,
}

fn item(
    label: &str,
    kind: SuggestionKind,
    insert_text: &str,
    detail: &str,
    documentation: &str,
) -> SuggestionItem {
    SuggestionItem {
        label: label.to_string(),
        kind,
        insert_text: insert_text.to_string(),
        detail: detail.to_string(),
        documentation: documentation.to_string(),
    }
}

/// A catalog entry whose insertion text depends on the currently declared
/// names: `with_choices` carries a `{{choices}}` slot that receives the
/// quoted-CSV name list, and `fallback` is the free-text-placeholder form
/// used while no names are known.
#[derive(Debug, Clone, Copy)]
pub struct DynamicTemplate {
    /// The label shown in the completion list.
    pub label: &'static str,
    /// Completion kind.
    pub kind: SuggestionKind,
    /// Snippet form containing the `{{choices}}` selection-list slot.
    pub with_choices: &'static str,
    /// Snippet form used when no names are declared.
    pub fallback: &'static str,
    /// One-line signature shown next to the label.
    pub detail: &'static str,
    /// Documentation prose.
    pub documentation: &'static str,
}

impl DynamicTemplate {
    /// Build the suggestion for the current name list.
    ///
    /// An empty CSV selects the fallback form; a selection list with zero
    /// choices is never emitted.
    pub fn render(&self, quoted_csv: &str) -> SuggestionItem {
        let insert_text = if quoted_csv.is_empty() {
            self.fallback.to_string()
        } else {
            self.with_choices.replace("{{choices}}", quoted_csv)
        };
        SuggestionItem {
            label: self.label.to_string(),
            kind: self.kind,
            insert_text,
            detail: self.detail.to_string(),
            documentation: self.documentation.to_string(),
        }
    }
}

/// Fixed operations available on the `game.` root.
pub static GAME_BUILTINS: Lazy<Vec<SuggestionItem>> = Lazy::new(build_game_builtins);

/// Overridable lifecycle callbacks offered on the `object.` root.
pub static LIFECYCLE_CALLBACKS: Lazy<Vec<SuggestionItem>> = Lazy::new(build_lifecycle_callbacks);

/// Fixed data members of the `m.` instance namespace.
pub static INSTANCE_VARIABLES: Lazy<Vec<SuggestionItem>> = Lazy::new(build_instance_variables);

/// Fixed operations of the `m.` instance namespace.
pub static INSTANCE_METHODS: Lazy<Vec<SuggestionItem>> = Lazy::new(build_instance_methods);

/// The dynamic `game.` operations that take a declared name, in
/// declaration-kind order.
pub static GAME_DYNAMIC: &[(DeclarationKind, DynamicTemplate)] = &[
    (
        DeclarationKind::ObjectType,
        DynamicTemplate {
            label: "createInstance",
            kind: SuggestionKind::Method,
            with_choices: "createInstance(${1|{{choices}}|}${2: [, args as Object]})",
            fallback: "createInstance(${1:object_name as String}${2: [, args as Object]})",
            detail: "createInstance(object_name as String [, args as Object]) as Object",
            documentation: "Spawns a new instance of a defined object type in the current \
                            room and returns it. Extra args are passed to the type's \
                            onCreate callback.",
        },
    ),
    (
        DeclarationKind::Room,
        DynamicTemplate {
            label: "changeRoom",
            kind: SuggestionKind::Method,
            with_choices: "changeRoom(${1|{{choices}}|})",
            fallback: "changeRoom(${1:room_name as String})",
            detail: "changeRoom(room_name as String) as Void",
            documentation: "Tears down the current room and starts the named one. Takes \
                            effect at the end of the current frame.",
        },
    ),
    (
        DeclarationKind::Font,
        DynamicTemplate {
            label: "getFont",
            kind: SuggestionKind::Method,
            with_choices: "getFont(${1|{{choices}}|})",
            fallback: "getFont(${1:font_name as String})",
            detail: "getFont(font_name as String) as Object",
            documentation: "Looks up a font registered with loadFont.",
        },
    ),
    (
        DeclarationKind::Sound,
        DynamicTemplate {
            label: "getSound",
            kind: SuggestionKind::Method,
            with_choices: "getSound(${1|{{choices}}|})",
            fallback: "getSound(${1:sound_name as String})",
            detail: "getSound(sound_name as String) as Object",
            documentation: "Looks up a sound registered with loadSound.",
        },
    ),
    (
        DeclarationKind::Bitmap,
        DynamicTemplate {
            label: "getBitmap",
            kind: SuggestionKind::Method,
            with_choices: "getBitmap(${1|{{choices}}|})",
            fallback: "getBitmap(${1:bitmap_name as String})",
            detail: "getBitmap(bitmap_name as String) as Object",
            documentation: "Looks up a bitmap registered with loadBitmap.",
        },
    ),
];

/// The dynamic `m.` interface-membership operations, both keyed to the
/// Interface declaration kind.
pub static INTERFACE_MEMBERSHIP: &[DynamicTemplate] = &[
    DynamicTemplate {
        label: "addInterface",
        kind: SuggestionKind::Method,
        with_choices: "addInterface(${1|{{choices}}|})",
        fallback: "addInterface(${1:interface_name as String})",
        detail: "addInterface(interface_name as String) as Object",
        documentation: "Attaches a defined interface to this instance and returns the \
                        interface table.",
    },
    DynamicTemplate {
        label: "hasInterface",
        kind: SuggestionKind::Method,
        with_choices: "hasInterface(${1|{{choices}}|})",
        fallback: "hasInterface(${1:interface_name as String})",
        detail: "hasInterface(interface_name as String) as Boolean",
        documentation: "True if the named interface is attached to this instance.",
    },
];

fn build_game_builtins() -> Vec<SuggestionItem> {
    vec![
        item(
            "deltaTime",
            SuggestionKind::Constant,
            "deltaTime",
            "deltaTime as Float",
            "Seconds elapsed since the previous frame.",
        ),
        item(
            "screenWidth",
            SuggestionKind::Constant,
            "screenWidth",
            "screenWidth as Integer",
            "Width of the render target in pixels.",
        ),
        item(
            "screenHeight",
            SuggestionKind::Constant,
            "screenHeight",
            "screenHeight as Integer",
            "Height of the render target in pixels.",
        ),
        item(
            "currentRoom",
            SuggestionKind::Constant,
            "currentRoom",
            "currentRoom as String",
            "Name of the room currently running.",
        ),
        item(
            "playSound",
            SuggestionKind::Method,
            "playSound(${1:sound as Object}${2: [, volume as Float]})",
            "playSound(sound as Object [, volume as Float]) as Void",
            "Starts playback of a sound obtained from getSound. Volume ranges \
             from 0.0 to 1.0 and defaults to 1.0.",
        ),
        item(
            "stopSound",
            SuggestionKind::Method,
            "stopSound(${1:sound as Object})",
            "stopSound(sound as Object) as Void",
            "Stops every running playback of the given sound.",
        ),
        item(
            "drawBitmap",
            SuggestionKind::Method,
            "drawBitmap(${1:bitmap as Object}, ${2:x as Float}, ${3:y as Float})",
            "drawBitmap(bitmap as Object, x as Float, y as Float) as Void",
            "Draws a bitmap at the given room coordinates. Only valid inside a \
             draw callback.",
        ),
        item(
            "drawText",
            SuggestionKind::Method,
            "drawText(${1:text as String}, ${2:font as Object}, ${3:x as Float}, ${4:y as Float})",
            "drawText(text as String, font as Object, x as Float, y as Float) as Void",
            "Draws a text run with the given font. Only valid inside a draw \
             callback.",
        ),
        item(
            "setCamera",
            SuggestionKind::Method,
            "setCamera(${1:x as Float}, ${2:y as Float})",
            "setCamera(x as Float, y as Float) as Void",
            "Centers the view on the given room coordinates.",
        ),
        item(
            "quit",
            SuggestionKind::Method,
            "quit()",
            "quit() as Void",
            "Ends the game at the end of the current frame.",
        ),
    ]
}

fn build_lifecycle_callbacks() -> Vec<SuggestionItem> {
    vec![
        item(
            "onCreate",
            SuggestionKind::Snippet,
            "onCreate = function(${1:args as Object})\n\t$0\nend function",
            "object.onCreate = function(args as Object)",
            "Runs once when an instance of this type is created. Receives the \
             args passed to createInstance.",
        ),
        item(
            "onUpdate",
            SuggestionKind::Snippet,
            "onUpdate = function(${1:dt as Float})\n\t$0\nend function",
            "object.onUpdate = function(dt as Float)",
            "Runs every frame with the elapsed time in seconds.",
        ),
        item(
            "onDraw",
            SuggestionKind::Snippet,
            "onDraw = function()\n\t$0\nend function",
            "object.onDraw = function()",
            "Runs every frame after all updates; the only place drawing calls \
             are valid.",
        ),
        item(
            "onCollision",
            SuggestionKind::Snippet,
            "onCollision = function(${1:other as Object})\n\t$0\nend function",
            "object.onCollision = function(other as Object)",
            "Runs when this instance starts overlapping another.",
        ),
        item(
            "onRoomEnter",
            SuggestionKind::Snippet,
            "onRoomEnter = function()\n\t$0\nend function",
            "object.onRoomEnter = function()",
            "Runs when the containing room becomes current.",
        ),
        item(
            "onRoomLeave",
            SuggestionKind::Snippet,
            "onRoomLeave = function()\n\t$0\nend function",
            "object.onRoomLeave = function()",
            "Runs just before the containing room is torn down.",
        ),
        item(
            "onDestroy",
            SuggestionKind::Snippet,
            "onDestroy = function()\n\t$0\nend function",
            "object.onDestroy = function()",
            "Runs just before this instance is removed.",
        ),
    ]
}

fn build_instance_variables() -> Vec<SuggestionItem> {
    vec![
        item("x", SuggestionKind::Variable, "x", "x as Float", "Horizontal room position."),
        item("y", SuggestionKind::Variable, "y", "y as Float", "Vertical room position."),
        item(
            "rotation",
            SuggestionKind::Variable,
            "rotation",
            "rotation as Float",
            "Rotation in degrees, clockwise.",
        ),
        item(
            "scale",
            SuggestionKind::Variable,
            "scale",
            "scale as Float",
            "Uniform draw scale, 1.0 by default.",
        ),
        item(
            "visible",
            SuggestionKind::Variable,
            "visible",
            "visible as Boolean",
            "Whether onDraw runs for this instance.",
        ),
        item(
            "depth",
            SuggestionKind::Variable,
            "depth",
            "depth as Integer",
            "Draw order; higher depths draw behind lower ones.",
        ),
        item(
            "id",
            SuggestionKind::Constant,
            "id",
            "id as Integer",
            "Unique identifier of this instance, stable for its lifetime.",
        ),
        item(
            "typeName",
            SuggestionKind::Constant,
            "typeName",
            "typeName as String",
            "Name of the object type this instance was created from.",
        ),
    ]
}

fn build_instance_methods() -> Vec<SuggestionItem> {
    vec![
        item(
            "destroy",
            SuggestionKind::Method,
            "destroy()",
            "destroy() as Void",
            "Removes this instance at the end of the current frame; onDestroy \
             runs first.",
        ),
        item(
            "moveTo",
            SuggestionKind::Method,
            "moveTo(${1:x as Float}, ${2:y as Float})",
            "moveTo(x as Float, y as Float) as Void",
            "Teleports this instance to the given room coordinates.",
        ),
        item(
            "distanceTo",
            SuggestionKind::Method,
            "distanceTo(${1:other as Object})",
            "distanceTo(other as Object) as Float",
            "Euclidean distance to another instance.",
        ),
        item(
            "collidesWith",
            SuggestionKind::Method,
            "collidesWith(${1:other as Object})",
            "collidesWith(other as Object) as Boolean",
            "True if the bounding boxes of the two instances overlap.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_choices() {
        let template = &GAME_DYNAMIC[0].1;
        let rendered = template.render(r#""enemy","player""#);

        assert_eq!(rendered.label, "createInstance");
        assert_eq!(
            rendered.insert_text,
            r#"createInstance(${1|"enemy","player"|}${2: [, args as Object]})"#
        );
    }

    #[test]
    fn render_falls_back_when_no_names_exist() {
        let template = &GAME_DYNAMIC[0].1;
        let rendered = template.render("");

        assert_eq!(
            rendered.insert_text,
            "createInstance(${1:object_name as String}${2: [, args as Object]})"
        );
        assert!(!rendered.insert_text.contains("{{choices}}"));
    }

    #[test]
    fn game_dynamic_covers_each_named_kind_once() {
        let kinds: Vec<DeclarationKind> = GAME_DYNAMIC.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                DeclarationKind::ObjectType,
                DeclarationKind::Room,
                DeclarationKind::Font,
                DeclarationKind::Sound,
                DeclarationKind::Bitmap,
            ]
        );
    }

    #[test]
    fn catalogs_have_no_duplicate_labels() {
        for catalog in [
            &*GAME_BUILTINS,
            &*LIFECYCLE_CALLBACKS,
            &*INSTANCE_VARIABLES,
            &*INSTANCE_METHODS,
        ] {
            let mut labels: Vec<&str> = catalog.iter().map(|i| i.label.as_str()).collect();
            labels.sort_unstable();
            labels.dedup();
            assert_eq!(labels.len(), catalog.len());
        }
    }

    #[test]
    fn lifecycle_entries_are_snippets() {
        assert!(
            LIFECYCLE_CALLBACKS
                .iter()
                .all(|i| i.kind == SuggestionKind::Snippet)
        );
    }
}
