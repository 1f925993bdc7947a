use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::SuggestionItem;
use crate::context::{self, Completion};
use crate::definitions::{DeclarationKind, DefinitionIndex};
use crate::error::{ScanError, ScanResult};
use crate::interfaces::InterfaceIndex;

/// The owned analysis service: one definition index plus one interface
/// index, mutated only through the refresh operations below.
///
/// Construct one per project, feed it file contents as they change, and
/// answer completion requests from it. Requests that arrive before the
/// first refresh see empty indexes and produce degraded (generic)
/// suggestions rather than blocking or failing.
#[derive(Debug, Default)]
pub struct Analyzer {
    index: DefinitionIndex,
    interfaces: InterfaceIndex,
}

impl Analyzer {
    /// Create an analyzer with empty indexes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current definition index.
    pub fn definitions(&self) -> &DefinitionIndex {
        &self.index
    }

    /// The current interface property sets.
    pub fn interfaces(&self) -> &InterfaceIndex {
        &self.interfaces
    }

    /// Re-scan the entry file's text, replacing every kind's declaration
    /// set and pruning property sets of interfaces that are gone.
    pub fn refresh_entry(&mut self, text: &str) {
        self.index.refresh(text);
        self.interfaces
            .retain_declared(self.index.declarations(DeclarationKind::Interface));
    }

    /// Run the interface pass over one project file's text.
    pub fn scan_file(&mut self, text: &str) {
        self.interfaces
            .scan_file(self.index.declarations(DeclarationKind::Interface), text);
    }

    /// Classify a caret context given the line text before the caret and
    /// the full document text.
    pub fn resolve_context(&self, line_prefix: &str, document: &str) -> Option<Completion> {
        context::resolve(&self.index, &self.interfaces, line_prefix, document)
    }

    /// Classify the caret at `line`/`character` in `document`.
    ///
    /// Out-of-range positions resolve to no namespace.
    pub fn resolve_at(&self, document: &str, line: u32, character: u32) -> Option<Completion> {
        let prefix = line_prefix(document, line, character)?;
        self.resolve_context(&prefix, document)
    }

    /// The inbound completion entry point: suggestions for the caret at
    /// `line`/`character` in `document`.
    ///
    /// Out-of-range positions yield an empty result.
    pub fn provide_completions(
        &self,
        document: &str,
        line: u32,
        character: u32,
    ) -> Vec<SuggestionItem> {
        self.resolve_at(document, line, character)
            .map(|completion| completion.items)
            .unwrap_or_default()
    }
}

/// The caret line's text up to the caret column.
///
/// Columns are counted in characters, which approximates the editor's
/// UTF-16 columns; the two agree on ASCII source, and a divergence only
/// shifts where the prefix ends.
fn line_prefix(text: &str, line: u32, character: u32) -> Option<String> {
    let line_text = text.lines().nth(line as usize)?;
    Some(line_text.chars().take(character as usize).collect())
}

/// Build a fully-scanned analyzer from a project directory.
///
/// Walks `root` for `.brs` files, refreshes the definition index from the
/// first `*main.brs` file in path order (a project without one just
/// leaves the index empty), then runs the interface pass over every file.
/// Unreadable nested directories and files are skipped; only an
/// unreadable root or entry file is an error.
pub fn scan_project(root: &Path) -> ScanResult<Analyzer> {
    let mut files: Vec<PathBuf> = Vec::new();
    collect_script_files(root, &mut files, true)?;
    files.sort();

    let mut analyzer = Analyzer::new();

    if let Some(entry) = files.iter().find(|path| is_entry_file(path)) {
        let text = fs::read_to_string(entry).map_err(|source| ScanError::EntryFile {
            path: entry.clone(),
            source,
        })?;
        analyzer.refresh_entry(&text);
    }

    for path in &files {
        if let Ok(text) = fs::read_to_string(path) {
            analyzer.scan_file(&text);
        }
    }

    Ok(analyzer)
}

/// Whether a path is the project's entry file (`*main.brs`).
pub fn is_entry_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().ends_with("main.brs"))
}

/// Recursively collect all `.brs` files under `dir`, skipping hidden
/// directories and common non-source trees.
fn collect_script_files(dir: &Path, out: &mut Vec<PathBuf>, is_root: bool) -> ScanResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) if is_root => {
            return Err(ScanError::WorkspaceDir {
                path: dir.to_path_buf(),
                source,
            });
        }
        Err(_) => return Ok(()),
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && !name.starts_with('.')
                && name != "target"
                && name != "node_modules"
            {
                collect_script_files(&path, out, false)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("brs"))
        {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ENTRY: &str = r#"
        defineObject("enemy", createEnemy)
        defineObject("player", createPlayer)
        defineInterface("movable", initMovable)
    "#;

    #[test]
    fn completions_after_game_trigger_list_declared_objects() {
        let mut analyzer = Analyzer::new();
        analyzer.refresh_entry(ENTRY);

        let document = "object.onCreate = function(args)\n\tgame.\nend function\n";
        let items = analyzer.provide_completions(document, 1, 6);

        let create = items.iter().find(|i| i.label == "createInstance").unwrap();
        assert!(create.insert_text.contains(r#"${1|"enemy","player"|}"#));
    }

    #[test]
    fn out_of_range_positions_yield_nothing() {
        let analyzer = Analyzer::new();

        assert!(analyzer.provide_completions("game.", 3, 0).is_empty());
        assert!(analyzer.provide_completions("", 0, 10).is_empty());
    }

    #[test]
    fn caret_past_line_end_uses_whole_line() {
        let mut analyzer = Analyzer::new();
        analyzer.refresh_entry(ENTRY);

        let items = analyzer.provide_completions("game.", 0, 80);
        assert!(items.iter().any(|i| i.label == "createInstance"));
    }

    #[test]
    fn refresh_prunes_interfaces_no_longer_declared() {
        let mut analyzer = Analyzer::new();
        analyzer.refresh_entry(ENTRY);
        analyzer.scan_file("function initMovable(iface)\n\tiface.speed = 0\nend function\n");
        assert!(analyzer.interfaces().properties("movable").is_some());

        analyzer.refresh_entry(r#"defineObject("enemy", createEnemy)"#);
        assert!(analyzer.interfaces().properties("movable").is_none());
    }

    #[test]
    fn scan_project_builds_from_a_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("game_main.brs"), ENTRY).unwrap();
        fs::create_dir(dir.path().join("objects")).unwrap();
        fs::write(
            dir.path().join("objects").join("movable.brs"),
            "function initMovable(iface)\n\tiface.speed = 0\nend function\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(
            dir.path().join("target").join("stale_main.brs"),
            r#"defineObject("stale", createStale)"#,
        )
        .unwrap();

        let analyzer = scan_project(dir.path()).unwrap();

        assert_eq!(
            analyzer.definitions().names(DeclarationKind::ObjectType),
            vec!["enemy", "player"]
        );
        let props = analyzer.interfaces().properties("movable").unwrap();
        assert_eq!(props[1].name, "speed");
    }

    #[test]
    fn scan_project_without_entry_file_stays_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("helpers.brs"),
            r#"defineObject("ignored", createIgnored)"#,
        )
        .unwrap();

        let analyzer = scan_project(dir.path()).unwrap();

        assert!(
            analyzer
                .definitions()
                .names(DeclarationKind::ObjectType)
                .is_empty()
        );
    }

    #[test]
    fn scan_project_on_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            scan_project(&missing),
            Err(ScanError::WorkspaceDir { .. })
        ));
    }

    #[test]
    fn entry_file_name_matching() {
        assert!(is_entry_file(Path::new("project/game_main.brs")));
        assert!(is_entry_file(Path::new("Main.BRS")));
        assert!(!is_entry_file(Path::new("project/mainframe.brs")));
        assert!(!is_entry_file(Path::new("project/main.txt")));
    }
}
