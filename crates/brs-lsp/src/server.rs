use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use brs_analysis::{Analyzer, SuggestionItem, SuggestionKind, TriggerNamespace};

/// Shared workspace state.
struct WorkspaceState {
    /// Open document texts (in-memory, may be unsaved).
    open_docs: HashMap<Url, String>,
    /// The last fully-committed analysis of the workspace.
    analyzer: Analyzer,
    /// Workspace root path.
    root: Option<PathBuf>,
}

/// The BRS language server: drives the analyzer from document-sync
/// notifications and answers completion requests from its last snapshot.
pub struct BrsLanguageServer {
    client: Client,
    state: Arc<RwLock<WorkspaceState>>,
}

impl BrsLanguageServer {
    /// Create a server with an empty workspace.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorkspaceState {
                open_docs: HashMap::new(),
                analyzer: Analyzer::new(),
                root: None,
            })),
        }
    }

    /// Rebuild the analyzer from every `.brs` file in the workspace and
    /// commit it in one swap.
    ///
    /// Runs once per change notification; a notification that arrives
    /// while a rebuild is in flight simply produces the next rebuild, so
    /// writes never interleave and readers always see a whole snapshot.
    async fn analyze_workspace(&self) {
        let state = self.state.read().await;
        let root = match &state.root {
            Some(root) => root.clone(),
            None => return,
        };
        let open_docs = state.open_docs.clone();
        drop(state);

        let mut file_paths: Vec<PathBuf> = Vec::new();
        collect_brs_files(&root, &mut file_paths);
        file_paths.sort();

        // Open-editor text wins over what is on disk.
        let mut sources: Vec<(PathBuf, String)> = Vec::new();
        for path in file_paths {
            let overlay = url_for(&path).and_then(|uri| open_docs.get(&uri).cloned());
            let text = match overlay {
                Some(text) => text,
                None => match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(_) => continue,
                },
            };
            sources.push((path, text));
        }

        let mut analyzer = Analyzer::new();
        if let Some((_, entry_text)) = sources
            .iter()
            .find(|(path, _)| brs_analysis::is_entry_file(path))
        {
            analyzer.refresh_entry(entry_text);
        }
        for (_, text) in &sources {
            analyzer.scan_file(text);
        }

        let mut state = self.state.write().await;
        state.analyzer = analyzer;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for BrsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok())
            .or_else(|| params.root_uri.as_ref().and_then(|u| u.to_file_path().ok()));

        if let Some(root) = root {
            let mut state = self.state.write().await;
            state.root = Some(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".into()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "BRS LSP initialized")
            .await;

        self.analyze_workspace().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;

        {
            let mut state = self.state.write().await;

            // If no workspace root set yet, derive it from the file's parent.
            if state.root.is_none()
                && let Ok(path) = uri.to_file_path()
                && let Some(parent) = path.parent()
            {
                state.root = Some(parent.to_path_buf());
            }

            state.open_docs.insert(uri, text);
        }

        self.analyze_workspace().await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().last() {
            {
                let mut state = self.state.write().await;
                state.open_docs.insert(uri, change.text);
            }
            self.analyze_workspace().await;
        }
    }

    async fn did_save(&self, _params: DidSaveTextDocumentParams) {
        // Disk state may differ from the overlay we were tracking.
        self.analyze_workspace().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        {
            let mut state = self.state.write().await;
            state.open_docs.remove(&params.text_document.uri);
        }
        self.analyze_workspace().await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let state = self.state.read().await;
        let text = match get_file_text(&state.open_docs, &uri) {
            Some(text) => text,
            None => return Ok(None),
        };

        let completion = state
            .analyzer
            .resolve_at(&text, position.line, position.character);
        let Some(completion) = completion else {
            return Ok(None);
        };

        let tag = namespace_tag(&completion.namespace);
        let items: Vec<CompletionItem> = completion
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| to_completion_item(item, index, &tag))
            .collect();

        Ok(Some(CompletionResponse::Array(items)))
    }
}

/// Map a core suggestion onto an LSP completion item.
///
/// `index` preserves catalog order through `sort_text`; the namespace tag
/// rides along in `data` for future resolve round-trips.
fn to_completion_item(item: &SuggestionItem, index: usize, namespace_tag: &str) -> CompletionItem {
    let kind = match item.kind {
        SuggestionKind::Method => CompletionItemKind::METHOD,
        SuggestionKind::Constant => CompletionItemKind::CONSTANT,
        SuggestionKind::Variable => CompletionItemKind::VARIABLE,
        SuggestionKind::Snippet => CompletionItemKind::SNIPPET,
    };

    CompletionItem {
        label: item.label.clone(),
        kind: Some(kind),
        detail: Some(item.detail.clone()),
        documentation: Some(Documentation::String(item.documentation.clone())),
        insert_text: Some(item.insert_text.clone()),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        sort_text: Some(format!("{index:03}")),
        data: Some(serde_json::json!({ "namespace": namespace_tag })),
        ..Default::default()
    }
}

/// A stable string form of the matched namespace.
fn namespace_tag(namespace: &TriggerNamespace) -> String {
    match namespace {
        TriggerNamespace::GameRoot => "game".to_string(),
        TriggerNamespace::ObjectOverride => "object".to_string(),
        TriggerNamespace::InstanceData => "m".to_string(),
        TriggerNamespace::Interface(name) => format!("interface:{name}"),
    }
}

/// A document's current text: the open-editor overlay, or disk.
fn get_file_text(open_docs: &HashMap<Url, String>, uri: &Url) -> Option<String> {
    if let Some(text) = open_docs.get(uri) {
        return Some(text.clone());
    }
    let path = uri.to_file_path().ok()?;
    std::fs::read_to_string(path).ok()
}

/// Best-effort URL for a filesystem path.
fn url_for(path: &Path) -> Option<Url> {
    Url::from_file_path(path)
        .ok()
        .or_else(|| Url::parse(&format!("file://{}", path.display())).ok())
}

/// Recursively collect all `.brs` files under a directory, skipping
/// hidden directories and common non-source dirs.
fn collect_brs_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && !name.starts_with('.')
                && name != "target"
                && name != "node_modules"
            {
                collect_brs_files(&path, out);
            }
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("brs")) {
            out.push(path);
        }
    }
}
