//! Page-shell collaborators driven by the page router.
//!
//! In a browser these are the DOM, the History API, the global loading
//! indicator and the modal layer. The server renders each request into an
//! in-memory shell and serializes the result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::router::LayoutScope;

/// The document: content container, title, viewport and navigation links.
pub trait Document: Send + Sync {
    /// Replaces the content container's children with `html`.
    fn replace_content(&self, html: &str, layout: LayoutScope);
    /// Appends markup after the current content (data islands, widgets).
    fn append_content(&self, html: &str);
    fn set_title(&self, title: &str);
    fn scroll_to_top(&self);
    /// Marks navigation links whose href equals `path` as active, clears the rest.
    fn mark_active_links(&self, path: &str);
    /// Full navigation away from the application (not an in-app route change).
    fn redirect(&self, location: &str);
}

/// The state object stored with every pushed history entry: `{ route: path }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub route: String,
}

pub trait History: Send + Sync {
    fn push_state(&self, entry: HistoryEntry);
    /// State of the current entry, if any was pushed.
    fn state(&self) -> Option<HistoryEntry>;
}

pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

pub trait ModalHost: Send + Sync {
    fn close_all(&self);
}

/// Shell
///
/// The bundle of collaborators one navigation session writes to.
#[derive(Clone)]
pub struct Shell {
    pub document: Arc<dyn Document>,
    pub history: Arc<dyn History>,
    pub loader: Arc<dyn LoadingIndicator>,
    pub modals: Arc<dyn ModalHost>,
}

impl Shell {
    pub fn new(
        document: Arc<dyn Document>,
        history: Arc<dyn History>,
        loader: Arc<dyn LoadingIndicator>,
        modals: Arc<dyn ModalHost>,
    ) -> Self {
        Self {
            document,
            history,
            loader,
            modals,
        }
    }

    /// A detached shell backed by fresh in-memory collaborators.
    pub fn in_memory() -> (Self, MemoryShell) {
        let handles = MemoryShell::default();
        let shell = Self::new(
            handles.document.clone(),
            handles.history.clone(),
            handles.loader.clone(),
            handles.modals.clone(),
        );
        (shell, handles)
    }
}

/// Concrete handles to the collaborators of an in-memory shell, for
/// inspecting the outcome of a navigation.
#[derive(Clone, Default)]
pub struct MemoryShell {
    pub document: Arc<RenderedDocument>,
    pub history: Arc<SessionHistory>,
    pub loader: Arc<LoaderFlag>,
    pub modals: Arc<ModalStack>,
}

/// Snapshot of everything written to a `RenderedDocument`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub content: String,
    pub layout: LayoutScope,
    pub title: String,
    pub active_path: Option<String>,
    pub redirected_to: Option<String>,
    pub scroll_resets: usize,
}

#[derive(Default)]
pub struct RenderedDocument {
    state: Mutex<DocumentSnapshot>,
}

impl RenderedDocument {
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.state.lock().clone()
    }
}

impl Document for RenderedDocument {
    fn replace_content(&self, html: &str, layout: LayoutScope) {
        let mut state = self.state.lock();
        state.content = html.to_string();
        state.layout = layout;
    }

    fn append_content(&self, html: &str) {
        self.state.lock().content.push_str(html);
    }

    fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    fn scroll_to_top(&self) {
        self.state.lock().scroll_resets += 1;
    }

    fn mark_active_links(&self, path: &str) {
        self.state.lock().active_path = Some(path.to_string());
    }

    fn redirect(&self, location: &str) {
        self.state.lock().redirected_to = Some(location.to_string());
    }
}

/// SessionHistory
///
/// A browser-like history stack. Pushing truncates any forward entries;
/// `back`/`forward` move the cursor and return the entry a `popstate`
/// event would carry.
#[derive(Default)]
pub struct SessionHistory {
    inner: Mutex<HistoryStack>,
}

#[derive(Default)]
struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl SessionHistory {
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn back(&self) -> Option<HistoryEntry> {
        let mut stack = self.inner.lock();
        let target = stack.cursor?.checked_sub(1)?;
        stack.cursor = Some(target);
        stack.entries.get(target).cloned()
    }

    pub fn forward(&self) -> Option<HistoryEntry> {
        let mut stack = self.inner.lock();
        let target = stack.cursor? + 1;
        let entry = stack.entries.get(target).cloned()?;
        stack.cursor = Some(target);
        Some(entry)
    }
}

impl History for SessionHistory {
    fn push_state(&self, entry: HistoryEntry) {
        let mut stack = self.inner.lock();
        let keep = stack.cursor.map_or(0, |cursor| cursor + 1);
        stack.entries.truncate(keep);
        stack.entries.push(entry);
        stack.cursor = Some(stack.entries.len() - 1);
    }

    fn state(&self) -> Option<HistoryEntry> {
        let stack = self.inner.lock();
        stack.cursor.and_then(|cursor| stack.entries.get(cursor).cloned())
    }
}

/// LoaderFlag
///
/// Visibility of the loading indicator plus how often it was toggled.
#[derive(Default)]
pub struct LoaderFlag {
    visible: AtomicBool,
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl LoaderFlag {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn show_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn hide_count(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl LoadingIndicator for LoaderFlag {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct ModalStack {
    open: AtomicUsize,
}

impl ModalStack {
    pub fn open(&self) {
        self.open.fetch_add(1, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl ModalHost for ModalStack {
    fn close_all(&self) {
        self.open.store(0, Ordering::SeqCst);
    }
}
