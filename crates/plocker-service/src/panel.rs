//! The list-and-toggle settings panel.
//!
//! The candidate list is read from the catalog once, when the panel opens,
//! and excludes built-in plugins and the locker itself. Rendering combines
//! that cached list with the controller's current registry, so a toggle is
//! followed by a full re-render.

use std::time::Instant;

use serde::Serialize;

use plocker_core::{filter_by_name, normalize_query, LockRegistry, PluginId};
use plocker_storage::{FileStore, PluginCatalog, PluginEntry, RegistryStore, StorageError};

use crate::controller::{LockController, ToggleReport};
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};

/// Shown instead of rows when the filter matches nothing.
pub const NO_MATCHES_MESSAGE: &str = "No matching plugins found";

/// One rendered plugin row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRow {
    pub id: PluginId,
    pub name: String,
    pub locked: bool,
    pub is_desktop_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_version: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PanelView {
    Rows { rows: Vec<PluginRow> },
    Empty { message: String },
}

impl PanelView {
    pub fn rows(&self) -> &[PluginRow] {
        match self {
            PanelView::Rows { rows } => rows.as_slice(),
            PanelView::Empty { .. } => &[],
        }
    }
}

pub struct SettingsPanel {
    candidates: Vec<PluginEntry>,
    query: String,
    search: Debouncer<String>,
}

impl SettingsPanel {
    /// Opens the panel over the catalog's current plugins.
    pub fn open(catalog: &impl PluginCatalog, self_id: &PluginId) -> Result<Self, StorageError> {
        Ok(Self::from_entries(catalog.list()?, self_id))
    }

    pub fn from_entries(entries: Vec<PluginEntry>, self_id: &PluginId) -> Self {
        let candidates = entries
            .into_iter()
            .filter(|entry| !entry.is_builtin && &entry.id != self_id)
            .collect();
        SettingsPanel {
            candidates,
            query: String::new(),
            search: Debouncer::new(SEARCH_DEBOUNCE),
        }
    }

    pub fn candidates(&self) -> &[PluginEntry] {
        &self.candidates
    }

    /// The normalized filter currently applied.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Applies a filter immediately, bypassing the debounce.
    pub fn set_query(&mut self, raw: &str) {
        self.query = normalize_query(raw);
    }

    /// Feeds raw search-box input through the debouncer. Returns true when
    /// the applied filter changed and the panel should re-render.
    pub fn input_search(&mut self, raw: &str, now: Instant) -> bool {
        match self.search.call(raw.to_string(), now) {
            Some(value) => self.apply(&value),
            None => false,
        }
    }

    /// Applies held search input whose debounce window has passed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(value) => self.apply(&value),
            None => false,
        }
    }

    /// When held search input will be ready for [`SettingsPanel::poll_search`].
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    fn apply(&mut self, raw: &str) -> bool {
        let query = normalize_query(raw);
        if query == self.query {
            return false;
        }
        self.query = query;
        true
    }

    /// Candidates matching the current filter, in catalog order.
    pub fn visible(&self) -> Vec<&PluginEntry> {
        filter_by_name(&self.candidates, &self.query, |entry| entry.name.as_str())
    }

    pub fn render(&self, registry: &LockRegistry) -> PanelView {
        let rows: Vec<PluginRow> = self
            .visible()
            .into_iter()
            .map(|entry| row_for(entry, registry))
            .collect();
        if rows.is_empty() {
            PanelView::Empty {
                message: NO_MATCHES_MESSAGE.to_string(),
            }
        } else {
            PanelView::Rows { rows }
        }
    }

    /// Toggles `id` and re-renders from the controller's updated registry.
    pub fn toggle<F: FileStore, R: RegistryStore>(
        &self,
        controller: &mut LockController<F, R>,
        id: &PluginId,
    ) -> (ToggleReport, PanelView) {
        let report = controller.toggle_lock(id);
        (report, self.render(controller.registry()))
    }
}

fn row_for(entry: &PluginEntry, registry: &LockRegistry) -> PluginRow {
    let record = registry.get(&entry.id);
    let description = match record {
        Some(record) => format!(
            "Locked version: {}, Original version: {}",
            record.updated_version,
            record.original_version.as_deref().unwrap_or("unknown")
        ),
        None => format!("Locking will prevent {} from updating", entry.name),
    };
    PluginRow {
        id: entry.id.clone(),
        name: entry.name.clone(),
        locked: record.is_some(),
        is_desktop_only: entry.is_desktop_only,
        author: entry.author.clone(),
        original_version: record.and_then(|r| r.original_version.clone()),
        updated_version: record.map(|r| r.updated_version.clone()),
        description,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use plocker_core::LockRecord;

    use super::*;

    fn entry(id: &str, name: &str) -> PluginEntry {
        PluginEntry {
            id: PluginId::parse(id).unwrap(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            is_builtin: false,
            is_desktop_only: false,
            author: None,
            description: None,
        }
    }

    fn self_id() -> PluginId {
        PluginId::parse("plugin-update-locker").unwrap()
    }

    fn panel() -> SettingsPanel {
        let mut builtin = entry("file-explorer", "Files");
        builtin.is_builtin = true;
        let mut desktop = entry("bar-baz", "Bar Baz");
        desktop.is_desktop_only = true;
        desktop.author = Some("Someone".to_string());
        SettingsPanel::from_entries(
            vec![
                entry("foo", "Foo"),
                builtin,
                desktop,
                entry("plugin-update-locker", "Plugin Update Locker"),
                entry("foobar", "foobar"),
            ],
            &self_id(),
        )
    }

    fn names(view: &PanelView) -> Vec<&str> {
        view.rows().iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn excludes_builtins_and_self() {
        let panel = panel();
        let ids: Vec<&str> = panel.candidates().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["foo", "bar-baz", "foobar"]);
    }

    #[test]
    fn filter_is_case_insensitive_and_ordered() {
        let mut panel = panel();
        panel.set_query("foo");
        assert_eq!(names(&panel.render(&LockRegistry::new())), vec!["Foo", "foobar"]);
    }

    #[test]
    fn empty_result_renders_message() {
        let mut panel = panel();
        panel.set_query("zzz");
        assert_eq!(
            panel.render(&LockRegistry::new()),
            PanelView::Empty {
                message: NO_MATCHES_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn rows_describe_lock_state() {
        let panel = panel();
        let mut registry = LockRegistry::new();
        registry.insert(LockRecord::capture(PluginId::parse("foo").unwrap(), "1.0.0"));
        let view = panel.render(&registry);
        let rows = view.rows();

        assert!(rows[0].locked);
        assert_eq!(
            rows[0].description,
            "Locked version: 9999.1.0.0, Original version: 1.0.0"
        );
        assert_eq!(rows[0].updated_version.as_deref(), Some("9999.1.0.0"));
        assert!(!rows[1].locked);
        assert_eq!(rows[1].description, "Locking will prevent Bar Baz from updating");
        assert_eq!(rows[1].original_version, None);
    }

    #[test]
    fn rows_carry_desktop_only_flag_and_author() {
        let panel = panel();
        let view = panel.render(&LockRegistry::new());
        let rows = view.rows();

        assert!(!rows[0].is_desktop_only);
        assert!(rows[1].is_desktop_only);
        assert_eq!(rows[1].author.as_deref(), Some("Someone"));

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["isDesktopOnly"], serde_json::json!(true));
        assert_eq!(json["author"], serde_json::json!("Someone"));
        assert!(serde_json::to_value(&rows[0]).unwrap().get("author").is_none());
    }

    #[test]
    fn search_input_is_debounced() {
        let mut panel = panel();
        let t0 = Instant::now();
        assert!(panel.input_search("B", t0));
        assert_eq!(panel.query(), "b");
        assert!(!panel.input_search("Ba", t0 + Duration::from_millis(50)));
        assert!(!panel.input_search("Bar", t0 + Duration::from_millis(100)));
        assert_eq!(panel.query(), "b");

        assert!(!panel.poll_search(t0 + Duration::from_millis(200)));
        assert_eq!(
            panel.search_deadline(),
            Some(t0 + Duration::from_millis(350))
        );
        assert!(panel.poll_search(t0 + Duration::from_millis(350)));
        assert_eq!(panel.query(), "bar");
        assert_eq!(names(&panel.render(&LockRegistry::new())), vec!["Bar Baz", "foobar"]);
    }
}
