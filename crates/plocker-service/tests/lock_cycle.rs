//! End-to-end lock/unlock cycles against a vault on disk.

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use serde_json::{json, Value};

use plocker_core::{is_sentinel, LockRecord, PluginId};
use plocker_service::{LockChange, LockController, ManifestUpdate, PanelView, SettingsPanel};
use plocker_storage::{
    DiskFileStore, FileStore, InMemoryFileStore, JsonRegistryStore, ManifestCatalog,
    RegistryStore, VaultLayout,
};

const SELF_ID: &str = "plugin-update-locker";

type DiskController = LockController<DiskFileStore, JsonRegistryStore<DiskFileStore>>;

fn pid(raw: &str) -> PluginId {
    PluginId::parse(raw).unwrap()
}

fn write_manifest(vault: &Path, id: &str, manifest: Value) {
    let dir = vault.join(".obsidian/plugins").join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), manifest.to_string()).unwrap();
}

fn read_manifest(vault: &Path, id: &str) -> Value {
    let path = vault.join(".obsidian/plugins").join(id).join("manifest.json");
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

fn open_controller(vault: &Path) -> DiskController {
    let layout = VaultLayout::default();
    let files = DiskFileStore::new(vault);
    let settings = JsonRegistryStore::new(files.clone(), layout.data_path(&pid(SELF_ID)));
    LockController::new(files, settings, layout)
}

#[test]
fn sample_plugin_round_trip_on_disk() {
    let vault = tempfile::tempdir().unwrap();
    write_manifest(
        vault.path(),
        "sample-plugin",
        json!({ "id": "sample-plugin", "name": "Sample", "version": "1.2.3", "author": "someone" }),
    );
    let id = pid("sample-plugin");

    let mut controller = open_controller(vault.path());
    controller.toggle_lock(&id);

    let manifest = read_manifest(vault.path(), "sample-plugin");
    assert_eq!(manifest["version"], json!("9999.1.2.3"));
    assert_eq!(manifest["author"], json!("someone"));

    let data: Value = serde_json::from_slice(
        &fs::read(vault.path().join(".obsidian/plugins/plugin-update-locker/data.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        data["lockedPlugins"],
        json!([{
            "pluginId": "sample-plugin",
            "originalVersion": "1.2.3",
            "updatedVersion": "9999.1.2.3"
        }])
    );

    // A fresh controller sees the persisted lock.
    let mut controller = open_controller(vault.path());
    assert!(controller.is_locked(&id));
    controller.toggle_lock(&id);

    assert_eq!(read_manifest(vault.path(), "sample-plugin")["version"], json!("1.2.3"));
    assert!(!open_controller(vault.path()).is_locked(&id));
}

#[test]
fn rewritten_manifest_keeps_key_order() {
    let vault = tempfile::tempdir().unwrap();
    let dir = vault.path().join(".obsidian/plugins/ordered");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("manifest.json"),
        r#"{"version":"0.1.0","id":"ordered","name":"Ordered","minAppVersion":"1.0.0"}"#,
    )
    .unwrap();

    let mut controller = open_controller(vault.path());
    controller.toggle_lock(&pid("ordered"));

    let text = fs::read_to_string(dir.join("manifest.json")).unwrap();
    assert_eq!(
        text,
        "{\n  \"version\": \"9999.0.1.0\",\n  \"id\": \"ordered\",\n  \"name\": \"Ordered\",\n  \"minAppVersion\": \"1.0.0\"\n}"
    );
}

#[test]
fn missing_manifest_leaves_registry_untouched() {
    let vault = tempfile::tempdir().unwrap();
    let mut controller = open_controller(vault.path());
    controller.toggle_lock(&pid("not-installed"));
    assert!(controller.registry().is_empty());
    assert!(open_controller(vault.path()).registry().is_empty());
}

#[test]
fn panel_lists_vault_plugins_and_reflects_toggles() {
    let vault = tempfile::tempdir().unwrap();
    write_manifest(vault.path(), "foo", json!({ "id": "foo", "name": "Foo", "version": "1.0.0" }));
    write_manifest(
        vault.path(),
        "bar-baz",
        json!({ "id": "bar-baz", "name": "Bar Baz", "version": "2.0.0" }),
    );
    write_manifest(
        vault.path(),
        "foobar",
        json!({ "id": "foobar", "name": "foobar", "version": "3.0.0" }),
    );
    write_manifest(
        vault.path(),
        SELF_ID,
        json!({ "id": SELF_ID, "name": "Plugin Update Locker", "version": "1.0.0" }),
    );

    let mut controller = open_controller(vault.path());
    let mut panel = {
        let catalog = ManifestCatalog::new(controller.files(), controller.layout());
        SettingsPanel::open(&catalog, &pid(SELF_ID)).unwrap()
    };
    assert_eq!(panel.candidates().len(), 3);

    panel.set_query("FOO");
    let (report, view) = panel.toggle(&mut controller, &pid("foobar"));
    assert!(report.is_locked());
    let PanelView::Rows { rows } = view else {
        panic!("expected rows");
    };
    let summary: Vec<(&str, bool)> = rows.iter().map(|r| (r.name.as_str(), r.locked)).collect();
    assert_eq!(summary, vec![("Foo", false), ("foobar", true)]);
    assert_eq!(
        rows[1].description,
        "Locked version: 9999.3.0.0, Original version: 3.0.0"
    );
}

#[test]
fn read_only_manifest_is_left_alone_and_reported() {
    let vault = tempfile::tempdir().unwrap();
    write_manifest(vault.path(), "pinned", json!({ "id": "pinned", "version": "4.5.6" }));
    let path = vault.path().join(".obsidian/plugins/pinned/manifest.json");
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&path, permissions).unwrap();

    let mut controller = open_controller(vault.path());
    let report = controller.toggle_lock(&pid("pinned"));

    assert!(matches!(
        report.change,
        LockChange::Locked {
            manifest: ManifestUpdate::Failed { .. },
            ..
        }
    ));
    assert!(report.warning().unwrap().contains("9999.4.5.6"));
    assert_eq!(read_manifest(vault.path(), "pinned")["version"], json!("4.5.6"));
    assert!(fs::metadata(&path).unwrap().permissions().readonly());
}

fn memory_controller(
    version: &str,
) -> LockController<InMemoryFileStore, JsonRegistryStore<InMemoryFileStore>> {
    let layout = VaultLayout::default();
    let manifest = json!({ "id": "p", "name": "P", "version": version, "extra": [1, 2] });
    let files = InMemoryFileStore::new().with_file(layout.manifest_path(&pid("p")), manifest.to_string());
    let settings = JsonRegistryStore::new(InMemoryFileStore::new(), layout.data_path(&pid(SELF_ID)));
    LockController::new(files, settings, layout)
}

proptest! {
    #[test]
    fn lock_then_unlock_restores_the_exact_version(version in "[0-9A-Za-z.+-]{0,24}") {
        prop_assume!(!is_sentinel(&version));
        let mut controller = memory_controller(&version);
        let id = pid("p");
        let path = controller.layout().manifest_path(&id);

        controller.toggle_lock(&id);
        let record = controller.registry().get(&id).cloned().unwrap();
        prop_assert_eq!(&record, &LockRecord::capture(id.clone(), &version));
        let locked: Value = serde_json::from_slice(&controller.files().read(&path).unwrap()).unwrap();
        prop_assert_eq!(locked["version"].as_str(), Some(record.updated_version.as_str()));

        controller.toggle_lock(&id);
        let restored: Value = serde_json::from_slice(&controller.files().read(&path).unwrap()).unwrap();
        prop_assert_eq!(restored["version"].as_str(), Some(version.as_str()));
        prop_assert_eq!(&restored["extra"], &json!([1, 2]));
        prop_assert!(controller.registry().is_empty());

        let (_, settings) = controller.into_parts();
        prop_assert!(settings.load().is_empty());
    }
}
