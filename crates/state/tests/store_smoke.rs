use beat_state::{ConfigStore, ENABLED_KEY, ROOT_KEY};
use tempfile::tempdir;

#[test]
fn store_persists_across_loads() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join(".beat/targets.json");

    let mut store = ConfigStore::load(&path).unwrap();
    store.set("codex", ENABLED_KEY, "true");
    store.set("codex", ROOT_KEY, "~/.codex/prompts");
    store.set("cursor", ENABLED_KEY, "true");
    store.save().unwrap();

    let reloaded = ConfigStore::load(&path).unwrap();
    assert_eq!(reloaded, store);
    assert_eq!(reloaded.enabled_targets(), vec!["codex", "cursor"]);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["codex"]["root"], "~/.codex/prompts");
}
