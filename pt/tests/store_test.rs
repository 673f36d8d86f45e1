//! Integration tests for the template store, codec and placeholder engine

use std::collections::HashMap;

use promptstore::settings::MemoryBackend;
use promptstore::{Options, TemplateDraft, TemplateStore, parse_import, placeholder};
use tempfile::TempDir;

fn store() -> TemplateStore<MemoryBackend> {
    TemplateStore::new(MemoryBackend::new())
}

// =============================================================================
// Store
// =============================================================================

#[test]
fn test_add_then_list_has_one_new_trimmed_entry() {
    let store = store();
    store.add(TemplateDraft::new("Existing", "body")).unwrap();
    let before = store.list().unwrap();

    let created = store.add(TemplateDraft::new("  New title  ", "  new body ")).unwrap();
    let after = store.list().unwrap();

    assert_eq!(after.len(), before.len() + 1);
    let matching: Vec<_> = after.iter().filter(|t| t.id == created.id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title, "New title");
    assert_eq!(matching[0].content, "new body");
}

#[test]
fn test_ids_stay_unique_under_rapid_adds() {
    let store = store();
    for i in 0..20 {
        store.add(TemplateDraft::new(format!("T{}", i), "c")).unwrap();
    }
    let mut ids: Vec<String> = store.list().unwrap().into_iter().map(|t| t.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_rejected_add_leaves_list_unchanged() {
    let store = store();
    store.add(TemplateDraft::new("Keep", "me")).unwrap();
    let before = store.list().unwrap();

    assert!(store.add(TemplateDraft::new("", "content")).is_err());
    assert!(store.add(TemplateDraft::new("   ", "content")).is_err());
    assert!(store.add(TemplateDraft::new("title", "   ")).is_err());

    assert_eq!(store.list().unwrap(), before);
}

#[test]
fn test_remove_every_template_is_idempotent() {
    let store = store();
    store.seed_defaults().unwrap();
    store.add(TemplateDraft::new("Mine", "content")).unwrap();

    for template in store.list().unwrap() {
        store.remove(&template.id).unwrap();
        assert!(store.list().unwrap().iter().all(|t| t.id != template.id));
        store.remove(&template.id).unwrap();
    }
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_update_absent_id_leaves_list_unchanged() {
    let store = store();
    store.add(TemplateDraft::new("A", "B")).unwrap();
    let before = store.list().unwrap();

    let absent = TemplateDraft::new("X", "Y").into_template("absent-id".to_string());
    store.update(absent).unwrap();

    assert_eq!(store.list().unwrap(), before);
}

// =============================================================================
// Import / export
// =============================================================================

#[test]
fn test_partial_import_merges_valid_subset() {
    let store = store();
    let existing = store.add(TemplateDraft::new("Existing", "kept")).unwrap();

    let report = store
        .import(r#"[{"title":"A","content":"B"},{"title":"","content":"C"}]"#)
        .unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.total, 2);
    assert!(report.is_partial());

    let list = store.list().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, existing.id);
    assert_eq!(list[1].title, "A");
}

#[test]
fn test_import_without_valid_entries_changes_nothing() {
    let store = store();
    store.add(TemplateDraft::new("Existing", "kept")).unwrap();
    let before = store.list().unwrap();

    let err = store.import("[]").unwrap_err();
    assert!(err.is_format());
    let err = store.import(r#"{"title":"No content"}"#).unwrap_err();
    assert!(err.is_format());
    let err = store.import("not json").unwrap_err();
    assert!(err.is_format());

    assert_eq!(store.list().unwrap(), before);
}

#[test]
fn test_export_import_roundtrip_modulo_ids() {
    let source = store();
    source.add(TemplateDraft::new("T2", "second {{x}}")).unwrap();
    source
        .add(TemplateDraft::new("T1", "first").with_category("work"))
        .unwrap();
    let exported = source.export().unwrap();

    // Strip ids before importing
    let mut value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    for item in value.as_array_mut().unwrap() {
        item.as_object_mut().unwrap().remove("id");
    }

    let target = store();
    let report = target.import(&value.to_string()).unwrap();
    assert_eq!(report.imported, 2);

    let fields = |list: Vec<promptstore::PromptTemplate>| -> Vec<(String, String, Option<String>)> {
        list.into_iter().map(|t| (t.title, t.content, t.category)).collect()
    };
    assert_eq!(fields(target.list().unwrap()), fields(source.list().unwrap()));
}

#[test]
fn test_imported_ids_never_collide_with_existing() {
    let store = store();
    let existing = store.add(TemplateDraft::new("Existing", "kept")).unwrap();
    let input = format!(r#"[{{"id":"{}","title":"Dup","content":"x"}}]"#, existing.id);

    let batch = parse_import(&input).unwrap();
    assert_ne!(batch.accepted[0].id, existing.id);

    store.import(&input).unwrap();
    let ids: Vec<String> = store.list().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids.iter().filter(|id| **id == existing.id).count(), 1);
}

// =============================================================================
// File backend
// =============================================================================

#[test]
fn test_two_file_stores_do_not_lose_updates() {
    let temp = TempDir::new().unwrap();
    let tab_a = TemplateStore::open(temp.path(), Options::default()).unwrap();
    let tab_b = TemplateStore::open(temp.path(), Options::default()).unwrap();

    tab_a.add(TemplateDraft::new("From A", "a")).unwrap();
    tab_b.import(r#"[{"title":"From B","content":"b"}]"#).unwrap();
    tab_a.add(TemplateDraft::new("From A again", "a2")).unwrap();

    let titles: Vec<String> = tab_b.list().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["From A again", "From A", "From B"]);
}

#[test]
fn test_concurrent_file_stores_keep_every_add() {
    const WRITERS: usize = 6;
    const ADDS_PER_WRITER: usize = 20;

    let temp = TempDir::new().unwrap();
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = temp.path().to_path_buf();
            std::thread::spawn(move || {
                let store = TemplateStore::open(&path, Options::default()).unwrap();
                for i in 0..ADDS_PER_WRITER {
                    store
                        .add(TemplateDraft::new(format!("w{}-{}", writer, i), "content"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let store = TemplateStore::open(temp.path(), Options::default()).unwrap();
    let mut titles: Vec<String> = store.list().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles.len(), WRITERS * ADDS_PER_WRITER);
    titles.sort();
    titles.dedup();
    assert_eq!(titles.len(), WRITERS * ADDS_PER_WRITER);
}

// =============================================================================
// Placeholders
// =============================================================================

#[test]
fn test_placeholder_examples() {
    assert_eq!(
        placeholder::extract_placeholders("Hi {{name}}, your {{name}} is {{status}}"),
        vec!["name", "status"]
    );

    let mut values = HashMap::new();
    values.insert("name".to_string(), "Bob".to_string());
    assert_eq!(placeholder::render("Hi {{name}}", &values), "Hi Bob");
    assert_eq!(placeholder::preview("Hi {{name}}", &HashMap::new()), "Hi {{name}}");
}
