use super::*;
use serde_json::json;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "storyframe_store_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn missing_document_is_created_with_default_shape() {
    let dir = temp_dir("missing");
    let store = ChoiceStore::new(dir.join("gamedata.json"));

    let record = store.try_load().unwrap();
    assert_eq!(record, ChoiceRecord::default());
    assert_eq!(
        read_json(store.path()),
        json!([{"state": ""}, {"story": []}])
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn corrupt_document_is_reported_by_try_load_and_recovered_by_load() {
    let dir = temp_dir("corrupt");
    let path = dir.join("gamedata.json");

    for body in ["not json", "{}", "[]", r#"[{"choice": 3}, {"story": []}]"#] {
        std::fs::write(&path, body).unwrap();
        let store = ChoiceStore::new(&path);
        let err = store.try_load().unwrap_err();
        assert!(matches!(err, StoryError::CorruptStore(_)), "{body}");
        assert_eq!(store.load(), ChoiceRecord::default());
        assert_eq!(store.get_last_choice(), None);
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn menu_choice_overwrites_and_reads_back() {
    let dir = temp_dir("menu");
    let store = ChoiceStore::new(dir.join("gamedata.json"));
    let options = vec!["A".to_string(), "B".to_string(), "C".to_string()];

    store.record_menu_choice(&options, "B").unwrap();
    assert_eq!(store.get_last_choice().as_deref(), Some("B"));

    store.record_menu_choice(&options, "C").unwrap();
    assert_eq!(store.get_last_choice().as_deref(), Some("C"));
    assert_eq!(store.lookup(None).as_deref(), Some("C"));
    assert_eq!(store.lookup(Some("")).as_deref(), Some("C"));

    assert_eq!(
        read_json(store.path())[0],
        json!({"options": ["A", "B", "C"], "choice": "C"})
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn story_choices_append_without_dedup_and_leave_menu_alone() {
    let dir = temp_dir("story");
    let store = ChoiceStore::new(dir.join("gamedata.json"));
    let options = vec!["yes".to_string(), "no".to_string()];

    store.record_menu_choice(&options, "yes").unwrap();
    store.record_story_choice("chapter1", "no").unwrap();
    store.record_story_choice("chapter1", "yes").unwrap();
    store.record_story_choice("chapter2", "yes").unwrap();

    let record = store.try_load().unwrap();
    assert_eq!(record.story_choices.len(), 3);
    assert_eq!(record.last_choice(), Some("yes"));

    // First match wins.
    assert_eq!(store.get_story_choice("chapter1").as_deref(), Some("no"));
    assert_eq!(store.lookup(Some("chapter2")).as_deref(), Some("yes"));
    assert_eq!(store.get_story_choice("chapter9"), None);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn original_documents_are_readable() {
    let dir = temp_dir("compat");
    let path = dir.join("gamedata.json");
    std::fs::write(
        &path,
        r#"[{"options": ["Left", "Right"], "choice": "Right"}, {"story": [{"id": "1", "choice": "Left"}]}]"#,
    )
    .unwrap();

    let store = ChoiceStore::new(&path);
    let record = store.try_load().unwrap();
    assert_eq!(
        record.last_menu_choice,
        Some(MenuChoice {
            options: vec!["Left".into(), "Right".into()],
            choice: "Right".into(),
        })
    );
    assert_eq!(record.lookup(Some("1")), Some("Left"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn numeric_story_ids_read_as_text() {
    let dir = temp_dir("numeric_id");
    let path = dir.join("gamedata.json");
    std::fs::write(
        &path,
        r#"[{"options": ["A", "B"], "choice": "B"}, {"story": [{"id": "ch1", "choice": "A"}, {"id": 2, "choice": "B"}]}]"#,
    )
    .unwrap();

    let store = ChoiceStore::new(&path);
    let record = store.try_load().unwrap();
    assert_eq!(record.last_choice(), Some("B"));
    assert_eq!(record.lookup(Some("2")), Some("B"));

    store.record_story_choice("ch3", "C").unwrap();
    let record = store.try_load().unwrap();
    assert_eq!(record.last_choice(), Some("B"));
    let ids: Vec<_> = record.story_choices.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["ch1", "2", "ch3"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn recording_never_overwrites_an_unreadable_document() {
    let dir = temp_dir("no_clobber");
    let path = dir.join("gamedata.json");
    let body = r#"[{"options": ["A"], "choice": "A"}, {"story": [{"id": null, "choice": "A"}]}]"#;
    std::fs::write(&path, body).unwrap();

    let store = ChoiceStore::new(&path);
    let err = store.record_story_choice("ch1", "B").unwrap_err();
    assert!(matches!(err, StoryError::CorruptStore(_)));
    let err = store
        .record_menu_choice(&["A".to_string()], "A")
        .unwrap_err();
    assert!(matches!(err, StoryError::CorruptStore(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), body);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = temp_dir("atomic");
    let store = ChoiceStore::new(dir.join("nested").join("gamedata.json"));
    store.save(&ChoiceRecord::default()).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.join("nested"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["gamedata.json".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}
