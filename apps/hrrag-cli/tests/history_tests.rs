use hrrag_cli::history::{preview, ChatHistory, Role, PREVIEW_CHARS, TIME_FORMAT};

#[test]
fn push_save_and_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("chat_history.json");
    let mut history = ChatHistory::load(&path);
    assert!(history.messages().is_empty());
    history.push(Role::User, "How many vacation days do I get?");
    history.push(Role::Assistant, "Twenty days per year.");
    history.save().expect("save");

    let reloaded = ChatHistory::load(&path);
    assert_eq!(reloaded.messages(), history.messages());
    assert_eq!(reloaded.messages()[0].role, Role::User);
    assert!(chrono::NaiveDateTime::parse_from_str(&reloaded.messages()[0].time, TIME_FORMAT).is_ok());
}

#[test]
fn file_layout_is_a_pretty_array_of_role_content_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat_history.json");
    let mut history = ChatHistory::load(&path);
    history.push(Role::User, "hello");
    history.save().expect("save");
    let raw = std::fs::read_to_string(&path).expect("read");
    assert!(raw.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let first = &value.as_array().expect("array")[0];
    assert_eq!(first["role"], "user");
    assert_eq!(first["content"], "hello");
    assert!(first["time"].is_string());
}

#[test]
fn clear_empties_the_saved_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat_history.json");
    let mut history = ChatHistory::load(&path);
    history.push(Role::User, "question");
    history.save().expect("save");
    history.clear();
    history.save().expect("save");
    assert!(ChatHistory::load(&path).messages().is_empty());
}

#[test]
fn corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat_history.json");
    std::fs::write(&path, "{ this is not json").expect("write");
    let history = ChatHistory::load(&path);
    assert!(history.messages().is_empty());
    assert_eq!(history.path(), path.as_path());
}

#[test]
fn summaries_list_user_questions_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut history = ChatHistory::load(&dir.path().join("h.json"));
    history.push(Role::User, "first question");
    history.push(Role::Assistant, "first answer");
    history.push(Role::User, "second question");
    history.push(Role::Assistant, "second answer");
    let summaries = history.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!((summaries[0].0, summaries[0].1.as_str()), (2, "second question"));
    assert_eq!((summaries[1].0, summaries[1].1.as_str()), (1, "first question"));
}

#[test]
fn long_questions_are_previewed() {
    let long = "a".repeat(PREVIEW_CHARS + 15);
    let p = preview(&long, PREVIEW_CHARS);
    assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    assert!(p.ends_with("..."));
    assert_eq!(preview("short", PREVIEW_CHARS), "short");
    assert_eq!(preview("ééé", 2), "éé...");
}

#[test]
fn recorded_question_is_on_disk_before_any_answer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat_history.json");
    let mut history = ChatHistory::load(&path);
    history.record(Role::User, "Can I carry over unused leave?").expect("record");

    let on_disk = ChatHistory::load(&path);
    assert_eq!(on_disk.messages().len(), 1);
    assert_eq!(on_disk.messages()[0].role, Role::User);
    assert_eq!(on_disk.messages()[0].content, "Can I carry over unused leave?");

    history.record(Role::Assistant, "Up to five days.").expect("record");
    assert_eq!(ChatHistory::load(&path).messages().len(), 2);
}
