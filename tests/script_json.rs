use narrascene::NarrationScript;

#[test]
fn json_fixture_validates() {
    let s = include_str!("data/arithmetic_script.json");
    let script: NarrationScript = serde_json::from_str(s).unwrap();
    script.validate().unwrap();

    assert_eq!(script.topic, "basic-arithmetic");
    assert_eq!(script.seed, 7);
    assert_eq!(script.lines.len(), 5);

    let add = &script.lines[1];
    assert_eq!(add.section_id, "addition");
    let state = add.line_state.as_ref().unwrap();
    assert_eq!(state.params["num2"], serde_json::json!(4));
    assert!(state.show["group1"].visible());
    assert_eq!(state.show["group2"].count(4), 2);
}

#[test]
fn seed_defaults_to_zero_when_absent() {
    let s = r#"{
        "topic": "bezier",
        "lines": [
            { "lineId": "l1", "sectionId": "intro",
              "scene": { "id": "intro-welcome", "type": "title" } }
        ]
    }"#;
    let script: NarrationScript = serde_json::from_str(s).unwrap();
    script.validate().unwrap();
    assert_eq!(script.seed, 0);
}
