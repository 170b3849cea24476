//! Integration tests: host profile → seeded document → snapshot and SVG.

use dh_core::host::Canvas;
use dh_scene::{HostProfile, ProfileError, render_svg};
use pretty_assertions::assert_eq;

const PROFILE: &str = r#"{
    "fileKey": "AbC123",
    "fileName": "Campaign",
    "nodes": [
        { "type": "frame", "name": "Hero", "x": 0, "y": 0, "width": 1440, "height": 900,
          "fill": { "r": 1, "g": 1, "b": 1 },
          "children": [
              { "type": "text", "name": "Headline", "x": 80, "y": 120, "characters": "Fish & Chips", "fontSize": 48 }
          ] },
        { "type": "frame", "name": "Footer", "y": 1000, "width": 1440, "height": 200 },
        { "type": "text", "name": "Note", "x": 1500, "characters": "loose" }
    ],
    "selection": ["Footer"]
}"#;

#[test]
fn seeds_nodes_in_order() {
    let host = HostProfile::from_json(PROFILE).unwrap().build().unwrap();
    let names: Vec<String> = host
        .document
        .page_children()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["Hero", "Footer", "Note"]);
    assert_eq!(host.document.len(), 4);
    assert_eq!(host.document.file_key().as_deref(), Some("AbC123"));
    assert_eq!(host.document.file_name(), "Campaign");
}

#[test]
fn selection_is_resolved_by_name() {
    let host = HostProfile::from_json(PROFILE).unwrap().build().unwrap();
    let selected: Vec<String> = host
        .document
        .selection()
        .into_iter()
        .map(|id| host.document.get(id).unwrap().name.clone())
        .collect();
    assert_eq!(selected, vec!["Footer"]);
}

#[test]
fn unknown_selection_is_rejected() {
    let err = HostProfile::from_json(r#"{ "selection": ["Ghost"] }"#)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, ProfileError::UnknownSelection(ref name) if name == "Ghost"));
}

#[test]
fn snapshot_mirrors_the_tree() {
    let host = HostProfile::from_json(PROFILE).unwrap().build().unwrap();
    let snapshot = host.document.snapshot();
    assert_eq!(snapshot.children.len(), 3);
    let hero = &snapshot.children[0];
    assert_eq!(hero.children.len(), 1);
    assert_eq!(hero.children[0].characters.as_deref(), Some("Fish & Chips"));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["children"][0]["name"], "Hero");
    assert_eq!(json["children"][0]["children"][0]["fontSize"], 48.0);
}

#[test]
fn svg_contains_every_top_level_frame() {
    let host = HostProfile::from_json(PROFILE).unwrap().build().unwrap();
    let svg = render_svg(&host.document);
    for name in ["Hero", "Footer"] {
        assert!(svg.contains(&format!("data-name=\"{name}\"")), "missing {name}");
    }
    assert!(svg.contains("Fish &amp; Chips"));
    assert!(svg.contains(">loose</text>"));
}
