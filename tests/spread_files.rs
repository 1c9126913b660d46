#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::fs;
use std::path::Path;

use lms_spread::address::ChannelAddress;
use lms_spread::lms::SequenceDocument;
use lms_spread::settings::SpreadSettings;
use lms_spread::spread::{spread_file, SpreadOptions};
use lms_spread::SpreadError;

const SEQUENCE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<sequence saveFileVersion="14" author="Test">
  <channels>
    <channel name="Rect 1-1" color="12632256" centiseconds="3000" deviceType="LOR" unit="27" circuit="5" savedIndex="0">
      <effect type="intensity" startCentisecond="0" endCentisecond="150" intensity="100"/>
    </channel>
    <channel name="Rect 1-2" color="12632256" centiseconds="3000" deviceType="LOR" unit="27" circuit="6" savedIndex="1">
      <effect type="shimmer" startCentisecond="150" endCentisecond="300" intensity="80"/>
    </channel>
    <channel name="Arch 1" unit="30" circuit="1" savedIndex="2">
      <effect type="twinkle" startCentisecond="0" endCentisecond="50" intensity="40"/>
    </channel>
    <channel name="Arch 2" unit="30" circuit="2" savedIndex="3"/>
    <channel name="Mega tree 1" unit="52" circuit="17" savedIndex="4"/>
    <channel name="Rudolph nose" unit="66" circuit="3" savedIndex="5"/>
  </channels>
  <tracks>
    <track totalCentiseconds="3000"/>
  </tracks>
</sequence>
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    settings: SpreadSettings,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let settings = SpreadSettings {
        input_dir: root.join("inputSequences"),
        output_dir: root.join("outputSequences"),
        assign_dir: root.join("assignFiles"),
        ..SpreadSettings::default()
    };
    fs::create_dir_all(&settings.input_dir).unwrap();
    fs::create_dir_all(&settings.assign_dir).unwrap();
    fs::write(settings.input_dir.join("Sandstorm.lms"), SEQUENCE).unwrap();

    write_json(
        &settings.assign_dir.join("assign.json"),
        &serde_json::json!([
            {"modelChannel": [27, 5], "childChannels": [[30, 1], [30, 2]]},
            {"modelChannel": [5, 5], "childChannels": [[30, 1]]}
        ]),
    );
    write_json(
        &settings.assign_dir.join("assignTrees.json"),
        &serde_json::json!([
            {"modelChannel": [27, 6], "childChannels": [[52, 17], [52, 18]]}
        ]),
    );
    write_json(
        &settings.assign_dir.join("assignRGB.json"),
        &serde_json::json!([
            {"modelChannel": [27, 6], "childChannels": [[30, 2]]}
        ]),
    );
    write_json(
        &settings.assign_dir.join("assignReindeer.json"),
        &serde_json::json!([
            {"modelChannel": [27, 5], "childChannels": [[66, 3]]}
        ]),
    );

    Fixture {
        _dir: dir,
        settings,
    }
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn effect_types(doc: &SequenceDocument, unit: u32, circuit: u32) -> Vec<String> {
    doc.effects_of(ChannelAddress::new(unit, circuit))
        .unwrap()
        .into_iter()
        .filter_map(|e| e.attr("type").map(str::to_string))
        .collect()
}

#[test]
fn default_run_applies_all_three_sets_and_writes_once() {
    let f = fixture();
    let outcome = spread_file(&f.settings, "Sandstorm.lms", &SpreadOptions::default()).unwrap();

    let passes: Vec<&str> = outcome.reports.iter().map(|r| r.pass.as_str()).collect();
    assert_eq!(passes, ["basic", "trees", "RGB"]);

    // basic: one bad model, nothing else wrong
    assert_eq!(outcome.reports[0].assignment_errors.len(), 1);
    assert!(outcome.reports[0].channel_errors.is_empty());
    // trees: (52, 18) is not in the sequence
    assert_eq!(outcome.reports[1].channel_errors.len(), 1);
    assert_eq!(outcome.reports[1].channel_errors[0].channel, ChannelAddress::new(52, 18));
    assert!(!outcome.reports[2].has_errors());

    let out = SequenceDocument::read(&outcome.output).unwrap();
    assert_eq!(effect_types(&out, 30, 1), ["twinkle", "intensity"]);
    assert_eq!(effect_types(&out, 30, 2), ["intensity", "shimmer"]);
    assert_eq!(effect_types(&out, 52, 17), ["shimmer"]);
    assert!(effect_types(&out, 66, 3).is_empty());
    // Source templates untouched
    assert_eq!(effect_types(&out, 27, 5), ["intensity"]);
    assert_eq!(effect_types(&out, 27, 6), ["shimmer"]);

    // Untouched parts of the sequence survive the round trip
    assert_eq!(out.root().attr("saveFileVersion"), Some("14"));
    assert!(out.root().child("tracks").is_some());
    let arch = out.find_channel(ChannelAddress::new(30, 1)).unwrap();
    assert_eq!(arch.attr("name"), Some("Arch 1"));

    // Input left alone
    let input = fs::read_to_string(f.settings.input_dir.join("Sandstorm.lms")).unwrap();
    assert_eq!(input, SEQUENCE);
}

#[test]
fn reindeer_only_runs_a_single_pass() {
    let f = fixture();
    let options = SpreadOptions {
        reindeer_only: true,
        ..SpreadOptions::default()
    };
    let outcome = spread_file(&f.settings, "Sandstorm.lms", &options).unwrap();

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].pass, "reindeer");
    let out = SequenceDocument::read(&outcome.output).unwrap();
    assert_eq!(effect_types(&out, 66, 3), ["intensity"]);
    assert!(effect_types(&out, 30, 2).is_empty());
}

#[test]
fn override_replaces_child_effects() {
    let f = fixture();
    let options = SpreadOptions {
        trees: false,
        rgb: false,
        overwrite: true,
        ..SpreadOptions::default()
    };
    let outcome = spread_file(&f.settings, "Sandstorm.lms", &options).unwrap();
    let out = SequenceDocument::read(&outcome.output).unwrap();
    assert_eq!(effect_types(&out, 30, 1), ["intensity"]);
}

#[test]
fn rerun_keeps_previous_output_as_backup() {
    let f = fixture();
    let first = spread_file(&f.settings, "Sandstorm.lms", &SpreadOptions::default()).unwrap();
    let first_bytes = fs::read(&first.output).unwrap();

    spread_file(&f.settings, "Sandstorm.lms", &SpreadOptions::default()).unwrap();

    let backup = f.settings.output_dir.join("Sandstorm.lms.bak");
    assert_eq!(fs::read(backup).unwrap(), first_bytes);
}

#[test]
fn missing_assignment_file_aborts_before_writing() {
    let f = fixture();
    fs::remove_file(f.settings.assign_dir.join("assignRGB.json")).unwrap();

    let err = spread_file(&f.settings, "Sandstorm.lms", &SpreadOptions::default()).unwrap_err();

    assert!(matches!(err, SpreadError::Assignments(_)), "{err}");
    assert!(!f.settings.output_dir.join("Sandstorm.lms").exists());
}

#[test]
fn missing_sequence_is_a_document_error() {
    let f = fixture();
    let err = spread_file(&f.settings, "Nope.lms", &SpreadOptions::default()).unwrap_err();
    assert!(matches!(err, SpreadError::Document { .. }), "{err}");
}
