//! Tests for #[derive(Slice)] and #[derive(SliceState)]

#![allow(dead_code)]

use marquee::{KeyedStateStore, Slice, SliceState};
use serde::Serialize;

#[derive(marquee::Slice, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    display_name: String,
    age: u32,
}

#[derive(marquee::Slice, Clone, Debug, Default, PartialEq, Serialize)]
struct Settings {
    theme: Option<String>,
}

#[derive(marquee::SliceState, Clone, Debug, Default, PartialEq, Serialize)]
struct State {
    profile: Profile,
    settings: Settings,
}

#[test]
fn test_slice_merge_is_shallow() {
    let mut profile = Profile {
        display_name: "ann".into(),
        age: 30,
    };

    let touched = profile.merge(ProfilePatch {
        age: Some(31),
        ..Default::default()
    });

    assert!(touched);
    assert_eq!(profile.display_name, "ann");
    assert_eq!(profile.age, 31);
}

#[test]
fn test_empty_slice_patch_reports_untouched() {
    let mut settings = Settings::default();
    assert!(!settings.merge(SettingsPatch::default()));
}

#[test]
fn test_slice_names() {
    assert_eq!(State::slice_names(), &["profile", "settings"]);
}

#[test]
fn test_state_merge_touches_only_given_slice() {
    let mut state = State::default();
    state.settings.theme = Some("dark".into());

    let touched = state.merge(StatePatch {
        profile: Some(ProfilePatch {
            display_name: Some("bo".into()),
            ..Default::default()
        }),
        settings: None,
    });

    assert_eq!(touched, vec!["profile"]);
    assert_eq!(state.profile.display_name, "bo");
    assert_eq!(state.settings.theme.as_deref(), Some("dark"));
}

#[test]
fn test_retain_pristine_drops_changed_slices() {
    let baseline = State::default();
    let mut current = State::default();
    current.profile.age = 5;

    let patch = StatePatch {
        profile: Some(ProfilePatch {
            age: Some(40),
            ..Default::default()
        }),
        settings: Some(SettingsPatch {
            theme: Some(Some("light".into())),
        }),
    };

    let kept = current.retain_pristine(&baseline, patch);

    assert!(kept.profile.is_none());
    assert!(kept.settings.is_some());
    assert_eq!(State::touched(&kept), vec!["settings"]);
}

#[test]
fn test_patch_deserializes_partial_snapshot_with_renames() {
    let patch: StatePatch =
        serde_json::from_str(r#"{"profile":{"displayName":"cy"}}"#).unwrap();

    assert_eq!(
        patch,
        StatePatch {
            profile: Some(ProfilePatch {
                display_name: Some("cy".into()),
                age: None,
            }),
            settings: None,
        }
    );
}

#[test]
fn test_patch_skips_absent_fields_when_serialized() {
    let patch = StatePatch {
        profile: Some(ProfilePatch {
            age: Some(2),
            ..Default::default()
        }),
        settings: None,
    };

    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json, serde_json::json!({ "profile": { "age": 2 } }));
}

#[test]
fn test_derived_state_works_in_store() {
    let store = KeyedStateStore::new(State::default());
    store.update(StatePatch {
        settings: Some(SettingsPatch {
            theme: Some(Some("dark".into())),
        }),
        ..Default::default()
    });

    assert_eq!(store.read().settings.theme.as_deref(), Some("dark"));
    assert_eq!(store.read().profile, Profile::default());
}
