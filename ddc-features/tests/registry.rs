//! Registry behaviour against realistic capabilities strings.

use ddc_features::{Capabilities, FeatureError, FeatureTable, ModelOverride};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};

#[test]
fn lookup_by_name_then_code() {
    let table = FeatureTable::builtin();
    assert_eq!(table.lookup("input", None).unwrap().code, 0x60);
    assert_eq!(table.lookup("60", None).unwrap().name, "input");
    assert_eq!(table.lookup("0xE9", None).unwrap().name, "unknown feature 0xE9");
    assert_eq!(
        table.lookup("not a feature", None),
        Err(FeatureError::NotFound("not a feature".to_string()))
    );
}

#[test]
fn unknown_code_resolves_to_placeholder() {
    let feature = FeatureTable::shared().for_code(0xE9, Some("any model"));
    assert_eq!(feature.name, "unknown feature 0xE9");
    assert!(feature.value_names.is_empty());
    assert_eq!(feature.model, None);
}

#[test]
fn normalize_input_names() {
    let input = FeatureTable::builtin().for_code(0x60, None);
    assert_eq!(input.normalize_value("VGA-1"), Ok(0x01));
    assert_eq!(input.normalize_value("HDMI-2"), Ok(0x12));
    assert_eq!(input.normalize_value("0x0f"), Ok(0x0F));
    assert!(input.normalize_value("Thunderbolt").is_err());
}

#[test]
fn lg_override_changes_value_names() {
    let table = FeatureTable::builtin();
    let model = "LG FULLHD(HDMI)";

    let input = table.for_code(0x60, Some(model));
    assert_eq!(input.normalize_value("HDMI-1"), Ok(0x04));

    let power = table.lookup("power mode", Some(model)).unwrap();
    assert_eq!(power.name_for(0x01), Some("On"));
    assert_eq!(power.name_for(0x02), None);

    let caps = Capabilities::parse("(prot(monitor)type(LCD)model(LG FULLHD)cmds(01 02 03 0C E3 F3)vcp(02 04 05 08 10 12 14(05 08 0B) 16 18 1A 52 60(01 04 11 12) B0 B6 C6 C8 C9 D6(01 04) DF)mccs_ver(2.1)mswhql(1))");
    assert_eq!(caps.model(), Some("LG FULLHD"));
    assert_eq!(caps.display_type(), Some("LCD"));

    let supported = caps.supported_values(&table, Some(model));
    assert_eq!(supported[&0x60].values, BTreeSet::from([0x01, 0x04]));
    assert_eq!(
        supported[&0x60].named_values(),
        BTreeMap::from([
            ("0x01".to_string(), "VGA-1".to_string()),
            ("0x04".to_string(), "HDMI-1".to_string()),
        ])
    );
}

#[test]
fn configured_override_is_used_for_its_model_only() {
    let mut table = FeatureTable::builtin();
    table
        .apply(&ModelOverride {
            model: "DELL U2720Q".to_string(),
            code: "input".to_string(),
            values: BTreeMap::from([
                ("0x0F".to_string(), "DisplayPort".to_string()),
                ("0x1B".to_string(), "USB-C".to_string()),
            ]),
        })
        .unwrap();

    let caps = Capabilities::parse("(vcp(60(0F 11 1B)))");
    let dell = caps.supported_values(&table, Some("DELL U2720Q"));
    assert_eq!(dell[&0x60].feature.name_for(0x1B), Some("USB-C"));
    assert_eq!(dell[&0x60].values, BTreeSet::from([0x0F, 0x1B]));

    let other = caps.supported_values(&table, Some("Other"));
    assert_eq!(other[&0x60].values, BTreeSet::from([0x0F, 0x11, 0x1B]));
    assert_eq!(other[&0x60].feature.name_for(0x1B), None);
}
