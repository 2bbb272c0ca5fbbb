//! Profile overlay semantics (spec §4.1): a profile document is merged
//! onto the primary config document before either is deserialized into
//! [`super::Config`]. Scalars and sequences in the profile replace the
//! base value outright; mappings are merged key by key, recursively.

use serde_yaml::Value;

/// Merge `profile` onto `base` following spec's overlay rule and return
/// the combined document, still as a raw `Value` (the caller
/// deserializes it into `Config` afterward, so unknown-key warnings run
/// exactly once on the merged result).
pub fn overlay_profile(base: Value, profile: Value) -> Value {
    match (base, profile) {
        (Value::Mapping(mut base_map), Value::Mapping(profile_map)) => {
            for (key, profile_value) in profile_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => overlay_profile(base_value, profile_value),
                    None => profile_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        // Sequences and scalars: the profile's value wins outright.
        (_, profile_value) => profile_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn scalar_in_profile_replaces_base() {
        let base = yaml("workdir: /tmp/a\n");
        let profile = yaml("workdir: /tmp/b\n");
        let merged = overlay_profile(base, profile);
        assert_eq!(merged["workdir"].as_str(), Some("/tmp/b"));
    }

    #[test]
    fn sequence_in_profile_replaces_not_appends() {
        let base = yaml("ignore:\n  - a\n  - b\n");
        let profile = yaml("ignore:\n  - c\n");
        let merged = overlay_profile(base, profile);
        let seq: Vec<String> = merged["ignore"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(seq, vec!["c".to_string()]);
    }

    #[test]
    fn mapping_merges_key_by_key_recursively() {
        let base = yaml("inspections:\n  disabled:\n    - elf\n  ignore:\n    license:\n      - '*.txt'\n");
        let profile = yaml("inspections:\n  disabled:\n    - xml\n");
        let merged = overlay_profile(base, profile);
        assert_eq!(
            merged["inspections"]["disabled"].as_sequence().unwrap().len(),
            1
        );
        // untouched nested key survives the merge
        assert!(merged["inspections"]["ignore"]["license"].is_sequence());
    }

    #[test]
    fn key_only_in_profile_is_added() {
        let base = yaml("common:\n  workdir: /tmp\n");
        let profile = yaml("elf:\n  include_path: '^/usr'\n");
        let merged = overlay_profile(base, profile);
        assert_eq!(merged["elf"]["include_path"].as_str(), Some("^/usr"));
        assert_eq!(merged["common"]["workdir"].as_str(), Some("/tmp"));
    }
}
