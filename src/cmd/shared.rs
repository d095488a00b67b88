/*!
shared.rs - helpers used by the run command.

Focus:
  - load_config_file: read a JSON / YAML config file into a flat map
  - merge_into_input: fill unset `ConfigInput` fields from that map
  - value_to_flag_string: flatten scalar / array values to flag syntax

Precedence is flag > environment > config file; clap already folds the
first two together, so the file only ever fills gaps.
*/

use std::collections::BTreeMap;

use tracing::warn;

use crate::api::{ConfigInput, InputError};

/// Keys accepted in a config file (same spelling as the long flags).
pub const CONFIG_KEYS: &[&str] = &[
    "id",
    "command",
    "timeout",
    "runtime-assets",
    "subscriptions",
    "namespace",
    "sensu-api-url",
    "sensu-access-token",
    "sensu-trusted-ca-file",
];

/* ---- Config File Loading ---- */

/// Parse a config file into `key -> flag string`. YAML is chosen by
/// extension (`.yaml` / `.yml`), anything else is read as JSON.
pub fn load_config_file(path: &str) -> Result<BTreeMap<String, String>, InputError> {
    let fail = |reason: String| InputError::ConfigFile {
        path: path.to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| fail(format!("failed to read: {e}")))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).map_err(|e| fail(format!("invalid YAML: {e}")))?;
        serde_json::to_value(yaml_v).map_err(|e| fail(format!("unsupported YAML value: {e}")))?
    } else {
        serde_json::from_str(&raw).map_err(|e| fail(format!("invalid JSON: {e}")))?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| fail("root must be an object".to_string()))?;

    let mut out = BTreeMap::new();
    for (k, v) in obj {
        if !CONFIG_KEYS.contains(&k.as_str()) {
            warn!("ignoring unknown config file key '{k}'");
            continue;
        }
        let s = value_to_flag_string(v)
            .ok_or_else(|| fail(format!("unsupported value for '{k}'")))?;
        out.insert(k.clone(), s);
    }
    Ok(out)
}

/// Convert a config value to the string a flag would carry.
/// Arrays become comma-separated lists; objects are rejected.
pub fn value_to_flag_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|i| match i {
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
                other => value_to_flag_string(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        serde_json::Value::Null | serde_json::Value::Object(_) => None,
    }
}

/* ---- Merging ---- */

/// Fill every field of `input` that is still unset (or empty) from `file`.
pub fn merge_into_input(input: &mut ConfigInput, file: &BTreeMap<String, String>) {
    let slots: [(&str, &mut Option<String>); 9] = [
        ("id", &mut input.job_id),
        ("command", &mut input.command),
        ("timeout", &mut input.timeout),
        ("runtime-assets", &mut input.runtime_assets),
        ("subscriptions", &mut input.subscriptions),
        ("namespace", &mut input.namespace),
        ("sensu-api-url", &mut input.api_url),
        ("sensu-access-token", &mut input.access_token),
        ("sensu-trusted-ca-file", &mut input.trusted_ca_file),
    ];
    for (key, slot) in slots {
        let unset = slot.as_deref().is_none_or(|s| s.trim().is_empty());
        if unset && let Some(v) = file.get(key) {
            *slot = Some(v.clone());
        }
    }
}

/* ---- Tests (basic) ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn flag_strings() {
        assert_eq!(value_to_flag_string(&json!("x")), Some("x".into()));
        assert_eq!(value_to_flag_string(&json!(30)), Some("30".into()));
        assert_eq!(
            value_to_flag_string(&json!(["web", "db", "web"])),
            Some("web,db,web".into())
        );
        assert_eq!(value_to_flag_string(&json!({"a": 1})), None);
        assert_eq!(value_to_flag_string(&json!([["nested"]])), None);
    }

    #[test]
    fn json_config_file() {
        let f = write_temp(
            ".json",
            r#"{ "command": "uptime", "timeout": 15, "subscriptions": ["web","db"] }"#,
        );
        let map = load_config_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(map.get("command").unwrap(), "uptime");
        assert_eq!(map.get("timeout").unwrap(), "15");
        assert_eq!(map.get("subscriptions").unwrap(), "web,db");
    }

    #[test]
    fn yaml_config_file_and_unknown_keys() {
        let f = write_temp(
            ".yaml",
            "namespace: production\nsensu-api-url: https://sensu.example:8080\nflavor: vanilla\n",
        );
        let map = load_config_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(map.get("namespace").unwrap(), "production");
        assert_eq!(map.get("sensu-api-url").unwrap(), "https://sensu.example:8080");
        assert!(!map.contains_key("flavor"));
    }

    #[test]
    fn bad_config_files() {
        let f = write_temp(".json", "[1,2,3]");
        let err = load_config_file(f.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("root must be an object"));

        let f = write_temp(".yml", "command: [unclosed");
        assert!(load_config_file(f.path().to_str().unwrap()).is_err());

        assert!(matches!(
            load_config_file("/nonexistent/runbook.json"),
            Err(InputError::ConfigFile { .. })
        ));
    }

    #[test]
    fn file_values_only_fill_gaps() {
        let mut input = ConfigInput {
            command: Some("from-flag".into()),
            ..Default::default()
        };
        let mut file = BTreeMap::new();
        file.insert("command".to_string(), "from-file".to_string());
        file.insert("namespace".to_string(), "default".to_string());
        file.insert("id".to_string(), "job-7".to_string());

        merge_into_input(&mut input, &file);
        assert_eq!(input.command.as_deref(), Some("from-flag"));
        assert_eq!(input.namespace.as_deref(), Some("default"));
        assert_eq!(input.job_id.as_deref(), Some("job-7"));
        assert!(input.api_url.is_none());
    }
}
