//! Trigger parameter validators.
//!
//! Parameters arrive as raw strings keyed by name. Each trigger kind declares a
//! schema of [`ParamSpec`]s; [`parse_params`] runs the matching validator for
//! every recognized name and ignores the rest.

use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, BTreeSet};

pub const LIST_DELIMITER: char = ',';
pub const NAME_VERSION_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// `a, b,c` -> `["a", "b", "c"]`
    DelimitedList,
    /// `curl|7.29.0-35.el7,zlib|1.2.8` -> `{curl: 7.29.0-35.el7, zlib: 1.2.8}`
    NameVersionList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    List(Vec<String>),
    NameVersions(BTreeMap<String, String>),
}

impl Validator {
    pub fn parse(&self, param: &str, raw: &str) -> CoreResult<ParamValue> {
        match self {
            Validator::DelimitedList => Ok(ParamValue::List(parse_delimited_list(raw))),
            Validator::NameVersionList => {
                Ok(ParamValue::NameVersions(parse_name_version_list(param, raw)?))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub validator: Validator,
    pub description: &'static str,
}

pub fn parse_delimited_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_name_version_list(param: &str, raw: &str) -> CoreResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for token in parse_delimited_list(raw) {
        let (name, version) = token.split_once(NAME_VERSION_SEPARATOR).ok_or_else(|| {
            CoreError::parameter_format(
                param,
                raw,
                format!("entry {:?} is not of the form name|version", token),
            )
        })?;
        let (name, version) = (name.trim(), version.trim());
        if name.is_empty() {
            return Err(CoreError::parameter_format(
                param,
                raw,
                format!("entry {:?} has an empty package name", token),
            ));
        }
        if version.is_empty() {
            return Err(CoreError::parameter_format(
                param,
                raw,
                format!("entry {:?} has an empty version", token),
            ));
        }
        // Later duplicates replace earlier ones.
        out.insert(name.to_string(), version.to_string());
    }
    Ok(out)
}

/// Parsed parameter values for one trigger invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerParams {
    values: BTreeMap<&'static str, ParamValue>,
}

impl TriggerParams {
    /// Recognized list parameter, or empty when it was not supplied.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(ParamValue::List(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    pub fn name_set(&self, name: &str) -> BTreeSet<String> {
        self.list(name).into_iter().collect()
    }

    pub fn name_versions(&self, name: &str) -> BTreeMap<String, String> {
        match self.values.get(name) {
            Some(ParamValue::NameVersions(m)) => m.clone(),
            _ => BTreeMap::new(),
        }
    }
}

/// Runs the schema's validators over the raw parameters. Names are matched
/// case-insensitively; anything not in the schema is dropped.
pub fn parse_params(
    schema: &'static [ParamSpec],
    raw: &BTreeMap<String, String>,
) -> CoreResult<TriggerParams> {
    let mut values = BTreeMap::new();
    for (key, value) in raw {
        let upper = key.trim().to_ascii_uppercase();
        let Some(spec) = schema.iter().find(|s| s.name == upper) else {
            tracing::debug!(param = %key, "ignoring unrecognized trigger parameter");
            continue;
        };
        values.insert(spec.name, spec.validator.parse(spec.name, value)?);
    }
    Ok(TriggerParams { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_list_trims_and_drops_empty_tokens() {
        assert_eq!(
            parse_delimited_list(" /usr/bin , ,/etc,"),
            vec!["/usr/bin".to_string(), "/etc".to_string()]
        );
        assert!(parse_delimited_list("").is_empty());
        assert!(parse_delimited_list(" , ").is_empty());
    }

    #[test]
    fn name_version_list_last_duplicate_wins() {
        let m = parse_name_version_list("P", "curl|1, zlib | 1.2.8 ,curl|2").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m["curl"], "2");
        assert_eq!(m["zlib"], "1.2.8");
    }

    #[test]
    fn name_version_list_keeps_extra_separators_in_version() {
        let m = parse_name_version_list("P", "odd|1|2").unwrap();
        assert_eq!(m["odd"], "1|2");
    }

    #[test]
    fn name_version_list_rejects_missing_separator() {
        let err = parse_name_version_list("PKGFULLMATCH", "curl|1,zlib").unwrap_err();
        match err {
            CoreError::ParameterFormat { param, raw, .. } => {
                assert_eq!(param, "PKGFULLMATCH");
                assert_eq!(raw, "curl|1,zlib");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn name_version_list_rejects_empty_halves() {
        assert!(parse_name_version_list("P", "|1.0").is_err());
        assert!(parse_name_version_list("P", "curl|").is_err());
    }
}
