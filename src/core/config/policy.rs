//! Rewrite policy: which comment categories are deleted, flagged or kept.

use serde::{Deserialize, Serialize};

use crate::core::errors::{CommentaryError, Result};

/// Accepted policy keys. Each option is also accepted in camelCase.
pub const POLICY_OPTIONS: [(&str, &str); 7] = [
    ("delete_filler", "deleteFiller"),
    ("delete_redundant", "deleteRedundant"),
    ("delete_placeholder", "deletePlaceholder"),
    ("flag_misleading", "flagMisleading"),
    ("flag_drift", "flagDrift"),
    ("preserve_informative", "preserveInformative"),
    ("fix_typos", "fixTypos"),
];

/// Options controlling the rewrite planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Delete comments classified as filler
    #[serde(default, alias = "deleteFiller")]
    pub delete_filler: bool,

    /// Delete comments that restate the code
    #[serde(default, alias = "deleteRedundant")]
    pub delete_redundant: bool,

    /// Delete bare markers such as `XXX`
    #[serde(default, alias = "deletePlaceholder")]
    pub delete_placeholder: bool,

    /// Flag unverified claims for review. Cannot be disabled.
    #[serde(default = "default_true", alias = "flagMisleading")]
    pub flag_misleading: bool,

    /// Flag comments involved in drift findings instead of rewriting them
    #[serde(default = "default_true", alias = "flagDrift")]
    pub flag_drift: bool,

    /// Never delete informative comments. Cannot be disabled.
    #[serde(default = "default_true", alias = "preserveInformative")]
    pub preserve_informative: bool,

    /// Rewrite kept comments to correct misspellings
    #[serde(default, alias = "fixTypos")]
    pub fix_typos: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            delete_filler: false,
            delete_redundant: false,
            delete_placeholder: false,
            flag_misleading: true,
            flag_drift: true,
            preserve_informative: true,
            fix_typos: false,
        }
    }
}

impl Policy {
    /// Policy that deletes every low-value category.
    pub fn aggressive() -> Self {
        Self {
            delete_filler: true,
            delete_redundant: true,
            delete_placeholder: true,
            ..Self::default()
        }
    }

    /// Parse a policy from a YAML/JSON mapping, rejecting unknown keys.
    pub fn from_yaml_value(value: &serde_yaml::Value) -> Result<Self> {
        Self::check_keys(value)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let policy: Policy = serde_yaml::from_value(value.clone())?;
        policy.validate()?;
        Ok(policy)
    }

    /// Parse a policy from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        Self::from_yaml_value(&value)
    }

    /// Fail with [`CommentaryError::UnknownPolicyOption`] on the first key
    /// that is not a policy option.
    pub fn check_keys(value: &serde_yaml::Value) -> Result<()> {
        let mapping = match value {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => return Ok(()),
            _ => {
                return Err(CommentaryError::config_field(
                    "policy must be a mapping of option names to booleans",
                    "policy",
                ))
            }
        };

        for key in mapping.keys() {
            let name = key.as_str().unwrap_or_default();
            let known = POLICY_OPTIONS
                .iter()
                .any(|(snake, camel)| name == *snake || name == *camel);
            if !known {
                return Err(CommentaryError::UnknownPolicyOption {
                    option: name.to_string(),
                    expected: POLICY_OPTIONS
                        .iter()
                        .map(|(snake, _)| *snake)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }

    /// Reject attempts to switch off the mandatory safety options.
    pub fn validate(&self) -> Result<()> {
        if !self.flag_misleading {
            return Err(CommentaryError::config_field(
                "flag_misleading cannot be disabled",
                "policy.flag_misleading",
            ));
        }
        if !self.preserve_informative {
            return Err(CommentaryError::config_field(
                "preserve_informative cannot be disabled",
                "policy.preserve_informative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_conservative() {
        let policy = Policy::default();
        assert!(!policy.delete_filler);
        assert!(!policy.delete_redundant);
        assert!(!policy.delete_placeholder);
        assert!(policy.flag_misleading);
        assert!(policy.preserve_informative);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_camel_case_keys_accepted() {
        let policy = Policy::from_yaml_str(
            "deleteFiller: true\ndeleteRedundant: true\ndeletePlaceholder: true\nflagDrift: true\n",
        )
        .unwrap();
        assert_eq!(policy, Policy::aggressive());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err =
            Policy::from_yaml_str("delete_filler: true\ndelete_everything: true\n").unwrap_err();
        match err {
            CommentaryError::UnknownPolicyOption { option, expected } => {
                assert_eq!(option, "delete_everything");
                assert!(expected.contains("delete_filler"));
            }
            other => panic!("expected UnknownPolicyOption, got {other:?}"),
        }
    }

    #[test]
    fn test_mandatory_options_cannot_be_disabled() {
        let err = Policy::from_yaml_str("flag_misleading: false\n").unwrap_err();
        assert!(matches!(err, CommentaryError::Config { .. }));

        let err = Policy::from_yaml_str("preserveInformative: false\n").unwrap_err();
        assert!(err.to_string().contains("preserve_informative"));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(Policy::from_yaml_str("").unwrap(), Policy::default());
    }
}
