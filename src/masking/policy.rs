//! Field-to-rule mapping
//!
//! A [`MaskingPolicy`] holds at most one rule per field, in the order fields
//! were first added. Rules are validated before they are stored, so the
//! engine never sees an incomplete rule.
//!
//! # Document format
//!
//! ```json
//! {
//!   "email":  {"type": "email_mask", "options": {}},
//!   "salary": {"type": "number_randomize", "options": {}}
//! }
//! ```

use super::rule::{MaskingRule, RuleDocument};
use crate::domain::{PolicyError, RuleError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered mapping from field name to masking rule
///
/// Deserializing goes through [`set_rule_document`](Self::set_rule_document)
/// for every entry, so a policy read with serde is validated the same way as
/// one built by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, RuleDocument>",
    into = "IndexMap<String, RuleDocument>"
)]
pub struct MaskingPolicy {
    rules: IndexMap<String, MaskingRule>,
}

impl MaskingPolicy {
    /// Create an empty policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `rule` to `field`, replacing any prior rule for that field
    ///
    /// The rule is validated first; on error the policy is left unchanged.
    /// An overwritten field keeps its original position.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::EmptyField`] for a blank field name, or the
    /// rule's own validation error.
    pub fn set_rule(
        &mut self,
        field: impl Into<String>,
        rule: MaskingRule,
    ) -> Result<Option<MaskingRule>, RuleError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(RuleError::EmptyField);
        }
        rule.validate()?;
        Ok(self.rules.insert(field, rule))
    }

    /// Parse `document` and bind the resulting rule to `field`
    pub fn set_rule_document(
        &mut self,
        field: impl Into<String>,
        document: &RuleDocument,
    ) -> Result<Option<MaskingRule>, RuleError> {
        let rule = MaskingRule::from_document(document)?;
        self.set_rule(field, rule)
    }

    /// Remove the rule for `field`, keeping the order of the others
    pub fn remove_rule(&mut self, field: &str) -> Option<MaskingRule> {
        self.rules.shift_remove(field)
    }

    /// Remove every rule
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Rule for `field`, if any
    pub fn get(&self, field: &str) -> Option<&MaskingRule> {
        self.rules.get(field)
    }

    /// Rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &MaskingRule)> + '_ {
        self.rules.iter().map(|(field, rule)| (field.as_str(), rule))
    }

    /// Field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serialize to a pretty-printed policy document
    pub fn to_json_string(&self) -> Result<String, PolicyError> {
        serde_json::to_string_pretty(self).map_err(|e| PolicyError::Parse(e.to_string()))
    }

    /// Parse a policy document
    ///
    /// Every rule is validated; a single invalid rule rejects the whole
    /// document and names the offending field.
    pub fn from_json_str(document: &str) -> Result<Self, PolicyError> {
        let raw: IndexMap<String, RuleDocument> =
            serde_json::from_str(document).map_err(|e| PolicyError::Parse(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Write the policy document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PolicyError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), rules = self.len(), "Saved masking policy");
        Ok(())
    }

    /// Read a policy document from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let policy = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), rules = policy.len(), "Loaded masking policy");
        Ok(policy)
    }
}

impl TryFrom<IndexMap<String, RuleDocument>> for MaskingPolicy {
    type Error = PolicyError;

    fn try_from(documents: IndexMap<String, RuleDocument>) -> Result<Self, Self::Error> {
        let mut policy = Self::new();
        for (field, document) in documents {
            policy
                .set_rule_document(field.clone(), &document)
                .map_err(|source| PolicyError::InvalidRule { field, source })?;
        }
        Ok(policy)
    }
}

impl From<MaskingPolicy> for IndexMap<String, RuleDocument> {
    fn from(policy: MaskingPolicy) -> Self {
        policy
            .rules
            .into_iter()
            .map(|(field, rule)| (field, rule.to_document()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MaskingPolicy {
    type Item = (&'a String, &'a MaskingRule);
    type IntoIter = indexmap::map::Iter<'a, String, MaskingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::cipher::EncryptionKey;

    #[test]
    fn test_set_rule_overwrites_in_place() {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("email", MaskingRule::EmailMask).unwrap();
        policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();

        let previous = policy.set_rule("email", MaskingRule::Hash).unwrap();
        assert_eq!(previous, Some(MaskingRule::EmailMask));
        assert_eq!(policy.len(), 2);
        assert_eq!(policy.fields().collect::<Vec<_>>(), vec!["email", "ssn"]);
        assert_eq!(policy.get("email"), Some(&MaskingRule::Hash));
    }

    #[test]
    fn test_invalid_rule_leaves_policy_unchanged() {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("ssn", MaskingRule::SsnMask).unwrap();

        let result = policy.set_rule(
            "ssn",
            MaskingRule::ReversibleEncrypt {
                key: EncryptionKey::new("   "),
            },
        );
        assert!(matches!(result, Err(RuleError::InvalidOption { option: "key", .. })));
        assert_eq!(policy.get("ssn"), Some(&MaskingRule::SsnMask));
    }

    #[test]
    fn test_empty_field_rejected() {
        let mut policy = MaskingPolicy::new();
        assert_eq!(
            policy.set_rule("", MaskingRule::FullMask),
            Err(RuleError::EmptyField)
        );
        assert!(policy.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("a", MaskingRule::FullMask).unwrap();
        policy.set_rule("b", MaskingRule::Hash).unwrap();
        policy.set_rule("c", MaskingRule::PhoneMask).unwrap();

        assert_eq!(policy.remove_rule("b"), Some(MaskingRule::Hash));
        assert_eq!(policy.remove_rule("b"), None);
        assert_eq!(policy.fields().collect::<Vec<_>>(), vec!["a", "c"]);

        policy.clear();
        assert!(policy.is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let mut policy = MaskingPolicy::new();
        policy.set_rule("email", MaskingRule::EmailMask).unwrap();
        policy.set_rule("salary", MaskingRule::FullMask).unwrap();
        policy
            .set_rule("hired", MaskingRule::DateShift { shift_days: 14 })
            .unwrap();

        let json = policy.to_json_string().unwrap();
        let restored = MaskingPolicy::from_json_str(&json).unwrap();
        assert_eq!(restored, policy);
        assert_eq!(
            restored.fields().collect::<Vec<_>>(),
            vec!["email", "salary", "hired"]
        );
    }

    #[test]
    fn test_invalid_document_names_field() {
        let doc = r#"{
            "email": {"type": "email_mask"},
            "dob": {"type": "date_shift", "options": {}}
        }"#;
        match MaskingPolicy::from_json_str(doc) {
            Err(PolicyError::InvalidRule { field, source }) => {
                assert_eq!(field, "dob");
                assert!(matches!(source, RuleError::MissingOption { option: "shift_days", .. }));
            }
            other => panic!("expected InvalidRule, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_deserialize_validates_rules() {
        let err = serde_json::from_str::<MaskingPolicy>(r#"{"": {"type": "hash"}}"#).unwrap_err();
        assert!(err.to_string().contains("field name must not be empty"));

        let err = serde_json::from_str::<MaskingPolicy>(
            r#"{"ssn": {"type": "reversible_encrypt", "options": {"key": " "}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rule for field 'ssn' is invalid"));

        let doc = r#"{"email": {"type": "email_mask"}, "dob": {"type": "date_shift", "options": {"shift_days": 3}}}"#;
        let via_serde: MaskingPolicy = serde_json::from_str(doc).unwrap();
        assert_eq!(via_serde, MaskingPolicy::from_json_str(doc).unwrap());
        assert_eq!(
            serde_json::to_value(&via_serde).unwrap()["dob"]["options"]["shift_days"],
            3
        );
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            MaskingPolicy::from_json_str("[1, 2, 3]"),
            Err(PolicyError::Parse(_))
        ));
    }
}
