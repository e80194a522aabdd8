use crate::check::Check;
use crate::checker::Policy;
use serde::{Deserialize, Serialize};

/// A JSON representation of a policy and its rules, compatible with
/// `serde_json`.
///
/// To check a document against it, see
/// [`Checker::with_rule_set`][`crate::Checker::with_rule_set`].
///
/// ```
/// use jsoncheck::{Check, Policy, RuleSet, SerdeRule};
/// use serde_json::json;
///
/// assert_eq!(
///     RuleSet {
///         policy: Policy::DefaultPermitted,
///         rules: vec![SerdeRule {
///             pattern: "items.*.id".to_owned(),
///             checks: vec![Check::IsNumber],
///         }],
///     },
///     serde_json::from_value::<RuleSet>(json!({
///         "rules": [{ "pattern": "items.*.id", "checks": [{ "check": "isNumber" }] }]
///     }))
///     .unwrap()
/// )
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub policy: Policy,

    #[serde(default)]
    pub rules: Vec<SerdeRule>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SerdeRule {
    pub pattern: String,
    pub checks: Vec<Check>,
}
