use crate::check::Check;
use crate::rule::{CheckResult, Evaluation, Rule};
use crate::rule_set::RuleSet;
use crate::tree::Tree;
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Whether nodes that no `Permitted` check reached are violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Policy {
    /// Only failing checks are reported.
    DefaultPermitted,
    /// Every node not permitted by some rule is also reported. This is how an
    /// allow-list of fields is enforced.
    DefaultNotPermitted,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::DefaultPermitted
    }
}

/// The outcome of [`Checker::check`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Every failure, in discovery order.
    pub results: Vec<CheckResult>,
    /// True iff `results` is empty.
    pub passed: bool,
}

/// Checks one JSON document against a list of rules.
///
/// ```
/// use jsoncheck::{Check, Checker, Policy};
///
/// let mut checker = Checker::new(
///     r#"{ "name": "web", "replicas": "3", "limits": { "cpu": "500m" } }"#,
///     Policy::DefaultNotPermitted,
/// )
/// .unwrap();
///
/// checker
///     .add_rule("name", vec![Check::IsString, Check::Permitted])
///     .add_rule("replicas", vec![Check::NumGte(1.0), Check::Permitted])
///     .add_rule("limits.*", vec![Check::NumLte(1.0), Check::Permitted]);
///
/// let report = checker.check();
/// assert!(report.passed, "{:?}", report.results);
/// ```
#[derive(Debug)]
pub struct Checker {
    tree: Tree,
    rules: Vec<Rule>,
    policy: Policy,
}

impl Checker {
    /// Parses `json` and builds the checker's tree. Fails if `json` is not a
    /// valid JSON document.
    pub fn new(json: &str, policy: Policy) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, policy)
    }

    pub fn from_value(value: &Value, policy: Policy) -> Result<Self, Error> {
        let tree = Tree::from_value(value)?;
        debug!(nodes = tree.len(), ?policy, "built document tree");

        Ok(Checker {
            tree,
            rules: vec![],
            policy,
        })
    }

    /// Parses `json` and registers the policy and rules of `rule_set`.
    pub fn with_rule_set(json: &str, rule_set: RuleSet) -> Result<Self, Error> {
        let mut checker = Self::new(json, rule_set.policy)?;
        for rule in rule_set.rules {
            checker.add_rule(rule.pattern, rule.checks);
        }
        Ok(checker)
    }

    /// Registers a rule. Rules are evaluated in registration order.
    pub fn add_rule<I: IntoIterator<Item = Check>>(
        &mut self,
        pattern: impl Into<String>,
        checks: I,
    ) -> &mut Self {
        let rule = Rule::new(pattern, checks);
        debug!(pattern = %rule.pattern(), checks = rule.checks().len(), "registered rule");
        self.rules.push(rule);
        self
    }

    /// Evaluates every rule against every node and applies the policy.
    ///
    /// Permissions are recomputed from scratch on each call, so repeated calls
    /// return the same report for the same rules.
    pub fn check(&mut self) -> Report {
        self.tree.clear_permits();

        let mut evaluation = Evaluation::default();
        for rule in &self.rules {
            self.tree
                .for_each_node(|id, node| rule.evaluate(id, node, &mut evaluation));
        }

        for &id in &evaluation.permits {
            self.tree.permit(id);
        }

        if self.policy == Policy::DefaultNotPermitted {
            self.tree.for_each_node(|_, node| {
                if !node.has_permit_rule() {
                    evaluation.push_failure(node, "", "not permitted".to_owned());
                }
            });
        }

        let passed = evaluation.results.is_empty();
        debug!(
            rules = self.rules.len(),
            failures = evaluation.results.len(),
            passed,
            "evaluated document"
        );

        Report {
            results: evaluation.results,
            passed,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PERMISSIONS_DOCUMENT: &str = r#"
{
    "object": {
        "permitted": null,
        "notpermitted": null
    }
}
"#;

    #[test]
    fn check_suite() {
        use std::collections::BTreeMap;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct TestCase {
            document: Value,
            pattern: String,
            checks: Vec<Check>,
            failures: usize,
        }

        let test_cases: BTreeMap<String, TestCase> =
            serde_json::from_str(include_str!("../testdata/checks.json"))
                .expect("parse checks.json");

        for (name, test_case) in test_cases {
            let mut checker =
                Checker::from_value(&test_case.document, Policy::DefaultPermitted).expect(&name);
            checker.add_rule(test_case.pattern, test_case.checks);

            let report = checker.check();
            assert_eq!(
                test_case.failures,
                report.results.len(),
                "wrong number of failures for {}: {:?}",
                name,
                report.results
            );
            assert_eq!(test_case.failures == 0, report.passed, "{}", name);
        }
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        match Checker::new("{ \"a\": ", Policy::DefaultPermitted) {
            Err(Error::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(Checker::new("", Policy::DefaultNotPermitted).is_err());
    }

    #[test]
    fn out_of_range_number_is_a_parse_error() {
        match Checker::new(r#"{"n": 1e400}"#, Policy::DefaultPermitted) {
            Err(Error::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn array_length_rule() {
        let json = r#"{"array": [10.2, 20.4, 30.6]}"#;

        let mut checker = Checker::new(json, Policy::DefaultPermitted).unwrap();
        checker.add_rule("array", vec![Check::ArrayLenEquals(3)]);
        assert!(checker.check().results.is_empty());

        let mut checker = Checker::new(json, Policy::DefaultPermitted).unwrap();
        checker.add_rule("array", vec![Check::ArrayLenEquals(2)]);
        assert_eq!(1, checker.check().results.len());
    }

    #[test]
    fn permitted() {
        let mut checker = Checker::new(PERMISSIONS_DOCUMENT, Policy::DefaultNotPermitted).unwrap();
        checker.add_rule("object.permitted", vec![Check::Permitted]);

        let report = checker.check();
        assert!(!report.passed);
        assert_eq!(
            vec![CheckResult {
                path: "object.notpermitted=(Null)".to_owned(),
                pattern: "".to_owned(),
                pass: false,
                message: "not permitted".to_owned(),
            }],
            report.results
        );

        checker.add_rule("ob??ct.*", vec![Check::Permitted]);
        let report = checker.check();
        assert!(report.passed, "{:?}", report.results);
    }

    #[test]
    fn not_permitted() {
        let mut checker = Checker::new(PERMISSIONS_DOCUMENT, Policy::DefaultPermitted).unwrap();

        // Everything passes with no rules under the default-permitted policy.
        let report = checker.check();
        assert!(report.passed, "{:?}", report.results);

        checker.add_rule("object.*", vec![Check::NotPermitted]);
        let report = checker.check();
        assert!(!report.passed);
        assert_eq!(2, report.results.len());
        for result in &report.results {
            assert_eq!("object.*", result.pattern);
            assert_eq!("not permitted", result.message);
        }
    }

    #[test]
    fn not_permitted_fails_even_when_permitted() {
        let mut checker = Checker::new(PERMISSIONS_DOCUMENT, Policy::DefaultNotPermitted).unwrap();
        checker
            .add_rule("#", vec![Check::Permitted])
            .add_rule("object.notpermitted", vec![Check::NotPermitted]);

        let report = checker.check();
        assert_eq!(1, report.results.len());
        assert_eq!("object.notpermitted", report.results[0].pattern);
    }

    #[test]
    fn nothing_permitted_reports_every_node() {
        let mut checker = Checker::new(r#"{"a": [1, 2]}"#, Policy::DefaultNotPermitted).unwrap();

        let paths: Vec<_> = checker
            .check()
            .results
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(vec!["=(Object)", "a=(Array[2])", "a.0=1", "a.1=2"], paths);
    }

    #[test]
    fn permitting_a_leaf_permits_its_ancestors_only() {
        let mut checker = Checker::new(
            r#"{"spec": {"containers": [{"name": "web", "image": "nginx"}]}}"#,
            Policy::DefaultNotPermitted,
        )
        .unwrap();
        checker.add_rule("spec.containers.#.name", vec![Check::Permitted]);

        let paths: Vec<_> = checker
            .check()
            .results
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(vec!["spec.containers.0.image=\"nginx\""], paths);

        let mut permitted = vec![];
        checker.tree().for_each_node(|_, node| {
            if node.has_permit_rule() {
                permitted.push(node.path().to_owned());
            }
        });
        assert_eq!(
            vec!["", "spec", "spec.containers", "spec.containers.0", "spec.containers.0.name"],
            permitted
        );
    }

    #[test]
    fn results_follow_rule_then_node_order() {
        let mut checker =
            Checker::new(r#"{"a": 1, "b": 2, "c": "x"}"#, Policy::DefaultPermitted).unwrap();
        checker
            .add_rule("*", vec![Check::IsString])
            .add_rule("c", vec![Check::IsNumber, Check::IsNull]);

        let results: Vec<_> = checker
            .check()
            .results
            .into_iter()
            .map(|r| format!("{} {}", r.pattern, r.path))
            .collect();
        // A bare `*` also matches the root, whose path is empty.
        assert_eq!(
            vec!["* =(Object)", "* a=1", "* b=2", "c c=\"x\"", "c c=\"x\""],
            results
        );
    }

    #[test]
    fn repeated_checks_are_idempotent() {
        let mut checker = Checker::new(PERMISSIONS_DOCUMENT, Policy::DefaultNotPermitted).unwrap();
        checker.add_rule("object.permitted", vec![Check::Permitted, Check::IsNull]);

        let first = checker.check();
        let second = checker.check();
        assert_eq!(first, second);
        assert_eq!(1, second.results.len());
    }

    #[test]
    fn permits_are_recomputed_on_each_check() {
        let mut checker = Checker::new(PERMISSIONS_DOCUMENT, Policy::DefaultPermitted).unwrap();
        checker.add_rule("object.permitted", vec![Check::Permitted]);
        checker.check();

        let permitted_count = |checker: &Checker| {
            let mut count = 0;
            checker.tree().for_each_node(|_, node| {
                if node.has_permit_rule() {
                    count += 1;
                }
            });
            count
        };
        assert_eq!(3, permitted_count(&checker));

        // Flags left over from the previous pass are cleared before the next
        // one, then set again by the same rules.
        checker.check();
        assert_eq!(3, permitted_count(&checker));
    }

    #[test]
    fn scalar_documents() {
        let mut checker = Checker::new("\"750m\"", Policy::DefaultPermitted).unwrap();
        checker.add_rule("", vec![Check::NumEquals(0.75), Check::IsString]);
        assert!(checker.check().passed);

        let mut checker = Checker::new("null", Policy::DefaultNotPermitted).unwrap();
        checker.add_rule("#", vec![Check::Permitted]);
        assert!(checker.check().passed);
    }

    #[test]
    fn with_rule_set() {
        let rule_set: RuleSet = serde_json::from_value(json!({
            "policy": "defaultNotPermitted",
            "rules": [
                { "pattern": "object.permitted", "checks": [{ "check": "permitted" }] },
            ],
        }))
        .unwrap();

        let mut checker = Checker::with_rule_set(PERMISSIONS_DOCUMENT, rule_set).unwrap();
        assert_eq!(Policy::DefaultNotPermitted, checker.policy());
        assert_eq!(1, checker.rules().len());
        assert_eq!(1, checker.check().results.len());
    }

    #[test]
    fn report_serializes() {
        let mut checker = Checker::new(r#"{"a": 1}"#, Policy::DefaultPermitted).unwrap();
        checker.add_rule("a", vec![Check::IsString]);

        assert_eq!(
            json!({
                "results": [{
                    "path": "a=1",
                    "pattern": "a",
                    "pass": false,
                    "message": "expected String, found Number",
                }],
                "passed": false,
            }),
            serde_json::to_value(checker.check()).unwrap()
        );
    }
}
