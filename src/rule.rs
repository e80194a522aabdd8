use crate::check::{Check, Outcome};
use crate::pattern::matches;
use crate::tree::{Node, NodeId};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// A failed check, or a node left unpermitted by the policy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckResult {
    /// Display form of the node, e.g. `object.count=3`.
    pub path: String,
    /// The pattern of the rule that failed. Empty for policy violations.
    pub pattern: String,
    pub pass: bool,
    pub message: String,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.pattern, self.message)
    }
}

/// A pattern bound to an ordered list of checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pattern: String,
    checks: Vec<Check>,
}

impl Rule {
    pub fn new<I: IntoIterator<Item = Check>>(pattern: impl Into<String>, checks: I) -> Self {
        Rule {
            pattern: pattern.into(),
            checks: checks.into_iter().collect(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Runs every check of this rule against `node` if the rule's pattern
    /// matches its path. Failures and permits are recorded in `evaluation`.
    pub(crate) fn evaluate(&self, id: NodeId, node: &Node, evaluation: &mut Evaluation) {
        if !matches(&self.pattern, node.path()) {
            return;
        }

        trace!(pattern = %self.pattern, path = %node.path(), "rule matched node");

        for check in &self.checks {
            match check.evaluate(node) {
                Outcome::Pass => {}
                Outcome::Permit => evaluation.permits.push(id),
                Outcome::Fail(message) => evaluation.push_failure(node, &self.pattern, message),
            }
        }
    }
}

/// State accumulated over one evaluation pass.
#[derive(Debug, Default)]
pub(crate) struct Evaluation {
    pub results: Vec<CheckResult>,
    /// Nodes matched by a `Permitted` check, in discovery order.
    pub permits: Vec<NodeId>,
}

impl Evaluation {
    pub fn push_failure(&mut self, node: &Node, pattern: &str, message: String) {
        self.results.push(CheckResult {
            path: node.to_string(),
            pattern: pattern.to_owned(),
            pass: false,
            message,
        });
    }
}
