use crate::tree::{Kind, Node};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A single predicate over one node.
///
/// Checks never reject a node of an unexpected kind at registration time;
/// applying a check to the wrong kind of node is an ordinary failure.
///
/// In a rule set, a check is written as an object tagged by `check`, with its
/// operand (if any) under `value`:
///
/// ```
/// use jsoncheck::Check;
/// use serde_json::json;
///
/// assert_eq!(
///     Check::NumGte(0.5),
///     serde_json::from_value(json!({ "check": "numGte", "value": 0.5 })).unwrap()
/// );
/// assert_eq!(
///     Check::Permitted,
///     serde_json::from_value(json!({ "check": "permitted" })).unwrap()
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", content = "value", rename_all = "camelCase")]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Check {
    IsString,
    IsNumber,
    IsObject,
    IsArray,
    IsTrue,
    IsFalse,
    IsNull,
    /// Passes for `true` and `false`.
    IsBoolean,
    /// Passes for strings holding an RFC 3339 timestamp.
    IsTimestamp,

    StringEquals(String),
    StringHasPrefix(String),
    StringHasSuffix(String),

    ArrayLenEquals(usize),
    ArrayLenLt(usize),
    ArrayLenLte(usize),
    ArrayLenGt(usize),
    ArrayLenGte(usize),

    /// Numeric checks accept numbers and quantity strings such as `"750m"`.
    /// Equality is exact.
    NumEquals(f64),
    NumGt(f64),
    NumGte(f64),
    NumLt(f64),
    NumLte(f64),

    /// Permits the matched node, and with it every ancestor, under the
    /// [`DefaultNotPermitted`][`crate::Policy::DefaultNotPermitted`] policy.
    /// Never fails.
    Permitted,
    /// Fails for every node it matches, regardless of policy.
    NotPermitted,
}

/// What evaluating a [`Check`] against a node produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Pass,
    Fail(String),
    /// The node was matched by a [`Check::Permitted`].
    Permit,
}

impl Check {
    pub fn string_equals(s: impl Into<String>) -> Self {
        Check::StringEquals(s.into())
    }

    pub fn string_has_prefix(s: impl Into<String>) -> Self {
        Check::StringHasPrefix(s.into())
    }

    pub fn string_has_suffix(s: impl Into<String>) -> Self {
        Check::StringHasSuffix(s.into())
    }

    pub fn evaluate(&self, node: &Node) -> Outcome {
        match self {
            Check::IsString => expect_kind(node, &[Kind::String]),
            Check::IsNumber => expect_kind(node, &[Kind::Number]),
            Check::IsObject => expect_kind(node, &[Kind::Object]),
            Check::IsArray => expect_kind(node, &[Kind::Array]),
            Check::IsTrue => expect_kind(node, &[Kind::True]),
            Check::IsFalse => expect_kind(node, &[Kind::False]),
            Check::IsNull => expect_kind(node, &[Kind::Null]),
            Check::IsBoolean => expect_kind(node, &[Kind::True, Kind::False]),
            Check::IsTimestamp => match node.as_str() {
                Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => Outcome::Pass,
                Some(s) => Outcome::Fail(format!("{:?} is not an RFC 3339 timestamp", s)),
                None => kind_mismatch(node, Kind::String),
            },

            Check::StringEquals(want) => compare_str(node, "equal to", want, |s| s == want),
            Check::StringHasPrefix(want) => {
                compare_str(node, "with prefix", want, |s| s.starts_with(want.as_str()))
            }
            Check::StringHasSuffix(want) => {
                compare_str(node, "with suffix", want, |s| s.ends_with(want.as_str()))
            }

            Check::ArrayLenEquals(n) => compare_len(node, "==", *n, |len| len == *n),
            Check::ArrayLenLt(n) => compare_len(node, "<", *n, |len| len < *n),
            Check::ArrayLenLte(n) => compare_len(node, "<=", *n, |len| len <= *n),
            Check::ArrayLenGt(n) => compare_len(node, ">", *n, |len| len > *n),
            Check::ArrayLenGte(n) => compare_len(node, ">=", *n, |len| len >= *n),

            Check::NumEquals(n) => compare_num(node, "==", *n, |v| v == *n),
            Check::NumGt(n) => compare_num(node, ">", *n, |v| v > *n),
            Check::NumGte(n) => compare_num(node, ">=", *n, |v| v >= *n),
            Check::NumLt(n) => compare_num(node, "<", *n, |v| v < *n),
            Check::NumLte(n) => compare_num(node, "<=", *n, |v| v <= *n),

            Check::Permitted => Outcome::Permit,
            Check::NotPermitted => Outcome::Fail("not permitted".to_owned()),
        }
    }
}

fn expect_kind(node: &Node, kinds: &[Kind]) -> Outcome {
    if kinds.contains(&node.kind()) {
        return Outcome::Pass;
    }

    let expected: Vec<_> = kinds.iter().map(Kind::to_string).collect();
    Outcome::Fail(format!(
        "expected {}, found {}",
        expected.join(" or "),
        node.kind()
    ))
}

fn kind_mismatch(node: &Node, expected: Kind) -> Outcome {
    Outcome::Fail(format!("expected {}, found {}", expected, node.kind()))
}

fn compare_str(node: &Node, relation: &str, want: &str, pred: impl Fn(&str) -> bool) -> Outcome {
    match node.as_str() {
        Some(s) if pred(s) => Outcome::Pass,
        Some(s) => Outcome::Fail(format!("expected string {} {:?}, found {:?}", relation, want, s)),
        None => kind_mismatch(node, Kind::String),
    }
}

fn compare_len(node: &Node, op: &str, want: usize, pred: impl Fn(usize) -> bool) -> Outcome {
    match node.array_len() {
        Some(len) if pred(len) => Outcome::Pass,
        Some(len) => Outcome::Fail(format!("expected array length {} {}, found {}", op, want, len)),
        None => kind_mismatch(node, Kind::Array),
    }
}

fn compare_num(node: &Node, op: &str, want: f64, pred: impl Fn(f64) -> bool) -> Outcome {
    match node.magnitude() {
        Some(v) if pred(v) => Outcome::Pass,
        Some(v) => Outcome::Fail(format!("expected number {} {}, found {}", op, want, v)),
        None => Outcome::Fail(format!("{} value is not a number or quantity", node.kind())),
    }
}
