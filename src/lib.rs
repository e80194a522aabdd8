//! Declarative checks for JSON documents.
//!
//! A [`Checker`] holds one parsed document and a list of rules. Each rule
//! pairs a path pattern (see [`matches`]) with [`Check`]s; evaluating the
//! checker runs every check against every node whose path matches and
//! reports each failure as a [`CheckResult`]. Under
//! [`Policy::DefaultNotPermitted`], every node that no [`Check::Permitted`]
//! reached is reported as well, which turns a set of rules into an allow-list
//! of fields.
//!
//! ```
//! use jsoncheck::{Check, Checker, Policy};
//!
//! let mut checker = Checker::new(
//!     r#"{ "object": { "permitted": null, "notpermitted": null } }"#,
//!     Policy::DefaultNotPermitted,
//! )
//! .unwrap();
//! checker.add_rule("object.permitted", vec![Check::Permitted]);
//!
//! let report = checker.check();
//! assert!(!report.passed);
//! assert_eq!("object.notpermitted=(Null)", report.results[0].path);
//! ```

mod check;
mod checker;
mod error;
mod pattern;
mod quantity;
mod rule;
mod rule_set;
mod tree;

pub use check::*;
pub use checker::*;
pub use error::*;
pub use pattern::*;
pub use quantity::*;
pub use rule::*;
pub use rule_set::*;
pub use tree::*;
