//! Overpass QL statement tree.
//!
//! Statements are built bottom-up: tag predicates and filters go into
//! element statements, element statements into unions and differences, and
//! everything into a [`Sequence`] that is compiled and submitted as one
//! query.

mod combinator;
mod filter;
mod sequence;
mod setting;
mod statement;
mod tag;

pub use combinator::{DifferenceStatement, UnionStatement};
pub use filter::{Around, BoundingBox, ElementFilter, FilterKind, MemberRecurse, to_engine_order};
pub use sequence::Sequence;
pub use setting::{OutputFormat, Setting, SettingKey};
pub use statement::{
    DEFAULT_SET, ElementStatement, ElementType, OutStatement, RecurseDirection, RecurseStatement,
    SetRef, SettingsStatement, Statement, Verbosity,
};
pub use tag::TagPredicate;
