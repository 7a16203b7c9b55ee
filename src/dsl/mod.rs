//! Compact tag predicate syntax for the command line.
//!
//! Syntax:
//!   key                     - key exists
//!   !key                    - key doesn't exist
//!   key=value               - exact match
//!   key!=value              - anything but value
//!   key~regex               - value matches regex
//!   key!~regex              - value doesn't match regex
//!   pred1 & pred2           - both (rendered as adjacent filters)
//!   "quoted key"="a \"b\""  - keys and values with other characters

mod lexer;
mod parser;

pub use parser::parse_predicates;
