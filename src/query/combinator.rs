//! Union and difference blocks.
//!
//! Neither block may directly contain another union or difference. Nested
//! results are consumed by naming them and referencing the name with a
//! [`SetRef`](super::statement::SetRef).

use super::statement::{DEFAULT_SET, Statement};
use crate::error::BuildError;

/// `(member; member; ...)->.result;`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionStatement {
    result: String,
    members: Vec<Statement>,
    compiled: String,
}

impl UnionStatement {
    /// An empty `result` writes the default set `_`.
    pub fn new(
        result: impl Into<String>,
        members: impl IntoIterator<Item = Statement>,
    ) -> Result<Self, BuildError> {
        let members: Vec<Statement> = members.into_iter().collect();
        for member in &members {
            check_nesting("union statement", member)?;
        }
        let mut union = Self {
            result: result_or_default(result.into()),
            members,
            compiled: String::new(),
        };
        union.compiled = union.compile();
        Ok(union)
    }

    /// Validates every new member before touching the union, so a failed
    /// append leaves both members and text unchanged.
    pub fn append(
        &mut self,
        members: impl IntoIterator<Item = Statement>,
    ) -> Result<(), BuildError> {
        let members: Vec<Statement> = members.into_iter().collect();
        for member in &members {
            check_nesting("union statement", member)?;
        }
        self.members.extend(members);
        self.compiled = self.compile();
        Ok(())
    }

    fn compile(&self) -> String {
        let mut c = String::from("(");
        for member in &self.members {
            c.push_str(member.compiled());
        }
        c.push_str(&format!(")->.{};", self.result));
        c
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn members(&self) -> &[Statement] {
        &self.members
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

/// `(first - second)->.result;`
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceStatement {
    result: String,
    first: Box<Statement>,
    second: Box<Statement>,
    compiled: String,
}

impl DifferenceStatement {
    pub fn new(
        result: impl Into<String>,
        first: Statement,
        second: Statement,
    ) -> Result<Self, BuildError> {
        check_nesting("difference statement", &first)?;
        check_nesting("difference statement", &second)?;
        let mut difference = Self {
            result: result_or_default(result.into()),
            first: Box::new(first),
            second: Box::new(second),
            compiled: String::new(),
        };
        difference.compiled = difference.compile();
        Ok(difference)
    }

    fn compile(&self) -> String {
        format!(
            "({} - {})->.{};",
            self.first.compiled(),
            self.second.compiled(),
            self.result
        )
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn first(&self) -> &Statement {
        &self.first
    }

    pub fn second(&self) -> &Statement {
        &self.second
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

/// Sequences are transparent: their text lands inline, so a combinator
/// anywhere inside one is still nested.
fn check_nesting(outer: &'static str, member: &Statement) -> Result<(), BuildError> {
    match member {
        Statement::Union(_) | Statement::Difference(_) => Err(BuildError::InvalidNesting {
            outer,
            inner: member.kind_name(),
        }),
        Statement::Sequence(sequence) => sequence
            .statements()
            .iter()
            .try_for_each(|inner| check_nesting(outer, inner)),
        _ => Ok(()),
    }
}

fn result_or_default(result: String) -> String {
    if result.is_empty() {
        DEFAULT_SET.to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::statement::{
        ElementStatement, ElementType, RecurseDirection, RecurseStatement, SetRef,
    };
    use crate::query::sequence::Sequence;
    use crate::query::tag::TagPredicate;

    fn way(key: &str) -> Statement {
        ElementStatement::new(ElementType::Way, [TagPredicate::exists(key)], None).into()
    }

    fn down() -> Statement {
        RecurseStatement::new(RecurseDirection::Down).into()
    }

    fn nested_union() -> Statement {
        UnionStatement::new("inner", [way("highway")]).unwrap().into()
    }

    fn nested_difference() -> Statement {
        DifferenceStatement::new("inner", way("highway"), way("railway"))
            .unwrap()
            .into()
    }

    #[test]
    fn union_defaults_to_underscore() {
        let union = UnionStatement::new("", [way("highway"), down()]).unwrap();
        assert_eq!(union.compiled(), "(way[\"highway\"];<;)->._;");
        assert_eq!(Statement::from(union).produced_set_name(), Some("_"));
    }

    #[test]
    fn union_rejects_nested_combinators_in_any_position() {
        for nested in [nested_union(), nested_difference()] {
            let err = UnionStatement::new("_", [way("highway"), nested.clone()]).unwrap_err();
            assert!(matches!(err, BuildError::InvalidNesting { outer: "union statement", .. }));

            let err = UnionStatement::new("_", [nested]).unwrap_err();
            assert!(matches!(err, BuildError::InvalidNesting { .. }));
        }
    }

    #[test]
    fn union_append_keeps_previous_text() {
        let mut union = UnionStatement::new("roads", [way("highway")]).unwrap();
        let before = union.compiled().trim_end_matches(")->.roads;").to_string();

        union.append([down(), way("railway")]).unwrap();
        assert_eq!(
            union.compiled(),
            format!("{before}<;way[\"railway\"];)->.roads;")
        );
    }

    #[test]
    fn failed_union_append_changes_nothing() {
        let mut union = UnionStatement::new("_", [way("highway")]).unwrap();
        let before = union.clone();

        let err = union.append([down(), nested_union()]).unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidNesting {
                outer: "union statement",
                inner: "union statement",
            }
        );
        assert_eq!(union, before);
    }

    #[test]
    fn difference_compiles_both_operands() {
        let difference =
            DifferenceStatement::new("", way("highway"), way("bridge")).unwrap();
        assert_eq!(
            difference.compiled(),
            "(way[\"highway\"]; - way[\"bridge\"];)->._;"
        );
    }

    #[test]
    fn difference_rejects_nested_combinators_in_both_operands() {
        for nested in [nested_union(), nested_difference()] {
            let first = DifferenceStatement::new("_", nested.clone(), way("a")).unwrap_err();
            assert!(matches!(
                first,
                BuildError::InvalidNesting { outer: "difference statement", .. }
            ));

            let second = DifferenceStatement::new("_", way("a"), nested).unwrap_err();
            assert!(matches!(
                second,
                BuildError::InvalidNesting { outer: "difference statement", .. }
            ));
        }
    }

    /// A combinator hidden one and two sequences deep.
    fn wrapped(nested: Statement) -> [Statement; 2] {
        let once: Statement = Sequence::new([way("a"), nested]).into();
        let twice: Statement = Sequence::new([Sequence::new([once.clone()]).into()]).into();
        [once, twice]
    }

    #[test]
    fn combinators_inside_sequences_are_rejected() {
        for nested in [nested_union(), nested_difference()] {
            for member in wrapped(nested) {
                let err = UnionStatement::new("b", [member.clone()]).unwrap_err();
                assert!(matches!(err, BuildError::InvalidNesting { outer: "union statement", .. }));

                let first = DifferenceStatement::new("_", member.clone(), way("z")).unwrap_err();
                assert!(matches!(
                    first,
                    BuildError::InvalidNesting { outer: "difference statement", .. }
                ));

                let second = DifferenceStatement::new("_", way("z"), member.clone()).unwrap_err();
                assert!(matches!(
                    second,
                    BuildError::InvalidNesting { outer: "difference statement", .. }
                ));

                let mut union = UnionStatement::new("_", [way("highway")]).unwrap();
                let before = union.clone();
                assert!(union.append([member]).is_err());
                assert_eq!(union, before);
            }
        }
    }

    #[test]
    fn sequences_of_leaves_may_be_members() {
        let member: Statement = Sequence::new([way("highway"), down()]).into();
        let union = UnionStatement::new("_", [member]).unwrap();
        assert_eq!(union.compiled(), "(way[\"highway\"];<;)->._;");
    }

    #[test]
    fn nested_results_are_referenced_by_name() {
        let inner = UnionStatement::new("roads", [way("highway")]).unwrap();
        let name = Statement::from(inner).produced_set_name().unwrap().to_string();

        let outer = UnionStatement::new("_", [SetRef::new(name).into(), way("railway")]).unwrap();
        assert_eq!(outer.compiled(), "(.roads;way[\"railway\"];)->._;");
    }
}
