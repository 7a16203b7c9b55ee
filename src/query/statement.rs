//! Statement tree and leaf statements.
//!
//! Every statement compiles its text once when it is built; the only
//! mutation afterwards is `append` on unions and sequences, which reruns
//! the same compile function and replaces the cached text.

use std::fmt;

use super::combinator::{DifferenceStatement, UnionStatement};
use super::filter::ElementFilter;
use super::sequence::Sequence;
use super::setting::Setting;
use super::tag::TagPredicate;

/// Name of the implicit default set.
pub const DEFAULT_SET: &str = "_";

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Element(ElementStatement),
    SetRef(SetRef),
    Out(OutStatement),
    Recurse(RecurseStatement),
    Settings(SettingsStatement),
    Union(UnionStatement),
    Difference(DifferenceStatement),
    Sequence(Sequence),
}

impl Statement {
    pub fn compiled(&self) -> &str {
        match self {
            Statement::Element(s) => s.compiled(),
            Statement::SetRef(s) => s.compiled(),
            Statement::Out(s) => s.compiled(),
            Statement::Recurse(s) => s.compiled(),
            Statement::Settings(s) => s.compiled(),
            Statement::Union(s) => s.compiled(),
            Statement::Difference(s) => s.compiled(),
            Statement::Sequence(s) => s.compiled(),
        }
    }

    /// Named set this statement writes, `None` when it only writes the
    /// implicit result.
    pub fn produced_set_name(&self) -> Option<&str> {
        match self {
            Statement::SetRef(s) => Some(s.name()),
            Statement::Union(s) => Some(s.result()),
            Statement::Difference(s) => Some(s.result()),
            Statement::Element(_)
            | Statement::Out(_)
            | Statement::Recurse(_)
            | Statement::Settings(_)
            | Statement::Sequence(_) => None,
        }
    }

    /// Set this statement reads: a named set, [`DEFAULT_SET`] for the prior
    /// implicit result, or `None` when it reads nothing. Combinators report
    /// `None`; their members carry their own inputs.
    pub fn input_set(&self) -> Option<&str> {
        match self {
            Statement::Element(s) => s.filter().and_then(ElementFilter::reads),
            Statement::SetRef(s) => Some(s.name()),
            Statement::Out(_) | Statement::Recurse(_) => Some(DEFAULT_SET),
            Statement::Settings(_)
            | Statement::Union(_)
            | Statement::Difference(_)
            | Statement::Sequence(_) => None,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Statement::Element(_) => "element statement",
            Statement::SetRef(_) => "set statement",
            Statement::Out(_) => "out statement",
            Statement::Recurse(_) => "recurse statement",
            Statement::Settings(_) => "settings statement",
            Statement::Union(_) => "union statement",
            Statement::Difference(_) => "difference statement",
            Statement::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.compiled())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Node,
    Way,
    Relation,
    Area,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
            ElementType::Area => "area",
        }
    }
}

/// `way["highway"](bbox);`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStatement {
    element_type: ElementType,
    predicates: Vec<TagPredicate>,
    filter: Option<ElementFilter>,
    compiled: String,
}

impl ElementStatement {
    pub fn new(
        element_type: ElementType,
        predicates: impl IntoIterator<Item = TagPredicate>,
        filter: Option<ElementFilter>,
    ) -> Self {
        let mut statement = Self {
            element_type,
            predicates: predicates.into_iter().collect(),
            filter,
            compiled: String::new(),
        };
        statement.compiled = statement.compile();
        statement
    }

    fn compile(&self) -> String {
        let mut c = String::from(self.element_type.as_str());
        for predicate in &self.predicates {
            c.push_str(&predicate.to_string());
        }
        if let Some(filter) = &self.filter {
            c.push('(');
            c.push_str(filter.clause());
            c.push(')');
        }
        c.push(';');
        c
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn predicates(&self) -> &[TagPredicate] {
        &self.predicates
    }

    pub fn filter(&self) -> Option<&ElementFilter> {
        self.filter.as_ref()
    }
}

/// `.name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRef {
    name: String,
    compiled: String,
}

impl SetRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let compiled = format!(".{name};");
        Self { name, compiled }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only element ids.
    Ids,
    IdsNoIds,
    /// Minimum needed for geometry.
    Skel,
    SkelNoIds,
    /// Everything needed to use the data, including tags and member roles.
    Body,
    BodyNoIds,
    /// Ids and tags, no coordinates or members.
    Tags,
    TagsNoIds,
    /// Body plus version, changeset, timestamp and user.
    Meta,
    MetaNoIds,
    /// Full geometry on every object.
    Geom,
    /// Bounding box only.
    BoundingBox,
    /// Center of the bounding box only.
    Center,
    /// Sort by id.
    Asc,
    /// Sort by quadtile index.
    Qt,
    /// Element counts by type; cannot be combined.
    Count,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Ids => "ids",
            Verbosity::IdsNoIds => "ids noids",
            Verbosity::Skel => "skel",
            Verbosity::SkelNoIds => "skel noids",
            Verbosity::Body => "body",
            Verbosity::BodyNoIds => "body noids",
            Verbosity::Tags => "tags",
            Verbosity::TagsNoIds => "tags noids",
            Verbosity::Meta => "meta",
            Verbosity::MetaNoIds => "meta noids",
            Verbosity::Geom => "geom",
            Verbosity::BoundingBox => "bb",
            Verbosity::Center => "center",
            Verbosity::Asc => "asc",
            Verbosity::Qt => "qt",
            Verbosity::Count => "count",
        }
    }
}

/// `out body;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutStatement {
    verbosity: Verbosity,
    compiled: String,
}

impl OutStatement {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            compiled: format!("out {};", verbosity.as_str()),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurseDirection {
    /// `<`: members of ways and relations in the input set.
    Down,
    /// `<<`: members, followed transitively.
    DownRelations,
    /// `>`: ways and relations referencing the input set.
    Up,
    /// `>>`: backlinks, followed transitively.
    UpRelations,
}

impl RecurseDirection {
    pub fn symbol(&self) -> &'static str {
        match self {
            RecurseDirection::Down => "<",
            RecurseDirection::DownRelations => "<<",
            RecurseDirection::Up => ">",
            RecurseDirection::UpRelations => ">>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurseStatement {
    direction: RecurseDirection,
    compiled: String,
}

impl RecurseStatement {
    pub fn new(direction: RecurseDirection) -> Self {
        Self {
            direction,
            compiled: format!("{};", direction.symbol()),
        }
    }

    pub fn direction(&self) -> RecurseDirection {
        self.direction
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

/// `[out:json][timeout:25];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStatement {
    settings: Vec<Setting>,
    compiled: String,
}

impl SettingsStatement {
    pub fn new(settings: impl IntoIterator<Item = Setting>) -> Self {
        let mut statement = Self {
            settings: settings.into_iter().collect(),
            compiled: String::new(),
        };
        statement.compiled = statement.compile();
        statement
    }

    fn compile(&self) -> String {
        let mut c: String = self.settings.iter().map(Setting::to_string).collect();
        c.push(';');
        c
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }
}

impl From<ElementStatement> for Statement {
    fn from(s: ElementStatement) -> Self {
        Statement::Element(s)
    }
}

impl From<SetRef> for Statement {
    fn from(s: SetRef) -> Self {
        Statement::SetRef(s)
    }
}

impl From<OutStatement> for Statement {
    fn from(s: OutStatement) -> Self {
        Statement::Out(s)
    }
}

impl From<RecurseStatement> for Statement {
    fn from(s: RecurseStatement) -> Self {
        Statement::Recurse(s)
    }
}

impl From<SettingsStatement> for Statement {
    fn from(s: SettingsStatement) -> Self {
        Statement::Settings(s)
    }
}

impl From<UnionStatement> for Statement {
    fn from(s: UnionStatement) -> Self {
        Statement::Union(s)
    }
}

impl From<DifferenceStatement> for Statement {
    fn from(s: DifferenceStatement) -> Self {
        Statement::Difference(s)
    }
}

impl From<Sequence> for Statement {
    fn from(s: Sequence) -> Self {
        Statement::Sequence(s)
    }
}
