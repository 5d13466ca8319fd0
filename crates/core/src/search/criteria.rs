//! A backend-neutral criteria query.
//!
//! DAOs describe what to fetch: a root entity, joins reached through relationship paths, a
//! conjunction of predicates, ordering and include directives. The persistence collaborator
//! turns a [`CriteriaQuery`] into SQL (or ORM criteria) and executes it.
//!
//! Properties are addressed as `alias.property` for joined entities and bare `property` for the
//! root.

use crate::search::params::{Include, SortOrder};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    DateTime(DateTime<Utc>),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::DateTime(dt) => write!(f, "'{}'", dt.to_rfc3339()),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// Where a `LIKE` pattern may match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Start,
    Anywhere,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Criterion {
    Compare {
        property: String,
        op: Comparison,
        value: Value,
    },
    In {
        property: String,
        values: Vec<Value>,
    },
    Like {
        property: String,
        value: String,
        mode: MatchMode,
        ignore_case: bool,
    },
    IsNull(String),
    IsNotNull(String),
    And(Vec<Criterion>),
    Or(Vec<Criterion>),
}

impl Criterion {
    pub fn compare(property: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Self::Compare {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, Comparison::Eq, value)
    }

    /// `property IN (...)`, or plain equality for a single value.
    pub fn is_in(property: impl Into<String>, values: Vec<Value>) -> Self {
        let property = property.into();
        match <[Value; 1]>::try_from(values) {
            Ok([value]) => Self::Compare {
                property,
                op: Comparison::Eq,
                value,
            },
            Err(values) => Self::In { property, values },
        }
    }

    pub fn like(property: impl Into<String>, value: impl Into<String>, mode: MatchMode) -> Self {
        Self::Like {
            property: property.into(),
            value: value.into(),
            mode,
            ignore_case: true,
        }
    }

    /// Conjunction; `None` when empty, the criterion itself when single.
    pub fn all(mut criteria: Vec<Criterion>) -> Option<Self> {
        match criteria.len() {
            0 => None,
            1 => criteria.pop(),
            _ => Some(Self::And(criteria)),
        }
    }

    /// Disjunction; `None` when empty, the criterion itself when single.
    pub fn any(mut criteria: Vec<Criterion>) -> Option<Self> {
        match criteria.len() {
            0 => None,
            1 => criteria.pop(),
            _ => Some(Self::Or(criteria)),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn joined(f: &mut fmt::Formatter<'_>, parts: &[Criterion], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::Compare {
                property,
                op,
                value,
            } => write!(f, "{property} {} {value}", op.symbol()),
            Self::In { property, values } => {
                write!(f, "{property} IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
            Self::Like {
                property,
                value,
                mode,
                ignore_case,
            } => {
                let pattern = match mode {
                    MatchMode::Exact => value.clone(),
                    MatchMode::Start => format!("{value}%"),
                    MatchMode::Anywhere => format!("%{value}%"),
                };
                let op = if *ignore_case { "ILIKE" } else { "LIKE" };
                write!(f, "{property} {op} {}", Value::Text(pattern))
            }
            Self::IsNull(property) => write!(f, "{property} IS NULL"),
            Self::IsNotNull(property) => write!(f, "{property} IS NOT NULL"),
            Self::And(parts) => joined(f, parts, " AND "),
            Self::Or(parts) => joined(f, parts, " OR "),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
}

/// A join from a relationship path (`patient.names`) to an alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub path: String,
    pub alias: String,
    pub kind: JoinKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub order: SortOrder,
}

/// Alias name derived from a relationship path: `drugOrder.patient` becomes
/// `drugOrder_patient`.
pub fn alias_for_path(path: &str) -> String {
    path.replace('.', "_")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriteriaQuery {
    root: String,
    joins: IndexMap<String, Join>,
    predicates: Vec<Criterion>,
    orders: Vec<Order>,
    includes: Vec<Include>,
    rev_includes: Vec<Include>,
}

impl CriteriaQuery {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_owned(),
            joins: IndexMap::new(),
            predicates: Vec::new(),
            orders: Vec::new(),
            includes: Vec::new(),
            rev_includes: Vec::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Join `path` under `alias`, reusing the join when the alias already exists.
    ///
    /// A path may start with an existing alias (`p.names`) to join through it.
    pub fn create_alias(&mut self, path: &str, alias: &str) -> String {
        if let Some(existing) = self.joins.get(alias) {
            if existing.path != path {
                tracing::warn!(
                    alias,
                    existing = %existing.path,
                    requested = path,
                    "alias already bound to another path; reusing existing join"
                );
            }
            return existing.alias.clone();
        }

        self.joins.insert(
            alias.to_owned(),
            Join {
                path: path.to_owned(),
                alias: alias.to_owned(),
                kind: JoinKind::Inner,
            },
        );
        alias.to_owned()
    }

    /// Join `path` under the alias derived from it.
    pub fn join_path(&mut self, path: &str) -> String {
        self.create_alias(path, &alias_for_path(path))
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.joins.contains_key(alias)
    }

    pub fn joins(&self) -> impl Iterator<Item = &Join> {
        self.joins.values()
    }

    pub fn add(&mut self, criterion: Criterion) -> &mut Self {
        self.predicates.push(criterion);
        self
    }

    pub fn predicates(&self) -> &[Criterion] {
        &self.predicates
    }

    pub fn add_order(&mut self, property: impl Into<String>, order: SortOrder) {
        self.orders.push(Order {
            property: property.into(),
            order,
        });
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn add_include(&mut self, include: Include) {
        let target = if include.reverse {
            &mut self.rev_includes
        } else {
            &mut self.includes
        };
        if !target.contains(&include) {
            target.push(include);
        }
    }

    pub fn includes(&self) -> &[Include] {
        &self.includes
    }

    pub fn rev_includes(&self) -> &[Include] {
        &self.rev_includes
    }
}

impl fmt::Display for CriteriaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {}", self.root)?;
        for join in self.joins.values() {
            let kind = match join.kind {
                JoinKind::Inner => "JOIN",
                JoinKind::LeftOuter => "LEFT JOIN",
            };
            write!(f, " {kind} {} AS {}", join.path, join.alias)?;
        }
        if let Some(predicate) = Criterion::all(self.predicates.clone()) {
            write!(f, " WHERE {predicate}")?;
        }
        if !self.orders.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, order) in self.orders.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                let direction = match order.order {
                    SortOrder::Ascending => "ASC",
                    SortOrder::Descending => "DESC",
                };
                write!(f, "{} {direction}", order.property)?;
            }
        }
        Ok(())
    }
}
