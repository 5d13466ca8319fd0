//! Typed search parameters and the [`SearchParameterMap`] that carries them.
//!
//! The REST layer parses query strings into these values and files each one under a handler
//! name (see [`constants`](crate::constants)). Every handler has a fixed parameter shape; a
//! DAO asking for the wrong shape is a programming error and panics.

use crate::{TranslatorError, TranslatorResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use indexmap::IndexMap;
use std::fmt;

// ============================================================================
// Prefixes and dates
// ============================================================================

/// Comparison prefix of a date or number parameter (`ge2020`, `lt2021-03`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParamPrefix {
    #[default]
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    StartsAfter,
    EndsBefore,
    Approximate,
}

impl ParamPrefix {
    fn split(input: &str) -> (Self, &str) {
        let prefixes = [
            ("eq", Self::Eq),
            ("ne", Self::Ne),
            ("gt", Self::Gt),
            ("lt", Self::Lt),
            ("ge", Self::Ge),
            ("le", Self::Le),
            ("sa", Self::StartsAfter),
            ("eb", Self::EndsBefore),
            ("ap", Self::Approximate),
        ];
        prefixes
            .iter()
            .find_map(|(text, prefix)| input.strip_prefix(text).map(|rest| (*prefix, rest)))
            .unwrap_or((Self::Eq, input))
    }
}

/// How much of a date parameter was specified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    Instant,
}

/// A single date parameter such as `ge2020-03`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParam {
    pub prefix: ParamPrefix,
    pub value: DateTime<Utc>,
    pub precision: DatePrecision,
}

impl DateParam {
    pub fn new(prefix: ParamPrefix, value: DateTime<Utc>, precision: DatePrecision) -> Self {
        Self {
            prefix,
            value,
            precision,
        }
    }

    /// Parses `[prefix]YYYY[-MM[-DD]]` or `[prefix]` followed by an RFC 3339 instant.
    pub fn parse(input: &str) -> TranslatorResult<Self> {
        let (prefix, rest) = ParamPrefix::split(input.trim());
        let invalid = || TranslatorError::InvalidInput(format!("invalid date parameter: '{input}'"));

        if rest.contains('T') {
            let value = DateTime::parse_from_rfc3339(rest)
                .map_err(|_| invalid())?
                .with_timezone(&Utc);
            return Ok(Self::new(prefix, value, DatePrecision::Instant));
        }

        let parts: Vec<&str> = rest.split('-').collect();
        let number = |p: &str| p.parse::<u32>().map_err(|_| invalid());
        let (year, month, day, precision) = match parts.as_slice() {
            [y] if y.len() == 4 => (number(y)?, 1, 1, DatePrecision::Year),
            [y, m] if y.len() == 4 && m.len() == 2 => {
                (number(y)?, number(m)?, 1, DatePrecision::Month)
            }
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                (number(y)?, number(m)?, number(d)?, DatePrecision::Day)
            }
            _ => return Err(invalid()),
        };
        let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;
        Ok(Self::new(prefix, start_of_day(date), precision))
    }

    /// Half-open window `[lower, upper)` covered by the parameter at its precision.
    ///
    /// An instant covers exactly itself, so `lower == upper`.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let date = self.value.date_naive();
        match self.precision {
            DatePrecision::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(date);
                (start_of_day(start), start_of_day(end))
            }
            DatePrecision::Month => {
                let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                let end = if date.month() == 12 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
                }
                .unwrap_or(date);
                (start_of_day(start), start_of_day(end))
            }
            DatePrecision::Day => (start_of_day(date), start_of_day(date) + Duration::days(1)),
            DatePrecision::Instant => (self.value, self.value),
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Lower and/or upper bound of a date search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRangeParam {
    pub lower: Option<DateParam>,
    pub upper: Option<DateParam>,
}

impl DateRangeParam {
    pub fn new(lower: Option<DateParam>, upper: Option<DateParam>) -> Self {
        Self { lower, upper }
    }

    /// A range holding a single parameter, e.g. `date=2020-03`.
    pub fn single(param: DateParam) -> Self {
        Self::new(Some(param), None)
    }
}

// ============================================================================
// Reference, token and string parameters
// ============================================================================

/// A reference search value, optionally chained (`subject.name=Smith`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceParam {
    pub resource_type: Option<String>,
    pub chain: Option<String>,
    pub value: String,
}

impl ReferenceParam {
    /// Match by referenced id.
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            resource_type: None,
            chain: None,
            value: value.into(),
        }
    }

    /// Match by a property of the referenced resource.
    pub fn chained(chain: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            resource_type: None,
            chain: Some(chain.into()),
            value: value.into(),
        }
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// The chain, treating `""` and `"_id"` as no chain.
    pub fn effective_chain(&self) -> Option<&str> {
        self.chain
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "_id")
    }
}

/// A `system|code` token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenParam {
    pub system: Option<String>,
    pub value: String,
}

impl TokenParam {
    pub fn code(value: impl Into<String>) -> Self {
        Self {
            system: None,
            value: value.into(),
        }
    }

    pub fn system_code(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: value.into(),
        }
    }
}

/// A string search value with its `:exact` / `:contains` modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringParam {
    pub value: String,
    pub exact: bool,
    pub contains: bool,
}

impl StringParam {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: false,
            contains: false,
        }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            exact: true,
            ..Self::new(value)
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: true,
            ..Self::new(value)
        }
    }
}

/// AND of OR-groups: every group must match, any value within a group may.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AndOrList<T> {
    groups: Vec<Vec<T>>,
}

impl<T> Default for AndOrList<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> AndOrList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(value: T) -> Self {
        Self::new().and(vec![value])
    }

    /// Adds an OR-group. Empty groups are ignored.
    pub fn and(mut self, or_group: Vec<T>) -> Self {
        if !or_group.is_empty() {
            self.groups.push(or_group);
        }
        self
    }

    pub fn groups(&self) -> &[Vec<T>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.groups.iter().flatten()
    }
}

pub type ReferenceAndListParam = AndOrList<ReferenceParam>;
pub type TokenAndListParam = AndOrList<TokenParam>;
pub type StringAndListParam = AndOrList<StringParam>;

// ============================================================================
// Sort and include
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// `_sort=a,-b`: a chain of sort keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub param_name: String,
    pub order: SortOrder,
    pub chain: Option<Box<SortSpec>>,
}

impl SortSpec {
    pub fn new(param_name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            param_name: param_name.into(),
            order,
            chain: None,
        }
    }

    /// Parses `_sort` syntax: comma separated names, `-` for descending.
    pub fn parse(input: &str) -> Option<Self> {
        let specs: Vec<SortSpec> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('-') {
                Some(name) => Self::new(name, SortOrder::Descending),
                None => Self::new(s, SortOrder::Ascending),
            })
            .collect();

        specs.into_iter().rev().fold(None, |next, mut spec| {
            spec.chain = next.map(Box::new);
            Some(spec)
        })
    }

    /// This spec followed by its chain.
    pub fn iter(&self) -> impl Iterator<Item = &SortSpec> {
        std::iter::successors(Some(self), |spec| spec.chain.as_deref())
    }
}

/// An `_include` or `_revinclude` directive: `SourceType:param[:TargetType]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Include {
    pub source_type: String,
    pub param_name: String,
    pub target_type: Option<String>,
    pub reverse: bool,
}

impl Include {
    pub fn parse(value: &str, reverse: bool) -> Option<Self> {
        let mut parts = value.trim().split(':');
        let source_type = parts.next().filter(|s| !s.is_empty())?;
        let param_name = parts.next().filter(|s| !s.is_empty())?;
        let target_type = parts.next().filter(|s| !s.is_empty()).map(str::to_owned);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            source_type: source_type.to_owned(),
            param_name: param_name.to_owned(),
            target_type,
            reverse,
        })
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.param_name)?;
        if let Some(target) = &self.target_type {
            write!(f, ":{target}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Parameter map
// ============================================================================

/// One parameter value of any supported shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchParam {
    Reference(ReferenceAndListParam),
    Token(TokenAndListParam),
    String(StringAndListParam),
    DateRange(DateRangeParam),
    Includes(Vec<Include>),
}

impl SearchParam {
    fn shape(&self) -> &'static str {
        match self {
            Self::Reference(_) => "reference",
            Self::Token(_) => "token",
            Self::String(_) => "string",
            Self::DateRange(_) => "date range",
            Self::Includes(_) => "include",
        }
    }

    /// # Panics
    ///
    /// Panics if the parameter is not a reference list.
    pub fn as_references(&self) -> &ReferenceAndListParam {
        match self {
            Self::Reference(p) => p,
            other => panic!("expected a reference parameter, got a {} parameter", other.shape()),
        }
    }

    /// # Panics
    ///
    /// Panics if the parameter is not a token list.
    pub fn as_tokens(&self) -> &TokenAndListParam {
        match self {
            Self::Token(p) => p,
            other => panic!("expected a token parameter, got a {} parameter", other.shape()),
        }
    }

    /// # Panics
    ///
    /// Panics if the parameter is not a string list.
    pub fn as_strings(&self) -> &StringAndListParam {
        match self {
            Self::String(p) => p,
            other => panic!("expected a string parameter, got a {} parameter", other.shape()),
        }
    }

    /// # Panics
    ///
    /// Panics if the parameter is not a date range.
    pub fn as_date_range(&self) -> &DateRangeParam {
        match self {
            Self::DateRange(p) => p,
            other => panic!("expected a date range parameter, got a {} parameter", other.shape()),
        }
    }

    /// # Panics
    ///
    /// Panics if the parameter is not a set of include directives.
    pub fn as_includes(&self) -> &[Include] {
        match self {
            Self::Includes(p) => p,
            other => panic!("expected include directives, got a {} parameter", other.shape()),
        }
    }
}

impl From<ReferenceAndListParam> for SearchParam {
    fn from(value: ReferenceAndListParam) -> Self {
        Self::Reference(value)
    }
}

impl From<TokenAndListParam> for SearchParam {
    fn from(value: TokenAndListParam) -> Self {
        Self::Token(value)
    }
}

impl From<StringAndListParam> for SearchParam {
    fn from(value: StringAndListParam) -> Self {
        Self::String(value)
    }
}

impl From<DateRangeParam> for SearchParam {
    fn from(value: DateRangeParam) -> Self {
        Self::DateRange(value)
    }
}

impl From<Vec<Include>> for SearchParam {
    fn from(value: Vec<Include>) -> Self {
        Self::Includes(value)
    }
}

/// A parameter value filed under a handler, optionally naming the property it targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropParam {
    pub property_name: Option<String>,
    pub param: SearchParam,
}

/// Ordered multimap of handler name to parameter values.
///
/// Handlers iterate in first-insertion order and values of one handler in insertion order, so
/// the same map always produces the same joins and aliases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParameterMap {
    parameters: IndexMap<String, Vec<PropParam>>,
    sort: Option<SortSpec>,
}

impl SearchParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_parameter(&mut self, handler: &str, param: impl Into<SearchParam>) -> &mut Self {
        self.push(handler, None, param.into())
    }

    pub fn add_property_parameter(
        &mut self,
        handler: &str,
        property_name: &str,
        param: impl Into<SearchParam>,
    ) -> &mut Self {
        self.push(handler, Some(property_name.to_owned()), param.into())
    }

    fn push(&mut self, handler: &str, property_name: Option<String>, param: SearchParam) -> &mut Self {
        self.parameters
            .entry(handler.to_owned())
            .or_default()
            .push(PropParam {
                property_name,
                param,
            });
        self
    }

    pub fn set_sort_spec(&mut self, sort: Option<SortSpec>) -> &mut Self {
        self.sort = sort;
        self
    }

    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Parameters filed under `handler`, in insertion order.
    pub fn get(&self, handler: &str) -> &[PropParam] {
        self.parameters
            .get(handler)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &[PropParam])> {
        self.parameters
            .iter()
            .map(|(handler, params)| (handler.as_str(), params.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.sort.is_none()
    }
}
