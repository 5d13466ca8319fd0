//! Search parameters, criteria queries and the handlers that connect them.

pub mod criteria;
pub mod handlers;
pub mod include;
pub mod params;
pub mod request;

pub use criteria::{alias_for_path, Comparison, CriteriaQuery, Criterion, Join, JoinKind, MatchMode, Order, Value};
pub use include::{IncludeResolver, ReferenceSource};
pub use params::{
    AndOrList, DateParam, DatePrecision, DateRangeParam, Include, ParamPrefix, PropParam,
    ReferenceAndListParam, ReferenceParam, SearchParam, SearchParameterMap, SortOrder, SortSpec,
    StringAndListParam, StringParam, TokenAndListParam, TokenParam,
};
pub use request::{
    DiagnosticReportSearchParams, MedicationDispenseSearchParams, MedicationRequestSearchParams,
    PersonSearchParams,
};
