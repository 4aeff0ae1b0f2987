//! Task list filtering.
//!
//! [`TaskFilter`] turns the task list's query parameters into a set of
//! predicates. Relative deadline buckets are resolved against an injected
//! "today" so that date math stays testable.

use crate::query::QueryParams;
use crate::types::{Priority, Status};
use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Named relative-date range for the deadline filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineBucket {
    Today,
    Overdue,
    Tomorrow,
    ThisWeek,
    NextWeek,
}

/// Inclusive date bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Intersect two ranges.
    pub fn narrow(self, other: DateRange) -> DateRange {
        DateRange {
            start: match (self.start, other.start) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
            end: match (self.end, other.end) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Last day (Sunday) of the week containing `today`.
fn week_end(today: NaiveDate) -> NaiveDate {
    let remaining = 6 - u64::from(today.weekday().num_days_from_monday());
    today + Days::new(remaining)
}

impl DeadlineBucket {
    pub const ALL: [DeadlineBucket; 5] = [
        DeadlineBucket::Today,
        DeadlineBucket::Overdue,
        DeadlineBucket::Tomorrow,
        DeadlineBucket::ThisWeek,
        DeadlineBucket::NextWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineBucket::Today => "today",
            DeadlineBucket::Overdue => "overdue",
            DeadlineBucket::Tomorrow => "tomorrow",
            DeadlineBucket::ThisWeek => "this_week",
            DeadlineBucket::NextWeek => "next_week",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeadlineBucket::Today => "Today",
            DeadlineBucket::Overdue => "Overdue",
            DeadlineBucket::Tomorrow => "Tomorrow",
            DeadlineBucket::ThisWeek => "This week",
            DeadlineBucket::NextWeek => "Next week",
        }
    }

    /// The dates this bucket covers, relative to `today`.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            DeadlineBucket::Today => DateRange {
                start: Some(today),
                end: Some(today),
            },
            DeadlineBucket::Overdue => DateRange {
                start: None,
                end: today.pred_opt(),
            },
            DeadlineBucket::Tomorrow => {
                let tomorrow = today.succ_opt();
                DateRange {
                    start: tomorrow,
                    end: tomorrow,
                }
            }
            DeadlineBucket::ThisWeek => DateRange {
                start: Some(today),
                end: Some(week_end(today)),
            },
            DeadlineBucket::NextWeek => {
                let end = week_end(today);
                DateRange {
                    start: Some(end + Days::new(1)),
                    end: Some(end + Days::new(7)),
                }
            }
        }
    }
}

impl FromStr for DeadlineBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeadlineBucket::ALL
            .iter()
            .find(|bucket| bucket.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown deadline filter: {}", s))
    }
}

/// Active/inactive status grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    Active,
    Inactive,
}

impl ActiveFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveFilter::Active => "active",
            ActiveFilter::Inactive => "deactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActiveFilter::Active => "Active",
            ActiveFilter::Inactive => "Inactive",
        }
    }

    pub fn matches(&self, status: Status) -> bool {
        match self {
            ActiveFilter::Active => status.is_active(),
            ActiveFilter::Inactive => !status.is_active(),
        }
    }
}

impl FromStr for ActiveFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ActiveFilter::Active),
            "deactive" | "inactive" => Ok(ActiveFilter::Inactive),
            other => Err(format!("unknown activity filter: {}", other)),
        }
    }
}

/// A query parameter whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Select a valid choice. {} is not one of the available choices.",
            self.field, self.value
        )
    }
}

/// Composed predicate over the task list. Every populated field is ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub task_type: Option<i64>,
    pub assignee: Option<i64>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub active: Option<ActiveFilter>,
    pub deadline: Option<DeadlineBucket>,
    pub deadline_after: Option<NaiveDate>,
    pub deadline_before: Option<NaiveDate>,
    pub errors: Vec<FilterError>,
}

impl TaskFilter {
    /// Build a filter from the list page's query parameters.
    ///
    /// With no parameters at all the list shows active tasks only.
    pub fn from_query(params: &QueryParams) -> Self {
        let mut filter = TaskFilter::default();

        if params.is_empty() {
            filter.active = Some(ActiveFilter::Active);
            return filter;
        }

        filter.search = params.get_nonempty("q").map(str::to_string);
        filter.task_type = filter.parse_field(params, "task_type");
        filter.assignee = filter.parse_field(params, "assignee");
        filter.priority = filter.parse_field(params, "priority");
        filter.status = filter.parse_field(params, "status");
        filter.active = filter.parse_field(params, "active_filter");
        filter.deadline = filter.parse_field(params, "deadline_filter");
        filter.deadline_after = filter.parse_date(params, "deadline_after");
        filter.deadline_before = filter.parse_date(params, "deadline_before");
        filter
    }

    fn parse_field<T: FromStr>(&mut self, params: &QueryParams, field: &'static str) -> Option<T> {
        let raw = params.get_nonempty(field)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.push(FilterError {
                    field,
                    value: raw.to_string(),
                });
                None
            }
        }
    }

    fn parse_date(&mut self, params: &QueryParams, field: &'static str) -> Option<NaiveDate> {
        let raw = params.get_nonempty(field)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors.push(FilterError {
                    field,
                    value: raw.to_string(),
                });
                None
            }
        }
    }

    /// Combined deadline bounds from the bucket and the explicit range.
    pub fn deadline_range(&self, today: NaiveDate) -> DateRange {
        let explicit = DateRange {
            start: self.deadline_after,
            end: self.deadline_before,
        };
        match self.deadline {
            Some(bucket) => bucket.range(today).narrow(explicit),
            None => explicit,
        }
    }

    /// Drop a `task_type` or `assignee` id that names no record and report
    /// it like any other bad value.
    pub fn check_choices(&mut self, task_type_ids: &[i64], worker_ids: &[i64]) {
        if let Some(id) = self.task_type.filter(|id| !task_type_ids.contains(id)) {
            self.task_type = None;
            self.errors.push(FilterError {
                field: "task_type",
                value: id.to_string(),
            });
        }
        if let Some(id) = self.assignee.filter(|id| !worker_ids.contains(id)) {
            self.assignee = None;
            self.errors.push(FilterError {
                field: "assignee",
                value: id.to_string(),
            });
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
