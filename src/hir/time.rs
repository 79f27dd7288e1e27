//! Time value resolution and time-list expansion.

use std::collections::hash_map::Entry;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::model::{DatasetMilestone, Milestone, RelativeTo};
use crate::parser::time::{StudyDay, TimeExpr, TimeValue, Window};

/// Expected type reported when a milestone's `at` has the wrong shape.
pub const MILESTONE_AT_SHAPE: &str = "study_day|relative";

/// A problem found while resolving time expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeProblem {
    MilestoneNotFound(SmolStr),
    InvalidType {
        actual: &'static str,
        expected: &'static str,
    },
}

/// Resolve the `at` expression of `milestone NAME { at: ... }`.
///
/// Only a single study day or a single relative expression is allowed; the
/// error carries the actual shape found. An unknown reference target is not
/// an error here.
pub fn resolve_milestone(name: &SmolStr, exprs: &[TimeExpr]) -> Result<Milestone, &'static str> {
    let [expr] = exprs else {
        return Err("time_list");
    };
    match expr {
        TimeExpr::Range { .. } => Err("time_range"),
        TimeExpr::Value(TimeValue::Milestone { .. }) => Err("milestone_ref"),
        TimeExpr::Value(TimeValue::StudyDay(StudyDay { hour: Some(_), .. })) => Err("hour"),
        TimeExpr::Value(TimeValue::StudyDay(StudyDay { day, window, .. })) => {
            Ok(Milestone::Absolute {
                name: name.clone(),
                day: *day,
                window: *window,
            })
        }
        TimeExpr::Relative { position, target } => {
            let relative_to = match target {
                TimeValue::StudyDay(StudyDay { hour: Some(_), .. })
                | TimeValue::Milestone { hour: Some(_), .. } => return Err("hour"),
                TimeValue::StudyDay(StudyDay { day, window, .. }) => RelativeTo::Anonymous {
                    day: *day,
                    window: *window,
                },
                TimeValue::Milestone { name, .. } => RelativeTo::Reference { name: name.clone() },
            };
            Ok(Milestone::Relative {
                name: name.clone(),
                position: *position,
                relative_to,
            })
        }
    }
}

/// Longest run of interior days a single range may fill.
pub const MAX_RANGE_DAYS: i64 = 36_600;

/// Dedup key: dated entries collapse on day and hour, undated ones on name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EntryKey {
    Dated(i64, Option<u32>),
    Undated(Option<SmolStr>, Option<u32>),
}

impl EntryKey {
    fn of(entry: &DatasetMilestone) -> Self {
        match entry.day {
            Some(day) => EntryKey::Dated(day, entry.hour),
            None => EntryKey::Undated(entry.name.clone(), entry.hour),
        }
    }
}

/// Result of expanding a dataset's time list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub milestones: Vec<DatasetMilestone>,
    pub problems: Vec<TimeProblem>,
    index: FxHashMap<EntryKey, usize>,
}

impl Expansion {
    /// Add an entry unless an equivalent one exists. A named entry replaces an
    /// unnamed one at the same day and hour.
    pub(crate) fn push(&mut self, entry: DatasetMilestone) {
        match self.index.entry(EntryKey::of(&entry)) {
            Entry::Occupied(slot) => {
                let existing = &mut self.milestones[*slot.get()];
                if existing.name.is_none() {
                    existing.name = entry.name;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(self.milestones.len());
                self.milestones.push(entry);
            }
        }
    }
}

/// Days strictly between two windowed endpoints, or `None` when there are none.
fn interior_days(a: i64, wa: Window, b: i64, wb: Window) -> Option<(i64, i64)> {
    let first = a.checked_add(wa.after)?.checked_add(1)?;
    let last = b.checked_add(wb.before)?.checked_sub(1)?;
    (first <= last).then_some((first, last))
}

/// A resolved endpoint with its fixed day, when it has one.
struct Point {
    entry: DatasetMilestone,
    fixed: Option<(i64, Window)>,
}

/// Expands `@milestone(t"...")` time lists into concrete dataset milestones.
pub struct TimeResolver<'a> {
    milestones: &'a IndexMap<SmolStr, Milestone>,
}

impl<'a> TimeResolver<'a> {
    pub fn new(milestones: &'a IndexMap<SmolStr, Milestone>) -> Self {
        Self { milestones }
    }

    pub fn expand(&self, exprs: &[TimeExpr], out: &mut Expansion) {
        for expr in exprs {
            match expr {
                TimeExpr::Value(value) => {
                    let point = self.resolve(value, out);
                    out.push(point.entry);
                }
                TimeExpr::Relative { .. } => out.problems.push(TimeProblem::InvalidType {
                    actual: "relative",
                    expected: "study_day|milestone|time_range",
                }),
                TimeExpr::Range { start, end } => self.expand_range(start, end, out),
            }
        }
    }

    fn expand_range(&self, start: &TimeValue, end: &TimeValue, out: &mut Expansion) {
        let start = self.resolve(start, out);
        let end = self.resolve(end, out);
        let interior = match (start.fixed, end.fixed) {
            (Some((a, wa)), Some((b, wb))) => interior_days(a, wa, b, wb),
            _ => None,
        };
        out.push(start.entry);
        if let Some((first, last)) = interior {
            if last.checked_sub(first).is_none_or(|span| span >= MAX_RANGE_DAYS) {
                out.problems.push(TimeProblem::InvalidType {
                    actual: "time_range",
                    expected: "bounded_time_range",
                });
            } else {
                for day in first..=last {
                    out.push(DatasetMilestone {
                        name: None,
                        day: Some(day),
                        hour: None,
                    });
                }
            }
        }
        out.push(end.entry);
    }

    fn resolve(&self, value: &TimeValue, out: &mut Expansion) -> Point {
        match value {
            TimeValue::StudyDay(StudyDay { day, window, hour }) => Point {
                entry: DatasetMilestone {
                    name: None,
                    day: Some(*day),
                    hour: *hour,
                },
                fixed: Some((*day, *window)),
            },
            TimeValue::Milestone { name, hour } => {
                let fixed = match self.milestones.get(name) {
                    Some(milestone) => milestone.fixed_day(),
                    None => {
                        out.problems.push(TimeProblem::MilestoneNotFound(name.clone()));
                        None
                    }
                };
                Point {
                    entry: DatasetMilestone {
                        name: Some(name.clone()),
                        day: fixed.map(|(day, _)| day),
                        hour: *hour,
                    },
                    fixed,
                }
            }
        }
    }
}

/// Report a relative milestone used as a range endpoint.
pub fn check_range_endpoints(
    exprs: &[TimeExpr],
    milestones: &IndexMap<SmolStr, Milestone>,
) -> Vec<TimeProblem> {
    let mut problems = Vec::new();
    for expr in exprs {
        let TimeExpr::Range { start, end } = expr else {
            continue;
        };
        for value in [start, end] {
            if let TimeValue::Milestone { name, .. } = value {
                if matches!(milestones.get(name), Some(Milestone::Relative { .. })) {
                    problems.push(TimeProblem::InvalidType {
                        actual: "relative",
                        expected: "study_day",
                    });
                }
            }
        }
    }
    problems
}
