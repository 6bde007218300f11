//! Calendar events built from tasks and interventions

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Intervention, MaintenanceTask, Priority, TaskStatus};

pub const DEFAULT_TASK_HOURS: f64 = 2.0;
pub const DEFAULT_INTERVENTION_HOURS: f64 = 1.0;
pub const UPCOMING_TASK_HOURS: f64 = 3.0;
pub const MAX_UPCOMING_TASKS: usize = 5;
/// Longest span an event is drawn with
pub const MAX_EVENT_HOURS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Maintenance,
    Intervention,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    /// Unique across kinds, e.g. "maintenance-12"
    pub id: String,
    pub source_id: i32,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: EventKind,
    pub priority: Priority,
    pub status: String,
    pub equipment: Option<String>,
    pub assigned_to: Option<String>,
}

/// End of an event lasting `hours`, clamped to `[0, MAX_EVENT_HOURS]`
fn plus_hours(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    let seconds = (hours.clamp(0.0, MAX_EVENT_HOURS) * 3600.0).round() as i64;
    TimeDelta::try_seconds(seconds)
        .and_then(|span| start.checked_add_signed(span))
        .unwrap_or(start)
}

fn task_event(task: &MaintenanceTask, kind: EventKind, hours: f64) -> Option<CalendarEvent> {
    let start = task.due_date?;
    Some(CalendarEvent {
        id: format!("{}-{}", kind_prefix(kind), task.id),
        source_id: task.id,
        title: task.title.clone(),
        start,
        end: plus_hours(start, hours),
        kind,
        priority: task.priority,
        status: task.status.as_str().to_string(),
        equipment: Some(task.equipment.clone()),
        assigned_to: task.assigned_to.clone(),
    })
}

fn kind_prefix(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Maintenance => "maintenance",
        EventKind::Intervention => "intervention",
        EventKind::Upcoming => "upcoming",
    }
}

/// Tasks, then interventions, then upcoming tasks, each in input order.
/// Tasks without a due date are not placed on the calendar.
pub fn create_calendar_events(
    tasks: &[MaintenanceTask],
    interventions: &[Intervention],
    upcoming: &[MaintenanceTask],
) -> Vec<CalendarEvent> {
    let mut events = Vec::with_capacity(tasks.len() + interventions.len() + upcoming.len());

    events.extend(tasks.iter().filter_map(|t| {
        let hours = t.estimated_duration.unwrap_or(DEFAULT_TASK_HOURS);
        task_event(t, EventKind::Maintenance, hours)
    }));

    events.extend(interventions.iter().map(|i| {
        let hours = i
            .duration
            .or(i.scheduled_duration)
            .unwrap_or(DEFAULT_INTERVENTION_HOURS);
        CalendarEvent {
            id: format!("{}-{}", kind_prefix(EventKind::Intervention), i.id),
            source_id: i.id,
            title: i.title.clone(),
            start: i.date,
            end: plus_hours(i.date, hours),
            kind: EventKind::Intervention,
            priority: i.priority,
            status: i.status.as_str().to_string(),
            equipment: i.equipment.clone(),
            assigned_to: i.technician.clone(),
        }
    }));

    events.extend(
        upcoming
            .iter()
            .filter_map(|t| task_event(t, EventKind::Upcoming, UPCOMING_TASK_HOURS)),
    );

    events
}

/// Next scheduled tasks by due date; undated tasks come last
pub fn upcoming_tasks(tasks: &[MaintenanceTask]) -> Vec<MaintenanceTask> {
    let mut scheduled: Vec<MaintenanceTask> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Scheduled)
        .cloned()
        .collect();

    scheduled.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    scheduled.truncate(MAX_UPCOMING_TASKS);
    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{intervention, task};
    use crate::models::InterventionStatus;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_task_durations() {
        let mut estimated = task(1, TaskStatus::Scheduled, Some(at(2, 8)));
        estimated.estimated_duration = Some(1.5);
        let default = task(2, TaskStatus::Scheduled, Some(at(3, 8)));
        let undated = task(3, TaskStatus::Scheduled, None);

        let events = create_calendar_events(&[estimated, default, undated], &[], &[]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "maintenance-1");
        assert_eq!(events[0].end, at(2, 9) + TimeDelta::minutes(30));
        assert_eq!(events[1].end, at(3, 10));
    }

    #[test]
    fn test_intervention_and_upcoming_durations() {
        let mut timed = intervention(1, InterventionStatus::Completed, Priority::Low);
        timed.date = at(4, 8);
        timed.duration = Some(4.0);
        let mut untimed = intervention(2, InterventionStatus::Scheduled, Priority::Low);
        untimed.date = at(5, 8);

        let upcoming = task(7, TaskStatus::Scheduled, Some(at(6, 8)));

        let events = create_calendar_events(&[], &[timed, untimed], &[upcoming]);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Intervention, EventKind::Intervention, EventKind::Upcoming]);
        assert_eq!(events[0].end, at(4, 12));
        assert_eq!(events[1].end, at(5, 9));
        assert_eq!(events[2].end, at(6, 11));
        assert_eq!(events[2].id, "upcoming-7");
    }

    #[test]
    fn test_oversized_durations_are_clamped() {
        let mut long_task = task(1, TaskStatus::Scheduled, Some(at(2, 8)));
        long_task.estimated_duration = Some(1e10);
        let mut long_intervention = intervention(2, InterventionStatus::Completed, Priority::Low);
        long_intervention.date = at(4, 8);
        long_intervention.duration = Some(1e300);
        let mut negative = intervention(3, InterventionStatus::Scheduled, Priority::Low);
        negative.date = at(5, 8);
        negative.duration = Some(-2.0);

        let events = create_calendar_events(&[long_task], &[long_intervention, negative], &[]);
        let cap = TimeDelta::hours(MAX_EVENT_HOURS as i64);
        assert_eq!(events[0].end, at(2, 8) + cap);
        assert_eq!(events[1].end, at(4, 8) + cap);
        assert_eq!(events[2].end, at(5, 8));
    }

    #[test]
    fn test_fractional_duration_rounds_to_seconds() {
        let mut t = task(1, TaskStatus::Scheduled, Some(at(2, 8)));
        t.estimated_duration = Some(0.25);

        let events = create_calendar_events(&[t], &[], &[]);
        assert_eq!(events[0].end, at(2, 8) + TimeDelta::minutes(15));
    }

    #[test]
    fn test_end_never_overflows_calendar() {
        let mut t = task(1, TaskStatus::Scheduled, Some(DateTime::<Utc>::MAX_UTC));
        t.estimated_duration = Some(5.0);

        let events = create_calendar_events(&[t], &[], &[]);
        assert_eq!(events[0].end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_upcoming_tasks() {
        let mut tasks: Vec<MaintenanceTask> = (1..=7)
            .map(|id| task(id, TaskStatus::Scheduled, Some(at(20 - id as u32, 8))))
            .collect();
        tasks.push(task(8, TaskStatus::Completed, Some(at(1, 8))));
        tasks.push(task(9, TaskStatus::Scheduled, None));

        let upcoming = upcoming_tasks(&tasks);
        let ids: Vec<i32> = upcoming.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }
}
