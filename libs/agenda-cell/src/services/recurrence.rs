// libs/agenda-cell/src/services/recurrence.rs
//
// Pure expansion of recurring appointments into concrete occurrences.
// `expand` is a function of (base set, window) and nothing else: no
// clock reads, no store access, no mutation of its inputs.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

use crate::models::{
    Appointment, DateWindow, Occurrence, OccurrenceId, RecurrenceEnd, RecurrenceFrequency,
    RecurrenceRule,
};

/// Expand every appointment into the occurrences visible in `window`
/// (start inclusive, end exclusive). Non-recurring appointments pass
/// through unchanged, at occurrence index 0, when their day falls inside
/// the window. Output is sorted by (date, base id, index) so identical
/// inputs always yield identical results.
pub fn expand(appointments: &[Appointment], window: DateWindow) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();

    for appointment in appointments {
        match &appointment.recurrence {
            Some(rule) => expand_series(appointment, rule, window, &mut occurrences),
            None => {
                if window.contains(appointment.calendar_day()) {
                    occurrences.push(Occurrence {
                        id: OccurrenceId {
                            base_id: appointment.id,
                            occurrence_index: 0,
                        },
                        appointment: appointment.clone(),
                    });
                }
            }
        }
    }

    occurrences.sort_by_key(|occ| (occ.appointment.date, occ.id.base_id, occ.id.occurrence_index));
    occurrences
}

/// The concrete date of occurrence `index` of a series, or `None` when
/// the index lies beyond the rule's end condition. Exception dates do not
/// shift indices, so this stays stable as exceptions are edited.
pub fn occurrence_date(appointment: &Appointment, index: u32) -> Option<DateTime<Utc>> {
    let rule = appointment.recurrence.as_ref()?;
    if let Some(RecurrenceEnd::Count(count)) = rule.end {
        if index >= count {
            return None;
        }
    }

    let date = step(appointment.date, rule, index)?;
    if let Some(RecurrenceEnd::Until(until)) = rule.end {
        if date.date_naive() > until {
            return None;
        }
    }
    Some(date)
}

fn expand_series(
    appointment: &Appointment,
    rule: &RecurrenceRule,
    window: DateWindow,
    out: &mut Vec<Occurrence>,
) {
    let mut index: u32 = 0;
    loop {
        if let Some(RecurrenceEnd::Count(count)) = rule.end {
            if index >= count {
                break;
            }
        }

        let date = match step(appointment.date, rule, index) {
            Some(date) => date,
            None => break,
        };
        let day = date.date_naive();

        // An until-date equal to a computed occurrence day includes it.
        if let Some(RecurrenceEnd::Until(until)) = rule.end {
            if day > until {
                break;
            }
        }

        // Dates are strictly increasing, so past the window nothing more
        // can match.
        if day >= window.end {
            break;
        }

        let skipped = rule.exceptions.contains(&day);
        if day >= window.start && !skipped {
            let mut occurrence = appointment.clone();
            occurrence.date = date;
            out.push(Occurrence {
                id: OccurrenceId {
                    base_id: appointment.id,
                    occurrence_index: index,
                },
                appointment: occurrence,
            });
        }

        index += 1;
    }
}

fn step(base: DateTime<Utc>, rule: &RecurrenceRule, index: u32) -> Option<DateTime<Utc>> {
    // Validation rejects zero intervals; stored data may still carry one,
    // so clamp rather than loop in place.
    let interval = rule.interval.max(1);
    let steps = interval.checked_mul(index)?;

    match rule.frequency {
        RecurrenceFrequency::Daily => base.checked_add_signed(Duration::days(steps as i64)),
        RecurrenceFrequency::Weekly => base.checked_add_signed(Duration::weeks(steps as i64)),
        RecurrenceFrequency::Monthly => base.checked_add_months(Months::new(steps)),
    }
}

/// Convenience for callers that only care about the days of a series
/// inside a window (month-view dot markers).
pub fn occurrence_days(appointment: &Appointment, window: DateWindow) -> Vec<NaiveDate> {
    expand(std::slice::from_ref(appointment), window)
        .into_iter()
        .map(|occ| occ.appointment.calendar_day())
        .collect()
}
