//! Terminal rendering for the shell's views.

use chrono::{Datelike, NaiveDate};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use gym_core::reports::{CalendarView, HistoryRow, ProgressPoint};
use gym_core::WorkoutEntry;

const BAR_WIDTH: f64 = 40.0;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format kilograms the way they are stored: always at least one decimal
pub fn kg(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Workout history table; best-1RM rows are starred and highlighted
pub fn history_table(rows: &[HistoryRow<'_>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(""),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Exercise").add_attribute(Attribute::Bold),
            Cell::new("Weight (kg)").add_attribute(Attribute::Bold),
            Cell::new("Reps").add_attribute(Attribute::Bold),
            Cell::new("Estimated 1RM (kg)").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let entry = row.entry;
        let values = [
            if row.is_best { "★".to_string() } else { String::new() },
            entry.date.to_string(),
            entry.exercise.clone(),
            kg(entry.weight),
            entry.reps.to_string(),
            kg(entry.one_rep_max),
        ];

        let cells: Vec<Cell> = values
            .into_iter()
            .map(|value| {
                let cell = Cell::new(value);
                if row.is_best {
                    cell.fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}

/// Latest-entry summary
pub fn quick_stats(latest: &WorkoutEntry) -> String {
    format!(
        "  Latest Exercise: {}\n  Latest Weight:   {} kg\n  Estimated 1RM:   {} kg",
        latest.exercise,
        kg(latest.weight),
        kg(latest.one_rep_max)
    )
}

/// 1RM over time as horizontal bars scaled to the best point
pub fn progress_chart(exercise: &str, points: &[ProgressPoint]) -> String {
    let best = points
        .iter()
        .map(|p| p.one_rep_max)
        .fold(0.0_f64, f64::max);

    let mut out = format!("1RM progress: {}\n", exercise);
    for point in points {
        let width = if best > 0.0 {
            ((point.one_rep_max / best) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {}  {:>8} kg  {}\n",
            point.date,
            kg(point.one_rep_max),
            "█".repeat(width)
        ));
    }
    out
}

/// Month grid (weeks start on Monday) followed by the day-of-month counts
pub fn calendar(view: &CalendarView) -> String {
    let mut out = month_grid(view.year, view.month);
    out.push('\n');
    out.push_str("Days with logged workouts:\n");
    for (day, count) in &view.day_counts {
        out.push_str(&format!(
            "- {}/{}/{}: {} workouts\n",
            day, view.month, view.year, count
        ));
    }
    out
}

fn month_grid(year: i32, month: u32) -> String {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return String::new();
    };

    let title = format!("{} {}", MONTH_NAMES[first.month0() as usize], year);
    let mut out = format!("{:^20}\n", title).trim_end().to_string();
    out.push('\n');
    out.push_str("Mo Tu We Th Fr Sa Su\n");

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["  ".to_string(); offset];
    for day in 1..=days_in_month(first) {
        cells.push(format!("{:>2}", day));
    }

    for week in cells.chunks(7) {
        out.push_str(week.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };

    match next {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}
