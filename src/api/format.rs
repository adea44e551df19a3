use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const UNITS: &[(i64, &str)] = &[
    (YEAR, "year"),
    (MONTH, "month"),
    (WEEK, "week"),
    (DAY, "day"),
    (HOUR, "hour"),
    (MINUTE, "minute"),
];

/// Render a timestamp relative to `now`: "now", "a minute ago", "3 hours ago",
/// "2 days, 4 hours ago", "5 minutes from now".
pub fn naturaltime(value: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - value).num_seconds();
    if seconds == 0 {
        return "now".to_string();
    }

    let (magnitude, suffix) = if seconds > 0 { (seconds, "ago") } else { (-seconds, "from now") };
    let phrase = if magnitude < MINUTE {
        counted(magnitude, "a second", "seconds")
    } else if magnitude < HOUR {
        counted(magnitude / MINUTE, "a minute", "minutes")
    } else if magnitude < DAY {
        counted(magnitude / HOUR, "an hour", "hours")
    } else {
        timesince(magnitude)
    };
    format!("{} {}", phrase, suffix)
}

fn counted(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        one.to_string()
    } else {
        format!("{} {}", n, many)
    }
}

/// Largest unit plus the adjacent smaller one, if non-zero: "1 year, 2 months"
fn timesince(seconds: i64) -> String {
    let Some(index) = UNITS.iter().position(|(size, _)| seconds >= *size) else {
        return "0 minutes".to_string();
    };

    let (size, name) = UNITS[index];
    let first = seconds / size;
    let mut out = unit(first, name);

    if let Some(&(next_size, next_name)) = UNITS.get(index + 1) {
        let second = (seconds - first * size) / next_size;
        if second > 0 {
            out.push_str(", ");
            out.push_str(&unit(second, next_name));
        }
    }
    out
}

fn unit(n: i64, name: &str) -> String {
    if n == 1 {
        format!("1 {}", name)
    } else {
        format!("{} {}s", n, name)
    }
}
