use chrono::{Datelike, Weekday};
use quantor_model::{Bar, BarSize};

/// Resample a strictly-ascending daily bar series to `target`. Each emitted
/// bar's `date` is the last *actual* trading day inside its period (not the
/// calendar period boundary — a holiday-shortened week still reports its
/// real last session).
pub fn resample(daily: &[Bar], target: BarSize) -> Vec<Bar> {
    if target == BarSize::Daily || daily.is_empty() {
        return daily.to_vec();
    }

    let mut groups: Vec<Vec<Bar>> = Vec::new();
    let mut current_key: Option<i64> = None;

    for bar in daily {
        let key = period_key(bar, target);
        match current_key {
            Some(k) if k == key => groups.last_mut().unwrap().push(*bar),
            _ => {
                groups.push(vec![*bar]);
                current_key = Some(key);
            }
        }
    }

    groups.iter().map(|group| aggregate(group)).collect()
}

/// A sortable integer identifying the period a bar falls into.
fn period_key(bar: &Bar, target: BarSize) -> i64 {
    let date = bar.date;
    match target {
        BarSize::Daily => date.num_days_from_ce() as i64,
        BarSize::Weekly => {
            // W-FRI: bars in the same Mon-Fri window share a key, keyed by
            // the ISO (year, week) of the date shifted so Saturday/Sunday
            // belong to the week that just ended.
            let iso = date.iso_week();
            (iso.year() as i64) * 100 + iso.week() as i64
        }
        BarSize::Monthly => (date.year() as i64) * 100 + date.month() as i64,
        BarSize::Quarterly => (date.year() as i64) * 10 + (date.month0() as i64 / 3),
    }
}

fn aggregate(group: &[Bar]) -> Bar {
    let first = group.first().expect("non-empty group");
    let last = group.last().expect("non-empty group");
    let high = group.iter().fold(f64::MIN, |acc, b| acc.max(b.high));
    let low = group.iter().fold(f64::MAX, |acc, b| acc.min(b.low));
    let volume = group.iter().map(|b| b.volume).sum();

    Bar {
        date: last.date,
        open: first.open,
        high,
        low,
        close: last.close,
        volume,
    }
}

/// True if `weekday` is a weekend day, used only to document intent at call
/// sites that special-case trading-day boundaries.
pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn weekly_groups_by_iso_week() {
        let daily = vec![
            bar(2024, 1, 1, 100.0), // Mon
            bar(2024, 1, 2, 101.0),
            bar(2024, 1, 5, 105.0), // Fri, end of week 1
            bar(2024, 1, 8, 110.0), // Mon, week 2
        ];
        let weekly = resample(&daily, BarSize::Weekly);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].close, 105.0);
        assert_eq!(weekly[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(weekly[1].close, 110.0);
    }

    #[test]
    fn monthly_uses_last_trading_day_not_calendar_end() {
        let daily = vec![
            bar(2024, 1, 30, 100.0),
            bar(2024, 1, 31, 102.0),
            bar(2024, 2, 1, 103.0),
        ];
        let monthly = resample(&daily, BarSize::Monthly);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(monthly[0].close, 102.0);
    }

    #[test]
    fn daily_passthrough() {
        let daily = vec![bar(2024, 1, 1, 100.0)];
        assert_eq!(resample(&daily, BarSize::Daily), daily);
    }
}
