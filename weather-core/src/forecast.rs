//! Reduction of the provider's 3-hourly forecast series to one reading per day.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike};

use crate::model::{ForecastDay, ForecastSample, capitalize};

/// Maximum number of days shown on the forecast page.
pub const FORECAST_DAYS: usize = 5;

const MIDDAY_HOUR: i64 = 12;

/// Groups `samples` by calendar date in `tz` and keeps, for each date, the
/// sample whose hour is closest to noon. The first sample at the minimum
/// distance wins. Days come back in ascending order, at most [`FORECAST_DAYS`].
pub fn reduce_to_daily<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<ForecastDay> {
    let mut buckets: BTreeMap<NaiveDate, (i64, &ForecastSample)> = BTreeMap::new();

    for sample in samples {
        let Some(utc) = DateTime::from_timestamp(sample.timestamp, 0) else {
            tracing::debug!(timestamp = sample.timestamp, "skipping out-of-range forecast sample");
            continue;
        };
        let local = utc.with_timezone(tz);
        let score = (i64::from(local.hour()) - MIDDAY_HOUR).abs();

        buckets
            .entry(local.date_naive())
            .and_modify(|best| {
                if score < best.0 {
                    *best = (score, sample);
                }
            })
            .or_insert((score, sample));
    }

    buckets
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, (_, sample))| ForecastDay {
            date,
            temperature: sample.temperature,
            description: capitalize(&sample.description),
            icon_id: sample.icon_id.clone(),
            icon: None,
        })
        .collect()
}
