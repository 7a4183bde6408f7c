//! # Fixtures
//!
//! Builders for synthetic logs.

use chrono::{DateTime, TimeDelta, Utc};
use wx_log_data::{
    CurveInfo, CurveValue, Direction, IndexType, IndexValue, LogFixture, LogHeader, LogReference,
};

/// Reference used by single-log fixtures.
pub fn reference(log: &str) -> LogReference {
    LogReference::new("W-INT", "WB-INT", log)
}

/// Depth log with an index curve `DEPTH` stored after `GR` and `RHOB`.
///
/// `GR` carries `depth * 2` so values can be checked against their index.
pub fn depth_log(log: &str, direction: Direction, depths: &[f64]) -> LogFixture {
    LogFixture {
        header: LogHeader {
            reference: reference(log),
            name: format!("{log} depth"),
            index_type: IndexType::Depth,
            direction,
            index_curve: Some("DEPTH".into()),
            start_index: depths.first().map(|d| IndexValue::Depth(*d)),
            end_index: depths.last().map(|d| IndexValue::Depth(*d)),
            object_growing: false,
            curves: vec![
                CurveInfo::new("GR", "gAPI"),
                CurveInfo::new("RHOB", "g/cm3"),
                CurveInfo::new("DEPTH", "m"),
            ],
        },
        mnemonics: vec!["GR".into(), "RHOB".into(), "DEPTH".into()],
        units: vec!["gAPI".into(), "g/cm3".into(), "m".into()],
        rows: depths
            .iter()
            .map(|d| vec![CurveValue::Number(d * 2.0), CurveValue::Number(2.3), CurveValue::Number(*d)])
            .collect(),
    }
}

/// Date-time log sampled every `step_secs` seconds from `start`.
pub fn time_log(log: &str, start: DateTime<Utc>, step_secs: i64, samples: usize) -> LogFixture {
    let times: Vec<DateTime<Utc>> = (0..samples)
        .map(|i| start + TimeDelta::seconds(step_secs * i as i64))
        .collect();
    LogFixture {
        header: LogHeader {
            reference: reference(log),
            name: format!("{log} realtime"),
            index_type: IndexType::DateTime,
            direction: Direction::Increasing,
            index_curve: Some("TIME".into()),
            start_index: times.first().map(|t| IndexValue::DateTime(*t)),
            end_index: times.last().map(|t| IndexValue::DateTime(*t)),
            object_growing: true,
            curves: vec![CurveInfo::new("ROP", "m/h"), CurveInfo::new("TIME", "datetime")],
        },
        mnemonics: vec!["ROP".into(), "TIME".into()],
        units: vec!["m/h".into(), "datetime".into()],
        rows: times.iter().map(time_row).collect(),
    }
}

/// One date-time log row, `ROP` then `TIME`.
pub fn time_row(time: &DateTime<Utc>) -> Vec<CurveValue> {
    vec![
        CurveValue::Number(10.0),
        CurveValue::Text(IndexValue::DateTime(*time).to_string()),
    ]
}
