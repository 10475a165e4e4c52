use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::postgres::types::{PgInterval, PgTimeTz};
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use uuid::Uuid;

/// Converts a result row into a JSON object keyed by column name.
///
/// NUMERIC is rendered as a string so no precision is lost, INTERVAL as an
/// ISO-8601 duration. Results arrive in binary format, so a column type with
/// no arm here (Redshift SUPER or VARBYTE, for instance) only survives if it
/// is text-like; anything else is `null`.
pub fn row_to_json(row: &PgRow) -> Map<String, Value> {
    row.columns()
        .iter()
        .map(|column| {
            let value = column_value(row, column.ordinal(), column.type_info().name());
            (column.name().to_string(), value)
        })
        .collect()
}

fn column_value(row: &PgRow, idx: usize, type_name: &str) -> Value {
    match type_name {
        "BOOL" => decode::<bool>(row, idx).map(Value::Bool),
        "INT2" => decode::<i16>(row, idx).map(Value::from),
        "INT4" => decode::<i32>(row, idx).map(Value::from),
        "INT8" => decode::<i64>(row, idx).map(Value::from),
        "FLOAT4" => decode::<f32>(row, idx).map(|v| Value::from(f64::from(v))),
        "FLOAT8" => decode::<f64>(row, idx).map(Value::from),
        "NUMERIC" => decode::<Decimal>(row, idx).map(|v| Value::String(v.to_string())),
        "DATE" => decode::<NaiveDate>(row, idx).map(|v| Value::String(v.to_string())),
        "TIME" => decode::<NaiveTime>(row, idx).map(|v| Value::String(v.to_string())),
        "TIMETZ" => decode::<PgTimeTz<NaiveTime, FixedOffset>>(row, idx)
            .map(|v| Value::String(format!("{}{}", v.time, v.offset))),
        "TIMESTAMP" => decode::<NaiveDateTime>(row, idx)
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "TIMESTAMPTZ" => decode::<DateTime<Utc>>(row, idx).map(|v| Value::String(v.to_rfc3339())),
        "INTERVAL" => decode::<PgInterval>(row, idx).map(|v| Value::String(interval_to_iso8601(&v))),
        "UUID" => decode::<Uuid>(row, idx).map(|v| Value::String(v.to_string())),
        "JSON" | "JSONB" => decode::<Value>(row, idx),
        _ => decode::<String>(row, idx).map(Value::String),
    }
    .unwrap_or(Value::Null)
}

// SQL NULL and undecodable values both come back as None.
fn decode<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get::<Option<T>, _>(idx).ok().flatten()
}

/// `P<months>M<days>DT<seconds>S`, keeping months and days separate the way
/// Postgres stores them.
fn interval_to_iso8601(interval: &PgInterval) -> String {
    let sign = if interval.microseconds < 0 { "-" } else { "" };
    let micros = interval.microseconds.unsigned_abs();
    let (secs, frac) = (micros / 1_000_000, micros % 1_000_000);
    let seconds = if frac == 0 {
        secs.to_string()
    } else {
        let frac = format!("{frac:06}");
        format!("{secs}.{}", frac.trim_end_matches('0'))
    };
    format!("P{}M{}DT{sign}{seconds}S", interval.months, interval.days)
}
