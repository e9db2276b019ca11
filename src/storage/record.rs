use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Postgres' own text rendering of `timestamptz`, e.g. `2024-01-01 00:00:00+00`.
const PG_TIMESTAMPTZ: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Last observation for one road segment.
///
/// Serialized with camelCase keys. Decoding matches keys case-insensitively,
/// so `segmentId`, `segmentid`, `SegmentId` and `SEGMENTID` are all accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LiveDataRecord {
    #[sqlx(rename = "segmentid")]
    pub segment_id: i32,
    pub time: DateTime<Utc>,
    pub speed: i32,
}

/// Parse RFC 3339 first, then the form Postgres prints timestamps in.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, PG_TIMESTAMPTZ))
        .map(|t| t.with_timezone(&Utc))
}

enum Field {
    SegmentId,
    Time,
    Speed,
    Other,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a live data field name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Field, E> {
                Ok(if v.eq_ignore_ascii_case("segmentid") {
                    Field::SegmentId
                } else if v.eq_ignore_ascii_case("time") {
                    Field::Time
                } else if v.eq_ignore_ascii_case("speed") {
                    Field::Speed
                } else {
                    Field::Other
                })
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

impl<'de> Deserialize<'de> for LiveDataRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = LiveDataRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a live data record")
            }

            // Repeated keys: last one wins.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LiveDataRecord, A::Error> {
                let mut segment_id = None;
                let mut time = None;
                let mut speed = None;

                while let Some(key) = map.next_key::<Field>()? {
                    match key {
                        Field::SegmentId => segment_id = Some(map.next_value()?),
                        Field::Time => {
                            let raw: String = map.next_value()?;
                            let parsed = parse_time(&raw).map_err(|e| {
                                de::Error::custom(format!("invalid time {raw:?}: {e}"))
                            })?;
                            time = Some(parsed);
                        }
                        Field::Speed => speed = Some(map.next_value()?),
                        Field::Other => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(LiveDataRecord {
                    segment_id: segment_id.ok_or_else(|| de::Error::missing_field("segmentId"))?,
                    time: time.ok_or_else(|| de::Error::missing_field("time"))?,
                    speed: speed.ok_or_else(|| de::Error::missing_field("speed"))?,
                })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode(json: &str) -> Result<LiveDataRecord, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = LiveDataRecord {
            segment_id: 5,
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            speed: 42,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"segmentId": 5, "time": "2024-01-01T00:00:00Z", "speed": 42})
        );
    }

    #[test]
    fn accepts_upper_case_field_names() {
        let record =
            decode(r#"{"SEGMENTID": 7, "TIME": "2024-03-10T12:30:00+01:00", "SPEED": 88}"#)
                .unwrap();
        assert_eq!(record.segment_id, 7);
        assert_eq!(record.time, Utc.with_ymd_and_hms(2024, 3, 10, 11, 30, 0).unwrap());
        assert_eq!(record.speed, 88);
    }

    #[test]
    fn field_names_match_case_insensitively() {
        let expected = LiveDataRecord {
            segment_id: 1,
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            speed: 5,
        };
        for json in [
            r#"{"segmentid": 1, "time": "2024-01-01T00:00:00Z", "speed": 5}"#,
            r#"{"SegmentId": 1, "Time": "2024-01-01T00:00:00Z", "Speed": 5}"#,
            r#"{"segmentId": 1, "time": "2024-01-01T00:00:00Z", "speed": 5, "extra": [1]}"#,
        ] {
            assert_eq!(decode(json).unwrap(), expected, "{json}");
        }
    }

    #[test]
    fn accepts_postgres_timestamp_text() {
        let record =
            decode(r#"{"segmentid": 2, "time": "2024-01-01 02:00:00+02", "speed": 9}"#).unwrap();
        assert_eq!(record.time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let record =
            decode(r#"{"segmentid": 2, "time": "2024-01-01 00:00:00.250+00:00", "speed": 9}"#)
                .unwrap();
        assert_eq!(record.time.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn rejects_unparseable_time_naming_the_value() {
        let err = decode(r#"{"segmentId": 1, "time": "yesterday", "speed": 3}"#).unwrap_err();
        assert!(err.to_string().contains("invalid time \"yesterday\""));
    }

    #[test]
    fn rejects_missing_speed() {
        let err = decode(r#"{"segmentId": 1, "time": "2024-01-01T00:00:00Z"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `speed`"));
    }
}
