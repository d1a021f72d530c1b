//! Serde `with` modules for the `timestamptz` columns of the backend.
//!
//! The export writes them as RFC 3339 strings with an offset and, most of the
//! time, fractional seconds (`2024-04-28T16:12:45.123+00:00`). They are read
//! into [DateTime<Utc>] whatever the offset, and written back with
//! [DateTime::to_rfc3339].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserializer, Serializer};

pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339())
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    d.deserialize_str(TimestampVisitor)
}

fn parse<E: de::Error>(timestamp: &str) -> Result<DateTime<Utc>, E> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| E::custom(format!("invalid timestamp `{timestamp}`: {e}")))
}

struct TimestampVisitor;
impl de::Visitor<'_> for TimestampVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an RFC 3339 timestamp")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse(v)
    }
}

/// Nullable timestamps, e.g. the publication date of a draft.
pub mod option {
    use std::fmt;

    use chrono::{DateTime, Utc};
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => serializer.serialize_some(&at.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        d.deserialize_option(NullableVisitor)
    }

    struct NullableVisitor;
    impl<'de> de::Visitor<'de> for NullableVisitor {
        type Value = Option<DateTime<Utc>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("null or an RFC 3339 timestamp")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            super::deserialize(d).map(Some)
        }
    }
}
