use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ConsentStatus {
    Pending => "pending",
    Approved => "approved",
    Denied => "denied",
});

str_enum!(AppointmentStatus {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn consent_status_round_trip() {
        for (variant, s) in [
            (ConsentStatus::Pending, "pending"),
            (ConsentStatus::Approved, "approved"),
            (ConsentStatus::Denied, "denied"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ConsentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Upcoming, "upcoming"),
            (AppointmentStatus::Completed, "completed"),
            (AppointmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_database_strings() {
        let json = serde_json::to_string(&ConsentStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        let parsed: ConsentStatus = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(parsed, ConsentStatus::Denied);
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = ConsentStatus::from_str("maybe").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }
}
