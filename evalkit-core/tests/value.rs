#[cfg(test)]
mod tests {
    use evalkit_core::{AsValue, ClientError, IsolationLevel, Passive, Value, error_code};
    use time::macros::{date, datetime, time};

    #[test]
    fn integers_accept_wider_variants() {
        assert_eq!(i32::try_from_value(Value::Int64(Some(42))).unwrap(), 42);
        assert_eq!(u8::try_from_value(Value::Int64(Some(200))).unwrap(), 200);
        assert!(i8::try_from_value(Value::Int64(Some(300))).is_err());
        assert!(u32::try_from_value(Value::Int32(Some(-1))).is_err());
        assert_eq!(i64::try_from_value(Value::Varchar(Some(" 17 ".into()))).unwrap(), 17);
    }

    #[test]
    fn booleans_accept_integers() {
        assert!(bool::try_from_value(Value::Int64(Some(1))).unwrap());
        assert!(!bool::try_from_value(Value::Int64(Some(0))).unwrap());
        assert!(bool::try_from_value(Value::Boolean(Some(true))).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("maybe".into()))).is_err());
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::try_from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert_eq!(f64::try_from_value(Value::Float64(Some(4.5))).unwrap(), 4.5);
        assert!(f64::try_from_value(Value::Varchar(Some("x".into()))).is_err());
    }

    #[test]
    fn temporal_values_parse_text() {
        assert_eq!(
            time::PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2025-03-01 10:20:30".into()
            )))
            .unwrap(),
            datetime!(2025-03-01 10:20:30)
        );
        assert_eq!(
            time::PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2025-03-01T10:20:30.25".into()
            )))
            .unwrap(),
            datetime!(2025-03-01 10:20:30.25)
        );
        assert_eq!(
            time::Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            time::Time::try_from_value(Value::Varchar(Some("08:15".into()))).unwrap(),
            time!(8:15)
        );
        assert!(time::Date::try_from_value(Value::Varchar(Some("yesterday".into()))).is_err());
        assert_eq!(
            time::OffsetDateTime::try_from_value(Value::Varchar(Some(
                "2025-03-01 10:20:30+02:00".into()
            )))
            .unwrap(),
            datetime!(2025-03-01 10:20:30 +2)
        );
        assert_eq!(
            <time::OffsetDateTime as AsValue>::parse("2025-03-01 10:20:30").unwrap(),
            datetime!(2025-03-01 10:20:30 UTC)
        );
    }

    #[test]
    fn option_and_passive() {
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::try_from_value(Value::Varchar(Some("a".into()))).unwrap(),
            Some("a".to_string())
        );
        assert!(matches!(None::<i32>.as_value(), Value::Int32(None)));
        assert_eq!(
            Passive::<i32>::try_from_value(Value::Int64(Some(9))).unwrap(),
            Passive::Set(9)
        );
        assert!(matches!(Passive::<i32>::NotSet.as_value(), Value::Int32(None)));
        assert!(!Passive::<i32>::NotSet.is_set());
    }

    #[test]
    fn value_equality() {
        assert_eq!(Value::Int32(None), Value::Varchar(None));
        assert_eq!(Value::Int32(Some(1)), Value::Int32(Some(1)));
        assert_ne!(Value::Int32(Some(1)), Value::Int64(Some(1)));
        assert!(Value::Float64(Some(1.0)).is_numeric());
        assert!(!Value::Varchar(Some("1".into())).is_numeric());
        assert!(matches!(Value::Date(Some(date!(2020 - 01 - 01))).as_null(), Value::Date(None)));
    }

    #[test]
    fn isolation_level_from_str() {
        assert_eq!(
            "ReadCommitted".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::ReadCommitted
        );
        assert_eq!(
            "repeatable read".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::RepeatableRead
        );
        let error = "whatever".parse::<IsolationLevel>().unwrap_err();
        assert!(matches!(
            ClientError::of(&error),
            Some(ClientError::Validation(..))
        ));
    }

    #[test]
    fn error_code_survives_context() {
        let error = anyhow::Error::from(ClientError::known("P2002", "duplicate"))
            .context("While creating a record");
        assert_eq!(error_code(&error), Some("P2002"));
        assert_eq!(error_code(&anyhow::Error::msg("plain")), None);
    }
}
