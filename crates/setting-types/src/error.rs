/// An out-of-range or inconsistent parameter, named by field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid parameter `{field}` = {value}: {reason}")]
pub struct ParameterError {
    pub field: &'static str,
    pub value: f64,
    pub reason: String,
}

impl ParameterError {
    pub fn new(field: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self {
            field,
            value,
            reason: reason.into(),
        }
    }
}

/// Require a finite, strictly positive value.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::new(field, value, "must be a positive finite length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_nan_and_negative() {
        assert!(positive("w", 1.0).is_ok());
        assert!(positive("w", 0.0).is_err());
        assert!(positive("w", -2.0).is_err());
        assert!(positive("w", f64::NAN).is_err());
        assert!(positive("w", f64::INFINITY).is_err());
    }

    #[test]
    fn message_names_field_and_value() {
        let e = ParameterError::new("depth", -1.5, "must be a positive finite length");
        assert_eq!(
            e.to_string(),
            "invalid parameter `depth` = -1.5: must be a positive finite length"
        );
    }
}
