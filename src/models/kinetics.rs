//! Shared kinetic terms and parameter guards used by all reactor models.

use crate::simulation::error::ConfigurationError;

/// Monod saturation term `max_rate * substrate / (half_saturation + substrate)`.
///
/// A substrate concentration of exactly zero yields exactly zero, even for a
/// zero half-saturation constant. Negative concentrations (solver overshoot)
/// are evaluated as-is.
#[inline]
pub fn monod(max_rate: f64, half_saturation: f64, substrate: f64) -> f64 {
    if substrate == 0.0 {
        return 0.0;
    }
    max_rate * substrate / (half_saturation + substrate)
}

/// Rejects negative or non-finite parameter values.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), ConfigurationError> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigurationError::NegativeParameter {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// Rejects zero, negative or non-finite parameter values.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<(), ConfigurationError> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(ConfigurationError::NonPositiveParameter {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn ensure_finite(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() {
        return Err(ConfigurationError::NonFiniteParameter {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monod_zero_substrate() {
        assert_eq!(monod(0.5, 5.0, 0.0), 0.0);
        // Would be 0/0 without the guard
        assert_eq!(monod(0.5, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_monod_half_saturation() {
        assert_eq!(monod(0.5, 5.0, 5.0), 0.25);
    }

    #[test]
    fn test_monod_negative_substrate_is_defined() {
        let rate = monod(0.5, 5.0, -1.0);
        assert!(rate.is_finite());
        assert!(rate < 0.0);
    }

    #[test]
    fn test_guards() {
        assert!(ensure_non_negative("Q", 0.0).is_ok());
        assert!(ensure_positive("V", 100.0).is_ok());

        assert_eq!(
            ensure_non_negative("Q", -1.0),
            Err(ConfigurationError::NegativeParameter {
                name: "Q".to_string(),
                value: -1.0
            })
        );
        assert!(matches!(
            ensure_positive("V", 0.0),
            Err(ConfigurationError::NonPositiveParameter { .. })
        ));
        assert!(matches!(
            ensure_non_negative("mu_max", f64::NAN),
            Err(ConfigurationError::NonFiniteParameter { .. })
        ));
    }
}
