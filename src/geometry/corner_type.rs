use crate::error::{PackError, Result};

/// How offset rails are joined where the path turns.
///
/// The discriminants are the packed wire ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CornerType {
    /// Arc around the inner corner, tessellated in 5° steps.
    #[default]
    Rounded = 0,
    /// Rails extended to their intersection.
    Mitered = 1,
    /// Rails cut by a single chord.
    Beveled = 2,
}

impl CornerType {
    /// Returns the packed ordinal.
    #[must_use]
    pub fn ordinal(self) -> f64 {
        f64::from(self as u8)
    }

    /// Decodes a packed ordinal.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidCornerType`] for anything but `0`, `1` or `2`.
    #[allow(clippy::float_cmp)]
    pub fn from_ordinal(value: f64) -> Result<Self> {
        match value {
            v if v == 0.0 => Ok(Self::Rounded),
            v if v == 1.0 => Ok(Self::Mitered),
            v if v == 2.0 => Ok(Self::Beveled),
            _ => Err(PackError::InvalidCornerType(value).into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_wire_format() {
        assert_eq!(CornerType::Rounded.ordinal(), 0.0);
        assert_eq!(CornerType::Mitered.ordinal(), 1.0);
        assert_eq!(CornerType::Beveled.ordinal(), 2.0);
    }

    #[test]
    fn decode_each_ordinal() {
        for corner in [CornerType::Rounded, CornerType::Mitered, CornerType::Beveled] {
            assert_eq!(CornerType::from_ordinal(corner.ordinal()).unwrap(), corner);
        }
    }

    #[test]
    fn decode_rejects_unknown() {
        assert!(CornerType::from_ordinal(3.0).is_err());
        assert!(CornerType::from_ordinal(1.5).is_err());
        assert!(CornerType::from_ordinal(f64::NAN).is_err());
    }

    #[test]
    fn default_is_rounded() {
        assert_eq!(CornerType::default(), CornerType::Rounded);
    }
}
