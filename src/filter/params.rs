//! Filter parameter structures

use crate::object::{Dict, Object};

/// Predictor parameters for FlateDecode, read from `/DecodeParms`
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i32,
    /// Number of color components per sample
    pub colors: i32,
    /// Number of bits per color component
    pub bits_per_component: i32,
    /// Number of samples per row
    pub columns: i32,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    /// Read the parameters from a decode parameter dictionary, falling
    /// back to the defaults of the PDF specification
    pub fn from_dict(dict: &Dict) -> Self {
        let defaults = Self::default();
        let int = |name: &str, fallback: i32| {
            dict.get(name)
                .and_then(Object::as_int)
                .map(|i| i as i32)
                .unwrap_or(fallback)
        };
        Self {
            predictor: int("Predictor", defaults.predictor),
            colors: int("Colors", defaults.colors),
            bits_per_component: int("BitsPerComponent", defaults.bits_per_component),
            columns: int("Columns", defaults.columns),
        }
    }

    /// Bytes per complete pixel, at least one
    pub fn bytes_per_pixel(&self) -> usize {
        let colors = self.colors.max(1) as usize;
        let bits = self.bits_per_component.max(1) as usize;
        (colors * bits).div_ceil(8).max(1)
    }

    /// Bytes per row of samples
    pub fn bytes_per_row(&self) -> usize {
        let colors = self.colors.max(1) as usize;
        let bits = self.bits_per_component.max(1) as usize;
        let columns = self.columns.max(1) as usize;
        (colors * bits * columns).div_ceil(8).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::dict_from;

    #[test]
    fn test_defaults() {
        let params = PredictorParams::default();
        assert_eq!(params.predictor, 1);
        assert_eq!(params.colors, 1);
        assert_eq!(params.bits_per_component, 8);
        assert_eq!(params.columns, 1);
    }

    #[test]
    fn test_from_dict() {
        let dict = dict_from([
            ("Predictor", Object::Int(12)),
            ("Columns", Object::Int(5)),
        ]);
        let params = PredictorParams::from_dict(&dict);
        assert_eq!(params.predictor, 12);
        assert_eq!(params.columns, 5);
        // Unspecified keys keep their defaults
        assert_eq!(params.colors, 1);
        assert_eq!(params.bits_per_component, 8);
    }

    #[test]
    fn test_row_geometry() {
        let params = PredictorParams {
            predictor: 12,
            colors: 3,
            bits_per_component: 8,
            columns: 4,
        };
        assert_eq!(params.bytes_per_pixel(), 3);
        assert_eq!(params.bytes_per_row(), 12);
    }

    #[test]
    fn test_row_geometry_sub_byte() {
        let params = PredictorParams {
            predictor: 2,
            colors: 1,
            bits_per_component: 4,
            columns: 5,
        };
        // 20 bits round up to 3 bytes
        assert_eq!(params.bytes_per_row(), 3);
        assert_eq!(params.bytes_per_pixel(), 1);
    }
}
