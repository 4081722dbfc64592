use crate::common::is_positive_finite;
use crate::domain::{WavefrontError, WavefrontResult};
use serde::{Deserialize, Serialize};

pub const PROPAGATION_PARAM_COUNT: usize = 12;

/// Resizing and precision instructions applied when propagating through one element.
///
/// Serialized as the conventional flat 12-value tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 12]", into = "[f64; 12]")]
pub struct PropagationParams {
    pub auto_resize_before: bool,
    pub auto_resize_after: bool,
    /// Relative precision for propagation with auto-resizing (1.0 is nominal).
    pub resize_precision: f64,
    /// Semi-analytical treatment of the quadratic phase terms.
    pub semi_analytical_phase: bool,
    pub resize_on_fourier_side: bool,
    pub horizontal_range_factor: f64,
    pub horizontal_resolution_factor: f64,
    pub vertical_range_factor: f64,
    pub vertical_resolution_factor: f64,
    pub shift_kind: u8,
    pub shift_x: f64,
    pub shift_y: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            auto_resize_before: false,
            auto_resize_after: false,
            resize_precision: 1.0,
            semi_analytical_phase: false,
            resize_on_fourier_side: false,
            horizontal_range_factor: 1.0,
            horizontal_resolution_factor: 1.0,
            vertical_range_factor: 1.0,
            vertical_resolution_factor: 1.0,
            shift_kind: 0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

impl PropagationParams {
    pub fn from_array(values: [f64; PROPAGATION_PARAM_COUNT]) -> WavefrontResult<Self> {
        let params = Self {
            auto_resize_before: flag(values[0], 0)?,
            auto_resize_after: flag(values[1], 1)?,
            resize_precision: values[2],
            semi_analytical_phase: flag(values[3], 3)?,
            resize_on_fourier_side: flag(values[4], 4)?,
            horizontal_range_factor: values[5],
            horizontal_resolution_factor: values[6],
            vertical_range_factor: values[7],
            vertical_resolution_factor: values[8],
            shift_kind: shift_kind(values[9])?,
            shift_x: values[10],
            shift_y: values[11],
        };
        params.validate()?;
        Ok(params)
    }

    pub fn as_array(&self) -> [f64; PROPAGATION_PARAM_COUNT] {
        [
            bool_value(self.auto_resize_before),
            bool_value(self.auto_resize_after),
            self.resize_precision,
            bool_value(self.semi_analytical_phase),
            bool_value(self.resize_on_fourier_side),
            self.horizontal_range_factor,
            self.horizontal_resolution_factor,
            self.vertical_range_factor,
            self.vertical_resolution_factor,
            f64::from(self.shift_kind),
            self.shift_x,
            self.shift_y,
        ]
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        for (value, label) in [
            (self.resize_precision, "resize precision"),
            (self.horizontal_range_factor, "horizontal range factor"),
            (self.horizontal_resolution_factor, "horizontal resolution factor"),
            (self.vertical_range_factor, "vertical range factor"),
            (self.vertical_resolution_factor, "vertical resolution factor"),
        ] {
            if !is_positive_finite(value) {
                return Err(WavefrontError::input_validation(
                    "INPUT.PROPAGATION_PARAMS",
                    format!("propagation {} must be positive, got {}", label, value),
                ));
            }
        }
        if !self.shift_x.is_finite() || !self.shift_y.is_finite() {
            return Err(WavefrontError::input_validation(
                "INPUT.PROPAGATION_PARAMS",
                "propagation shift position is not finite",
            ));
        }
        Ok(())
    }

    pub fn resizes(&self) -> bool {
        self.auto_resize_before
            || self.auto_resize_after
            || self.horizontal_range_factor != 1.0
            || self.horizontal_resolution_factor != 1.0
            || self.vertical_range_factor != 1.0
            || self.vertical_resolution_factor != 1.0
    }
}

impl TryFrom<[f64; PROPAGATION_PARAM_COUNT]> for PropagationParams {
    type Error = WavefrontError;

    fn try_from(values: [f64; PROPAGATION_PARAM_COUNT]) -> Result<Self, Self::Error> {
        Self::from_array(values)
    }
}

impl From<PropagationParams> for [f64; PROPAGATION_PARAM_COUNT] {
    fn from(params: PropagationParams) -> Self {
        params.as_array()
    }
}

fn flag(value: f64, index: usize) -> WavefrontResult<bool> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(WavefrontError::input_validation(
            "INPUT.PROPAGATION_PARAMS",
            format!(
                "propagation parameter [{}] is a switch and must be 0 or 1, got {}",
                index, value
            ),
        ))
    }
}

fn shift_kind(value: f64) -> WavefrontResult<u8> {
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(WavefrontError::input_validation(
            "INPUT.PROPAGATION_PARAMS",
            format!("wavefront shift type must be a small integer, got {}", value),
        ))
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::PropagationParams;

    #[test]
    fn drift_tuple_maps_onto_named_fields() {
        let params = PropagationParams::from_array([
            0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.2, 1.0, 1.0, 0.0, 0.0, 0.0,
        ])
        .expect("drift parameters are valid");
        assert!(params.semi_analytical_phase);
        assert!(!params.auto_resize_before);
        assert_eq!(params.horizontal_resolution_factor, 1.2);
        assert!(params.resizes());
        assert_eq!(
            params.as_array(),
            [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.2, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn default_parameters_do_not_resize() {
        assert!(!PropagationParams::default().resizes());
    }

    #[test]
    fn switches_reject_fractional_values() {
        let error = PropagationParams::from_array([
            0.5, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0,
        ])
        .expect_err("0.5 is not a switch");
        assert_eq!(error.placeholder(), "INPUT.PROPAGATION_PARAMS");
        assert!(error.message().contains("[0]"));
    }

    #[test]
    fn serde_uses_flat_tuple() {
        let params: PropagationParams =
            serde_json::from_str("[0, 0, 1.0, 0, 0, 1.5, 1.0, 1.1, 8.0, 0, 0, 0]")
                .expect("aperture tuple should parse");
        assert_eq!(params.horizontal_range_factor, 1.5);
        assert_eq!(params.vertical_resolution_factor, 8.0);
        let json = serde_json::to_string(&params).expect("serialize params");
        assert_eq!(
            json,
            "[0.0,0.0,1.0,0.0,0.0,1.5,1.0,1.1,8.0,0.0,0.0,0.0]"
        );

        assert!(
            serde_json::from_str::<PropagationParams>("[0, 0, 0.0, 0, 0, 1, 1, 1, 1, 0, 0, 0]")
                .is_err()
        );
    }
}
