use crate::common::is_positive_finite;
use crate::domain::{WavefrontError, WavefrontResult};
use crate::modules::transmission::{CrlSpec, TransmissionRecord};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApertureShape {
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApertureKind {
    /// Transmits inside the opening.
    Aperture,
    /// Blocks inside the opening.
    Obstacle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aperture {
    pub shape: ApertureShape,
    pub kind: ApertureKind,
    /// Horizontal size (diameter for circles) [m].
    pub width: f64,
    /// Vertical size [m].
    pub height: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
}

impl Aperture {
    pub fn rectangular(width: f64, height: f64) -> Self {
        Self {
            shape: ApertureShape::Rectangle,
            kind: ApertureKind::Aperture,
            width,
            height,
            center_x: 0.0,
            center_y: 0.0,
        }
    }

    fn validate(&self) -> WavefrontResult<()> {
        if !is_positive_finite(self.width) || !is_positive_finite(self.height) {
            return Err(WavefrontError::input_validation(
                "INPUT.OPTICAL_ELEMENT",
                format!(
                    "aperture dimensions must be positive, got {} x {}",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }
}

/// Ideal thin lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinLens {
    pub focal_x: f64,
    pub focal_y: f64,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
}

impl ThinLens {
    fn validate(&self) -> WavefrontResult<()> {
        for focal in [self.focal_x, self.focal_y] {
            if !focal.is_finite() || focal == 0.0 {
                return Err(WavefrontError::input_validation(
                    "INPUT.OPTICAL_ELEMENT",
                    format!("lens focal length must be finite and non-zero, got {}", focal),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    /// Length [m].
    pub length: f64,
}

/// Optical element as configured, before any transmission map is tabulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementSpec {
    Aperture(Aperture),
    Lens(ThinLens),
    Crl(CrlSpec),
    Drift(Drift),
}

impl ElementSpec {
    pub fn validate(&self) -> WavefrontResult<()> {
        match self {
            Self::Aperture(aperture) => aperture.validate(),
            Self::Lens(lens) => lens.validate(),
            Self::Crl(crl) => crl.validate(),
            Self::Drift(drift) => {
                if drift.length.is_finite() {
                    Ok(())
                } else {
                    Err(WavefrontError::input_validation(
                        "INPUT.OPTICAL_ELEMENT",
                        "drift length is not finite",
                    ))
                }
            }
        }
    }

    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Aperture(_) => ElementKind::Aperture,
            Self::Lens(_) => ElementKind::Lens,
            Self::Crl(_) => ElementKind::Transmission,
            Self::Drift(_) => ElementKind::Drift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Aperture,
    Lens,
    Transmission,
    Drift,
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Aperture => "aperture",
            Self::Lens => "lens",
            Self::Transmission => "transmission",
            Self::Drift => "drift",
        })
    }
}

/// Optical element ready for propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum OpticalElement {
    Aperture(Aperture),
    Lens(ThinLens),
    Transmission(TransmissionRecord),
    Drift(Drift),
}

impl OpticalElement {
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Aperture(_) => ElementKind::Aperture,
            Self::Lens(_) => ElementKind::Lens,
            Self::Transmission(_) => ElementKind::Transmission,
            Self::Drift(_) => ElementKind::Drift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Aperture, ApertureKind, ApertureShape, Drift, ElementKind, ElementSpec, ThinLens};

    #[test]
    fn element_specs_use_tagged_json() {
        let spec: ElementSpec = serde_json::from_str(
            r#"{ "type": "aperture", "shape": "rectangle", "kind": "aperture", "width": 0.003, "height": 0.001 }"#,
        )
        .expect("aperture spec should parse");
        assert_eq!(spec, ElementSpec::Aperture(Aperture::rectangular(0.003, 0.001)));
        assert_eq!(spec.kind(), ElementKind::Aperture);

        let drift: ElementSpec =
            serde_json::from_str(r#"{ "type": "drift", "length": 38.73 }"#).expect("drift");
        assert_eq!(drift, ElementSpec::Drift(Drift { length: 38.73 }));
        assert_eq!(drift.kind().to_string(), "drift");
    }

    #[test]
    fn degenerate_elements_are_rejected() {
        let aperture = ElementSpec::Aperture(Aperture {
            shape: ApertureShape::Circle,
            kind: ApertureKind::Obstacle,
            width: 0.0,
            height: 1.0e-3,
            center_x: 0.0,
            center_y: 0.0,
        });
        assert_eq!(
            aperture.validate().expect_err("zero width").placeholder(),
            "INPUT.OPTICAL_ELEMENT"
        );

        let lens = ElementSpec::Lens(ThinLens {
            focal_x: 1.0e23,
            focal_y: 0.0,
            center_x: 0.0,
            center_y: 0.0,
        });
        assert!(lens.validate().is_err());

        let drift = ElementSpec::Drift(Drift { length: f64::NAN });
        assert!(drift.validate().is_err());
    }
}
