mod element;
mod propagation;

pub use element::{
    Aperture, ApertureKind, ApertureShape, Drift, ElementKind, ElementSpec, OpticalElement,
    ThinLens,
};
pub use propagation::{PROPAGATION_PARAM_COUNT, PropagationParams};

use crate::domain::{WavefrontError, WavefrontResult};
use crate::modules::traits::RadiationEngine;
use crate::modules::transmission::TransmissionRecord;
use serde::{Deserialize, Serialize};

/// One configured element together with the instructions for propagating through it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamlineEntrySpec {
    #[serde(flatten)]
    pub element: ElementSpec,
    pub propagation: PropagationParams,
}

impl BeamlineEntrySpec {
    pub const fn new(element: ElementSpec, propagation: PropagationParams) -> Self {
        Self {
            element,
            propagation,
        }
    }
}

/// Ordered beamline description as it appears in a run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamlineSpec {
    pub entries: Vec<BeamlineEntrySpec>,
}

impl BeamlineSpec {
    pub fn new(entries: Vec<BeamlineEntrySpec>) -> Self {
        Self { entries }
    }

    pub fn validate(&self) -> WavefrontResult<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            entry.element.validate().map_err(|error| {
                WavefrontError::new(
                    error.category(),
                    error.placeholder(),
                    format!(
                        "beamline element {} ({}): {}",
                        index,
                        entry.element.kind(),
                        error.message()
                    ),
                )
            })?;
            entry.propagation.validate()?;
        }
        Ok(())
    }

    /// Turns every CRL description into a transmission record through `engine`.
    pub fn assemble<E>(&self, engine: &E) -> WavefrontResult<Beamline>
    where
        E: RadiationEngine + ?Sized,
    {
        self.validate()?;
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let element = match entry.element {
                ElementSpec::Aperture(aperture) => OpticalElement::Aperture(aperture),
                ElementSpec::Lens(lens) => OpticalElement::Lens(lens),
                ElementSpec::Drift(drift) => OpticalElement::Drift(drift),
                ElementSpec::Crl(crl) => OpticalElement::Transmission(engine.setup_crl(&crl)?),
            };
            entries.push(BeamlineEntry {
                element,
                propagation: entry.propagation,
            });
        }
        Ok(Beamline { entries })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamlineEntry {
    element: OpticalElement,
    propagation: PropagationParams,
}

impl BeamlineEntry {
    pub fn new(element: OpticalElement, propagation: PropagationParams) -> Self {
        Self {
            element,
            propagation,
        }
    }

    pub fn element(&self) -> &OpticalElement {
        &self.element
    }

    pub fn propagation(&self) -> &PropagationParams {
        &self.propagation
    }
}

/// Ordered optical elements, each paired with its propagation parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Beamline {
    entries: Vec<BeamlineEntry>,
}

impl Beamline {
    pub fn new(entries: Vec<BeamlineEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BeamlineEntry] {
        &self.entries
    }

    pub fn elements(&self) -> impl Iterator<Item = &OpticalElement> + '_ {
        self.entries.iter().map(BeamlineEntry::element)
    }

    pub fn propagation_params(&self) -> impl Iterator<Item = &PropagationParams> + '_ {
        self.entries.iter().map(BeamlineEntry::propagation)
    }

    pub fn transmissions(&self) -> impl Iterator<Item = &TransmissionRecord> + '_ {
        self.elements().filter_map(|element| match element {
            OpticalElement::Transmission(record) => Some(record),
            _ => None,
        })
    }

    /// Sum of all drift lengths [m].
    pub fn total_drift_length(&self) -> f64 {
        self.elements()
            .map(|element| match element {
                OpticalElement::Drift(drift) => drift.length,
                _ => 0.0,
            })
            .sum()
    }
}
