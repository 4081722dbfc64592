pub mod accumulation;
pub mod intensity;
pub mod optics;
pub mod pipeline;
pub mod serialization;
pub mod source;
pub mod transmission;

mod dispatch;
mod traits;

pub use dispatch::{
    DryRunEngine, EngineKind, engine_available, engine_for, engine_unavailable_error,
};
pub use traits::{FieldRequest, RadiationEngine};
