// Sensor backends
// Each one decodes readings the application has already acquired into a raw
// shaft angle; bus and timer access stays outside this crate

pub mod encoder;
pub mod hall;
pub mod magnetic;

// Re-export main types for easier access
pub use encoder::{IncrementalEncoder, IndexMode, PulseCounter};
pub use hall::{HallInputs, HallSensor};
pub use magnetic::{AngleRegister, MagneticEncoder};
