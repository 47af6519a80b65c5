pub mod gaps;
pub mod validator;

pub use gaps::GapInterpolator;
pub use validator::{SeriesValidator, ValidationResult, ValidationStats};
