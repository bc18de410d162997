pub mod error;
pub mod time_value;
pub mod types;

pub mod billing;
pub mod display;
pub mod production;
pub mod savings;
pub mod sizing;
pub mod tariff;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "financing")]
pub mod evaluation;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "lead")]
pub mod lead;

pub use error::SolarFinanceError;
pub use types::*;

/// Standard result type for all solar-finance operations
pub type SolarFinanceResult<T> = Result<T, SolarFinanceError>;
