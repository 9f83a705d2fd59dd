pub mod anomalies;
pub mod assistant;
pub mod backend;
#[cfg(feature = "gemini")]
pub mod client;
pub mod forecasting;
pub mod prompts;
pub mod reports;
pub mod types;
pub mod utils;

pub use anomalies::*;
pub use assistant::*;
pub use backend::*;
#[cfg(feature = "gemini")]
pub use client::*;
pub use forecasting::*;
pub use reports::*;
pub use types::*;
