pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod limiter;
pub mod output;
pub mod prompts;
pub mod providers;
pub mod session;

pub use config::{GuidanceConfig, Provider};
pub use dispatch::{GuidanceDispatcher, GuidanceReply, ProviderStatus};
pub use error::GuidanceError;
pub use prompts::{Phase, PromptPair};
