mod beam;
mod config;
mod result;

pub use beam::AnchorConstructor;
pub use config::AnchorBuilder;
pub use config::AnchorConfig;
pub use result::AnchorResult;
