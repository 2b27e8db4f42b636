pub mod collector;
pub mod eastmoney;
pub mod reconciler;

pub use collector::{BatchCollector, FetchThrottle};
pub use eastmoney::EastmoneyClient;
