pub mod inventory_log;
pub mod swap_request;

pub use inventory_log::LogType;
pub use swap_request::{DoaFlag, SwapStatus};
