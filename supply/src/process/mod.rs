pub mod constants;
pub mod deposit;

pub use deposit::DepositWorkflow;
