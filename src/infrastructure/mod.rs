pub mod ledger;
pub mod notifier;
pub mod swap_executor;
pub mod wallet;
