pub mod bills;
pub mod debts;
pub mod goals;
pub mod notifications;
pub mod reconcile;
pub mod sources;
