pub mod bill;
pub mod currency;
pub mod item;
pub mod ledger;
pub mod participant;
