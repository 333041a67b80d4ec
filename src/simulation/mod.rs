pub mod random_bill;
