pub mod amount;
pub mod normalizer;
