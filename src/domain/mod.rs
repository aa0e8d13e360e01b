pub mod cart;
pub mod checkout;
pub mod filter;
pub mod pricing;
