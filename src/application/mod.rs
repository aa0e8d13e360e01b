pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod mutation;
pub mod repos;
pub mod uploads;
