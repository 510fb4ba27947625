pub mod errors;
pub mod is_authenticated;
pub mod login;
pub mod logout;
pub mod models;
pub mod ports;
