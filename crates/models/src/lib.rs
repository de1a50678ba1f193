pub mod client;
pub mod db;
pub mod errors;
pub mod provider;
pub mod user;
pub mod validation;
