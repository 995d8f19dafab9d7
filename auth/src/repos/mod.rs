pub mod db;
pub mod error;
pub mod memory;
pub mod user_repo;
