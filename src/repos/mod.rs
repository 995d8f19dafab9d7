/*
 * Responsibility
 * - 永続化まわり (trait + Postgres / in-memory 実装)
 */
pub mod booking_repo;
pub mod db;
pub mod error;
pub mod memory;
pub mod notification_repo;
pub mod station_repo;
