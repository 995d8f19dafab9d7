/*
 * Responsibility
 * - v1 の module ツリー (app から使うのは routes() だけ)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
