/*
 * Responsibility
 * - middleware 層の公開窓口 (各 module が `apply` を持つ)
 */
pub mod auth;
pub mod cors;
pub mod http;
