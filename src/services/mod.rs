/*
 * Responsibility
 * - handler / middleware から使う domain service
 */
pub mod auth;
pub mod id_codec;
pub mod slots;
