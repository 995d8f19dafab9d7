/*
 * Responsibility
 * - v1 handler 共通の request extractor
 */
pub mod api_json;
pub mod auth_ctx;
pub mod public_id;

pub use api_json::ApiJson;
pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
