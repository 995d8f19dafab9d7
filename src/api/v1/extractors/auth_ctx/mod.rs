/*!
 * 認証コンテキストの extractor
 *
 * Responsibility:
 * - 検証済みの caller (AuthCtx) を handler に渡す
 * - axum まわりは core、型そのものは types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
