/*
 * Responsibility
 *  - core と types を束ねる
 *  - handler から見える型・機能を制御する
 */
mod core;
mod types;

pub use types::*;
