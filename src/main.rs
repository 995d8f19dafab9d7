/*
 * Responsibility
 * - tokio runtime 起動
 * - app::run() を呼ぶだけ (ロジックは置かない)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    slotchain_api::app::run().await
}
