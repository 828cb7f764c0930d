//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the data directory exists, creating it when missing.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        warn!(%data_dir, "data directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    info!(%data_dir, "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_data_dir_creates_nested_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("feedback_env_{}", uuid::Uuid::new_v4()));
        let nested = root.join("a/b");
        let nested_str = nested.to_string_lossy().to_string();

        ensure_data_dir(&nested_str).await?;
        assert!(tokio::fs::metadata(&nested).await?.is_dir());

        // second call is a no-op
        ensure_data_dir(&nested_str).await?;

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
