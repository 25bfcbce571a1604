use std::future::Future;

use anyhow::Result;

/// Await a step whose failure must not stop the run.
///
/// Errors are logged at debug level and dropped.
pub async fn best_effort<T>(label: &str, step: impl Future<Output = Result<T>>) -> Option<T> {
    match step.await {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{} failed (ignored): {:#}", label, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn test_swallows_errors() {
        assert_eq!(best_effort("ok", async { Ok::<_, anyhow::Error>(3) }).await, Some(3));
        assert_eq!(best_effort("broken", async { Err::<u8, _>(anyhow!("boom")) }).await, None);
    }
}
