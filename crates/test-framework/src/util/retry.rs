/*!
   Bounded fixed-delay retry, used around image pulls, tx-hash lookups
   after broadcast, and the first height probe after container start.
   Everything else in the framework fails fast.
*/

use core::future::Future;
use core::time::Duration;

use tracing::{debug, trace};

use crate::error::Error;

/// Call `task` up to `attempts` times with `delay` between attempts,
/// returning the first success or the last error.
pub async fn retry_task<T, F, Fut>(
    description: &str,
    attempts: u16,
    delay: Duration,
    mut task: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut last_err = None;

    for attempt in 1..=attempts {
        match task().await {
            Ok(res) => {
                trace!("{} succeeded after {} attempts", description, attempt);
                return Ok(res);
            }
            Err(e) => {
                debug!("attempt {}/{} of {} failed: {}", attempt, attempts, description, e);
                last_err = Some(e);
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::retry(description.to_string(), attempts)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let res = retry_task("flaky", 5, Duration::from_millis(1), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::retry("not yet".to_string(), 1))
            } else {
                Ok(42u64)
            }
        })
        .await
        .unwrap();

        assert_eq!(res, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_last_error_when_budget_is_spent() {
        let res: Result<(), _> = retry_task("always-fails", 3, Duration::from_millis(1), || async {
            Err(Error::retry("nope".to_string(), 1))
        })
        .await;

        assert!(res.is_err());
    }
}
