use std::fmt::Debug;
use std::future::Future;

use crate::config::core_config::RetryConfig;

/// Errors that may disappear when the same call is repeated
pub trait TransientError {
    fn is_transient(&self) -> bool;
}

/// Repeats `operation` on transient failures only.
///
/// Must only wrap calls that have no observable effect when they fail, commits of
/// state transitions are never retried.
pub async fn retry_transient<T, E, F, Fut>(
    config: &RetryConfig,
    name: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: TransientError + Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retry_counter = 1;
    loop {
        match operation().await {
            Err(err) if err.is_transient() && retry_counter < config.max_attempts => {
                tracing::info!("Retrying {name}, retry({retry_counter}): {err:?}");
                tokio::time::sleep(config.delay).await;
                retry_counter += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl TransientError for TestError {
        fn is_transient(&self) -> bool {
            *self == TestError::Transient
        }
    }

    fn config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = &AtomicU32::new(0);

        let result = retry_transient(&config(), "test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Transient)
            } else {
                Ok(5)
            }
        })
        .await;

        assert_eq!(result, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_transient(&config(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Transient)
        })
        .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_error() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_transient(&config(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Permanent)
        })
        .await;

        assert_eq!(result, Err(TestError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
