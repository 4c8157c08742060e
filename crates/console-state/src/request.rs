//! 单次异步调用的状态包装

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use adconsole_client::ClientError;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

pub type RequestFn<A, T> =
    Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;

struct RequestInner<T> {
    data: Option<T>,
    loading: bool,
    error: Option<ClientError>,
}

impl<T> Default for RequestInner<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// 调用结束或被取消时复位 `loading`
struct LoadingGuard<'a, T>(&'a Mutex<RequestInner<T>>);

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.0.lock().loading = false;
    }
}

pub struct RequestState<A, T> {
    request_fn: RequestFn<A, T>,
    inner: Arc<Mutex<RequestInner<T>>>,
}

impl<A, T> Clone for RequestState<A, T> {
    fn clone(&self) -> Self {
        Self {
            request_fn: self.request_fn.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<A, T: fmt::Debug> fmt::Debug for RequestState<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RequestState")
            .field("data", &inner.data)
            .field("loading", &inner.loading)
            .field("error", &inner.error)
            .finish()
    }
}

impl<A, T> RequestState<A, T>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new<F, Fut>(request: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self {
            request_fn: Arc::new(move |args| request(args).boxed()),
            inner: Arc::default(),
        }
    }

    pub fn data(&self) -> Option<T> {
        self.inner.lock().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn error(&self) -> Option<ClientError> {
        self.inner.lock().error.clone()
    }

    /// 执行调用；成功时保存并返回结果，失败时保存错误并返回 None
    ///
    /// 失败前保存的数据保持不变。
    pub async fn execute(&self, args: A) -> Option<T> {
        {
            let mut inner = self.inner.lock();
            inner.loading = true;
            inner.error = None;
        }
        let _loading = LoadingGuard(&self.inner);

        let result = (self.request_fn)(args).await;

        let mut inner = self.inner.lock();
        match result {
            Ok(data) => {
                inner.data = Some(data.clone());
                Some(data)
            }
            Err(e) => {
                tracing::debug!(error = %e, "请求失败");
                inner.error = Some(e);
                None
            }
        }
    }

    pub fn reset(&self) {
        *self.inner.lock() = RequestInner::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn balance_request() -> RequestState<u64, f64> {
        RequestState::new(|advertiser_id: u64| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if advertiser_id == 0 {
                Err(ClientError::api(40001, "广告主不存在"))
            } else {
                Ok(advertiser_id as f64 * 1.5)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_tracks_loading_and_data() {
        let request = balance_request();
        let observer = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            request.loading()
        };

        let (result, during) = tokio::join!(request.execute(2), observer);

        assert_eq!(result, Some(3.0));
        assert!(during);
        assert!(!request.loading());
        assert_eq!(request.data(), Some(3.0));
        assert_eq!(request.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_data() {
        let request = balance_request();
        request.execute(2).await;

        assert_eq!(request.execute(0).await, None);
        assert_eq!(request.error(), Some(ClientError::api(40001, "广告主不存在")));
        assert_eq!(request.data(), Some(3.0));

        // 新的调用先清除旧错误
        request.execute(4).await;
        assert_eq!(request.error(), None);
        assert_eq!(request.data(), Some(6.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_everything() {
        let request = balance_request();
        request.execute(0).await;
        request.reset();

        assert_eq!(request.data(), None);
        assert_eq!(request.error(), None);
        assert!(!request.loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_execute_clears_loading() {
        let request: RequestState<u64, f64> = RequestState::new(|_| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(1.0)
        });

        let outcome = tokio::time::timeout(Duration::from_millis(100), request.execute(1)).await;

        assert!(outcome.is_err());
        assert!(!request.loading());
        assert_eq!(request.data(), None);
    }
}
