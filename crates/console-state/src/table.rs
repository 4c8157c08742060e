//! 分页列表状态
//!
//! 由一个分页查询函数和默认筛选条件构造。每次筛选、翻页、改页大小都会立即重新查询。
//!
//! 查询失败时清空行数据并把总数置 0，错误不向调用方返回，只记录日志并保存在
//! [`TableState::last_error`] 中。连续触发多次查询时，只有最后一次发起的查询结果会被采用，
//! 先发起但后返回的响应直接丢弃。

use std::future::Future;
use std::sync::Arc;

use adconsole_client::envelope::total_pages;
use adconsole_client::{ClientError, MergeParams, PageQuery, PageResponse};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// 默认页大小
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 分页查询函数
pub type FetchFn<T, P> = Arc<
    dyn Fn(PageQuery<P>) -> BoxFuture<'static, Result<PageResponse<T>, ClientError>> + Send + Sync,
>;

struct TableInner<T, P> {
    filters: P,
    page: u32,
    page_size: u32,
    rows: Vec<T>,
    total: u64,
    loading: bool,
    last_error: Option<ClientError>,
    /// 最近一次发起的查询序号
    latest: u64,
}

/// 查询结束或被取消时复位 `loading`，已被后续查询取代时不动
struct LoadingGuard<'a, T, P> {
    inner: &'a Mutex<TableInner<T, P>>,
    ticket: u64,
}

impl<T, P> Drop for LoadingGuard<'_, T, P> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.latest == self.ticket {
            inner.loading = false;
        }
    }
}

pub struct TableState<T, P> {
    fetch_fn: FetchFn<T, P>,
    default_filters: P,
    inner: Arc<Mutex<TableInner<T, P>>>,
}

impl<T, P: Clone> Clone for TableState<T, P> {
    fn clone(&self) -> Self {
        Self {
            fetch_fn: self.fetch_fn.clone(),
            default_filters: self.default_filters.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T, P> TableState<T, P>
where
    T: Clone + Send + 'static,
    P: MergeParams + Clone + Send + 'static,
{
    pub fn new<F, Fut>(fetch: F, default_filters: P) -> Self
    where
        F: Fn(PageQuery<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResponse<T>, ClientError>> + Send + 'static,
    {
        let fetch_fn: FetchFn<T, P> = Arc::new(move |query| fetch(query).boxed());
        Self {
            fetch_fn,
            inner: Arc::new(Mutex::new(TableInner {
                filters: default_filters.clone(),
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
                rows: Vec::new(),
                total: 0,
                loading: false,
                last_error: None,
                latest: 0,
            })),
            default_filters,
        }
    }

    /// 设置初始页大小（不触发查询）
    pub fn with_page_size(self, page_size: u32) -> Self {
        self.inner.lock().page_size = page_size;
        self
    }

    // ==================== 状态读取 ====================

    pub fn filters(&self) -> P {
        self.inner.lock().filters.clone()
    }

    pub fn page(&self) -> u32 {
        self.inner.lock().page
    }

    pub fn page_size(&self) -> u32 {
        self.inner.lock().page_size
    }

    pub fn rows(&self) -> Vec<T> {
        self.inner.lock().rows.clone()
    }

    pub fn total(&self) -> u64 {
        self.inner.lock().total
    }

    pub fn loading(&self) -> bool {
        self.inner.lock().loading
    }

    /// 最近一次被采用的查询的错误；成功查询会清除它
    pub fn last_error(&self) -> Option<ClientError> {
        self.inner.lock().last_error.clone()
    }

    /// `ceil(total / page_size)`
    pub fn total_pages(&self) -> u64 {
        let inner = self.inner.lock();
        total_pages(inner.total, inner.page_size)
    }

    // ==================== 操作 ====================

    /// 用当前筛选条件和分页游标查询
    pub async fn fetch(&self) {
        let (query, ticket) = {
            let mut inner = self.inner.lock();
            inner.loading = true;
            inner.latest += 1;
            (
                PageQuery::new(inner.filters.clone(), inner.page, inner.page_size),
                inner.latest,
            )
        };
        let _loading = LoadingGuard {
            inner: &self.inner,
            ticket,
        };

        let result = (self.fetch_fn)(query).await;

        let mut inner = self.inner.lock();
        if ticket != inner.latest {
            debug!(ticket, latest = inner.latest, "丢弃过期的列表响应");
            return;
        }

        match result {
            Ok(page) => {
                inner.rows = page.list;
                inner.total = page.total;
                inner.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, page = inner.page, "列表数据查询失败");
                inner.rows.clear();
                inner.total = 0;
                inner.last_error = Some(e);
            }
        }
    }

    /// 合并筛选条件，回到第一页并查询
    pub async fn set_params(&self, patch: P) {
        {
            let mut inner = self.inner.lock();
            inner.filters.merge(patch);
            inner.page = 1;
        }
        self.fetch().await;
    }

    pub async fn set_page(&self, page: u32) {
        self.inner.lock().page = page;
        self.fetch().await;
    }

    /// 修改页大小，回到第一页并查询
    pub async fn set_page_size(&self, page_size: u32) {
        {
            let mut inner = self.inner.lock();
            inner.page_size = page_size;
            inner.page = 1;
        }
        self.fetch().await;
    }

    pub async fn refresh(&self) {
        self.fetch().await;
    }

    /// 恢复默认筛选条件并回到第一页
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.lock();
            inner.filters = self.default_filters.clone();
            inner.page = 1;
        }
        self.fetch().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::time::Duration;

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    struct Filter {
        status: Option<String>,
        keyword: Option<String>,
    }

    adconsole_client::impl_merge_params!(Filter { status, keyword });

    type Calls = Arc<Mutex<Vec<(Filter, u32, u32)>>>;

    /// 记录每次查询参数的分页函数，总数固定为 57
    fn recording_table() -> (TableState<u32, Filter>, Calls) {
        let calls: Calls = Arc::default();
        let recorded = calls.clone();
        let table = TableState::new(
            move |query: PageQuery<Filter>| {
                recorded
                    .lock()
                    .push((query.filters.clone(), query.page, query.page_size));
                async move {
                    let start = (query.page - 1) * query.page_size;
                    let end = (start + query.page_size).min(57);
                    let list = (start..end).collect();
                    Ok(PageResponse::new(list, 57, query.page, query.page_size))
                }
            },
            Filter::default(),
        );
        (table, calls)
    }

    #[tokio::test]
    async fn test_total_pages_from_fetch() {
        let (table, _) = recording_table();
        let table = table.with_page_size(10);
        table.fetch().await;

        assert_eq!(table.rows().len(), 10);
        assert_eq!(table.total(), 57);
        assert_eq!(table.total_pages(), 6);
        assert!(!table.loading());
    }

    #[tokio::test]
    async fn test_set_page_size_resets_page_and_fetches_once() {
        let (table, calls) = recording_table();
        table.set_page(3).await;
        calls.lock().clear();

        table.set_page_size(50).await;

        let calls = calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].1, calls[0].2), (1, 50));
        assert_eq!(table.page(), 1);
        assert_eq!(table.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_set_params_merges_and_resets_page() {
        let (table, calls) = recording_table();
        table.set_params(Filter {
            status: Some("enable".into()),
            keyword: None,
        })
        .await;
        table.set_page(2).await;
        table.set_params(Filter {
            status: None,
            keyword: Some("品牌".into()),
        })
        .await;

        let last = calls.lock().last().cloned().unwrap();
        assert_eq!(
            last.0,
            Filter {
                status: Some("enable".into()),
                keyword: Some("品牌".into()),
            }
        );
        assert_eq!(last.1, 1);
    }

    #[tokio::test]
    async fn test_reset_restores_default_filters() {
        let calls: Calls = Arc::default();
        let recorded = calls.clone();
        let defaults = Filter {
            status: Some("enable".into()),
            keyword: None,
        };
        let table = TableState::new(
            move |query: PageQuery<Filter>| {
                recorded.lock().push((query.filters.clone(), query.page, query.page_size));
                async move { Ok(PageResponse::<u32>::empty(query.page, query.page_size)) }
            },
            defaults.clone(),
        );

        table.set_params(Filter {
            status: Some("disable".into()),
            keyword: Some("x".into()),
        })
        .await;
        table.set_page(4).await;
        table.reset().await;

        assert_eq!(table.filters(), defaults);
        assert_eq!(table.page(), 1);
        assert_eq!(calls.lock().last().unwrap().0, defaults);
    }

    #[tokio::test]
    async fn test_refresh_keeps_cursor() {
        let (table, calls) = recording_table();
        table.set_page(2).await;
        table.refresh().await;

        let calls = calls.lock().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1, 2);
    }

    #[tokio::test]
    async fn test_failure_clears_rows_and_keeps_error() {
        let table: TableState<u32, ()> = TableState::new(
            |query: PageQuery<()>| async move {
                if query.page == 1 {
                    Ok(PageResponse::new(vec![1, 2, 3], 3, 1, query.page_size))
                } else {
                    Err(ClientError::api(500, "服务繁忙"))
                }
            },
            (),
        );

        table.fetch().await;
        assert_eq!(table.total(), 3);

        table.set_page(2).await;
        assert!(table.rows().is_empty());
        assert_eq!(table.total(), 0);
        assert!(!table.loading());
        assert_eq!(table.last_error(), Some(ClientError::api(500, "服务繁忙")));

        table.set_page(1).await;
        assert_eq!(table.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_response_is_discarded() {
        // 第 2 页响应慢，第 3 页响应快
        let table: TableState<u32, ()> = TableState::new(
            |query: PageQuery<()>| async move {
                let delay = if query.page == 2 { 100 } else { 10 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(PageResponse::new(vec![query.page], 100, query.page, query.page_size))
            },
            (),
        );

        let slow = table.set_page(2);
        let fast = table.set_page(3);
        let observer = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            // 快的响应已落地，慢的仍在途中
            (table.rows(), table.loading())
        };
        let (_, _, mid) = tokio::join!(slow, fast, observer);

        assert_eq!(mid, (vec![3], false));
        assert_eq!(table.rows(), vec![3]);
        assert_eq!(table.page(), 3);
        assert!(!table.loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_fetch_clears_loading() {
        let table: TableState<u32, ()> = TableState::new(
            |query: PageQuery<()>| async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(PageResponse::new(vec![1], 1, query.page, query.page_size))
            },
            (),
        );

        let outcome = tokio::time::timeout(Duration::from_millis(100), table.refresh()).await;

        assert!(outcome.is_err());
        assert!(!table.loading());
        assert!(table.rows().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_stale_fetch_keeps_newer_loading() {
        let table: TableState<u32, ()> = TableState::new(
            |query: PageQuery<()>| async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(PageResponse::new(vec![query.page], 1, query.page, query.page_size))
            },
            (),
        );

        let newer = table.clone();
        let cancelled = tokio::time::timeout(Duration::from_millis(100), table.set_page(2));
        let superseding = async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tokio::spawn(async move { newer.set_page(3).await })
        };
        let (outcome, pending) = tokio::join!(cancelled, superseding);

        // 被取消的是旧查询，第 3 页的查询仍在进行
        assert!(outcome.is_err());
        assert!(table.loading());
        assert_eq!(table.page(), 3);
        pending.abort();
    }
}
