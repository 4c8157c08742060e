//! 广告主接口

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::{PageQuery, PageResponse};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertiser {
    pub id: i64,
    pub advertiser_id: i64,
    pub name: String,
    #[serde(default)]
    pub company: String,
    pub status: String,
    pub balance: f64,
    pub valid_balance: f64,
    pub created_at: String,
    #[serde(default)]
    pub last_sync_at: String,
}

/// 广告主列表过滤条件
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdvertiserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

crate::impl_merge_params!(AdvertiserFilter { keyword, status });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: f64,
    pub valid_balance: f64,
    pub cash_balance: f64,
}

/// 资金流水查询区间（日期格式 YYYY-MM-DD）
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FundFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

crate::impl_merge_params!(FundFilter { start_date, end_date });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundTransaction {
    pub transaction_seq: String,
    pub transaction_type: String,
    pub amount: f64,
    pub transaction_time: String,
}

#[derive(Debug, Clone)]
pub struct AdvertiserApi {
    client: ApiClient,
}

impl AdvertiserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery<AdvertiserFilter>) -> Result<PageResponse<Advertiser>> {
        self.client.get_with("/advertiser", query).await
    }

    pub async fn detail(&self, id: i64) -> Result<Advertiser> {
        self.client.get(&format!("/advertiser/{}", id)).await
    }

    /// 触发从广告平台同步
    pub async fn sync(&self, id: i64) -> Result<()> {
        self.client.post(&format!("/advertiser/{}/sync", id)).await
    }

    pub async fn balance(&self, id: i64) -> Result<Balance> {
        self.client.get(&format!("/advertiser/{}/balance", id)).await
    }

    pub async fn fund_transactions(
        &self,
        id: i64,
        query: &PageQuery<FundFilter>,
    ) -> Result<PageResponse<FundTransaction>> {
        self.client
            .get_with(&format!("/advertiser/{}/funds", id), query)
            .await
    }
}
