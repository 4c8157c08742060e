//! 广告组接口

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::{PageQuery, PageResponse};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub campaign_id: i64,
    pub advertiser_id: i64,
    pub name: String,
    pub budget_mode: String,
    pub budget: f64,
    pub landing_type: String,
    pub status: String,
    #[serde(default)]
    pub opt_status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CampaignFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

crate::impl_merge_params!(CampaignFilter { advertiser_id, status, name });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetMode {
    #[serde(rename = "BUDGET_MODE_INFINITE")]
    Infinite,
    #[serde(rename = "BUDGET_MODE_DAY")]
    Day,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignCreateRequest {
    pub advertiser_id: i64,
    pub name: String,
    pub budget_mode: BudgetMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub landing_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_goal: Option<String>,
}

/// 局部更新，只发送出现的字段
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CampaignUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_mode: Option<BudgetMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_goal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Enable,
    Disable,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [i64]>,
    status: StatusAction,
}

#[derive(Debug, Clone)]
pub struct CampaignApi {
    client: ApiClient,
}

impl CampaignApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery<CampaignFilter>) -> Result<PageResponse<Campaign>> {
        self.client.get_with("/campaign", query).await
    }

    pub async fn detail(&self, id: i64) -> Result<Campaign> {
        self.client.get(&format!("/campaign/{}", id)).await
    }

    pub async fn create(&self, request: &CampaignCreateRequest) -> Result<CreatedId> {
        self.client.post_json("/campaign", request).await
    }

    pub async fn update(&self, id: i64, request: &CampaignUpdateRequest) -> Result<()> {
        self.client
            .put_json(&format!("/campaign/{}", id), request)
            .await
    }

    pub async fn update_status(&self, id: i64, status: StatusAction) -> Result<()> {
        self.client
            .post_json(
                &format!("/campaign/{}/status", id),
                &StatusBody { ids: None, status },
            )
            .await
    }

    pub async fn batch_update_status(&self, ids: &[i64], status: StatusAction) -> Result<()> {
        self.client
            .post_json(
                "/campaign/batch/status",
                &StatusBody {
                    ids: Some(ids),
                    status,
                },
            )
            .await
    }
}
