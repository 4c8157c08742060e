//! 数据报表接口

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::PageResponse;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub stat_datetime: String,
    pub cost: f64,
    pub show: u64,
    pub click: u64,
    pub ctr: f64,
    pub convert: u64,
    pub convert_cost: f64,
    pub convert_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReportRow {
    #[serde(flatten)]
    pub data: ReportData,
    pub campaign_id: i64,
    pub campaign_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReportParams {
    pub advertiser_id: i64,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ReportParams {
    pub fn new(advertiser_id: i64, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            advertiser_id,
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CampaignReportParams {
    #[serde(flatten)]
    pub base: ReportParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeStats {
    pub cost: f64,
    pub show: u64,
    pub click: u64,
    pub convert: u64,
    pub update_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Advertiser,
    Campaign,
    Ad,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub params: ReportParams,
    #[serde(rename = "type")]
    pub kind: ExportKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct RealtimeQuery {
    advertiser_id: i64,
}

#[derive(Debug, Clone)]
pub struct ReportApi {
    client: ApiClient,
}

impl ReportApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn advertiser_report(&self, params: &ReportParams) -> Result<Vec<ReportData>> {
        self.client.get_with("/report/advertiser", params).await
    }

    pub async fn campaign_report(
        &self,
        params: &CampaignReportParams,
    ) -> Result<PageResponse<CampaignReportRow>> {
        self.client.get_with("/report/campaign", params).await
    }

    pub async fn realtime(&self, advertiser_id: i64) -> Result<RealtimeStats> {
        self.client
            .get_with("/report/realtime", &RealtimeQuery { advertiser_id })
            .await
    }

    pub async fn export(&self, request: &ExportRequest) -> Result<ExportTask> {
        self.client.post_json("/report/export", request).await
    }

    pub async fn export_result(&self, task_id: &str) -> Result<ExportResult> {
        self.client
            .get(&format!("/report/export/{}", task_id))
            .await
    }
}
