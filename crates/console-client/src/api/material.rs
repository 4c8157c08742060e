//! 素材库接口：图片、视频、素材分组与素材工具

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::{PageQuery, PageResponse};
use crate::error::Result;
use crate::transport::{FilePart, UploadForm};

// ==================== 图片素材 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMaterial {
    pub id: i64,
    pub image_id: String,
    pub advertiser_id: i64,
    pub filename: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub format: String,
    #[serde(default)]
    pub signature: String,
    pub created_at: String,
}

// ==================== 视频素材 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMaterial {
    pub id: i64,
    pub video_id: String,
    pub advertiser_id: i64,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub poster_url: String,
    pub width: u32,
    pub height: u32,
    /// 时长（秒）
    pub duration: f64,
    pub size: u64,
    pub format: String,
    #[serde(default)]
    pub bit_rate: u64,
    #[serde(default)]
    pub signature: String,
    pub created_at: String,
}

/// 推荐接口混合返回图片与视频
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Material {
    Video(VideoMaterial),
    Image(ImageMaterial),
}

// ==================== 素材分组 ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub group_id: String,
    pub group_name: String,
    pub material_count: u64,
    pub created_at: String,
}

// ==================== 请求参数 ====================

/// 图片/视频列表过滤条件
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MaterialFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

crate::impl_merge_params!(MaterialFilter { advertiser_id, group_id });

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupQuery {
    pub advertiser_id: i64,
    pub material_type: MaterialType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateGroupRequest {
    pub advertiser_id: i64,
    pub material_type: MaterialType,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveToGroupRequest {
    pub material_ids: Vec<i64>,
    pub material_type: MaterialType,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartCropRequest {
    pub video_id: String,
    /// 目标比例，如 `9:16`
    pub target_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendQuery {
    pub advertiser_id: i64,
    pub material_type: MaterialType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_id: Option<i64>,
}

// ==================== 响应结构 ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: i64,
    pub image_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedVideo {
    pub id: i64,
    pub video_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedGroup {
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CroppedVideo {
    pub video_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Covers {
    pub covers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UploadByUrl<'a> {
    advertiser_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct IdList<'a> {
    ids: &'a [i64],
}

#[derive(Debug, Serialize)]
struct GroupName<'a> {
    group_name: &'a str,
}

#[derive(Debug, Serialize)]
struct ExtractCovers<'a> {
    video_id: &'a str,
    count: u32,
}

/// 未指定数量时抽取的封面数
pub const DEFAULT_COVER_COUNT: u32 = 5;

fn upload_form(advertiser_id: i64, file: FilePart, filename: Option<&str>) -> UploadForm {
    UploadForm {
        file,
        fields: Vec::new(),
    }
    .field("advertiser_id", advertiser_id.to_string())
    .field_opt("filename", filename)
}

#[derive(Debug, Clone)]
pub struct MaterialApi {
    client: ApiClient,
}

impl MaterialApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // 图片素材

    pub async fn image_list(
        &self,
        query: &PageQuery<MaterialFilter>,
    ) -> Result<PageResponse<ImageMaterial>> {
        self.client.get_with("/media/images", query).await
    }

    pub async fn image_detail(&self, id: i64) -> Result<ImageMaterial> {
        self.client.get(&format!("/media/images/{}", id)).await
    }

    pub async fn upload_image(
        &self,
        advertiser_id: i64,
        file: FilePart,
        filename: Option<&str>,
    ) -> Result<UploadedImage> {
        self.client
            .upload("/media/images/upload", upload_form(advertiser_id, file, filename))
            .await
    }

    pub async fn upload_image_by_url(
        &self,
        advertiser_id: i64,
        image_url: &str,
        filename: Option<&str>,
    ) -> Result<UploadedImage> {
        let body = UploadByUrl {
            advertiser_id,
            image_url: Some(image_url),
            video_url: None,
            filename,
        };
        self.client.post_json("/media/images/upload-url", &body).await
    }

    pub async fn delete_image(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/media/images/{}", id)).await
    }

    pub async fn batch_delete_images(&self, ids: &[i64]) -> Result<()> {
        self.client
            .delete_with("/media/images/batch", &IdList { ids })
            .await
    }

    // 视频素材

    pub async fn video_list(
        &self,
        query: &PageQuery<MaterialFilter>,
    ) -> Result<PageResponse<VideoMaterial>> {
        self.client.get_with("/media/videos", query).await
    }

    pub async fn video_detail(&self, id: i64) -> Result<VideoMaterial> {
        self.client.get(&format!("/media/videos/{}", id)).await
    }

    pub async fn upload_video(
        &self,
        advertiser_id: i64,
        file: FilePart,
        filename: Option<&str>,
    ) -> Result<UploadedVideo> {
        self.client
            .upload("/media/videos/upload", upload_form(advertiser_id, file, filename))
            .await
    }

    pub async fn upload_video_by_url(
        &self,
        advertiser_id: i64,
        video_url: &str,
        filename: Option<&str>,
    ) -> Result<UploadedVideo> {
        let body = UploadByUrl {
            advertiser_id,
            image_url: None,
            video_url: Some(video_url),
            filename,
        };
        self.client.post_json("/media/videos/upload-url", &body).await
    }

    pub async fn delete_video(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/media/videos/{}", id)).await
    }

    pub async fn batch_delete_videos(&self, ids: &[i64]) -> Result<()> {
        self.client
            .delete_with("/media/videos/batch", &IdList { ids })
            .await
    }

    // 素材分组

    pub async fn group_list(&self, query: &GroupQuery) -> Result<Vec<MaterialGroup>> {
        self.client.get_with("/media/groups", query).await
    }

    pub async fn create_group(&self, request: &CreateGroupRequest) -> Result<CreatedGroup> {
        self.client.post_json("/media/groups", request).await
    }

    pub async fn update_group(&self, group_id: &str, group_name: &str) -> Result<()> {
        self.client
            .put_json(&format!("/media/groups/{}", group_id), &GroupName { group_name })
            .await
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/media/groups/{}", group_id))
            .await
    }

    pub async fn move_to_group(&self, request: &MoveToGroupRequest) -> Result<()> {
        self.client.post_json("/media/groups/move", request).await
    }

    // 素材工具

    pub async fn smart_crop(&self, request: &SmartCropRequest) -> Result<CroppedVideo> {
        self.client
            .post_json("/media/videos/smart-crop", request)
            .await
    }

    pub async fn extract_covers(&self, video_id: &str, count: Option<u32>) -> Result<Covers> {
        let body = ExtractCovers {
            video_id,
            count: count.unwrap_or(DEFAULT_COVER_COUNT),
        };
        self.client
            .post_json("/media/videos/extract-covers", &body)
            .await
    }

    pub async fn recommend(&self, query: &RecommendQuery) -> Result<Vec<Material>> {
        self.client.get_with("/media/recommend", query).await
    }
}
