//! Post-then-promote: feed post, campaign, ad set, creative, ad.
//!
//! Each stage runs only when the stages it consumes ids from succeeded.
//! Nothing is rolled back; resources created before a failure stay live.

use tracing::{info, warn};

use crate::ads::{AdManager, AdSetSpec, AdStatus, CampaignSpec, DEFAULT_AD_NAME, DEFAULT_CREATIVE_NAME};
use crate::error::GraphError;
use crate::post::{PostContent, PostManager};

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub post: PostContent,
    pub campaign: CampaignSpec,
    pub ad_set: AdSetSpec,
    pub creative_name: String,
    pub ad_name: String,
    pub ad_status: AdStatus,
}

impl PipelineRequest {
    pub fn new(post: PostContent, campaign: CampaignSpec) -> Self {
        Self {
            post,
            campaign,
            ad_set: AdSetSpec::default(),
            creative_name: DEFAULT_CREATIVE_NAME.to_string(),
            ad_name: DEFAULT_AD_NAME.to_string(),
            ad_status: AdStatus::Paused,
        }
    }
}

#[derive(Debug)]
pub enum Stage {
    Created(String),
    Failed(GraphError),
    /// Not attempted because an upstream stage produced no id.
    Skipped,
}

impl Stage {
    pub fn id(&self) -> Option<&str> {
        match self {
            Stage::Created(id) => Some(id),
            _ => None,
        }
    }

    fn from_result(name: &'static str, result: Result<String, GraphError>) -> Self {
        match result {
            Ok(id) => Stage::Created(id),
            Err(e) => {
                warn!(stage = name, error = %e, "pipeline stage failed");
                Stage::Failed(e)
            }
        }
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub post: Stage,
    pub campaign: Stage,
    pub ad_set: Stage,
    pub ad_creative: Stage,
    pub ad: Stage,
}

impl PipelineReport {
    pub fn ad_id(&self) -> Option<&str> {
        self.ad.id()
    }

    pub fn is_complete(&self) -> bool {
        self.ad_id().is_some()
    }

    pub fn stages(&self) -> [(&'static str, &Stage); 5] {
        [
            ("post", &self.post),
            ("campaign", &self.campaign),
            ("ad set", &self.ad_set),
            ("ad creative", &self.ad_creative),
            ("ad", &self.ad),
        ]
    }
}

/// Run every stage in order, threading ids forward.
pub async fn run_pipeline(
    posts: &PostManager,
    ads: &AdManager,
    request: &PipelineRequest,
) -> PipelineReport {
    run_pipeline_with_progress(posts, ads, request, |_| {}).await
}

/// Same as [`run_pipeline`], calling `on_stage` before each attempted stage.
pub async fn run_pipeline_with_progress<F>(
    posts: &PostManager,
    ads: &AdManager,
    request: &PipelineRequest,
    mut on_stage: F,
) -> PipelineReport
where
    F: FnMut(&'static str),
{
    on_stage("post");
    let post = Stage::from_result("post", posts.create_post(&request.post).await);

    on_stage("campaign");
    let campaign = Stage::from_result("campaign", ads.create_campaign(&request.campaign).await);

    let ad_set = match campaign.id() {
        Some(campaign_id) => {
            on_stage("ad set");
            Stage::from_result("ad set", ads.create_ad_set(campaign_id, &request.ad_set).await)
        }
        None => Stage::Skipped,
    };

    let ad_creative = match post.id() {
        Some(post_id) => {
            on_stage("ad creative");
            Stage::from_result(
                "ad creative",
                ads.create_ad_creative(post_id, &request.creative_name).await,
            )
        }
        None => Stage::Skipped,
    };

    let ad = match (ad_set.id(), ad_creative.id()) {
        (Some(ad_set_id), Some(creative_id)) => {
            on_stage("ad");
            Stage::from_result(
                "ad",
                ads.create_ad(ad_set_id, creative_id, &request.ad_name, request.ad_status)
                    .await,
            )
        }
        _ => Stage::Skipped,
    };

    let report = PipelineReport {
        post,
        campaign,
        ad_set,
        ad_creative,
        ad,
    };
    info!(complete = report.is_complete(), ad_id = ?report.ad_id(), "pipeline finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphClient;
    use mockito::{Matcher, Server};

    fn managers(server: &Server) -> (PostManager, AdManager) {
        let client = GraphClient::new(&server.url(), "v21.0").unwrap();
        (
            PostManager::new(client.clone(), "token", "page"),
            AdManager::new(client, "token", "act_42").unwrap(),
        )
    }

    fn request() -> PipelineRequest {
        PipelineRequest::new(
            PostContent::message("Post with link and Ad").with_link("https://lenaai.net"),
            CampaignSpec::with_categories(["HOUSING"]),
        )
    }

    #[tokio::test]
    async fn test_failed_post_skips_creative_and_ad() {
        let mut server = Server::new_async().await;
        let _feed = server
            .mock("POST", "/v21.0/page/feed")
            .with_status(400)
            .with_body(r#"{"error":{"message":"no","type":"OAuthException","code":200}}"#)
            .create_async()
            .await;
        let _campaigns = server
            .mock("POST", "/v21.0/act_42/campaigns")
            .with_body(r#"{"id":"cmp_1"}"#)
            .create_async()
            .await;
        let _adsets = server
            .mock("POST", "/v21.0/act_42/adsets")
            .with_body(r#"{"id":"set_1"}"#)
            .create_async()
            .await;
        let creatives = server
            .mock("POST", "/v21.0/act_42/adcreatives")
            .expect(0)
            .create_async()
            .await;
        let ads_mock = server
            .mock("POST", "/v21.0/act_42/ads")
            .expect(0)
            .create_async()
            .await;

        let (posts, ads) = managers(&server);
        let report = run_pipeline(&posts, &ads, &request()).await;

        assert!(matches!(report.post, Stage::Failed(GraphError::Api { .. })));
        assert_eq!(report.campaign.id(), Some("cmp_1"));
        assert_eq!(report.ad_set.id(), Some("set_1"));
        assert!(matches!(report.ad_creative, Stage::Skipped));
        assert!(matches!(report.ad, Stage::Skipped));
        assert!(!report.is_complete());
        creatives.assert_async().await;
        ads_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_campaign_skips_ad_set_and_ad() {
        let mut server = Server::new_async().await;
        let _feed = server
            .mock("POST", "/v21.0/page/feed")
            .with_body(r#"{"id":"page_post"}"#)
            .create_async()
            .await;
        let _campaigns = server
            .mock("POST", "/v21.0/act_42/campaigns")
            .with_body(r#"{}"#)
            .create_async()
            .await;
        let adsets = server
            .mock("POST", "/v21.0/act_42/adsets")
            .expect(0)
            .create_async()
            .await;
        let _creatives = server
            .mock("POST", "/v21.0/act_42/adcreatives")
            .match_body(Matcher::UrlEncoded("object_story_id".into(), "page_post".into()))
            .with_body(r#"{"id":"cr_1"}"#)
            .create_async()
            .await;

        let (posts, ads) = managers(&server);
        let mut seen = Vec::new();
        let report = run_pipeline_with_progress(&posts, &ads, &request(), |stage| seen.push(stage)).await;

        assert!(matches!(report.campaign, Stage::Failed(GraphError::MissingId { .. })));
        assert!(matches!(report.ad_set, Stage::Skipped));
        assert_eq!(report.ad_creative.id(), Some("cr_1"));
        assert!(matches!(report.ad, Stage::Skipped));
        assert_eq!(seen, vec!["post", "campaign", "ad creative"]);
        adsets.assert_async().await;
    }
}
