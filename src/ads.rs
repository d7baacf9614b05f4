use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphClient;

pub const AD_ACCOUNT_PREFIX: &str = "act_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdStatus {
    Active,
    #[default]
    Paused,
}

impl AdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdStatus::Active => "ACTIVE",
            AdStatus::Paused => "PAUSED",
        }
    }
}

/// Provider gender codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male = 1,
    Female = 2,
}

impl Serialize for Gender {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLocations {
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Targeting {
    pub geo_locations: GeoLocations,
    pub age_min: u8,
    pub age_max: u8,
    pub genders: Vec<Gender>,
}

impl Default for Targeting {
    fn default() -> Self {
        Self {
            geo_locations: GeoLocations {
                countries: vec!["EG".to_string()],
            },
            age_min: 18,
            age_max: 45,
            genders: vec![Gender::Male, Gender::Female],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSpec {
    pub name: String,
    pub objective: String,
    pub status: AdStatus,
    /// Regulated categories, e.g. `HOUSING`. Pass an empty list when none
    /// apply; `None` omits the field, which the provider usually rejects.
    pub special_ad_categories: Option<Vec<String>>,
}

impl Default for CampaignSpec {
    fn default() -> Self {
        Self {
            name: "New Campaign".to_string(),
            objective: "OUTCOME_TRAFFIC".to_string(),
            status: AdStatus::Paused,
            special_ad_categories: None,
        }
    }
}

impl CampaignSpec {
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            special_ad_categories: Some(categories.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdSetSpec {
    pub name: String,
    pub daily_budget_cents: u64,
    pub billing_event: String,
    pub optimization_goal: String,
    pub bid_strategy: String,
    pub targeting: Targeting,
    pub status: AdStatus,
}

impl Default for AdSetSpec {
    fn default() -> Self {
        Self {
            name: "Default Ad Set".to_string(),
            daily_budget_cents: 500,
            billing_event: "IMPRESSIONS".to_string(),
            optimization_goal: "LINK_CLICKS".to_string(),
            bid_strategy: "LOWEST_COST_WITHOUT_CAP".to_string(),
            targeting: Targeting::default(),
            status: AdStatus::Paused,
        }
    }
}

#[derive(Serialize)]
struct AdSetBody<'a> {
    name: &'a str,
    campaign_id: &'a str,
    daily_budget: String,
    billing_event: &'a str,
    optimization_goal: &'a str,
    bid_strategy: &'a str,
    targeting: &'a Targeting,
    status: AdStatus,
    access_token: &'a str,
}

pub const DEFAULT_CREATIVE_NAME: &str = "My Default Ad Creative";
pub const DEFAULT_AD_NAME: &str = "New Ad";

/// Drives campaign, ad set, creative and ad creation for one ad account.
#[derive(Debug, Clone)]
pub struct AdManager {
    client: GraphClient,
    access_token: String,
    ad_account_id: String,
}

impl AdManager {
    pub fn new(client: GraphClient, access_token: &str, ad_account_id: &str) -> GraphResult<Self> {
        if !ad_account_id.starts_with(AD_ACCOUNT_PREFIX)
            || ad_account_id.len() == AD_ACCOUNT_PREFIX.len()
        {
            return Err(GraphError::InvalidAdAccount(ad_account_id.to_string()));
        }
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            ad_account_id: ad_account_id.to_string(),
        })
    }

    pub fn from_config(client: GraphClient, config: &GraphConfig) -> GraphResult<Self> {
        let ad_account_id = config
            .ad_account_id
            .as_deref()
            .ok_or(GraphError::MissingInput("ad_account_id"))?;
        Self::new(client, &config.access_token, ad_account_id)
    }

    pub fn ad_account_id(&self) -> &str {
        &self.ad_account_id
    }

    pub async fn create_campaign(&self, spec: &CampaignSpec) -> GraphResult<String> {
        let mut fields = vec![
            ("name", spec.name.clone()),
            ("objective", spec.objective.clone()),
            ("status", spec.status.as_str().to_string()),
        ];
        match &spec.special_ad_categories {
            Some(categories) => fields.push(("special_ad_categories", json!(categories).to_string())),
            None => error!(
                campaign = %spec.name,
                "special_ad_categories not supplied, the campaign will likely be rejected"
            ),
        }
        fields.push(("access_token", self.access_token.clone()));

        let result = self
            .client
            .post_form(&self.ad_account_id, "campaigns", &fields)
            .await;
        log_outcome("campaign", result)
    }

    pub async fn create_ad_set(&self, campaign_id: &str, spec: &AdSetSpec) -> GraphResult<String> {
        if campaign_id.is_empty() {
            error!("cannot create ad set without a campaign id");
            return Err(GraphError::MissingInput("campaign_id"));
        }

        let body = AdSetBody {
            name: &spec.name,
            campaign_id,
            daily_budget: spec.daily_budget_cents.to_string(),
            billing_event: &spec.billing_event,
            optimization_goal: &spec.optimization_goal,
            bid_strategy: &spec.bid_strategy,
            targeting: &spec.targeting,
            status: spec.status,
            access_token: &self.access_token,
        };

        let result = self
            .client
            .post_json(&self.ad_account_id, "adsets", &body)
            .await;
        log_outcome("ad set", result)
    }

    /// Wrap an existing page post as the object story of a new creative.
    pub async fn create_ad_creative(&self, post_id: &str, name: &str) -> GraphResult<String> {
        if post_id.is_empty() {
            error!("cannot create ad creative without a post id");
            return Err(GraphError::MissingInput("post_id"));
        }

        let fields = [
            ("name", name.to_string()),
            ("object_story_id", post_id.to_string()),
            ("access_token", self.access_token.clone()),
        ];

        let result = self
            .client
            .post_form(&self.ad_account_id, "adcreatives", &fields)
            .await;
        log_outcome("ad creative", result)
    }

    pub async fn create_ad(
        &self,
        ad_set_id: &str,
        ad_creative_id: &str,
        name: &str,
        status: AdStatus,
    ) -> GraphResult<String> {
        if ad_set_id.is_empty() {
            error!("cannot create ad without an ad set id");
            return Err(GraphError::MissingInput("ad_set_id"));
        }
        if ad_creative_id.is_empty() {
            error!("cannot create ad without an ad creative id");
            return Err(GraphError::MissingInput("ad_creative_id"));
        }

        let fields = [
            ("name", name.to_string()),
            ("adset_id", ad_set_id.to_string()),
            ("creative", json!({ "creative_id": ad_creative_id }).to_string()),
            ("status", status.as_str().to_string()),
            ("access_token", self.access_token.clone()),
        ];

        let result = self
            .client
            .post_form(&self.ad_account_id, "ads", &fields)
            .await;
        log_outcome("ad", result)
    }
}

fn log_outcome(stage: &'static str, result: GraphResult<String>) -> GraphResult<String> {
    match &result {
        Ok(id) => info!(stage, %id, "created"),
        Err(e) => error!(stage, error = %e, "creation failed"),
    }
    result
}
