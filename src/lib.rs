//! Publish Facebook Page posts and promote them through the Marketing API.
//!
//! [`PostManager`] writes to a page feed, [`AdManager`] creates campaigns,
//! ad sets, creatives and ads, and [`run_pipeline`] chains them so each
//! stage consumes the ids produced upstream.

pub mod ads;
pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod post;
pub mod server;

pub use ads::{AdManager, AdSetSpec, AdStatus, CampaignSpec, Gender, Targeting};
pub use config::{GraphConfig, ServerConfig};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphClient, extract_id};
pub use pipeline::{PipelineReport, PipelineRequest, Stage, run_pipeline, run_pipeline_with_progress};
pub use post::{PostContent, PostManager};
