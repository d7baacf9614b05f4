use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use facebook_boost::{
    AdManager, AdSetSpec, AdStatus, CampaignSpec, GraphClient, GraphConfig, PipelineRequest,
    PostContent, PostManager, ServerConfig, Stage, run_pipeline_with_progress, server,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the upload and posting HTTP endpoints
    Serve {
        #[command(flatten)]
        graph: GraphConfig,

        #[command(flatten)]
        server: ServerConfig,
    },
    /// Publish a single feed post
    Post {
        #[command(flatten)]
        graph: GraphConfig,

        #[command(flatten)]
        content: ContentArgs,
    },
    /// Publish a post and promote it: campaign, ad set, creative, ad
    ///
    /// Needs an ad account (`--ad-account-id` or FB_AD_ACCOUNT_ID).
    Pipeline {
        #[command(flatten)]
        graph: GraphConfig,

        #[command(flatten)]
        content: ContentArgs,

        /// Regulated category, repeatable (e.g. HOUSING). Omit for none.
        #[arg(long = "special-ad-category")]
        special_ad_categories: Vec<String>,

        #[arg(long, default_value = "New Campaign")]
        campaign_name: String,

        #[arg(long, default_value = "OUTCOME_TRAFFIC")]
        objective: String,

        /// Daily budget in cents
        #[arg(long, default_value_t = 500)]
        daily_budget: u64,

        #[arg(long, value_delimiter = ',', default_value = "EG")]
        countries: Vec<String>,

        #[arg(long, default_value_t = 18)]
        age_min: u8,

        #[arg(long, default_value_t = 45)]
        age_max: u8,

        /// Create everything as ACTIVE instead of PAUSED
        #[arg(long)]
        activate: bool,
    },
}

#[derive(clap::Args)]
struct ContentArgs {
    #[arg(short, long)]
    message: Option<String>,

    #[arg(short, long)]
    link: Option<String>,

    /// Image URL to upload and attach
    #[arg(long)]
    media_url: Option<String>,
}

impl From<ContentArgs> for PostContent {
    fn from(args: ContentArgs) -> Self {
        PostContent {
            message: args.message,
            link: args.link,
            media_url: args.media_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facebook_boost=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Serve {
            graph,
            server: config,
        } => {
            let posts = PostManager::from_config(GraphClient::from_config(&graph)?, &graph);
            server::serve(config, posts).await?;
        }
        Mode::Post { graph, content } => {
            let posts = PostManager::from_config(GraphClient::from_config(&graph)?, &graph);
            let id = posts.create_post(&PostContent::from(content)).await?;
            println!("Post created on page {}: {}", posts.page_id(), id);
        }
        Mode::Pipeline {
            graph,
            content,
            special_ad_categories,
            campaign_name,
            objective,
            daily_budget,
            countries,
            age_min,
            age_max,
            activate,
        } => {
            let client = GraphClient::from_config(&graph)?;
            let posts = PostManager::from_config(client.clone(), &graph);
            let ads = AdManager::from_config(client, &graph)?;
            let status = if activate { AdStatus::Active } else { AdStatus::Paused };

            let mut request = PipelineRequest::new(
                PostContent::from(content),
                CampaignSpec {
                    name: campaign_name,
                    objective,
                    status,
                    special_ad_categories: Some(special_ad_categories),
                },
            );
            request.ad_set = AdSetSpec {
                daily_budget_cents: daily_budget,
                status,
                ..AdSetSpec::default()
            };
            request.ad_set.targeting.geo_locations.countries = countries;
            request.ad_set.targeting.age_min = age_min;
            request.ad_set.targeting.age_max = age_max;
            request.ad_status = status;

            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(100));

            let report = run_pipeline_with_progress(&posts, &ads, &request, |stage| {
                pb.set_message(format!("Creating {}...", stage));
            })
            .await;
            pb.finish_and_clear();

            println!("Ad account {}", ads.ad_account_id());

            for (name, stage) in report.stages() {
                match stage {
                    Stage::Created(id) => println!("{:<12} created  {}", name, id),
                    Stage::Failed(e) => println!("{:<12} failed   {}", name, e),
                    Stage::Skipped => println!("{:<12} skipped", name),
                }
            }

            if !report.is_complete() {
                bail!("the ad was not created");
            }
        }
    }

    Ok(())
}
