// Example usage of the facebook_boost library
// Requires real credentials in FB_ACCESS_TOKEN, FB_PAGE_ID and FB_AD_ACCOUNT_ID,
// and creates live (paused) objects on the ad account when run.

use anyhow::Result;
use facebook_boost::*;

#[tokio::main]
async fn main() -> Result<()> {
    let access_token = std::env::var("FB_ACCESS_TOKEN")?;
    let page_id = std::env::var("FB_PAGE_ID")?;
    let ad_account_id = std::env::var("FB_AD_ACCOUNT_ID")?;

    let client = GraphClient::new(config::DEFAULT_GRAPH_URL, config::DEFAULT_API_VERSION)?;
    let posts = PostManager::new(client.clone(), &access_token, &page_id);
    let ads = AdManager::new(client, &access_token, &ad_account_id)?;

    // A link is needed in the post for the ad to be created
    let request = PipelineRequest::new(
        PostContent::message("Post with link and Ad").with_link("https://lenaai.net"),
        CampaignSpec::with_categories(["HOUSING"]),
    );

    let report = run_pipeline(&posts, &ads, &request).await;
    for (name, stage) in report.stages() {
        println!("{}: {:?}", name, stage);
    }

    match report.ad_id() {
        Some(id) => println!("Ad created: {}", id),
        None => println!("The ad was not created"),
    }

    Ok(())
}
