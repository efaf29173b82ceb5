//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Fetch every post from the configured repository and render the site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, blog.source()?)?;
    let summary = generator.generate().await?;

    if summary.skipped > 0 {
        tracing::warn!("{} posts vanished during the build", summary.skipped);
    }
    tracing::info!(
        "Generated {} posts and copied {} static files",
        summary.posts,
        summary.assets
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
