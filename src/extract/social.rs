use crate::browse::{Anchor, Browser, Page, WaitPolicy, DEFAULT_BLOCKED_RESOURCES};

/// Host fragments that identify a social-media profile link
pub const SOCIAL_FRAGMENTS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "://x.com",
    "://www.x.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
];

pub fn is_social_link(href: &str) -> bool {
    let href = href.to_ascii_lowercase();
    SOCIAL_FRAGMENTS.iter().any(|fragment| href.contains(fragment))
}

fn social_hrefs(anchors: Vec<Anchor>) -> impl Iterator<Item = String> {
    anchors
        .into_iter()
        .map(|anchor| anchor.href.trim().to_string())
        .filter(|href| is_social_link(href))
}

/// Social links from the page's anchors and from every embedded frame
///
/// Each frame is loaded on its own surface, which is closed afterwards.
pub(super) async fn collect_social_links(page: &dyn Page, browser: &dyn Browser) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    match page.anchors().await {
        Ok(anchors) => {
            for href in social_hrefs(anchors) {
                push_unique(&mut links, href);
            }
        }
        Err(e) => tracing::warn!("Could not read anchors for social links: {}", e),
    }

    let frames = match page.frame_sources().await {
        Ok(frames) => frames,
        Err(e) => {
            tracing::warn!("Could not read frame sources: {}", e);
            Vec::new()
        }
    };

    for source in frames {
        for href in frame_social_links(browser, &source).await {
            push_unique(&mut links, href);
        }
    }

    links
}

fn push_unique(links: &mut Vec<String>, href: String) {
    if !links.contains(&href) {
        links.push(href);
    }
}

async fn frame_social_links(browser: &dyn Browser, source: &str) -> Vec<String> {
    let mut surface = match browser.open_surface().await {
        Ok(surface) => surface,
        Err(e) => {
            tracing::warn!("Could not open a surface for frame {}: {}", source, e);
            return Vec::new();
        }
    };

    let result = async {
        surface.block_resource_types(DEFAULT_BLOCKED_RESOURCES).await?;
        surface.navigate(source, WaitPolicy::DomContentLoaded).await?;
        surface.anchors().await
    }
    .await;

    if let Err(e) = surface.close().await {
        tracing::debug!("Closing frame surface for {} failed: {}", source, e);
    }

    match result {
        Ok(anchors) => social_hrefs(anchors).collect(),
        Err(e) => {
            tracing::debug!("Skipping frame {}: {}", source, e);
            Vec::new()
        }
    }
}
