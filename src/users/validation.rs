use super::repo_types::SocialLinks;
use crate::error::{AppError, AppResult};

pub const GITHUB_REQUIRED: &str = "GitHub profile is required";

/// Absolute URL in the WHATWG sense; relative references are rejected.
pub fn is_valid_url(url: &str) -> bool {
    reqwest::Url::parse(url).is_ok()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim every link, drop empty ones, require GitHub and check each URL.
pub fn normalize_links(input: SocialLinks) -> AppResult<SocialLinks> {
    let links = SocialLinks {
        github: clean(input.github),
        gitlab: clean(input.gitlab),
        medium: clean(input.medium),
        devto: clean(input.devto),
        twitter: clean(input.twitter),
        linkedin: clean(input.linkedin),
        website: clean(input.website),
    };

    if links.github.is_none() {
        return Err(AppError::bad_request(GITHUB_REQUIRED));
    }

    for (field, value) in links.fields() {
        if let Some(url) = value {
            if !is_valid_url(url) {
                return Err(AppError::bad_request(format!("Invalid URL format for {field}")));
            }
        }
    }

    Ok(links)
}
