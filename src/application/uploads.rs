//! Simulated product image upload.
//!
//! Nothing is read or transmitted. Each file waits the configured delay and
//! receives a fabricated image URL, which is what the admin form needs to fill
//! its thumbnail and gallery fields.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::debug;

pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ImageUploader {
    delay: Duration,
}

impl ImageUploader {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn upload<N: AsRef<str>>(&self, file_names: &[N]) -> Vec<String> {
        let mut urls = Vec::with_capacity(file_names.len());
        for (index, name) in file_names.iter().enumerate() {
            tokio::time::sleep(self.delay).await;
            let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
            let url = format!(
                "https://images.unsplash.com/photo-{millis}-{index}?w=400&h=400&fit=crop"
            );
            debug!(file = name.as_ref(), url = %url, "Simulated image upload");
            urls.push(url);
        }
        urls
    }
}

impl Default for ImageUploader {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_url_per_file_in_order() {
        let uploader = ImageUploader::new(Duration::ZERO);
        let urls = uploader.upload(&["front.png", "back.png"]).await;

        assert_eq!(urls.len(), 2);
        assert!(urls[0].starts_with("https://images.unsplash.com/photo-"));
        assert!(urls[0].ends_with("-0?w=400&h=400&fit=crop"));
        assert!(urls[1].ends_with("-1?w=400&h=400&fit=crop"));
        assert!(storefront_api_types::is_web_url(&urls[1]));
    }

    #[tokio::test]
    async fn no_files_no_urls() {
        let uploader = ImageUploader::new(Duration::ZERO);
        let urls = uploader.upload::<&str>(&[]).await;
        assert!(urls.is_empty());
    }
}
