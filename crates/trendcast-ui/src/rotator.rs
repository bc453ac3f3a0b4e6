//! Background image rotation.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use trendcast_core::BackgroundConfig;

use crate::page::{Background, Page};

const PRELOAD_TIMEOUT_SECS: u64 = 15;

/// Fetches image bytes ahead of time so a rotation never waits on the network.
pub trait Preloader {
    /// Returns `None` when the image could not (or should not) be fetched.
    fn fetch(&self, url: &str) -> impl Future<Output = Option<Vec<u8>>> + Send;
}

/// Downloads images over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPreloader {
    client: reqwest::Client,
}

impl HttpPreloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PRELOAD_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl Preloader for HttpPreloader {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to preload {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Preloading {} returned status {}", url, response.status());
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => {
                tracing::debug!("Preloaded {} ({} bytes)", url, bytes.len());
                Some(bytes.to_vec())
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", url, e);
                None
            }
        }
    }
}

/// Registers images without downloading them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipPreload;

impl Preloader for SkipPreload {
    async fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

/// A catalog image held in memory
#[derive(Debug, Clone)]
pub struct PreloadedImage {
    pub url: String,
    pub bytes: Option<Vec<u8>>,
}

/// Owns the catalog and the index of the last image shown.
#[derive(Debug, Clone)]
pub struct ImageRotator {
    initial: String,
    catalog: Vec<String>,
    initial_image: Option<PreloadedImage>,
    preloaded: Vec<PreloadedImage>,
    last_index: Option<usize>,
}

impl ImageRotator {
    pub fn new(initial: impl Into<String>, catalog: Vec<String>) -> Self {
        Self {
            initial: initial.into(),
            catalog,
            initial_image: None,
            preloaded: Vec::new(),
            last_index: None,
        }
    }

    pub fn from_config(config: &BackgroundConfig) -> Self {
        Self::new(config.initial.clone(), config.catalog.clone())
    }

    /// Fetch the initial image and every catalog image concurrently.
    ///
    /// Images that fail to download keep an empty handle and stay in the
    /// rotation; their URL still works as a background.
    pub async fn preload<P: Preloader>(&mut self, preloader: &P) {
        let (initial_bytes, catalog_bytes) = futures::join!(
            preloader.fetch(&self.initial),
            join_all(self.catalog.iter().map(|url| preloader.fetch(url)))
        );

        self.initial_image = Some(PreloadedImage {
            url: self.initial.clone(),
            bytes: initial_bytes,
        });

        // join_all keeps catalog order
        self.preloaded = self
            .catalog
            .iter()
            .zip(catalog_bytes)
            .map(|(url, bytes)| PreloadedImage {
                url: url.clone(),
                bytes,
            })
            .collect();

        let fetched = self.preloaded.iter().filter(|i| i.bytes.is_some()).count();
        tracing::info!(
            "Preloaded {}/{} background images",
            fetched,
            self.preloaded.len()
        );
    }

    pub fn preloaded(&self) -> &[PreloadedImage] {
        &self.preloaded
    }

    pub fn initial_image(&self) -> Option<&PreloadedImage> {
        self.initial_image.as_ref()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Restore a previously shown index; out-of-range values are ignored.
    pub fn restore_last_index(&mut self, index: Option<usize>) {
        match index {
            Some(i) if i < self.catalog.len() => self.last_index = Some(i),
            Some(i) => tracing::debug!("Ignoring stale rotation index {}", i),
            None => self.last_index = None,
        }
    }

    pub fn set_initial<P: Page>(&self, page: &mut P) {
        page.set_background(Background::new(self.initial.as_str()));
    }

    /// Show a random preloaded image other than the previous one.
    pub fn rotate<P: Page>(&mut self, page: &mut P) -> Option<usize> {
        self.rotate_with(page, &mut rand::thread_rng())
    }

    pub fn rotate_with<P: Page, R: Rng>(
        &mut self,
        page: &mut P,
        rng: &mut R,
    ) -> Option<usize> {
        let index = match self.preloaded.len() {
            0 => {
                tracing::warn!("No preloaded backgrounds to rotate through");
                return None;
            }
            // Redrawing could never leave the previous index
            1 => 0,
            len => loop {
                let candidate = rng.gen_range(0..len);
                if Some(candidate) != self.last_index {
                    break candidate;
                }
            },
        };

        self.last_index = Some(index);
        let url = self.preloaded[index].url.as_str();
        tracing::debug!("Rotating background to #{}: {}", index, url);
        page.set_background(Background::new(url));
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://img.test/{}.jpg", i)).collect()
    }

    async fn preloaded_rotator(n: usize) -> ImageRotator {
        let mut rotator = ImageRotator::new("https://img.test/initial.gif", catalog(n));
        rotator.preload(&SkipPreload).await;
        rotator
    }

    struct FakePreloader;

    impl Preloader for FakePreloader {
        async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
            (!url.ends_with("3.jpg")).then(|| url.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_preload_keeps_failed_images() {
        let mut rotator = ImageRotator::new("https://img.test/initial.gif", catalog(8));
        rotator.preload(&FakePreloader).await;

        assert_eq!(rotator.preloaded().len(), 8);
        assert!(rotator.preloaded()[3].bytes.is_none());
        assert!(rotator.preloaded()[2].bytes.is_some());
        assert!(rotator.initial_image().and_then(|i| i.bytes.as_ref()).is_some());
    }

    #[tokio::test]
    async fn test_preload_fetches_concurrently() {
        use std::time::Instant;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"img".to_vec())
                    .set_delay(Duration::from_millis(800)),
            )
            .expect(9)
            .mount(&server)
            .await;

        let catalog = (0..8)
            .map(|i| format!("{}/{}.jpg", server.uri(), i))
            .collect();
        let mut rotator = ImageRotator::new(format!("{}/initial.gif", server.uri()), catalog);
        let preloader = HttpPreloader::new().unwrap();

        let started = Instant::now();
        rotator.preload(&preloader).await;
        let elapsed = started.elapsed();

        assert_eq!(rotator.preloaded().len(), 8);
        assert!(rotator.preloaded().iter().all(|i| i.bytes.is_some()));
        assert_eq!(rotator.preloaded()[5].url, format!("{}/5.jpg", server.uri()));
        // Nine sequential fetches would take over seven seconds
        assert!(elapsed < Duration::from_secs(3), "preload took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_never_repeats_consecutively() {
        for size in 2..=8 {
            let mut rotator = preloaded_rotator(size).await;
            let mut page = MemoryPage::empty();
            let mut rng = StdRng::seed_from_u64(size as u64);

            let mut previous = None;
            for _ in 0..500 {
                let index = rotator.rotate_with(&mut page, &mut rng);
                assert!(index.is_some());
                assert_ne!(index, previous, "catalog size {}", size);
                previous = index;
            }
        }
    }

    #[tokio::test]
    async fn test_rotate_applies_background() {
        let mut rotator = preloaded_rotator(8).await;
        let mut page = MemoryPage::empty();
        rotator.set_initial(&mut page);

        let index = rotator.rotate(&mut page).unwrap();

        assert_eq!(page.background_history().len(), 2);
        assert_eq!(
            page.background().map(|b| b.url.clone()),
            Some(format!("https://img.test/{}.jpg", index))
        );
        assert_eq!(rotator.last_index(), Some(index));
    }

    #[tokio::test]
    async fn test_single_image_does_not_hang() {
        let mut rotator = preloaded_rotator(1).await;
        let mut page = MemoryPage::empty();
        assert_eq!(rotator.rotate(&mut page), Some(0));
        assert_eq!(rotator.rotate(&mut page), Some(0));
    }

    #[test]
    fn test_rotate_before_preload_is_noop() {
        let mut rotator = ImageRotator::new("https://img.test/initial.gif", catalog(8));
        let mut page = MemoryPage::empty();
        assert_eq!(rotator.rotate(&mut page), None);
        assert_eq!(page.mutation_count(), 0);
    }

    #[test]
    fn test_set_initial() {
        let rotator = ImageRotator::new("https://img.test/initial.gif", catalog(2));
        let mut page = MemoryPage::empty();
        rotator.set_initial(&mut page);
        assert_eq!(
            page.background().map(|b| b.url.as_str()),
            Some("https://img.test/initial.gif")
        );
    }

    #[tokio::test]
    async fn test_restored_index_is_avoided() {
        let mut rotator = preloaded_rotator(2).await;
        rotator.restore_last_index(Some(1));
        let mut page = MemoryPage::empty();
        assert_eq!(rotator.rotate(&mut page), Some(0));
    }

    #[test]
    fn test_restore_ignores_out_of_range() {
        let mut rotator = ImageRotator::new("https://img.test/initial.gif", catalog(2));
        rotator.restore_last_index(Some(7));
        assert_eq!(rotator.last_index(), None);
    }
}
