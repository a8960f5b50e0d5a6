//! Image loading: fetch + decode, and prefetching for the preload worker.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::Mutex;
use reqwest::Url;

use crate::error::LoadError;

/// Prefetched bodies kept for the next [`ImageLoader::load`].
const PREFETCH_CAPACITY: usize = 16;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch and decode the image at `url`.
    async fn load(&self, url: &str) -> Result<DynamicImage, LoadError>;

    /// Fetch `url` ahead of time so a later `load` is fast.
    async fn prefetch(&self, url: &str) -> Result<(), LoadError>;
}

/// Loads images over HTTP, resolving relative URLs against a base.
pub struct HttpImageLoader {
    http: reqwest::Client,
    base: Option<Url>,
    prefetched: Mutex<VecDeque<(String, Vec<u8>)>>,
}

impl HttpImageLoader {
    pub fn new(base: Option<&str>) -> Result<Self, LoadError> {
        let base = base
            .map(|b| {
                Url::parse(b).map_err(|e| LoadError::Url {
                    url: b.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LoadError::Fetch(e.to_string()))?;
        Ok(Self {
            http,
            base,
            prefetched: Mutex::new(VecDeque::new()),
        })
    }

    /// Absolute URL for `url`, joined onto the base when one is set.
    pub fn resolve(&self, url: &str) -> Result<Url, LoadError> {
        let resolved = match &self.base {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| LoadError::Url {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let resolved = self.resolve(url)?;
        let response = self
            .http
            .get(resolved.clone())
            .send()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
                url: resolved.to_string(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }

    fn take_prefetched(&self, url: &str) -> Option<Vec<u8>> {
        let mut cache = self.prefetched.lock();
        let index = cache.iter().position(|(u, _)| u == url)?;
        cache.remove(index).map(|(_, body)| body)
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<DynamicImage, LoadError> {
        let body = match self.take_prefetched(url) {
            Some(body) => body,
            None => self.fetch(url).await?,
        };
        log::debug!("decoding {} bytes from {url}", body.len());
        decode(body).await
    }

    async fn prefetch(&self, url: &str) -> Result<(), LoadError> {
        let body = self.fetch(url).await?;
        let mut cache = self.prefetched.lock();
        if cache.len() == PREFETCH_CAPACITY {
            cache.pop_front();
        }
        cache.push_back((url.to_string(), body));
        Ok(())
    }
}

/// Decode off the async workers.
pub async fn decode(body: Vec<u8>) -> Result<DynamicImage, LoadError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&body))
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
        .map_err(LoadError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn resolves_relative_urls() {
        let loader = HttpImageLoader::new(Some("http://localhost:8000/")).unwrap();
        assert_eq!(
            loader.resolve("/resource/pixiv/a.png").unwrap().as_str(),
            "http://localhost:8000/resource/pixiv/a.png"
        );
        assert_eq!(
            loader.resolve("https://cdn.example/x.jpg").unwrap().as_str(),
            "https://cdn.example/x.jpg"
        );
    }

    #[test]
    fn relative_url_without_base_is_an_error() {
        let loader = HttpImageLoader::new(None).unwrap();
        assert!(matches!(
            loader.resolve("/resource/a.png"),
            Err(LoadError::Url { .. })
        ));
    }

    #[tokio::test]
    async fn decode_png_bytes() {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(3, 2))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        let image = decode(png.into_inner()).await.unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[tokio::test]
    async fn decode_garbage_fails() {
        assert!(matches!(
            decode(b"not an image".to_vec()).await,
            Err(LoadError::Decode(_))
        ));
    }
}
