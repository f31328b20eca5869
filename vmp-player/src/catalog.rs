//! Music data catalog boundary
//!
//! The venue platform supplies the music configuration (intervals, tracks,
//! ad spots) over its API. The core only consumes whatever snapshot is
//! currently installed in shared state; this module is the fetch-and-install
//! seam, with a trait so tests can inject a fake source.

use crate::state::SharedState;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vmp_common::model::{Ad, Interval, MusicData, Track};
use vmp_common::{Error, Result};

/// Remote source of music data snapshots
#[async_trait]
pub trait MusicDataSource: Send + Sync {
    async fn fetch(&self) -> Result<MusicData>;
}

/// Wire format of the platform's music data payload
#[derive(Debug, Deserialize)]
struct MusicDataDto {
    #[serde(default)]
    intervals: Vec<IntervalDto>,
    #[serde(default)]
    tracks: Vec<TrackDto>,
    #[serde(default)]
    ads: Vec<AdDto>,
}

#[derive(Debug, Deserialize)]
struct IntervalDto {
    start: u32,
    end: u32,
    #[serde(default)]
    track_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct TrackDto {
    id: u32,
    title: String,
    artist: String,
    duration_secs: u32,
    media_url: String,
}

#[derive(Debug, Deserialize)]
struct AdDto {
    id: u32,
    audio_url: String,
}

impl From<MusicDataDto> for MusicData {
    fn from(dto: MusicDataDto) -> Self {
        MusicData {
            // The real version is assigned when the snapshot is installed
            version: 0,
            intervals: dto
                .intervals
                .into_iter()
                .map(|i| Interval {
                    start: i.start,
                    end: i.end,
                    track_ids: i.track_ids,
                })
                .collect(),
            tracks: dto
                .tracks
                .into_iter()
                .map(|t| Track {
                    id: t.id,
                    title: t.title,
                    artist: t.artist,
                    duration_secs: t.duration_secs,
                    media_url: t.media_url,
                })
                .collect(),
            ads: dto
                .ads
                .into_iter()
                .map(|a| Ad {
                    id: a.id,
                    audio_url: a.audio_url,
                })
                .collect(),
        }
    }
}

/// Music data source backed by the platform HTTP API
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MusicDataSource for HttpCatalog {
    async fn fetch(&self) -> Result<MusicData> {
        let url = format!("{}/music-data", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Catalog(format!(
                "unexpected status {} for {url}",
                response.status()
            )));
        }

        let dto: MusicDataDto = response
            .json()
            .await
            .map_err(|e| Error::Catalog(format!("invalid payload from {url}: {e}")))?;

        Ok(dto.into())
    }
}

/// Fetches snapshots and installs them into shared state
///
/// An initial load happens at startup; afterwards the service refreshes on
/// a fixed interval. Fetch failures are logged and retried on the next
/// interval, never fatal: the scheduler simply no-ops until data appears.
pub struct CatalogService {
    state: Arc<SharedState>,
    source: Arc<dyn MusicDataSource>,
    refresh: Duration,
}

impl CatalogService {
    pub fn new(
        state: Arc<SharedState>,
        source: Arc<dyn MusicDataSource>,
        refresh: Duration,
    ) -> Self {
        Self {
            state,
            source,
            refresh,
        }
    }

    /// Fetch one snapshot and install it; returns the assigned version
    pub async fn load(&self) -> Result<u64> {
        let data = self.source.fetch().await?;
        let version = self.state.install_music_data(data).await;
        info!(version, "music data installed");
        Ok(version)
    }

    /// Refresh the snapshot periodically until the token is cancelled
    pub async fn run(self, cancel: CancellationToken) {
        info!("catalog refresh started ({:?} interval)", self.refresh);

        let mut interval = tokio::time::interval(self.refresh);
        // The caller already performed the initial load
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("catalog refresh stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(err) = self.load().await {
                        warn!(%err, "music data refresh failed");
                    }
                }
            }
        }
    }
}
