//! Process configuration read from environment variables.
//!
//! Numeric values that do not parse are a configuration error. Zero falls back to the default.

use std::{path::PathBuf, sync::Arc, time::Duration};

use config::{Config, Environment, Map};
use serde::Deserialize;

use crate::{
    assets::store::DirAssetResolver,
    foundation::error::{CarouselError, CarouselResult},
    generate::{
        openai::DEFAULT_IMAGE_MODEL,
        provider::{ProviderCredentials, ProviderEndpoints},
        router::ProviderRouter,
    },
    jobs::{
        orchestrator::{Orchestrator, OrchestratorOpts},
        poll::PollOpts,
        registry::InMemoryJobRegistry,
        worker::StudioWorker,
    },
    render::raster::Rasterizer,
    storage::LocalDirStore,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioConfig {
    pub credentials: ProviderCredentials,
    pub endpoints: ProviderEndpoints,
    pub output_dir: PathBuf,
    pub assets_dir: PathBuf,
    /// URL prefix under which `output_dir` is served.
    pub public_prefix: String,
    pub job_retention: Duration,
    pub poll: PollOpts,
    pub openai_image_model: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            credentials: ProviderCredentials::default(),
            endpoints: ProviderEndpoints::default(),
            output_dir: PathBuf::from("output"),
            assets_dir: PathBuf::from("assets"),
            public_prefix: "/output".to_string(),
            job_retention: OrchestratorOpts::default().retention,
            poll: PollOpts::default(),
            openai_image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl StudioConfig {
    /// Load from the process environment.
    pub fn from_env() -> CarouselResult<Self> {
        Self::load(Environment::default())
    }

    /// Load from an explicit set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> CarouselResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(Environment::default().source(Some(map)))
    }

    fn load(env: Environment) -> CarouselResult<Self> {
        let raw: RawSettings = Config::builder()
            .add_source(env.ignore_empty(true))
            .build()
            .and_then(|config| config.try_deserialize::<RawSettings>())
            .map_err(|e| CarouselError::validation(format!("configuration: {e}")))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let defaults = Self::default();
        let secs = |value: Option<u64>, default: Duration| {
            value
                .filter(|&n| n > 0)
                .map_or(default, Duration::from_secs)
        };

        let credentials = ProviderCredentials {
            openai: non_blank(raw.openai_api_key),
            anthropic: non_blank(raw.anthropic_api_key),
            gemini: non_blank(raw.gemini_api_key).or_else(|| non_blank(raw.google_api_key)),
            fal: non_blank(raw.fal_api_key).or_else(|| non_blank(raw.fal_key)),
        };
        let poll = PollOpts {
            interval: secs(raw.carousel_poll_interval_secs, defaults.poll.interval),
            timeout: secs(raw.carousel_poll_timeout_secs, defaults.poll.timeout),
            max_consecutive_failures: raw
                .carousel_poll_max_failures
                .filter(|&n| n > 0)
                .unwrap_or(defaults.poll.max_consecutive_failures),
        };

        Self {
            credentials,
            endpoints: defaults.endpoints,
            output_dir: non_blank(raw.carousel_output_dir).map_or(defaults.output_dir, PathBuf::from),
            assets_dir: non_blank(raw.carousel_assets_dir).map_or(defaults.assets_dir, PathBuf::from),
            public_prefix: non_blank(raw.carousel_public_prefix).unwrap_or(defaults.public_prefix),
            job_retention: secs(raw.carousel_job_retention_secs, defaults.job_retention),
            poll,
            openai_image_model: non_blank(raw.openai_image_model)
                .unwrap_or(defaults.openai_image_model),
        }
    }

    pub fn router(&self) -> CarouselResult<ProviderRouter> {
        ProviderRouter::new(
            self.credentials.clone(),
            &self.endpoints,
            &self.openai_image_model,
            self.poll,
        )
    }

    /// Wire providers, assets, storage and an in-memory registry into a ready orchestrator.
    pub fn orchestrator(&self, raster: Rasterizer) -> CarouselResult<Orchestrator> {
        let router = self.router()?;
        tracing::info!(providers = ?router.available(), "providers configured");
        let worker = StudioWorker::new(
            Arc::new(router),
            Arc::new(DirAssetResolver::new(&self.assets_dir)),
            Arc::new(LocalDirStore::new(&self.output_dir, &self.public_prefix)),
            raster,
        );
        Ok(Orchestrator::new(
            Arc::new(InMemoryJobRegistry::new()),
            Arc::new(worker),
            OrchestratorOpts {
                retention: self.job_retention,
            },
        ))
    }
}

/// Variables as the `config` environment source reports them: lowercased, unnested.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    gemini_api_key: Option<String>,
    google_api_key: Option<String>,
    fal_api_key: Option<String>,
    fal_key: Option<String>,
    carousel_output_dir: Option<String>,
    carousel_assets_dir: Option<String>,
    carousel_public_prefix: Option<String>,
    carousel_job_retention_secs: Option<u64>,
    carousel_poll_interval_secs: Option<u64>,
    carousel_poll_timeout_secs: Option<u64>,
    carousel_poll_max_failures: Option<u32>,
    openai_image_model: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
