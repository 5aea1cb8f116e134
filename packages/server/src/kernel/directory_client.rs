use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{
    BaseDogRegistry, BaseMemberDirectory, DogProfile, VerificationStatus, WalkerPreferences,
};
use crate::common::utils::GeoPoint;
use crate::common::{DogId, MemberId};

/// HTTP client for the identity/profile service, which also owns dog profiles.
pub struct DirectoryClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    status: VerificationStatus,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    blocked: bool,
}

#[derive(Debug, Serialize)]
struct LastLocationRequest {
    latitude: f64,
    longitude: f64,
    recorded_at: DateTime<Utc>,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Option<T>> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .with_context(|| format!("Failed to call directory service: GET {path}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Directory service error {} on {}: {}", status, path, body);
        }

        let value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse directory response for {path}"))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl BaseMemberDirectory for DirectoryClient {
    async fn verification_status(&self, member_id: MemberId) -> Result<VerificationStatus> {
        let response: Option<VerificationResponse> = self
            .get_json(&format!("/members/{member_id}/verification"))
            .await?;
        Ok(response.map_or(VerificationStatus::Unverified, |r| r.status))
    }

    async fn walker_preferences(&self, walker_id: MemberId) -> Result<WalkerPreferences> {
        let prefs: Option<WalkerPreferences> = self
            .get_json(&format!("/walkers/{walker_id}/preferences"))
            .await?;
        Ok(prefs.unwrap_or_default())
    }

    async fn is_blocked(&self, owner_id: MemberId, walker_id: MemberId) -> Result<bool> {
        let response: Option<BlockResponse> = self
            .get_json(&format!("/owners/{owner_id}/blocks/{walker_id}"))
            .await?;
        Ok(response.is_some_and(|r| r.blocked))
    }

    async fn update_last_location(
        &self,
        walker_id: MemberId,
        point: GeoPoint,
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        let body = LastLocationRequest {
            latitude: point.latitude,
            longitude: point.longitude,
            recorded_at,
        };

        let response = self
            .client
            .put(format!("{}/walkers/{walker_id}/last-location", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Failed to send last-location update")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Directory service error {}: {}", status, body);
        }
        Ok(())
    }
}

#[async_trait]
impl BaseDogRegistry for DirectoryClient {
    async fn find_dog(&self, dog_id: DogId) -> Result<Option<DogProfile>> {
        self.get_json(&format!("/dogs/{dog_id}")).await
    }
}
