//! NATS client wrapper and notifier
//!
//! Report events are published as JSON on `moderation.reports.<listing_id>`
//! so admin tooling can subscribe to `moderation.reports.>`.

use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info};

use super::{AdminNotifier, ReportEvent};
use crate::config::NatsArgs;
use crate::types::{ModerationError, Result};

/// Subject prefix for report events
pub const REPORT_SUBJECT_PREFIX: &str = "moderation.reports";

const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(120);

/// NATS connection wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    pub async fn new(args: &NatsArgs, name: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", args.nats_url);

        // No retry on initial connect: startup should fail fast
        let mut options = ConnectOptions::new()
            .name(name)
            .ping_interval(DEFAULT_PING_INTERVAL)
            .connection_timeout(Duration::from_secs(5));

        if let (Some(user), Some(pass)) = (&args.nats_user, &args.nats_password) {
            options = options.user_and_password(user.clone(), pass.clone());
        }

        let client = options
            .connect(&args.nats_url)
            .await
            .map_err(|e| ModerationError::Nats(format!("Failed to connect: {}", e)))?;

        info!("Connected to NATS at {}", args.nats_url);

        Ok(Self { client })
    }

    pub async fn publish(&self, subject: &str, payload: Bytes) -> Result<()> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| ModerationError::Nats(format!("Publish failed: {}", e)))
    }
}

/// Subject a report event is published on
pub fn report_subject(listing_id: &str) -> String {
    format!("{}.{}", REPORT_SUBJECT_PREFIX, listing_id)
}

/// Publishes report events to NATS
pub struct NatsNotifier {
    nats: NatsClient,
}

impl NatsNotifier {
    pub fn new(nats: NatsClient) -> Self {
        Self { nats }
    }
}

#[async_trait]
impl AdminNotifier for NatsNotifier {
    fn name(&self) -> &'static str {
        "nats"
    }

    async fn notify(&self, event: &ReportEvent) -> Result<()> {
        let subject = report_subject(&event.listing_id);
        let payload = serde_json::to_vec(event)?;
        self.nats.publish(&subject, Bytes::from(payload)).await?;
        debug!("Published report event on {}", subject);
        Ok(())
    }
}
