use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use follow_core::{Followee, ProfileDetails, Stage};

use crate::client::{FollowingApi, ThrottlePolicy};
use crate::fetch::ProgressSink;
use crate::{ClientError, EngineEvent, RunProgress};

#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub fetch_details: bool,
    pub throttle: ThrottlePolicy,
    pub detail_retries: u32,
}

/// Result of enriching one followee. Failures degrade the record instead of
/// aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    Enriched(ProfileDetails),
    /// No user id to look up.
    Skipped,
    Degraded { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichSummary {
    pub enriched: usize,
    pub skipped: usize,
    pub degraded: usize,
}

/// Fetches the complete following list of `user_id`, optionally enriched.
///
/// Any failed page aborts with no partial result.
pub async fn fetch_following(
    api: &dyn FollowingApi,
    user_id: &str,
    options: &CollectOptions,
    sink: &dyn ProgressSink,
) -> Result<Vec<Followee>, ClientError> {
    let mut followees = collect_pages(api, user_id, options.throttle.page_delay, sink).await?;
    if options.fetch_details {
        let summary = enrich_all(api, &mut followees, options, sink).await;
        engine_info!(
            "Enrichment finished: {} enriched, {} degraded, {} skipped",
            summary.enriched,
            summary.degraded,
            summary.skipped
        );
    }
    Ok(followees)
}

/// Walks the cursor chain strictly in order, concatenating pages as served.
/// Stops at the first page without a cursor.
pub async fn collect_pages(
    api: &dyn FollowingApi,
    user_id: &str,
    page_delay: Duration,
    sink: &dyn ProgressSink,
) -> Result<Vec<Followee>, ClientError> {
    let mut followees = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = api.fetch_page(user_id, cursor.as_deref()).await?;
        pages += 1;
        followees.extend(page.followees);
        engine_debug!("Page {} done, {} followees so far", pages, followees.len());
        sink.emit(EngineEvent::Progress(RunProgress {
            stage: Stage::FetchingPages,
            fetched: followees.len(),
            enriched: 0,
        }));

        match page.next_cursor {
            Some(next) => {
                cursor = Some(next);
                tokio::time::sleep(page_delay).await;
            }
            None => break,
        }
    }
    engine_info!("Fetched {} followees in {} pages", followees.len(), pages);
    Ok(followees)
}

/// Second pass: one detail request per followee, sequential, with the detail
/// delay after each request.
pub async fn enrich_all(
    api: &dyn FollowingApi,
    followees: &mut [Followee],
    options: &CollectOptions,
    sink: &dyn ProgressSink,
) -> EnrichSummary {
    let mut summary = EnrichSummary::default();
    let total = followees.len();
    for (index, followee) in followees.iter_mut().enumerate() {
        let outcome = enrich_one(api, followee, options).await;
        match outcome {
            EnrichOutcome::Enriched(details) => {
                followee.apply_details(details);
                summary.enriched += 1;
            }
            EnrichOutcome::Skipped => summary.skipped += 1,
            EnrichOutcome::Degraded { reason } => {
                engine_debug!("Details for @{} unavailable: {}", followee.username, reason);
                summary.degraded += 1;
            }
        }
        sink.emit(EngineEvent::Progress(RunProgress {
            stage: Stage::Enriching,
            fetched: total,
            enriched: index + 1,
        }));
    }
    summary
}

/// Looks up one followee's details, retrying up to `detail_retries` times.
pub async fn enrich_one(
    api: &dyn FollowingApi,
    followee: &Followee,
    options: &CollectOptions,
) -> EnrichOutcome {
    let Some(user_id) = followee.user_id.as_deref() else {
        return EnrichOutcome::Skipped;
    };
    let mut last_error = String::new();
    for _ in 0..=options.detail_retries {
        let result = api.fetch_details(user_id).await;
        tokio::time::sleep(options.throttle.detail_delay).await;
        match result {
            Ok(details) => return EnrichOutcome::Enriched(details),
            Err(err) => last_error = err.to_string(),
        }
    }
    EnrichOutcome::Degraded { reason: last_error }
}
