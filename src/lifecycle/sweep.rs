use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::db::ObjectStore;
use crate::record::{HighlightRecord, StoredRecord, TranscriptRecord, VideoRecord};

/// Records removed by one sweep, per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub cutoff: DateTime<Utc>,
    pub videos: u64,
    pub transcripts: u64,
    pub highlights: u64,
}

impl SweepReport {
    fn empty(cutoff: DateTime<Utc>) -> Self {
        Self {
            cutoff,
            videos: 0,
            transcripts: 0,
            highlights: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.videos + self.transcripts + self.highlights
    }
}

/// Delete records saved more than `retention_hours` before `reference_time` (default now),
/// whichever session owns them.
pub async fn sweep_expired_records(
    store: &ObjectStore,
    retention_hours: i64,
    reference_time: Option<DateTime<Utc>>,
) -> SweepReport {
    let now = reference_time.unwrap_or_else(Utc::now);
    if retention_hours <= 0 {
        warn!("Skipping sweep: retention must be positive, got {} hours", retention_hours);
        return SweepReport::empty(now);
    }
    let cutoff = chrono::Duration::try_hours(retention_hours)
        .and_then(|retention| now.checked_sub_signed(retention))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    info!(
        "Sweeping records older than {} hours (cutoff: {})",
        retention_hours,
        cutoff.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let report = SweepReport {
        cutoff,
        videos: sweep_collection::<VideoRecord>(store, cutoff).await,
        transcripts: sweep_collection::<TranscriptRecord>(store, cutoff).await,
        highlights: sweep_collection::<HighlightRecord>(store, cutoff).await,
    };

    if report.total() > 0 {
        info!(
            "Swept {} videos, {} transcripts, {} highlights",
            report.videos, report.transcripts, report.highlights
        );
    } else {
        info!("No expired records to sweep");
    }
    report
}

async fn sweep_collection<R: StoredRecord>(store: &ObjectStore, cutoff: DateTime<Utc>) -> u64 {
    store.delete_saved_before::<R>(cutoff).await
}
