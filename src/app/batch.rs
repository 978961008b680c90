use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::MediaConfig;
use crate::core::fs::{collect_media_files, subtitles_already_exist, MediaFile};
use crate::core::notify::{NotificationIcon, Notifier};
use crate::utils::Error;

use super::matcher::{FileOutcome, SubtitleMatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub downloaded: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.downloaded + self.already_present + self.skipped + self.failed
    }
}

/// Courtesy delay between files that talk to the catalog.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    delay: Duration,
    previous_file_called_provider: bool,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            previous_file_called_provider: false,
        }
    }

    pub fn delay_before_next_call(&self) -> Option<Duration> {
        (self.previous_file_called_provider && !self.delay.is_zero()).then_some(self.delay)
    }

    pub async fn wait(&self) {
        if let Some(delay) = self.delay_before_next_call() {
            debug!("Waiting {}ms before next request", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    pub fn record(&mut self, called_provider: bool) {
        self.previous_file_called_provider = called_provider;
    }
}

/// Process a single media file, or every media file under a folder.
pub async fn run(
    matcher: &mut SubtitleMatcher<'_>,
    input: &Path,
    media: &MediaConfig,
    delay: Duration,
) -> Result<BatchSummary, Error> {
    let mut summary = BatchSummary::default();

    if input.is_file() {
        let file = MediaFile::from_path(input)
            .ok_or_else(|| Error::Other(format!("'{}' is not a media file", input.display())))?;
        process_one(matcher, &file, &mut summary).await;
        return Ok(summary);
    }

    if !input.is_dir() {
        return Err(Error::Other(format!("Input path '{}' does not exist", input.display())));
    }

    let files = collect_media_files(input, media.extensions());
    info!("Processing {} media files under '{}'", files.len(), input.display());

    let mut pacer = RequestPacer::new(delay);
    for file in &files {
        if subtitles_already_exist(
            &file.relative_path,
            &file.filename_no_extension,
            media.language_code(),
        ) {
            info!("Subtitles already exist for '{}', skipping", file.path.display());
            summary.skipped += 1;
            pacer.record(false);
            continue;
        }

        pacer.wait().await;
        let calls_before = matcher.provider_calls();
        process_one(matcher, file, &mut summary).await;
        pacer.record(matcher.provider_calls() > calls_before);
    }

    Ok(summary)
}

async fn process_one(
    matcher: &mut SubtitleMatcher<'_>,
    file: &MediaFile,
    summary: &mut BatchSummary,
) {
    match matcher.process(file).await {
        Ok(FileOutcome::Downloaded { .. }) => summary.downloaded += 1,
        Ok(FileOutcome::AlreadyExists { destination }) => {
            debug!("Kept existing '{}'", destination.display());
            summary.already_present += 1;
        }
        Err(e) => {
            error!("'{}': {e}", file.path.display());
            summary.failed += 1;
        }
    }
}

/// Log the totals. Runs over more than one file also get a summary notification.
pub fn report_summary(summary: &BatchSummary, notifier: &dyn Notifier) {
    let message = format!(
        "Done with {} files: {} downloaded, {} already present, {} skipped, {} failed",
        summary.total(),
        summary.downloaded,
        summary.already_present,
        summary.skipped,
        summary.failed
    );
    if summary.failed > 0 {
        warn!("{message}");
    } else {
        info!("{message}");
    }
    if summary.total() > 1 {
        notifier.notify(&message, NotificationIcon::Logo, summary.failed > 0);
    }
}
