use std::fs::File;
use std::io::Read;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::aggregator::LicenseAssignment;
use crate::closure::FileSet;
use crate::error::FileReadError;
use crate::license::detector::Detector;
use crate::models::FileRecord;

/// Only this many leading bytes of a file are read. License headers sit at
/// the top, so corpus matching only ever sees this prefix.
pub const MAX_READ_BYTES: u64 = 64 * 1024;

/// Read up to [`MAX_READ_BYTES`] of `path`, decoding bytes as Latin-1 so that
/// any content decodes.
pub fn read_bounded(path: &Path) -> Result<String, FileReadError> {
    let to_err = |source| FileReadError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(to_err)?;
    let mut bytes = Vec::new();
    file.take(MAX_READ_BYTES)
        .read_to_end(&mut bytes)
        .map_err(to_err)?;

    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Read every file once, detect its licenses and fold the result into a
/// [`LicenseAssignment`].
///
/// Read failures, empty files and per-file detection errors put the file in
/// the "no license detected" bucket; the run always continues.
pub fn scan_files(files: &FileSet, detector: &mut Detector, show_progress: bool) -> LicenseAssignment {
    let total = files.len();
    let step = (total / 10).max(1);
    let mut assignment = LicenseAssignment::new();

    let pb = if show_progress {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    for (num, path) in files.iter().enumerate() {
        if num % step == 0 {
            tracing::info!(processed = num, total, "Processed {num} of {total} files");
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }

        let mut record = FileRecord::new(path.clone());
        match read_bounded(&record.path) {
            Ok(content) => record.content = Some(content),
            Err(e) => {
                tracing::warn!("{e}");
                assignment.record_undetected(&record.path);
                continue;
            }
        }

        scan_record(&record, detector, &mut assignment);
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    assignment
}

fn scan_record(record: &FileRecord, detector: &mut Detector, assignment: &mut LicenseAssignment) {
    let text = record.content.as_deref().unwrap_or("");
    if text.trim().is_empty() {
        assignment.record_undetected(&record.path);
        return;
    }

    match detector.detect(&record.path, text) {
        Ok(ids) if ids.is_empty() => assignment.record_undetected(&record.path),
        Ok(ids) => {
            for id in &ids {
                assignment.record(id, &record.path);
            }
        }
        Err(e) => {
            tracing::warn!("{e}");
            assignment.record_undetected(&record.path);
        }
    }
}
