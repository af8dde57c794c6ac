use crate::archive::{Report, ReportRow, RowStatus};
use crate::error::{DamCamError, Result};
use crate::naming::NameEncoder;
use crate::scanner::{ImageFile, ImageScanner};
use crate::ui::GracefulShutdown;
use filetime::FileTime;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub bytes_copied: u64,
    pub collisions: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl BatchProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            bytes_copied: 0,
            collisions: 0,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_file(&mut self, filename: String, bytes: u64) {
        self.files_processed += 1;
        self.bytes_copied += bytes;
        self.current_file = Some(filename);
    }

    pub fn add_collision(&mut self) {
        self.collisions += 1;
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.elapsed();
        let rate = self.files_processed as f64 / elapsed.as_secs_f64();
        let remaining_files = self.total_files.saturating_sub(self.files_processed);

        if rate > 0.0 && rate.is_finite() {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

/// Renames and copies every image of one camera folder, one report row per
/// image.
pub struct BatchProcessor<'a> {
    encoder: NameEncoder<'a>,
    scanner: ImageScanner,
    overwrite_existing: bool,
    dry_run: bool,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(encoder: NameEncoder<'a>, scanner: ImageScanner) -> Self {
        Self {
            encoder,
            scanner,
            overwrite_existing: false,
            dry_run: false,
            shutdown: None,
        }
    }

    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Compute names and rows without touching the destination.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn process_folder(
        &self,
        input_dir: &Path,
        dest_dir: &Path,
        progress_callback: Option<&dyn Fn(&BatchProgress)>,
    ) -> Result<(Report, BatchProgress)> {
        let images = self.scanner.scan_folder(input_dir)?;
        let mut progress = BatchProgress::new(images.len());
        let mut report = Report::new(self.encoder.context().clone());
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        for image_path in &images {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let image = ImageFile::read(image_path)?;
            let new_name = self.encoder.encode(image.modified(), &image.file_name);
            let new_path = dest_dir.join(&new_name);

            let (status, collides_with, bytes) = match claimed.get(&new_path) {
                Some(first) => {
                    tracing::warn!(
                        "{} resolves to {} already taken by {}; not copied",
                        image.source_path.display(),
                        new_path.display(),
                        first.display()
                    );
                    progress.add_collision();
                    (RowStatus::Collision, Some(first.clone()), 0)
                }
                None if self.dry_run => (RowStatus::Planned, None, 0),
                None => {
                    let bytes = self.copy_image(&image.source_path, &new_path)?;
                    (RowStatus::Copied, None, bytes)
                }
            };

            if status != RowStatus::Collision {
                claimed.insert(new_path.clone(), image.source_path.clone());
            }

            report.push(ReportRow {
                old_path: image.source_path.clone(),
                new_name,
                new_path,
                mod_time: image.modified(),
                created_time: image.created(),
                context: self.encoder.context().clone(),
                status,
                collides_with,
            });
            progress.update_file(image.file_name, bytes);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok((report, progress))
    }

    fn copy_image(&self, source: &Path, dest: &Path) -> Result<u64> {
        if dest.exists() && !self.overwrite_existing {
            return Err(DamCamError::DestinationExists {
                path: dest.display().to_string(),
            });
        }

        let bytes = copy_file_with_buffer(source, dest)?;
        preserve_times(source, dest)?;
        tracing::trace!("Copied {} -> {}", source.display(), dest.display());
        Ok(bytes)
    }
}

fn copy_file_with_buffer(source: &Path, dest: &Path) -> Result<u64> {
    let source_file = fs::File::open(source).map_err(|e| DamCamError::inaccessible(source, e))?;
    let dest_file = fs::File::create(dest).map_err(|e| DamCamError::write_failure(dest, e))?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    let total_bytes =
        io::copy(&mut reader, &mut writer).map_err(|e| DamCamError::write_failure(dest, e))?;

    writer
        .flush()
        .map_err(|e| DamCamError::write_failure(dest, e))?;

    Ok(total_bytes)
}

/// Give `dest` the access and modification times of `source`.
fn preserve_times(source: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| DamCamError::inaccessible(source, e))?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| DamCamError::write_failure(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DeploymentContext;
    use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
    use tempfile::TempDir;

    fn at(h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 11, 11)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn write_image(dir: &Path, name: &str, modified: NaiveDateTime) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        let secs = Local.from_local_datetime(&modified).single().unwrap().timestamp();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).unwrap();
        path
    }

    struct Fixture {
        _temp: TempDir,
        input: PathBuf,
        dest: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("100RECNX");
        let dest = temp.path().join("D1A");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&dest).unwrap();
        Fixture {
            _temp: temp,
            input,
            dest,
        }
    }

    fn context() -> DeploymentContext {
        DeploymentContext::new("ED", "Dam0", "D1A", "100")
    }

    #[test]
    fn test_copies_and_reports_every_image() {
        let fx = fixture();
        let first = write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));
        write_image(&fx.input, "RCNX0002.JPG", at(9, 30, 0));

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        let (report, progress) = processor.process_folder(&fx.input, &fx.dest, None).unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(progress.files_processed, 2);
        assert_eq!(progress.collisions, 0);

        let row = &report.rows[0];
        assert_eq!(row.old_path, first);
        assert_eq!(row.new_name, "ED_Dam0_D1A_100__2022_11_11__8_0__0001.JPG");
        assert_eq!(row.new_path, fx.dest.join(&row.new_name));
        assert_eq!(row.status, RowStatus::Copied);
        assert_eq!(row.mod_time, at(8, 0, 0));
        assert!(row.new_path.exists());
        assert_eq!(fs::read(&row.new_path).unwrap(), b"RCNX0001.JPG");

        let copied = fs::metadata(&row.new_path).unwrap();
        let source = fs::metadata(&first).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&copied),
            FileTime::from_last_modification_time(&source)
        );
    }

    #[test]
    fn test_collision_is_flagged_not_overwritten() {
        let fx = fixture();
        // Both strip to "0001" and share the same minute.
        let first = write_image(&fx.input, "0001.JPG", at(8, 0, 10));
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 40));

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        let (report, progress) = processor.process_folder(&fx.input, &fx.dest, None).unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.collisions(), 1);
        assert_eq!(progress.collisions, 1);

        let dup = &report.rows[1];
        assert_eq!(dup.status, RowStatus::Collision);
        assert_eq!(dup.collides_with.as_deref(), Some(first.as_path()));
        assert_eq!(dup.new_path, report.rows[0].new_path);
        assert_eq!(fs::read(&dup.new_path).unwrap(), b"0001.JPG");
        assert_eq!(fs::read_dir(&fx.dest).unwrap().count(), 1);
    }

    #[test]
    fn test_seconds_avoid_collision() {
        let fx = fixture();
        write_image(&fx.input, "0001.JPG", at(8, 0, 10));
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 40));

        let context = context();
        let encoder = NameEncoder::new(&context).with_include_seconds(true);
        let processor = BatchProcessor::new(encoder, ImageScanner::new("JPG"));
        let (report, _) = processor.process_folder(&fx.input, &fx.dest, None).unwrap();

        assert_eq!(report.collisions(), 0);
        assert_eq!(fs::read_dir(&fx.dest).unwrap().count(), 2);
    }

    #[test]
    fn test_existing_destination_aborts_without_force() {
        let fx = fixture();
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        processor.process_folder(&fx.input, &fx.dest, None).unwrap();

        let err = processor.process_folder(&fx.input, &fx.dest, None).unwrap_err();
        assert!(matches!(err, DamCamError::DestinationExists { .. }));

        let forced = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"))
            .with_overwrite_existing(true);
        let (report, _) = forced.process_folder(&fx.input, &fx.dest, None).unwrap();
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_dry_run_copies_nothing() {
        let fx = fixture();
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"))
            .with_dry_run(true);
        let (report, _) = processor.process_folder(&fx.input, &fx.dest, None).unwrap();

        assert_eq!(report.rows[0].status, RowStatus::Planned);
        assert!(!report.rows[0].new_path.exists());
    }

    #[test]
    fn test_shutdown_cancels_between_files() {
        let fx = fixture();
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));

        let shutdown = GracefulShutdown::new_for_test();
        shutdown.request_shutdown();

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"))
            .with_shutdown(&shutdown);
        let err = processor.process_folder(&fx.input, &fx.dest, None).unwrap_err();
        assert!(matches!(err, DamCamError::Cancelled));
    }

    #[test]
    fn test_progress_callback_is_monotonic() {
        let fx = fixture();
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));
        write_image(&fx.input, "RCNX0002.JPG", at(8, 5, 0));

        let seen = std::cell::RefCell::new(Vec::new());
        let callback = |p: &BatchProgress| seen.borrow_mut().push(p.files_processed);

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        processor
            .process_folder(&fx.input, &fx.dest, Some(&callback))
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&2));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_unwritable_destination_is_write_failure() {
        let fx = fixture();
        write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));

        // A regular file where the download folder should be.
        let blocked = fx.dest.with_file_name("D1B");
        fs::write(&blocked, b"not a folder").unwrap();

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        let err = processor.process_folder(&fx.input, &blocked, None).unwrap_err();

        assert!(matches!(err, DamCamError::WriteFailure { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_image_vanishing_mid_pass_is_inaccessible() {
        let fx = fixture();
        let first = write_image(&fx.input, "RCNX0001.JPG", at(8, 0, 0));
        write_image(&fx.input, "RCNX0002.JPG", at(8, 5, 0));

        // Runs after the folder was listed, before the first image is read.
        let remove_first = |p: &BatchProgress| {
            if p.files_processed == 0 {
                let _ = fs::remove_file(&first);
            }
        };

        let context = context();
        let processor = BatchProcessor::new(NameEncoder::new(&context), ImageScanner::new("JPG"));
        let err = processor
            .process_folder(&fx.input, &fx.dest, Some(&remove_first))
            .unwrap_err();

        match &err {
            DamCamError::InaccessiblePath { path, .. } => {
                assert!(path.ends_with("RCNX0001.JPG"))
            }
            other => panic!("expected InaccessiblePath, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 4);
        assert_eq!(fs::read_dir(&fx.dest).unwrap().count(), 0);
    }

    #[test]
    fn test_progress_tracking() {
        let mut progress = BatchProgress::new(4);
        assert_eq!(progress.percentage(), 0.0);

        progress.update_file("RCNX0001.JPG".to_string(), 100);
        assert_eq!(progress.percentage(), 25.0);
        assert_eq!(progress.bytes_copied, 100);

        progress.add_collision();
        assert_eq!(progress.collisions, 1);
    }
}
