use assert_cmd::Command;
use chrono::{Local, NaiveDate, TimeZone};
use filetime::FileTime;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_image(dir: &Path, name: &str, hour: u32, minute: u32) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, b"jpeg").unwrap();

    let modified = NaiveDate::from_ymd_opt(2022, 11, 11)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    let secs = Local.from_local_datetime(&modified).single().unwrap().timestamp();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).unwrap();
    path
}

fn damcam(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("damcam").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("RUST_LOG")
        .arg(temp.path().join("DCIM"))
        .arg("--output")
        .arg(temp.path().join("Renamed"))
        .arg("--reports")
        .arg(temp.path().join("Reports"))
        .arg("--output-format")
        .arg("plain");
    cmd
}

#[test]
fn generates_sample_config() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("site.toml");

    Command::cargo_bin("damcam")
        .unwrap()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("study_area"));
}

#[test]
fn renames_copies_and_reports() {
    let temp = TempDir::new().unwrap();
    let dcim = temp.path().join("DCIM");
    write_image(&dcim.join("100RECNX"), "RCNX0001.JPG", 8, 0);
    write_image(&dcim.join("100RECNX"), "RCNX0002.JPG", 13, 42);
    write_image(&dcim.join("101RECNX"), "RCNX0001.JPG", 16, 0);

    damcam(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETED"))
        .stdout(predicate::str::contains("Images: 3"));

    let renamed = temp.path().join("Renamed");
    assert!(renamed
        .join("D1A/ED_Dam0_D1A_100__2022_11_11__8_0__0001.JPG")
        .exists());
    assert!(renamed
        .join("D1A/ED_Dam0_D1A_100__2022_11_11__13_42__0002.JPG")
        .exists());
    assert!(renamed
        .join("D1B/ED_Dam0_D1B_101__2022_11_11__16_0__0001.JPG")
        .exists());

    let report = fs::read_to_string(temp.path().join("Reports/ED_Dam0_D1A_100.csv")).unwrap();
    let mut lines = report.lines();
    assert_eq!(
        lines.next(),
        Some(",OldPath,NewName,NewPath,ModTime,CreatedTime,StudyArea,Place,Download,AuxFolder,Status,CollidesWith")
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn site_codes_and_time_delta_from_flags() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/102RECNX"), "RCNX0007.JPG", 0, 30);

    damcam(&temp)
        .args(["--study-area", "SF", "--place", "Dam3", "--download-prefix", "D2"])
        .args(["--time-delta", "1"])
        .assert()
        .success();

    assert!(temp
        .path()
        .join("Renamed/D2C/SF_Dam3_D2C_102__2022_11_10__23_30__0007.JPG")
        .exists());
}

#[test]
fn dry_run_leaves_disk_untouched() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);

    damcam(&temp)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("ED_Dam0_D1A_100__2022_11_11__8_0__0001.JPG"));

    assert!(!temp.path().join("Renamed").exists());
    assert!(!temp.path().join("Reports").exists());
}

#[test]
fn unmapped_folder_exits_with_code_3() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);
    write_image(&temp.path().join("DCIM/130RECNX"), "RCNX0001.JPG", 8, 0);

    damcam(&temp)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("INCOMPLETE"))
        .stderr(predicate::str::contains("130RECNX"));

    // The folder before the bad one was still finished.
    assert!(temp.path().join("Reports/ED_Dam0_D1A_100.csv").exists());
}

#[test]
fn collisions_exit_with_code_2() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("DCIM/100RECNX");
    write_image(&folder, "0001.JPG", 8, 0);
    write_image(&folder, "RCNX0001.JPG", 8, 0);

    damcam(&temp)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Collisions: 1"));

    let report = fs::read_to_string(temp.path().join("Reports/ED_Dam0_D1A_100.csv")).unwrap();
    assert!(report.contains("collision"));
}

#[test]
fn second_run_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);

    damcam(&temp).assert().success();
    damcam(&temp).assert().code(6);
    damcam(&temp).arg("--force").assert().success();
}

#[test]
fn rejects_out_of_range_time_delta() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("DCIM")).unwrap();

    damcam(&temp)
        .args(["--time-delta", "48"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Time delta"));
}

#[test]
fn json_output_is_a_single_document() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);
    write_image(&temp.path().join("DCIM/101RECNX"), "RCNX0001.JPG", 16, 0);

    let output = Command::cargo_bin("damcam")
        .unwrap()
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .arg(temp.path().join("DCIM"))
        .arg("--output")
        .arg(temp.path().join("Renamed"))
        .arg("--reports")
        .arg(temp.path().join("Reports"))
        .args(["--output-format", "json", "-v"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["passes"].as_array().unwrap().len(), 2);
    assert!(summary["error"].is_null());
}

#[test]
fn json_failure_summary_is_a_single_document() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);
    write_image(&temp.path().join("DCIM/99RECNX"), "RCNX0001.JPG", 8, 0);

    let output = Command::cargo_bin("damcam")
        .unwrap()
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .arg(temp.path().join("DCIM"))
        .arg("--output")
        .arg(temp.path().join("Renamed"))
        .arg("--reports")
        .arg(temp.path().join("Reports"))
        .args(["--output-format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["passes"].as_array().unwrap().len(), 1);
    assert!(summary["failed_folder"]
        .as_str()
        .unwrap()
        .ends_with("99RECNX"));
}

#[test]
fn unwritable_output_root_exits_with_code_5() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);
    // A regular file where the output root folder should be.
    fs::write(temp.path().join("Renamed"), b"not a folder").unwrap();

    damcam(&temp)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Renamed"));
}

#[test]
fn dry_run_details_follow_quiet() {
    let temp = TempDir::new().unwrap();
    write_image(&temp.path().join("DCIM/100RECNX"), "RCNX0001.JPG", 8, 0);

    damcam(&temp)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN MODE"))
        .stdout(predicate::str::contains("Input root:"));

    damcam(&temp)
        .args(["--dry-run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN MODE").not())
        .stdout(predicate::str::contains("Input root:").not());
}
