//! Cassette replay integration tests. Zero network I/O.
//!
//! Every test writes a cassette into a temp dir and points `BESTPHOTO_REPLAY`
//! at it, so the binary never contacts Gemini or Cloudinary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "name: test\nrecorded_at: 2025-05-01T10:00:00Z\ncommit: abc123\n";

fn cmd(cassette: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bestphoto");
    cmd.env("BESTPHOTO_REPLAY", cassette)
        .env("BESTPHOTO_CONFIG", "/nonexistent/bestphoto/config.toml")
        .env("CLOUDINARY_CLOUD_NAME", "demo")
        .env_remove("BESTPHOTO_REC")
        .env_remove("GEMINI_API_KEY");
    cmd
}

fn write_cassette(dir: &TempDir, interactions: &str) -> PathBuf {
    let path = dir.path().join("session.cassette.yaml");
    std::fs::write(&path, format!("{HEADER}interactions:\n{interactions}")).unwrap();
    path
}

fn vision_reply(seq: u64, text: &str) -> String {
    format!(
        "  - seq: {seq}\n    port: vision_model\n    method: generate\n    input: {{}}\n    \
         output:\n      Ok:\n        text: \"{text}\"\n        raw: {{}}\n"
    )
}

fn photos(dir: &TempDir, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, name.as_bytes()).unwrap();
            path.to_str().unwrap().to_string()
        })
        .collect()
}

#[test]
fn select_picks_the_numbered_photo() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(&dir, &vision_reply(0, "2"));
    let files = photos(&dir, &["a.jpg", "b.jpg", "c.jpg"]);

    cmd(&cassette)
        .args(["select", "--category", "portrait"])
        .args(&files)
        .assert()
        .success()
        .stdout(predicate::str::contains("b.jpg"))
        .stdout(predicate::str::contains("\"bestPhotoIndex\": 1"))
        .stdout(predicate::str::contains("AI selected the best photo."));
}

#[test]
fn unreadable_photo_aborts_before_the_model_is_called() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(&dir, &vision_reply(0, "1"));
    let mut files = photos(&dir, &["a.jpg"]);
    files.push(dir.path().join("gone.jpg").to_str().unwrap().to_string());

    cmd(&cassette)
        .args(["select", "-c", "portrait"])
        .args(&files)
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn select_with_feedback_runs_a_second_round() {
    let dir = tempfile::tempdir().unwrap();
    let interactions = format!("{}{}", vision_reply(0, "2"), vision_reply(1, "1"));
    let cassette = write_cassette(&dir, &interactions);
    let files = photos(&dir, &["a.jpg", "b.jpg", "c.jpg"]);

    cmd(&cassette)
        .args(["select", "-c", "landscape", "--feedback", "prefer the brighter one"])
        .args(&files)
        .assert()
        .success()
        .stderr(predicate::str::contains("First pick: b.jpg"))
        .stdout(predicate::str::contains("a.jpg"))
        .stdout(predicate::str::contains("\"bestPhotoIndex\": 0"))
        .stdout(predicate::str::contains("\"reason\": \"1\""));
}

#[test]
fn unparseable_reply_selects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(&dir, &vision_reply(0, "none of them"));
    let files = photos(&dir, &["a.jpg", "b.jpg"]);

    cmd(&cassette)
        .args(["select", "-c", "animal"])
        .args(&files)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bestPhoto\": null"));
}

#[test]
fn replayed_upstream_error_fails_the_command() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        &dir,
        "  - seq: 0\n    port: vision_model\n    method: generate\n    input: {}\n    \
         output:\n      Err: \"quota exceeded\"\n",
    );
    let files = photos(&dir, &["a.jpg"]);

    cmd(&cassette)
        .args(["select", "-c", "portrait"])
        .args(&files)
        .assert()
        .failure()
        .stderr(predicate::str::contains("quota exceeded"));
}

#[test]
fn upscale_scales_recorded_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        &dir,
        "  - seq: 0\n    port: image_cdn\n    method: resource\n    input: {}\n    \
         output:\n      Ok:\n        public_id: bestphoto/cat\n        width: 600\n        \
         height: 400\n",
    );

    cmd(&cassette)
        .args(["upscale", "--public-id", "bestphoto/cat", "--factor", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://res.cloudinary.com/demo/image/upload/c_scale,e_upscale,h_800,q_auto,w_1200/bestphoto/cat",
        ));
}

#[test]
fn upscale_from_file_uploads_first() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        &dir,
        "  - seq: 0\n    port: image_cdn\n    method: upload\n    input: {}\n    \
         output:\n      Ok:\n        public_id: bestphoto/dog\n        \
         secure_url: https://res.cloudinary.com/demo/image/upload/bestphoto/dog.jpg\n  \
         - seq: 1\n    port: image_cdn\n    method: resource\n    input: {}\n    \
         output:\n      Ok:\n        public_id: bestphoto/dog\n        width: 100\n        \
         height: 50\n",
    );
    let files = photos(&dir, &["dog.jpg"]);

    cmd(&cassette)
        .args(["upscale", "--file", &files[0], "--factor", "4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Uploaded: bestphoto/dog"))
        .stdout(predicate::str::contains("h_200,q_auto,w_400/bestphoto/dog"));
}

#[test]
fn upscale_without_dimensions_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        &dir,
        "  - seq: 0\n    port: image_cdn\n    method: resource\n    input: {}\n    \
         output:\n      Ok:\n        public_id: bestphoto/cat\n        width: null\n        \
         height: null\n",
    );

    cmd(&cassette)
        .args(["upscale", "--public-id", "bestphoto/cat", "--factor", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not retrieve original image dimensions"));
}

#[test]
fn upload_prints_public_id() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        &dir,
        "  - seq: 0\n    port: image_cdn\n    method: upload\n    input: {}\n    \
         output:\n      Ok:\n        public_id: bestphoto/cat\n        \
         secure_url: https://res.cloudinary.com/demo/image/upload/bestphoto/cat.jpg\n",
    );
    let files = photos(&dir, &["cat.jpg"]);

    cmd(&cassette)
        .args(["upload", &files[0]])
        .assert()
        .success()
        .stdout(predicate::str::contains("bestphoto/cat"))
        .stderr(predicate::str::contains("Uploaded: https://res.cloudinary.com/demo"));
}

#[test]
fn missing_cassette_fails_cleanly() {
    cmd(Path::new("/nonexistent/session.cassette.yaml"))
        .args(["upload", "cat.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load cassette"));
}
