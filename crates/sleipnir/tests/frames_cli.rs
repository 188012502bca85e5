use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_frames(dir: &Path, prefix: &str, count: usize, width: u32, height: u32) {
    for index in 1..=count {
        let shade = (index * 20) as u8;
        let image = RgbaImage::from_pixel(width, height, Rgba([shade, 0, 255 - shade, 255]));
        image
            .save(dir.join(format!("{prefix}{index:02}.png")))
            .unwrap();
    }
}

fn sleipnir(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sleipnir"))
        .env_remove("SLEIPNIR_CONFIG")
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run sleipnir")
}

#[test]
fn frames_lists_every_resolved_file() {
    let root = TempDir::new().unwrap();
    let frames = root.path().join("horse");
    fs::create_dir_all(&frames).unwrap();
    write_frames(&frames, "Horse", 12, 4, 2);

    let output = sleipnir(root.path(), &["frames", frames.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Horse01.png"));
    assert!(stdout.contains("Horse12.png"));
    assert_eq!(stdout.lines().filter(|line| line.contains(".png")).count(), 12);
}

#[test]
fn frames_fails_when_a_frame_is_missing() {
    let root = TempDir::new().unwrap();
    write_frames(root.path(), "Horse", 11, 4, 2);

    let output = sleipnir(root.path(), &["frames", root.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Horse12"), "{stderr}");
}

#[test]
fn frames_check_decodes_and_reports_bad_files() {
    let root = TempDir::new().unwrap();
    write_frames(root.path(), "Pony", 3, 4, 2);
    let dir = root.path().to_str().unwrap();

    let ok = sleipnir(
        root.path(),
        &["frames", dir, "--prefix", "Pony", "--count", "3", "--frame-size", "4x2", "--check"],
    );
    assert!(ok.status.success(), "{ok:?}");
    assert!(String::from_utf8_lossy(&ok.stdout).contains("ok 4x2"));

    fs::write(root.path().join("Pony02.png"), b"not a png").unwrap();
    let broken = sleipnir(
        root.path(),
        &["frames", dir, "--prefix", "Pony", "--count", "3", "--frame-size", "4x2", "--check"],
    );
    assert!(!broken.status.success());
    let stdout = String::from_utf8_lossy(&broken.stdout);
    assert!(stdout.contains("Pony02.png  FAILED"), "{stdout}");
}

#[test]
fn frames_check_rejects_wrong_dimensions() {
    let root = TempDir::new().unwrap();
    write_frames(root.path(), "Horse", 2, 8, 8);
    let dir = root.path().to_str().unwrap();

    let output = sleipnir(
        root.path(),
        &["frames", dir, "--count", "2", "--frame-size", "4x2", "--check"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("expected 4x2"));
}

#[test]
fn frames_reads_movie_settings_from_config_file() {
    let root = TempDir::new().unwrap();
    let frames = root.path().join("clips");
    fs::create_dir_all(&frames).unwrap();
    write_frames(&frames, "Colt", 2, 4, 2);

    let config = root.path().join("sleipnir.toml");
    fs::write(
        &config,
        format!(
            "[movie]\nframes = {:?}\nprefix = \"Colt\"\ncount = 2\n",
            frames.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = sleipnir(
        root.path(),
        &["frames", "--config", config.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Colt01.png"));
    assert!(stdout.contains("Colt02.png"));
}

#[test]
fn invalid_config_file_is_reported() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("broken.toml");
    fs::write(&config, "[movie]\ncount = 0\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sleipnir"))
        .env("SLEIPNIR_CONFIG", &config)
        .env("RUST_LOG", "warn")
        .args(["frames", root.path().to_str().unwrap()])
        .output()
        .expect("failed to run sleipnir");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("movie.count"), "{stderr}");
}
