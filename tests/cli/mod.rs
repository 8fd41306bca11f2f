//! Tests for the ffpipe-cli binary

use std::process::Command;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ffpipe-cli"))
}

#[test]
fn test_bitrate_reference_resolution() {
    let output = cli().args(["bitrate", "3840", "2160", "30"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "20");
}

#[test]
fn test_bitrate_scales_with_fps() {
    let output = cli().args(["bitrate", "1280", "720", "45"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3.333");
}

#[test]
fn test_unknown_command_fails() {
    let output = cli().arg("transcode").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_bitrate_rejects_garbage() {
    let output = cli().args(["bitrate", "wide", "720", "30"]).output().unwrap();
    assert!(!output.status.success());
}

#[cfg(unix)]
mod record_tests {
    use super::cli;
    use ffpipe::testing::fake_encoder;
    use tempfile::tempdir;

    #[test]
    fn test_record_with_settings_file() {
        let dir = tempdir().unwrap();
        let ffmpeg = fake_encoder(dir.path()).unwrap();
        let settings = dir.path().join("ffpipe.toml");
        std::fs::write(
            &settings,
            format!(
                "[encoder]\nffmpeg_path = {:?}\n\n[recording]\nwidth = 8\nheight = 4\nfps = 30.0\n",
                ffmpeg.display().to_string()
            ),
        )
        .unwrap();
        let out = dir.path().join("clip.mp4");

        let output = cli()
            .arg("record")
            .arg(&out)
            .args(["--frames", "5", "--codec", "libx264", "--json", "--config"])
            .arg(&settings)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["stats"]["frames_written"], 5);
        assert_eq!(report["stats"]["codec"], "libx264");
        assert_eq!(std::fs::metadata(&out).unwrap().len(), 5 * 8 * 4 * 3);
    }

    #[test]
    fn test_record_soft_subtitles() {
        let dir = tempdir().unwrap();
        let ffmpeg = fake_encoder(dir.path()).unwrap();
        let settings = dir.path().join("ffpipe.toml");
        std::fs::write(
            &settings,
            format!("[encoder]\nffmpeg_path = {:?}\n", ffmpeg.display().to_string()),
        )
        .unwrap();
        let out = dir.path().join("sim.mp4");

        let output = cli()
            .arg("record")
            .arg(&out)
            .args(["--width", "4", "--height", "4", "--frames", "3"])
            .args(["--subtitles", "soft", "--config"])
            .arg(&settings)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(dir.path().join("sim_with_sub.mp4").exists());

        let srt = std::fs::read_to_string(dir.path().join("sim_with_sub.srt")).unwrap();
        assert!(srt.starts_with("0\n00:00:00,000 --> 00:00:00,033\nframe 0\n"));
    }
}
