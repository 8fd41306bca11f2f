use anyhow::{anyhow, bail, Context, Result};
use ffpipe::platform::{DeviceProbe, HardwareHints, StaticDeviceProbe, SystemDeviceProbe};
use ffpipe::recording::{estimate_bitrate, select_codec, Dimensions, Recorder, SubtitleMode};
use ffpipe::testing::synthetic_video_frame;
use ffpipe::FfpipeSettings;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    ffpipe::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: ffpipe-cli <probe|bitrate|record> [args]");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "probe" => cmd_probe(&args),
        "bitrate" => cmd_bitrate(&args),
        "record" => cmd_record(&args),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

fn cmd_probe(args: &[String]) -> Result<()> {
    let hints = HardwareHints::detect();
    let probe = SystemDeviceProbe;
    let adapters = probe.adapters();
    // reuse the one query for selection
    let known = StaticDeviceProbe::from_names(adapters.iter().flatten().map(|a| a.name.clone()));
    let codec = select_codec(None, &hints, &known);

    if args.contains(&"--json".to_string()) {
        let report = serde_json::json!({
            "platform": hints.platform,
            "compute_accelerator": hints.compute_accelerator,
            "adapters": adapters,
            "codec": codec.as_ffmpeg_codec(),
        });
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("platform: {}", hints.platform);
        println!("compute accelerator: {}", hints.compute_accelerator);
        match &adapters {
            Some(list) if !list.is_empty() => {
                for a in list {
                    println!("adapter {}: {}", a.index, a.name);
                }
            }
            Some(_) => println!("adapters: none"),
            None => println!("adapters: unavailable"),
        }
        println!("codec: {}", codec);
    }
    Ok(())
}

fn cmd_bitrate(args: &[String]) -> Result<()> {
    if args.len() < 5 {
        eprintln!("Usage: ffpipe-cli bitrate <width> <height> <fps>");
        std::process::exit(1);
    }
    let width: u32 = args[2].parse().context("width")?;
    let height: u32 = args[3].parse().context("height")?;
    let fps: f64 = args[4].parse().context("fps")?;

    println!("{}", estimate_bitrate(Dimensions::new(width, height), fps));
    Ok(())
}

fn cmd_record(args: &[String]) -> Result<()> {
    // record <output> [--width N] [--height N] [--fps F] [--frames N] [--codec C]
    //   [--bitrate M] [--subtitles soft|burn] [--audio FILE] [--config FILE] [--json]
    let mut output = None;
    let mut width = None;
    let mut height = None;
    let mut fps = None;
    let mut frames: u64 = 90;
    let mut codec = None;
    let mut bitrate = None;
    let mut subtitles = None;
    let mut audio = None;
    let mut config_path = None;
    let mut json = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => width = Some(flag_value(args, &mut i)?.parse::<u32>()?),
            "--height" => height = Some(flag_value(args, &mut i)?.parse::<u32>()?),
            "--fps" => fps = Some(flag_value(args, &mut i)?.parse::<f64>()?),
            "--frames" => frames = flag_value(args, &mut i)?.parse()?,
            "--codec" => codec = Some(flag_value(args, &mut i)?.to_string()),
            "--bitrate" => bitrate = Some(flag_value(args, &mut i)?.parse::<f64>()?),
            "--subtitles" => {
                subtitles = Some(match flag_value(args, &mut i)? {
                    "soft" => SubtitleMode::Soft,
                    "burn" => SubtitleMode::BurnIn,
                    other => bail!("unknown subtitle mode '{}'", other),
                })
            }
            "--audio" => audio = Some(PathBuf::from(flag_value(args, &mut i)?)),
            "--config" => config_path = Some(PathBuf::from(flag_value(args, &mut i)?)),
            "--json" => json = true,
            other => {
                if output.is_none() {
                    output = Some(PathBuf::from(other));
                } else {
                    bail!("unexpected argument '{}'", other);
                }
            }
        }
        i += 1;
    }

    let output = output.ok_or_else(|| anyhow!("output path required"))?;
    let settings = match config_path {
        Some(path) => FfpipeSettings::load_from_file(path)?,
        None => FfpipeSettings::default(),
    };
    settings.validate().map_err(|e| anyhow!(e))?;

    let mut config = settings.recording_config(&output);
    if let Some(w) = width {
        config.dimensions.width = w;
    }
    if let Some(h) = height {
        config.dimensions.height = h;
    }
    if let Some(f) = fps {
        config.fps = f;
    }
    if let Some(c) = codec {
        config = config.with_codec(c);
    }
    if let Some(b) = bitrate {
        config = config.with_bitrate(b);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    let dims = config.dimensions;
    let fps = config.fps;
    let mut recorder = Recorder::record(config)?;

    for n in 0..frames {
        if interrupted.load(Ordering::SeqCst) {
            eprintln!("Interrupted after {} frames", n);
            break;
        }
        recorder.write_frame(&synthetic_video_frame(n, dims))?;
        if subtitles.is_some() {
            recorder.add_subtitle(format!("frame {}", n), fps)?;
        }
    }

    let stats = recorder.stop()?;

    let subtitle_status = match subtitles {
        Some(mode) => Some(recorder.mux_subtitles(mode)?),
        None => None,
    };
    let audio_outcome = match &audio {
        Some(path) => Some(recorder.mux_audio(path)?),
        None => None,
    };

    if json {
        let report = serde_json::json!({
            "stats": stats,
            "subtitle_exit_code": subtitle_status.and_then(|s| s.code()),
            "audio": audio_outcome.as_ref().map(|o| o.code()),
        });
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "Recorded {} frames to {} ({} @ {}M)",
            stats.frames_written,
            stats.output_path.display(),
            stats.codec,
            stats.bitrate_mbps
        );
        if let Some(status) = subtitle_status {
            println!(
                "Subtitles -> {} ({})",
                recorder.subtitled_output_path().display(),
                status
            );
        }
        if let Some(outcome) = audio_outcome {
            match outcome.output() {
                Some(path) => println!("Audio -> {}", path.display()),
                None => println!("Audio skipped: source not found"),
            }
        }
    }

    Ok(())
}

fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}
