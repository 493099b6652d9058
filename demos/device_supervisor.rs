//! Device supervisor demo
//!
//! Run with: cargo run --example device_supervisor
//!
//! Builds a capture registry over the in-process memory backend, loads a
//! capture for every attached camera, then pulls a cable and plugs it back
//! in to show the error notification and reload sweep.
//!
//! Set `RUST_LOG=capture_registry=trace` for the registry's own logging.

use std::path::Path;
use std::time::Duration;

use capture_registry::backend::MemoryBackend;
use capture_registry::format::{AudioCodec, Format, VideoCodec};
use capture_registry::{CaptureRegistry, RegistryConfig, RegistryEvent, SampleFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("capture_registry=debug".parse()?)
                .add_directive("device_supervisor=debug".parse()?),
        )
        .init();

    let backend = MemoryBackend::new()
        .with_video_device(0, "Integrated Camera")
        .with_video_device(1, "USB Webcam")
        .with_video_device(2, "Capture Card")
        .with_audio_device(0, "Built-in Microphone");

    // The capture card is held by another process
    backend.fail_open(2);

    let registry = CaptureRegistry::with_config(
        backend.clone(),
        RegistryConfig::default().event_capacity(16),
    )?;

    // Print every registry event as it arrives
    let mut events = registry.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                RegistryEvent::CaptureLoaded(capture) => {
                    println!("  loaded   {}", capture.source());
                }
                RegistryEvent::CaptureError { capture, error } => {
                    println!("  error    {}: {}", capture.source(), error);
                }
            }
        }
    });

    registry.update_formats(|formats| {
        formats.register(
            Format::new("MP4", "mp4")
                .with_video(
                    VideoCodec::new("H.264", "libx264")
                        .resolution(1280, 720)
                        .fps(30.0)
                        .bit_rate(2_500_000)
                        .pixel_fmt("yuv420p"),
                )
                .with_audio(
                    AudioCodec::new("AAC", "aac")
                        .channels(2)
                        .sample_rate(44_100)
                        .bit_rate(128_000)
                        .sample_fmt("fltp"),
                )
                .with_priority(10),
        );
        formats.register(
            Format::new("MJPEG", "mjpeg").with_video(VideoCodec::new("MJPEG", "mjpeg")),
        );
        formats.set_default("MP4")
    })?;

    println!("=== Devices ===");
    for device in registry.devices().video_capture_devices()? {
        println!("  {}", device);
    }
    for device in registry.devices().audio_input_devices()? {
        println!("  {}", device);
    }

    println!("=== Formats ===");
    for format in registry.formats().formats() {
        println!("  {}", format);
    }

    println!("=== Loading captures ===");
    let loaded = registry.load_video_captures()?;
    println!("  {} of 3 cameras loaded", loaded);

    let microphone = registry.create_audio_capture(0, 2, 48_000, SampleFormat::F32)?;
    println!("  microphone opened ({:?})", microphone.params());

    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let file = registry.create_file_capture(&manifest)?;
    println!("  file capture opened ({})", file.source());

    println!("=== Unplugging USB Webcam ===");
    backend.unplug(1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let report = registry.reload_failed_video_captures();
    println!("  reload while unplugged: {:?}", report);

    println!("=== Plugging USB Webcam back in ===");
    backend.plug(1);
    let report = registry.reload_failed_video_captures();
    println!("  reload after replug: {:?}", report);
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("=== Tracked captures ===");
    for (id, capture) in registry.video_captures() {
        let status = match capture.error() {
            Some(err) => err.to_string(),
            None => "ok".to_string(),
        };
        println!("  [{}] {}", id, status);
    }

    registry.shutdown();
    printer.await?;

    Ok(())
}
