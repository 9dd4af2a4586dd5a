mod app;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;

use handlink::{
    DEFAULT_PORT, EndpointConfig, FilterConfig, GestureThreshold, LogSink, MAX_PACKET_SIZE,
    ReceiveLoop, ScaleRange, TrackingConfig,
};

use app::{App, GestureMode};

#[derive(Parser)]
#[command(name = "handlink-consumer")]
#[command(about = "Receives hand tracking samples and drives an entity transform")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, default_value_t = MAX_PACKET_SIZE)]
    buffer_size: usize,

    #[arg(long, default_value_t = 0.3, help = "Low-pass filter factor (0, 1]")]
    filter_factor: f32,

    #[arg(long, default_value_t = 0.1, help = "Velocity look-ahead factor [0, 1)")]
    smooth_factor: f32,

    #[arg(long, default_value_t = 0.1, help = "Z velocity threshold for back-and-forth detection")]
    z_threshold: f32,

    #[arg(long, default_value_t = 0.1)]
    min_scale: f32,

    #[arg(long, default_value_t = 2.0)]
    max_scale: f32,

    #[arg(long, default_value_t = 60, help = "Application frame rate")]
    frame_rate: u32,

    #[arg(long, help = "Report a gesture once per crossing instead of every frame")]
    edge_gestures: bool,

    #[arg(long, default_value = "Cube", help = "Name of the controlled entity")]
    target: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;

    let config = TrackingConfig {
        filter: FilterConfig {
            filter_factor: args.filter_factor,
            smooth_factor: args.smooth_factor,
            ..Default::default()
        },
        scale: ScaleRange {
            min_scale: args.min_scale,
            max_scale: args.max_scale,
            ..Default::default()
        },
        gesture: GestureThreshold {
            z_threshold: args.z_threshold,
        },
        endpoint: EndpointConfig {
            addr,
            buffer_size: args.buffer_size,
        },
        ..Default::default()
    };
    config.validate()?;

    let receiver = ReceiveLoop::bind(&config)
        .with_context(|| format!("failed to bind {}", addr))?;
    let handle = receiver.spawn()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    let gesture_mode = if args.edge_gestures {
        GestureMode::Edge
    } else {
        GestureMode::Level
    };

    let mut app = App::new(LogSink::new(args.target), args.frame_rate, gesture_mode);
    app.run(&handle, &running);

    log::info!("Shutting down");
    let stats = handle.stats();
    handle.join().context("receive loop failed")?;

    log::info!(
        "Received {} packets ({} bytes), dropped {} malformed and {} invalid, applied {} frames",
        stats.packets_received,
        stats.bytes_received,
        stats.packets_malformed,
        stats.packets_invalid,
        app.frames_applied()
    );

    Ok(())
}
