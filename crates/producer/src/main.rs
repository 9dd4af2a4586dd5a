mod source;

use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use handlink::{
    DEFAULT_PORT, EndpointConfig, PacketLossSimulation, PreFilterConfig, SampleProducer,
    TrackingConfig,
};
use source::{DemoMotion, parse_line};

#[derive(Parser)]
#[command(name = "handlink-producer")]
#[command(about = "Sends hand tracking samples to a handlink consumer")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    remote: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 3, help = "Sliding window size for pre-filtering")]
    window: usize,

    #[arg(long, help = "Generate synthetic hand motion instead of reading stdin")]
    demo: bool,

    #[arg(long, default_value_t = 30.0, help = "Demo frame rate")]
    fps: f32,

    #[arg(long, help = "Stop the demo after this many seconds")]
    duration: Option<f32>,

    #[arg(long, default_value_t = 0.0, help = "Simulated packet loss percentage (0-100)")]
    loss_percent: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.remote, args.port)
        .parse()
        .with_context(|| format!("invalid remote address {}:{}", args.remote, args.port))?;

    let config = TrackingConfig {
        pre_filter: PreFilterConfig {
            window_size: args.window,
        },
        endpoint: EndpointConfig {
            addr,
            ..Default::default()
        },
        ..Default::default()
    };
    config.validate()?;

    let mut producer = SampleProducer::new(&config)?;
    if args.loss_percent > 0.0 {
        producer.set_packet_loss_sim(PacketLossSimulation::with_loss(args.loss_percent));
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    log::info!("Sending samples to {}", addr);

    if args.demo {
        run_demo(&mut producer, &running, args.fps, args.duration);
    } else {
        run_stdin(&mut producer, &running)?;
    }

    let stats = producer.stats();
    log::info!(
        "Producer stopped: {} packets sent ({} bytes), {} dropped by simulation",
        stats.packets_sent,
        stats.bytes_sent,
        stats.packets_lost
    );

    Ok(())
}

fn run_demo(producer: &mut SampleProducer, running: &AtomicBool, fps: f32, duration: Option<f32>) {
    let mut motion = DemoMotion::new(fps);
    let frame_time = Duration::from_secs_f32(1.0 / fps.max(1.0));
    let deadline = duration
        .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
        .map(|d| Instant::now() + d);
    let mut next_frame = Instant::now();

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let sent = producer.submit(motion.next_sample());
        log::trace!("sent {:?}", sent);

        next_frame += frame_time;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }
}

fn run_stdin(producer: &mut SampleProducer, running: &AtomicBool) -> Result<()> {
    let stdin = io::stdin();
    for (number, line) in stdin.lock().lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = line.context("failed to read stdin")?;
        match parse_line(&line) {
            Ok(Some(sample)) => {
                producer.submit(sample);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Skipping line {}: {}", number + 1, e),
        }
    }
    Ok(())
}
