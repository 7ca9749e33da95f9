use clap::Parser;
use client::commands::CommandDispatcher;
use client::config::{generate_nickname, ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
use client::input::InputManager;
use client::network::{self, SessionHandle, SessionStatus};
use client::rendering::Renderer;
use client::world::WorldStore;
use log::{error, info};
use macroquad::prelude::*;
use shared::Intent;
use std::time::{Duration, Instant};

const TICK_RATE: u32 = 60;
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Game server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Display name; a random one is generated when omitted
    #[arg(short, long)]
    nickname: Option<String>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Game Client".to_owned(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let nickname = args.nickname.unwrap_or_else(generate_nickname);
    let config = ConnectionConfig::new(args.host, args.port, nickname);

    info!("Starting client as {}", config.nickname);
    info!("Connecting to: {}", config.url());
    info!("Controls: WASD/arrows to move, type `talk <msg>`, `interact` or `quit` and press Enter");

    if let Err(e) = run(config).await {
        error!("Client error: {}", e);
    }
}

async fn run(config: ConnectionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorldStore::new(config.nickname.clone());
    let session = network::spawn(config, store.clone())?;
    let dispatcher = CommandDispatcher::new(session.clone());
    let mut input = InputManager::new();
    let renderer = Renderer::new();
    let frame_budget = Duration::from_secs(1) / TICK_RATE;

    prevent_quit();

    loop {
        let frame_start = Instant::now();

        if is_quit_requested() {
            let _ = dispatcher.dispatch(Intent::Disconnect);
            break;
        }

        let frame = input.update();
        let mut quitting = false;
        for line in &frame.submitted {
            if dispatcher.submit_line(line) == Some(Intent::Disconnect) {
                quitting = true;
            }
        }
        if quitting {
            break;
        }
        dispatcher.dispatch_movement(&frame.movement);

        renderer.render(&store.snapshot(), input.input_line(), session.status());

        // vsync usually paces us already; this caps the rate when it doesn't.
        // macroquad's executor is single-threaded and not tokio, so a blocking
        // sleep only holds up this loop; the network runs on its own thread.
        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
        next_frame().await;
    }

    wait_for_close(&session, SHUTDOWN_GRACE);
    Ok(())
}

// Gives the network thread a chance to flush the disconnect notice.
fn wait_for_close(session: &SessionHandle, grace: Duration) {
    let deadline = Instant::now() + grace;
    while session.status() == SessionStatus::Active && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
}
