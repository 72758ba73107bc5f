//! SoulAudio Player - host entry point.
//!
//! Plays the audio files at the root of `--music-path` with the same boot
//! sequence and control loop as the device. Commands are typed on stdin.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p firmware --features emulator -- --music-path ./music
//! ```

#![allow(clippy::print_stdout)]

use anyhow::Context as _;
use clap::Parser;
use firmware::app::{halt, load_playlist, write_banner, Player};
use firmware::config::PlayerConfig;
use firmware::host::{monotonic_clock, NoButtons, OfflineTransport, PacedAudio, StdinLines, StdoutConsole, TokioDelay};
use library::PlaylistCache;
use platform::storage_local::LocalFileStorage;
use playback::Pipeline;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "soulaudio-player", version, about = "Playlist player with serial-style command console")]
struct Args {
    /// Directory treated as the card root
    #[arg(long, env = "MUSIC_PATH")]
    music_path: String,

    /// Track played after boot (1-based)
    #[arg(long, default_value_t = 1)]
    start_track: usize,

    /// Open/start attempts per track switch
    #[arg(long, default_value_t = 3)]
    max_retries: u8,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    if !std::path::Path::new(&args.music_path).is_dir() {
        anyhow::bail!("music path {} is not a directory", args.music_path);
    }

    let config = PlayerConfig::default()
        .with_start_track(args.start_track.checked_sub(1))
        .with_playback(PlayerConfig::default().playback.with_max_retries(args.max_retries));

    let mut console = StdoutConsole;
    write_banner(&mut console);

    let mut storage = LocalFileStorage::new(&args.music_path);
    let cache = PlaylistCache::default();
    let playlist = match load_playlist(&mut storage, &cache, &mut console).await {
        Ok(playlist) => playlist,
        Err(e) => {
            tracing::error!("boot failed: {}", e);
            let tick = u32::try_from(config.halt_tick.as_millis()).unwrap_or(u32::MAX);
            match halt(&mut TokioDelay, tick).await {}
        }
    };

    let mut player = Player::new(
        storage,
        Pipeline::new(PacedAudio::default()),
        TokioDelay,
        console,
        OfflineTransport::default(),
        playlist,
        cache,
        config,
    );

    let mut clock = monotonic_clock();
    player.start(clock()).await;

    let mut serial = StdinLines::spawn();
    let mut panel = NoButtons;
    match player.run(&mut panel, &mut serial, clock).await {}
}
