//! Pin screen server binary.
//!
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{ensure, Result};
use axum::{routing::get, Extension, Router};
use clap::Parser;
use env_logger::TimestampPrecision;
use pin_server::{
    actuation::spawn_actuation_loop,
    data_socket::spawn_data_socket,
    endpoints::{depth_stream, healthcheck, pins_snapshot},
    heightfield::HeightFieldMapper,
    inferer::Inferer,
    latest::latest_depth_cell,
    meter::spawn_meter_logger,
    nn::MidasVariant,
    pins::{PinGrid, DEFAULT_TRAVEL_SCALE},
    DepthStreams, FRAME_JOBS_CHANNEL,
};

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Address to serve the HTTP endpoints on
    #[clap(long, default_value = "127.0.0.1:3000")]
    server_address: String,

    /// Address of the camera frame socket
    #[clap(long, default_value = "127.0.0.1:3001")]
    socket_address: String,

    /// Pins per grid row/column
    #[clap(long, default_value_t = 40)]
    grid_size: usize,

    /// Depth model variant (small or large)
    #[clap(long, default_value = "small")]
    model: String,

    /// Actuation passes per second
    #[clap(long, default_value_t = 60)]
    tick_rate: u32,

    /// Vertical travel of a fully raised pin
    #[clap(long, default_value_t = DEFAULT_TRAVEL_SCALE)]
    travel_scale: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    ensure!(args.tick_rate > 0, "tick rate must be positive");
    let variant: MidasVariant = args.model.parse()?;
    let mapper = HeightFieldMapper::new(args.grid_size)?;

    let (frame_tx, frame_rx) = FRAME_JOBS_CHANNEL.split();
    let (latest_tx, latest_rx) = latest_depth_cell();
    let streams = Arc::new(DepthStreams::new());
    let pins = Arc::new(Mutex::new(PinGrid::new(args.grid_size, args.travel_scale)));

    {
        let streams = streams.clone();
        let inferer = Inferer::new(frame_rx, variant, latest_tx, streams, args.grid_size).await?;
        tokio::spawn(async move { inferer.run().await });
    }

    spawn_actuation_loop(
        latest_rx,
        mapper,
        pins.clone(),
        Duration::from_secs_f64(1.0 / f64::from(args.tick_rate)),
    );

    // Create socket to receive camera frames via network
    spawn_data_socket(frame_tx, &args.socket_address).await?;

    spawn_meter_logger();

    // Build HTTP server with endpoints
    let app = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/depth_stream", get(depth_stream))
        .route("/pins", get(pins_snapshot))
        .layer(Extension(streams))
        .layer(Extension(pins));

    // Serve HTTP server
    let addr: SocketAddr = args.server_address.parse()?;
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
