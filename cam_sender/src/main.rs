//! Camera sender binary.
//!
use cam_sender::{sensors::get_capture_fn_linux, Error};
use clap::Parser;
use common::protocol::{FrameMsg, ProtoMsg};
use env_logger::TimestampPrecision;
use futures::sink::SinkExt;
use simple_error::simple_error;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Video device to capture from
    #[clap(long, default_value = "/dev/video0")]
    device: String,

    /// Pixel format requested from the camera
    #[clap(long, default_value = "MJPG")]
    format: String,

    /// Capture resolution as WIDTHxHEIGHT (camera maximum if omitted)
    #[clap(long)]
    resolution: Option<String>,

    /// Frames per second (camera maximum if omitted)
    #[clap(long)]
    fps: Option<u32>,

    /// Address of the pin server data socket
    #[clap(long, default_value = "127.0.0.1:3001")]
    socket_address: String,

    /// Identifier sent along with every frame
    #[clap(long, default_value = "webcam")]
    id: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let resolution = args
        .resolution
        .as_deref()
        .map(parse_resolution)
        .transpose()?;
    let frame_rate = args.fps.map(|fps| (1, fps));

    let (capture_fn, (width, height)) =
        get_capture_fn_linux(&args.device, &args.format, resolution, frame_rate)?;

    let stream = TcpStream::connect(&args.socket_address).await?;
    log::info!("Connected to {}", &args.socket_address);

    let mut transport = Framed::new(stream, LengthDelimitedCodec::new());

    loop {
        let frame = match capture_fn() {
            Some(frame) => frame,
            None => {
                log::error!("Error capturing frame");
                break;
            }
        };

        let msg = ProtoMsg::FrameMsg(FrameMsg::new(
            args.id.clone(),
            width,
            height,
            frame[..].to_vec(),
        ));
        let data: Vec<u8> = bincode::serialize(&msg)?;
        transport.send(bytes::Bytes::from(data)).await?;
    }

    Ok(())
}

/// Parse a `WIDTHxHEIGHT` resolution specification.
fn parse_resolution(spec: &str) -> Result<(u32, u32), Error> {
    let (width, height) = spec
        .split_once('x')
        .ok_or_else(|| simple_error!("Invalid resolution '{}'", spec))?;

    Ok((width.parse()?, height.parse()?))
}
