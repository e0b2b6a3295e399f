//! Server driving a virtual pin screen from live monocular depth inference.
//!
//! Camera frames arrive over the data socket, one depth pass runs at a time,
//! and an independent actuation loop maps the most recently inferred depth
//! buffer onto the pin bed at display cadence.

pub mod actuation;
pub mod data_socket;
pub mod depth_view;
pub mod endpoints;
pub mod heightfield;
pub mod inferer;
pub mod latest;
pub mod meter;
pub mod nn;
pub mod pins;
pub mod sampler;
pub mod utils;

use bytes::Bytes;
use thingbuf::mpsc::{StaticChannel, StaticReceiver, StaticSender};
use tokio::sync::broadcast;

/// A camera frame awaiting depth inference: width, height, JPEG bytes.
pub type FrameJob = (u32, u32, Vec<u8>);

pub type StaticFrameSender = StaticSender<FrameJob>;
pub type StaticFrameReceiver = StaticReceiver<FrameJob>;

/// Handoff from the data socket to the inference loop.
///
/// A single slot, and the inferer holds the slot reference for the whole
/// pass: `try_send_ref` fails while a pass is pending or running, so frames
/// arriving in the meantime are dropped, never queued.
pub static FRAME_JOBS_CHANNEL: StaticChannel<FrameJob, 1> = StaticChannel::new();

pub type BroadcastSender = broadcast::Sender<Bytes>;
pub type BroadcastReceiver = broadcast::Receiver<Bytes>;

pub fn broadcast_channel() -> (BroadcastSender, BroadcastReceiver) {
    broadcast::channel(4)
}

/// Broadcast channels fanning rendered depth views out to HTTP subscribers.
pub struct DepthStreams {
    pub plain_tx: BroadcastSender,
    pub overlay_tx: BroadcastSender,
}

impl DepthStreams {
    pub fn new() -> Self {
        let (plain_tx, _) = broadcast_channel();
        let (overlay_tx, _) = broadcast_channel();
        Self {
            plain_tx,
            overlay_tx,
        }
    }
}

impl Default for DepthStreams {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap JPEG bytes as one item of a `multipart/x-mixed-replace` stream.
pub fn as_jpeg_stream_item(data: &[u8]) -> Bytes {
    Bytes::copy_from_slice(
        &[
            "--frame\r\nContent-Type: image/jpeg\r\n\r\n".as_bytes(),
            data,
            "\r\n\r\n".as_bytes(),
        ]
        .concat(),
    )
}
