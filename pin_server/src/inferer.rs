//! Inference loop turning camera frames into depth buffers.
//!
use std::sync::Arc;

use anyhow::Result;
use image::RgbImage;

use crate::{
    as_jpeg_stream_item, depth_view,
    heightfield::DepthBuffer,
    latest::LatestDepthSender,
    meter::METER,
    nn::{InferDepth, MidasModel, MidasVariant},
    DepthStreams, StaticFrameReceiver,
};

pub struct Inferer {
    frame_rx: StaticFrameReceiver,
    model: MidasModel,
    latest_tx: LatestDepthSender,
    streams: Arc<DepthStreams>,
    grid_size: usize,
}

impl Inferer {
    pub async fn new(
        frame_rx: StaticFrameReceiver,
        variant: MidasVariant,
        latest_tx: LatestDepthSender,
        streams: Arc<DepthStreams>,
        grid_size: usize,
    ) -> Result<Self> {
        let model = MidasModel::new(variant).await?;

        Ok(Self {
            frame_rx,
            model,
            latest_tx,
            streams,
            grid_size,
        })
    }

    pub async fn run(&self) {
        // The slot reference is held for the whole pass, keeping the
        // capacity-1 channel full: frames arriving mid-pass are dropped at
        // the socket instead of queueing up behind a slow model.
        while let Some(job) = self.frame_rx.recv_ref().await {
            let image: RgbImage = match turbojpeg::decompress_image(job.2.as_slice()) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!(
                        "Skipping undecodable {}x{} frame: {}",
                        job.0,
                        job.1,
                        err
                    );
                    continue;
                }
            };

            match self.model.run(&image) {
                Ok(buffer) => {
                    METER.tick_depth();
                    self.publish_views(&buffer);
                    self.latest_tx.publish(buffer);
                }
                Err(err) => log::warn!("Depth inference failed: {err}"),
            }
        }
    }

    fn publish_views(&self, buffer: &DepthBuffer) {
        // Streams are best-effort; rendering is skipped entirely while no
        // subscriber is connected.
        if self.streams.plain_tx.receiver_count() > 0 {
            match depth_view::to_jpeg(buffer, None) {
                Ok(jpeg) => {
                    self.streams.plain_tx.send(as_jpeg_stream_item(&jpeg)).ok();
                }
                Err(err) => log::warn!("Failed to render depth view: {err}"),
            }
        }

        if self.streams.overlay_tx.receiver_count() > 0 {
            match depth_view::to_jpeg(buffer, Some(self.grid_size)) {
                Ok(jpeg) => {
                    self.streams
                        .overlay_tx
                        .send(as_jpeg_stream_item(&jpeg))
                        .ok();
                }
                Err(err) => log::warn!("Failed to render depth overlay: {err}"),
            }
        }
    }
}
