//! Data socket module to receive camera frames via network.
//!
use std::net::SocketAddr;

use anyhow::Result;
use common::protocol::ProtoMsg;
use futures::StreamExt;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::{meter::METER, StaticFrameSender};

pub async fn spawn_data_socket(
    tx: StaticFrameSender,
    addr: &str,
) -> Result<JoinHandle<Result<()>>> {
    let socket: SocketAddr = addr.parse()?;
    Ok(tokio::spawn(async move {
        let listener = TcpListener::bind(socket).await?;

        loop {
            let (socket, _peer_addr) = listener.accept().await?;
            let tx = tx.clone();
            tokio::spawn(async move {
                handle_incoming(tx, socket).await?;
                Ok::<_, anyhow::Error>(())
            });
        }
    }))
}

async fn handle_incoming(tx: StaticFrameSender, stream: TcpStream) -> Result<()> {
    let addr = stream.peer_addr()?;
    log::info!("{}: New TCP connection", &addr);

    let mut transport = Framed::new(stream, LengthDelimitedCodec::new());

    while let Some(frame) = transport.next().await {
        match frame {
            Ok(data) => {
                let frame_msg = match ProtoMsg::deserialize(&data[..]) {
                    Ok(ProtoMsg::FrameMsg(frame_msg)) => frame_msg,
                    Ok(other) => {
                        log::debug!("{}: Ignoring message {:?}", &addr, other);
                        continue;
                    }
                    Err(err) => {
                        log::warn!("{}: Undecodable message: {}", &addr, err);
                        continue;
                    }
                };

                METER.tick_camera();

                // A full channel means a depth pass is pending or running;
                // the frame is dropped, never queued.
                match tx.try_send_ref() {
                    Ok(mut slot) => {
                        slot.0 = frame_msg.width;
                        slot.1 = frame_msg.height;
                        slot.2.clear();
                        slot.2.extend_from_slice(&frame_msg.data);
                    }
                    Err(_) => log::debug!("{}: Dropping frame, inference busy", &addr),
                }
            }
            Err(err) => log::warn!("{}: Error in TCP codec: {}", &addr, err),
        }
    }

    Ok(())
}
