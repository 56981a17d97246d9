use std::net::SocketAddr;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use uuid::Uuid;

use crate::codec::MessageCodec;
use crate::reply::Reply;
use crate::Error;

pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    // Each read from the socket is handed to the codec, which turns whatever arrived into one
    // message.
    reader: FramedRead<OwnedReadHalf, MessageCodec>,
    writer: FramedWrite<OwnedWriteHalf, MessageCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr, max_message_size: usize) -> Connection {
        let (reader, writer) = stream.into_split();
        let codec = MessageCodec::new(max_message_size);
        let capacity = codec.read_capacity();

        Connection {
            id: Uuid::new_v4(),
            client_address,
            reader: FramedRead::with_capacity(reader, codec, capacity),
            writer: FramedWrite::new(writer, MessageCodec::new(max_message_size)),
        }
    }

    /// Returns the next raw message, or `None` once the peer has closed the connection.
    pub async fn read_message(&mut self) -> Result<Option<Bytes>, Error> {
        self.reader.next().await.transpose()
    }

    pub async fn write_reply(&mut self, reply: Reply) -> Result<(), Error> {
        self.writer.send(reply).await
    }
}
