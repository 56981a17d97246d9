use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::codec::encode_image;
use crate::handlers::Opcode;
use crate::message;
use crate::Error;

const REPLY_BUFFER_SIZE: usize = 64 * 1024;

/// A minimal client for the boutique protocol. Every call sends one request and waits for the
/// single reply the server sends back.
pub struct Client {
    stream: TcpStream,
    buffer: BytesMut,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Client, Error> {
        let stream = TcpStream::connect(addr).await?;

        Ok(Client {
            stream,
            buffer: BytesMut::with_capacity(REPLY_BUFFER_SIZE),
        })
    }

    pub async fn request(&mut self, opcode: Opcode, payload: &str) -> Result<String, Error> {
        self.send_raw(&message::encode(opcode.code(), payload)).await
    }

    pub async fn send_image(&mut self, name: &str, data: &[u8]) -> Result<String, Error> {
        let payload = format!("{}{}{}", name, message::DELIMITER, encode_image(data));
        self.request(Opcode::SendImage, &payload).await
    }

    /// Sends bytes as-is, for requests that do not come from an [`Opcode`].
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<String, Error> {
        self.stream.write_all(bytes).await?;
        self.read_reply().await
    }

    async fn read_reply(&mut self) -> Result<String, Error> {
        self.buffer.clear();
        self.buffer.reserve(REPLY_BUFFER_SIZE);

        if 0 == self.stream.read_buf(&mut self.buffer).await? {
            return Err("connection closed by server".into());
        }

        Ok(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}
