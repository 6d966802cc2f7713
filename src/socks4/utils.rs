use crate::socks4::result::Result;
use crate::socks4::wire::{self, SocksReply};
use log;
use tokio::io::AsyncWriteExt;

pub async fn send_reply(stream: &mut tokio::net::TcpStream, reply: &SocksReply) -> Result<()> {
    let frame = wire::encode_reply(reply);
    log::trace!("Send SOCKS4 reply: \"{:?}\"", frame);
    stream.write_all(&frame).await?;
    Ok(())
}
