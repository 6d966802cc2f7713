use crate::socks4::result::Result;
use log;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

pub const RELAY_BUFFER_SIZE: usize = 4096;

/// Forwards bytes between `client` and `upstream`, one pump loop per
/// direction, until either side ends its stream or fails. The protocol has no
/// half-close: whichever direction finishes first takes the whole session
/// down, and both sockets are shut down before returning.
pub async fn run(client: &mut TcpStream, upstream: &mut TcpStream) -> Result<()> {
    let outcome = {
        let (mut client_read, mut client_write) = client.split();
        let (mut upstream_read, mut upstream_write) = upstream.split();
        tokio::select! {
            sent = pump(&mut client_read, &mut upstream_write) => sent.map(|n| ("client", n)),
            sent = pump(&mut upstream_read, &mut client_write) => sent.map(|n| ("upstream", n)),
        }
    };
    client.shutdown().await.unwrap_or_default();
    upstream.shutdown().await.unwrap_or_default();

    let (side, sent) = outcome?;
    log::debug!(
        "Relay ended on the \"{}\" side after forwarding {} bytes",
        side,
        sent
    );
    Ok(())
}

/// Single in-flight buffer: the next read is not issued before the previous
/// write completes.
async fn pump<R, W>(reader: &mut R, writer: &mut W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buff = [0u8; RELAY_BUFFER_SIZE];
    let mut sent = 0u64;
    loop {
        let length = reader.read(&mut buff).await?;
        if length == 0 {
            return Ok(sent);
        }
        writer.write_all(&buff[..length]).await?;
        sent += length as u64;
    }
}
