use crate::socks4::error::Error;
use crate::socks4::result::Result;

pub const SOCKS4_VERSION: u8 = 4;
pub const GRANTED_CODE: u8 = 0x5a;
pub const REJECTED_CODE: u8 = 0x5b;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCmd {
    CONNECT,
    BIND,
}

impl SocksCmd {
    pub fn value(&self) -> u8 {
        match self {
            SocksCmd::CONNECT => 1,
            SocksCmd::BIND => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SocksCmd::CONNECT => "CONNECT",
            SocksCmd::BIND => "BIND",
        }
    }
}

impl TryFrom<u8> for SocksCmd {
    type Error = Error;
    fn try_from(value: u8) -> Result<SocksCmd> {
        match value {
            1 => Ok(SocksCmd::CONNECT),
            2 => Ok(SocksCmd::BIND),
            n => Err(Error::SocksCMDNotSupported(n)),
        }
    }
}
