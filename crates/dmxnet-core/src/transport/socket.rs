use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};

/// Opens an unbound UDP socket configured for lighting traffic: broadcast
/// enabled, address reuse enabled, multicast egress pinned to `local` when it
/// names a specific interface.
pub(crate) fn open_socket(local: SocketAddr) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(local), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    if let Some(interface) = multicast_interface(local) {
        if !interface.is_unspecified() {
            socket.set_multicast_if_v4(&interface)?;
        }
    }
    suppress_connection_reset(&socket)?;
    Ok(socket)
}

/// Opens and binds a socket on an OS-chosen port of the same interface.
pub(crate) fn open_ephemeral(local: SocketAddr) -> io::Result<Socket> {
    let ephemeral = SocketAddr::new(local.ip(), 0);
    let socket = open_socket(ephemeral)?;
    socket.bind(&ephemeral.into())?;
    Ok(socket)
}

/// Interface used for multicast membership: the local address, or the
/// wildcard when bound to every interface.
pub(crate) fn multicast_interface(local: SocketAddr) -> Option<Ipv4Addr> {
    match local.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

/// ICMP port-unreachable replies to earlier sends surface on Windows as
/// `WSAECONNRESET` on the next receive. Turn that behaviour off.
#[cfg(windows)]
fn suppress_connection_reset(socket: &Socket) -> io::Result<()> {
    use std::os::windows::io::AsRawSocket;

    use windows_sys::Win32::Networking::WinSock::{SIO_UDP_CONNRESET, SOCKET, SOCKET_ERROR, WSAIoctl};

    let enabled: u32 = 0;
    let mut returned: u32 = 0;
    // SAFETY: the socket handle is valid for the lifetime of `socket`, the
    // input buffer is a live u32 and no output buffer or overlapped I/O is used.
    let result = unsafe {
        WSAIoctl(
            socket.as_raw_socket() as SOCKET,
            SIO_UDP_CONNRESET,
            &enabled as *const u32 as *const _,
            std::mem::size_of::<u32>() as u32,
            std::ptr::null_mut(),
            0,
            &mut returned,
            std::ptr::null_mut(),
            None,
        )
    };
    if result == SOCKET_ERROR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(windows))]
fn suppress_connection_reset(_socket: &Socket) -> io::Result<()> {
    Ok(())
}

/// Errors a receive loop can see when a previous send was answered with ICMP
/// port-unreachable; they say nothing about the health of the socket.
pub(crate) fn is_transient_receive_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_socket_gets_a_port() {
        let socket = open_ephemeral("127.0.0.1:6454".parse().unwrap()).unwrap();
        let local = socket.local_addr().unwrap().as_socket().unwrap();
        assert_ne!(local.port(), 0);
        assert!(socket.broadcast().unwrap());
    }

    #[test]
    fn transient_errors() {
        assert!(is_transient_receive_error(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_transient_receive_error(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
