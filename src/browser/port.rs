use std::net::TcpListener;
use std::sync::atomic::{AtomicU16, Ordering};

static CDP_PORT_COUNTER: AtomicU16 = AtomicU16::new(9222);

/// Allocate a remote-debugging port for a new Chrome instance.
/// Asks the OS for a free port first; falls back to counting up from 9222
/// (wrapping at 65500) when binding is not possible.
pub fn allocate_cdp_port() -> u16 {
    if let Ok(listener) = TcpListener::bind(("127.0.0.1", 0)) {
        if let Ok(addr) = listener.local_addr() {
            return addr.port();
        }
    }

    let port = CDP_PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    if port > 65500 {
        CDP_PORT_COUNTER.store(9222, Ordering::SeqCst);
        return 9222;
    }
    port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_cdp_port_is_bindable() {
        let port = allocate_cdp_port();
        assert!(port > 0);
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }
}
