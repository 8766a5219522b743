//! Realtime integration tests
//!
//! Drive `/ws` over a real socket.

mod ws_test;
