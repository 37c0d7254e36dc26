//! Live-server tests. Start the server, then run: cargo test -- --ignored

mod api_tests;
