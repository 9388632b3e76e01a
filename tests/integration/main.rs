//! Integration tests for market-radar

mod e2e_test;
mod feed_test;
mod levels_test;
