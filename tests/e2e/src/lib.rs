//! SwapGate End-to-End Test Suite
//!
//! Drives the client flows against an in-process ledger with every program
//! registered: offline-cosigned swaps, multisig governance of asset B's
//! mint, and durable nonce handling.
//!
//! Each test file can be run independently:
//!
//! ```bash
//! cargo test -p swapgate-e2e-tests --test swap_lifecycle -- --nocapture
//! cargo test -p swapgate-e2e-tests --test governance_lifecycle -- --nocapture
//! cargo test -p swapgate-e2e-tests --test cosigning_lifecycle -- --nocapture
//! ```

pub mod helpers;
