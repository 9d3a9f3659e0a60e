//! SwapGate client
//!
//! Every operation takes a [`Context`]: a [`Ledger`] handle plus
//! [`ClientConfig`]. [`LocalLedger`] runs the ledger in process.
//!
//! | Module       | Responsibility                                             |
//! |--------------|------------------------------------------------------------|
//! | `nonce`      | Durable nonce tokens: create, read, reclaim, re-authorize  |
//! | `cosign`     | Offline, order-independent signature collection            |
//! | `token`      | Mints, holding accounts, token multisigs, amount parsing   |
//! | `governance` | Groups, proposals, votes, execution, member changes        |
//! | `swap`       | The swap instruction and the offline swap scenario         |
//!
//! Failures are [`ClientError`]s; [`ClientError::kind`] says whether to
//! fix the request, gather more signers, re-read and retry, or give up.

pub mod config;
pub mod context;
pub mod cosign;
pub mod error;
pub mod governance;
pub mod ledger;
pub mod nonce;
pub mod swap;
pub mod token;

pub use {
    config::{ClientConfig, ConfigError},
    context::Context,
    error::{ClientError, ErrorKind, Result},
    ledger::{Ledger, LocalLedger},
};
