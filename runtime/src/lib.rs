//! SwapGate Runtime
//!
//! The in-process ledger SwapGate programs and clients run against: an
//! Agave bank started by `solana-program-test`, with the SwapGate builtins
//! registered, driven through a blocking API.
//!
//! | Module   | Responsibility                                              |
//! |----------|-------------------------------------------------------------|
//! | `bank`   | Builtin registration, slots, account reads, transactions    |
//! | `config` | `BankConfig` and its validation                             |
//! | `error`  | `BankError`                                                 |
//!
//! Programs export an entrypoint produced by
//! `solana_program_runtime::declare_process_instruction!` and hand it to
//! [`Bank::new`] as a [`Builtin`].

pub mod bank;
pub mod config;
pub mod error;

pub use {
    bank::{Bank, Builtin, ProcessedTransaction, TransactionResult},
    config::{BankConfig, ConfigError},
    error::BankError,
};
