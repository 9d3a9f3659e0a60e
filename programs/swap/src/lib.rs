//! SwapGate Swap program
//!
//! One instruction, `Swap { amount }`: burn `amount` of asset A from the
//! sender's holding account and mint the same amount of asset B into the
//! receiver's. Asset B's mint authority is an M-of-N token multisig; this
//! program's `mint_authority` address is one of its signers and the
//! counterparty supplies another, so neither side can mint alone.
//!
//! Checks run in this order and the first failure aborts the instruction:
//!
//! | Check                                   | Error              |
//! |-----------------------------------------|--------------------|
//! | asset A ≠ asset B                       | `RepeatedMint`     |
//! | equal decimals                          | `NotEqualDecimals` |
//! | `amount > 0`                            | `ZeroSwapAmount`   |
//! | sender's asset-A balance ≥ `amount`     | `NotEnoughTokens`  |

pub mod error;
pub mod instruction;
pub mod processor;

use solana_pubkey::Pubkey;
pub use processor::{check_id, id, Entrypoint, BUILTIN, ID};

/// Seed of the program-derived mint authority.
pub const MINT_AUTHORITY_SEED: &[u8] = b"mint_authority";

/// The program-derived signer that co-authorizes asset-B mints, with its
/// bump seed.
pub fn find_mint_authority_address() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINT_AUTHORITY_SEED], &id())
}
