//! SwapGate Governance Program
//!
//! A group of members collectively authorizes arbitrary instructions. Each
//! group owns a set of vault authorities: program addresses that sign the
//! instructions of an approved proposal when it is executed.
//!
//! ## Lifecycle
//!
//! ```text
//! Draft ──activate──▶ Active ──approvals ≥ threshold──▶ ExecuteReady ──execute──▶ Executed
//!                       │                                   │
//!                       ├──approval unreachable──▶ Rejected  │
//!                       └──────────cancel──────▶ Cancelled ◀┘
//! ```
//!
//! The transition rules live in [`state_machine`] and do not touch accounts.
//!
//! ## Addresses
//!
//! | Account  | Seeds                                                  |
//! |----------|--------------------------------------------------------|
//! | Group    | `"squad"`, create key, `"multisig"`                    |
//! | Vault    | `"squad"`, group, authority index (u32 LE), `"authority"` |
//! | Proposal | `"squad"`, group, transaction index (u32 LE), `"transaction"` |
//!
//! Authority index 0 is the group itself. Proposals executed under it change
//! the group's own configuration (members and threshold), and every such
//! change makes all earlier proposals stale.

#![allow(clippy::arithmetic_side_effects)]

pub mod constants;
pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod state_machine;

use {
    constants::{SEED_AUTHORITY, SEED_MULTISIG, SEED_PREFIX, SEED_TRANSACTION},
    solana_pubkey::Pubkey,
};

/// Re-export the program ID.
pub use processor::{check_id, id, Entrypoint, BUILTIN, ID};

/// Address and bump seed of the group created with `create_key`.
pub fn get_group_address(create_key: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SEED_PREFIX, create_key.as_ref(), SEED_MULTISIG], &id())
}

/// Address and bump seed of vault `authority_index` of `group`.
///
/// Index 0 is reserved for the group itself; use [`get_group_address`] for it.
pub fn get_vault_address(group: &Pubkey, authority_index: u32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            group.as_ref(),
            &authority_index.to_le_bytes(),
            SEED_AUTHORITY,
        ],
        &id(),
    )
}

/// Address and bump seed of proposal `transaction_index` of `group`.
pub fn get_proposal_address(group: &Pubkey, transaction_index: u32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            group.as_ref(),
            &transaction_index.to_le_bytes(),
            SEED_TRANSACTION,
        ],
        &id(),
    )
}
