//! SwapGate Associated-account program
//!
//! Every (owner, mint) pair has exactly one canonical holding account, found
//! by derivation rather than lookup. This program creates it on demand:
//! funded by any payer, allocated at the derived address, and initialised
//! through the token program for the given owner and mint.

pub mod error;
pub mod instruction;
pub mod processor;

use {solana_pubkey::Pubkey, swapgate_runtime::Builtin};
pub use processor::Entrypoint;

solana_pubkey::declare_id!("95Br1Lg2tY1FG7xGo457tdbzM8HP1KfEuw3ko4AcitER");

pub const BUILTIN: Builtin = Builtin {
    name: "swapgate_associated_account_program",
    program_id: ID,
    entrypoint: Entrypoint::vm,
};

/// Derive the canonical holding account of `owner` for `mint`, with its bump
/// seed.
pub fn get_associated_account_address_and_bump_seed(owner: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            owner.as_ref(),
            swapgate_token_program::id().as_ref(),
            mint.as_ref(),
        ],
        &id(),
    )
}

pub fn get_associated_account_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_account_address_and_bump_seed(owner, mint).0
}
