//! Instruction definitions for the Associated-account program.

use {
    crate::{get_associated_account_address, id},
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
};

/// Both instructions take the same accounts:
///
/// 0. `[writable, signer]` — Funding account.
/// 1. `[writable]`         — Holding account at the derived address.
/// 2. `[]`                 — Owner.
/// 3. `[]`                 — Mint.
/// 4. `[]`                 — System program.
/// 5. `[]`                 — Token program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociatedAccountInstruction {
    /// Create the holding account. Fails if it already exists.
    Create,
    /// Create the holding account unless it already exists for the same
    /// owner and mint.
    CreateIdempotent,
}

fn build(
    funder: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    instruction: AssociatedAccountInstruction,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &instruction,
        vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new(get_associated_account_address(owner, mint), false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(solana_sdk_ids::system_program::id(), false),
            AccountMeta::new_readonly(swapgate_token_program::id(), false),
        ],
    )
}

pub fn create_associated_account(funder: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    build(funder, owner, mint, AssociatedAccountInstruction::Create)
}

pub fn create_associated_account_idempotent(
    funder: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    build(funder, owner, mint, AssociatedAccountInstruction::CreateIdempotent)
}
