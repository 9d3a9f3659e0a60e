use {
    crate::{find_mint_authority_address, id},
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    swapgate_associated_account_program::get_associated_account_address,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapInstruction {
    /// Burn `amount` of asset A and mint `amount` of asset B.
    ///
    /// # Accounts expected
    ///
    /// 0.  `[signer, writable]` — Fee payer.
    /// 1.  `[writable]`         — Asset A mint.
    /// 2.  `[writable]`         — Asset B mint.
    /// 3.  `[signer]`           — Asset A sender.
    /// 4.  `[writable]`         — Sender's associated asset-A account.
    /// 5.  `[]`                 — Asset B receiver.
    /// 6.  `[writable]`         — Receiver's associated asset-B account.
    /// 7.  `[]`                 — Asset B mint authority (token multisig).
    /// 8.  `[signer]`           — Counterparty signer of the multisig.
    /// 9.  `[]`                 — This program's mint authority address.
    /// 10. `[]`                 — System program.
    /// 11. `[]`                 — Associated-account program.
    /// 12. `[]`                 — Token program.
    Swap { amount: u64 },
}

/// The keys a swap is built from; holding accounts and program addresses
/// are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAccounts {
    pub fee_payer: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub sender: Pubkey,
    pub receiver: Pubkey,
    pub mint_b_authority: Pubkey,
    pub counterparty: Pubkey,
}

pub fn swap(accounts: &SwapAccounts, amount: u64) -> Instruction {
    let (program_authority, _) = find_mint_authority_address();
    Instruction::new_with_bincode(
        id(),
        &SwapInstruction::Swap { amount },
        vec![
            AccountMeta::new(accounts.fee_payer, true),
            AccountMeta::new(accounts.mint_a, false),
            AccountMeta::new(accounts.mint_b, false),
            AccountMeta::new_readonly(accounts.sender, true),
            AccountMeta::new(
                get_associated_account_address(&accounts.sender, &accounts.mint_a),
                false,
            ),
            AccountMeta::new_readonly(accounts.receiver, false),
            AccountMeta::new(
                get_associated_account_address(&accounts.receiver, &accounts.mint_b),
                false,
            ),
            AccountMeta::new_readonly(accounts.mint_b_authority, false),
            AccountMeta::new_readonly(accounts.counterparty, true),
            AccountMeta::new_readonly(program_authority, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(swapgate_associated_account_program::id(), false),
            AccountMeta::new_readonly(swapgate_token_program::id(), false),
        ],
    )
}
