//! Instruction definitions for the Token program.
//!
//! Instructions are serialised with `bincode`. Every authority slot accepts
//! either a single signer or a multisig account followed by its co-signers.

use {
    crate::id,
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
};

/// Authority kinds replaceable through [`TokenInstruction::SetAuthority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityType {
    /// Authority to mint new tokens.
    MintTokens,
    /// Authority to freeze any holding account of a mint.
    FreezeAccount,
    /// Owner of a holding account.
    AccountOwner,
}

/// Instructions supported by the Token program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenInstruction {
    /// Initialise a new mint.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The mint, allocated with `Mint::LEN` bytes and owned
    ///                   by this program.
    InitializeMint {
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
    },

    /// Initialise a holding account for `owner` and `mint`.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The holding account, allocated and owned by this
    ///                   program.
    /// 1. `[]`         — The mint.
    /// 2. `[]`         — The owner.
    InitializeAccount,

    /// Initialise an M-of-N multisig.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The multisig account.
    /// 1. ..1+N `[]`   — The signer keys, N between 1 and 11.
    InitializeMultisig { m: u8 },

    /// Move tokens between two holding accounts of the same mint.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — Source.
    /// 1. `[writable]` — Destination.
    /// 2. `[signer]`   — Source owner, or a multisig followed by M signers.
    Transfer { amount: u64 },

    /// Mint new tokens.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The mint.
    /// 1. `[writable]` — Destination holding account.
    /// 2. `[signer]`   — Mint authority, or a multisig followed by M signers.
    MintTo { amount: u64 },

    /// Burn tokens from a holding account.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The holding account.
    /// 1. `[writable]` — Its mint.
    /// 2. `[signer]`   — Account owner, or a multisig followed by M signers.
    Burn { amount: u64 },

    /// Replace or remove an authority of a mint or holding account.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The mint or holding account.
    /// 1. `[signer]`   — Current authority, or a multisig followed by M signers.
    SetAuthority {
        authority_type: AuthorityType,
        new_authority: Option<Pubkey>,
    },

    /// Freeze a holding account.
    ///
    /// # Accounts expected
    ///
    /// 0. `[writable]` — The holding account.
    /// 1. `[]`         — Its mint.
    /// 2. `[signer]`   — Freeze authority, or a multisig followed by M signers.
    FreezeAccount,

    /// Thaw a frozen holding account. Accounts as for `FreezeAccount`.
    ThawAccount,
}

fn authority_metas(authority: &Pubkey, signers: &[&Pubkey]) -> Vec<AccountMeta> {
    let mut metas = Vec::with_capacity(signers.len().saturating_add(1));
    metas.push(AccountMeta::new_readonly(*authority, signers.is_empty()));
    metas.extend(
        signers
            .iter()
            .map(|signer| AccountMeta::new_readonly(**signer, true)),
    );
    metas
}

fn with_authority(
    mut accounts: Vec<AccountMeta>,
    authority: &Pubkey,
    signers: &[&Pubkey],
) -> Vec<AccountMeta> {
    accounts.extend(authority_metas(authority, signers));
    accounts
}

pub fn initialize_mint(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::InitializeMint {
            decimals,
            mint_authority: *mint_authority,
            freeze_authority: freeze_authority.copied(),
        },
        vec![AccountMeta::new(*mint, false)],
    )
}

pub fn initialize_account(account: &Pubkey, mint: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::InitializeAccount,
        vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*owner, false),
        ],
    )
}

pub fn initialize_multisig(multisig: &Pubkey, signers: &[&Pubkey], m: u8) -> Instruction {
    let mut accounts = vec![AccountMeta::new(*multisig, false)];
    accounts.extend(
        signers
            .iter()
            .map(|signer| AccountMeta::new_readonly(**signer, false)),
    );
    Instruction::new_with_bincode(id(), &TokenInstruction::InitializeMultisig { m }, accounts)
}

pub fn transfer(
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::Transfer { amount },
        with_authority(
            vec![
                AccountMeta::new(*source, false),
                AccountMeta::new(*destination, false),
            ],
            authority,
            signers,
        ),
    )
}

pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::MintTo { amount },
        with_authority(
            vec![
                AccountMeta::new(*mint, false),
                AccountMeta::new(*destination, false),
            ],
            authority,
            signers,
        ),
    )
}

pub fn burn(
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::Burn { amount },
        with_authority(
            vec![
                AccountMeta::new(*account, false),
                AccountMeta::new(*mint, false),
            ],
            authority,
            signers,
        ),
    )
}

pub fn set_authority(
    owned: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    authority: &Pubkey,
    signers: &[&Pubkey],
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::SetAuthority {
            authority_type,
            new_authority: new_authority.copied(),
        },
        with_authority(vec![AccountMeta::new(*owned, false)], authority, signers),
    )
}

pub fn freeze_account(
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::FreezeAccount,
        with_authority(
            vec![
                AccountMeta::new(*account, false),
                AccountMeta::new_readonly(*mint, false),
            ],
            authority,
            signers,
        ),
    )
}

pub fn thaw_account(
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        &TokenInstruction::ThawAccount,
        with_authority(
            vec![
                AccountMeta::new(*account, false),
                AccountMeta::new_readonly(*mint, false),
            ],
            authority,
            signers,
        ),
    )
}
