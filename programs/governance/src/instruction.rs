//! Instruction definitions for the Governance program.
//!
//! All instructions are serialised / deserialised via `bincode` to stay
//! consistent with the other builtin programs.
//!
//! `AddMember`, `RemoveMember` and `ChangeThreshold` must be signed by the
//! group account itself, which only happens when a proposal created under
//! authority index 0 is executed. The `propose_*` helpers in the client wrap
//! them that way.

use {
    crate::{
        id,
        state::{StoredInstruction, StoredAccountMeta},
    },
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
};

/// Instructions supported by the Governance program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceInstruction {
    /// Create a group at the address derived from `create_key`.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` — Creator; funds the group account.
    /// 1. `[writable]`         — Group account (PDA, not yet created).
    /// 2. `[]`                 — System program.
    CreateGroup {
        threshold: u16,
        create_key: Pubkey,
        members: Vec<Pubkey>,
    },

    /// Add a member.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` — Group account.
    AddMember { member: Pubkey },

    /// Remove a member, lowering the threshold if it would exceed the
    /// remaining member count.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` — Group account.
    RemoveMember { member: Pubkey },

    /// Set a new approval threshold.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` — Group account.
    ChangeThreshold { threshold: u16 },

    /// Open the next proposal of a group in `Draft`.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer, writable]` — Creator (member); funds the proposal account.
    /// 1. `[writable]`         — Group account.
    /// 2. `[writable]`         — Proposal account (PDA for the next index).
    /// 3. `[]`                 — System program.
    CreateProposal { authority_index: u32 },

    /// Append an instruction to a `Draft` proposal.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Proposal creator.
    /// 1. `[]`         — Group account.
    /// 2. `[writable]` — Proposal account.
    AddInstruction { instruction: StoredInstruction },

    /// Freeze the instruction list and open voting.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Proposal creator.
    /// 1. `[]`         — Group account.
    /// 2. `[writable]` — Proposal account.
    Activate,

    /// Vote in favour.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Member.
    /// 1. `[]`         — Group account.
    /// 2. `[writable]` — Proposal account.
    Approve,

    /// Vote against.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Member.
    /// 1. `[]`         — Group account.
    /// 2. `[writable]` — Proposal account.
    Reject,

    /// Withdraw an `Active` or `ExecuteReady` proposal.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Proposal creator.
    /// 1. `[]`         — Group account.
    /// 2. `[writable]` — Proposal account.
    Cancel,

    /// Run the proposal's instructions signed by its authority.
    ///
    /// # Accounts expected
    ///
    /// 0. `[signer]`   — Member.
    /// 1. `[writable]` — Group account.
    /// 2. `[writable]` — Proposal account.
    /// 3+. (varies)    — Every account the stored instructions reference.
    Execute,
}

fn group_admin(group: &Pubkey, instruction: &GovernanceInstruction) -> Instruction {
    Instruction::new_with_bincode(id(), instruction, vec![AccountMeta::new(*group, true)])
}

fn proposal_action(
    signer: &Pubkey,
    group: &Pubkey,
    proposal: &Pubkey,
    instruction: &GovernanceInstruction,
) -> Instruction {
    Instruction::new_with_bincode(
        id(),
        instruction,
        vec![
            AccountMeta::new_readonly(*signer, true),
            AccountMeta::new_readonly(*group, false),
            AccountMeta::new(*proposal, false),
        ],
    )
}

pub fn create_group(
    creator: &Pubkey,
    create_key: &Pubkey,
    members: Vec<Pubkey>,
    threshold: u16,
) -> Instruction {
    let (group, _) = crate::get_group_address(create_key);
    Instruction::new_with_bincode(
        id(),
        &GovernanceInstruction::CreateGroup {
            threshold,
            create_key: *create_key,
            members,
        },
        vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(group, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn add_member(group: &Pubkey, member: &Pubkey) -> Instruction {
    group_admin(group, &GovernanceInstruction::AddMember { member: *member })
}

pub fn remove_member(group: &Pubkey, member: &Pubkey) -> Instruction {
    group_admin(group, &GovernanceInstruction::RemoveMember { member: *member })
}

pub fn change_threshold(group: &Pubkey, threshold: u16) -> Instruction {
    group_admin(group, &GovernanceInstruction::ChangeThreshold { threshold })
}

/// `transaction_index` is the index the new proposal will get, one past the
/// group's current `transaction_index`.
pub fn create_proposal(
    creator: &Pubkey,
    group: &Pubkey,
    transaction_index: u32,
    authority_index: u32,
) -> Instruction {
    let (proposal, _) = crate::get_proposal_address(group, transaction_index);
    Instruction::new_with_bincode(
        id(),
        &GovernanceInstruction::CreateProposal { authority_index },
        vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(*group, false),
            AccountMeta::new(proposal, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn add_instruction(
    creator: &Pubkey,
    group: &Pubkey,
    proposal: &Pubkey,
    instruction: &Instruction,
) -> Instruction {
    proposal_action(
        creator,
        group,
        proposal,
        &GovernanceInstruction::AddInstruction {
            instruction: StoredInstruction::from(instruction),
        },
    )
}

pub fn activate(creator: &Pubkey, group: &Pubkey, proposal: &Pubkey) -> Instruction {
    proposal_action(creator, group, proposal, &GovernanceInstruction::Activate)
}

pub fn approve(member: &Pubkey, group: &Pubkey, proposal: &Pubkey) -> Instruction {
    proposal_action(member, group, proposal, &GovernanceInstruction::Approve)
}

pub fn reject(member: &Pubkey, group: &Pubkey, proposal: &Pubkey) -> Instruction {
    proposal_action(member, group, proposal, &GovernanceInstruction::Reject)
}

pub fn cancel(creator: &Pubkey, group: &Pubkey, proposal: &Pubkey) -> Instruction {
    proposal_action(creator, group, proposal, &GovernanceInstruction::Cancel)
}

/// Build `Execute` for a proposal holding `instructions`.
///
/// `authority` is the key that signs the stored instructions (the vault, or
/// the group for index 0). Its signer flag is dropped from the outer
/// instruction since the program supplies that signature. Keys in
/// `additional_signers` must sign the enclosing transaction; every other
/// referenced key is passed without signer privilege.
pub fn execute(
    executor: &Pubkey,
    group: &Pubkey,
    proposal: &Pubkey,
    authority: &Pubkey,
    instructions: &[StoredInstruction],
    additional_signers: &[Pubkey],
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*executor, true),
        AccountMeta::new(*group, false),
        AccountMeta::new(*proposal, false),
    ];
    let mut push = |meta: StoredAccountMeta| {
        let is_signer = meta.pubkey != *authority && additional_signers.contains(&meta.pubkey);
        match accounts.iter_mut().find(|existing| existing.pubkey == meta.pubkey) {
            Some(existing) => {
                existing.is_writable |= meta.is_writable;
                existing.is_signer |= is_signer;
            }
            None => accounts.push(AccountMeta {
                pubkey: meta.pubkey,
                is_signer,
                is_writable: meta.is_writable,
            }),
        }
    };
    for stored in instructions {
        push(StoredAccountMeta {
            pubkey: stored.program_id,
            is_signer: false,
            is_writable: false,
        });
        for meta in &stored.accounts {
            push(*meta);
        }
    }
    Instruction::new_with_bincode(id(), &GovernanceInstruction::Execute, accounts)
}
