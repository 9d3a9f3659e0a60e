//! Instruction processing logic for the Governance program.

use {
    crate::{
        constants::{
            GROUP_AUTHORITY_INDEX, MAX_INSTRUCTIONS, MAX_MEMBERS, SEED_AUTHORITY, SEED_MULTISIG,
            SEED_PREFIX,
        },
        error::GovernanceError,
        get_group_address, get_proposal_address, get_vault_address,
        instruction::GovernanceInstruction,
        state::{Group, Proposal, StoredInstruction},
        state_machine::{self, Event, Tally, Vote},
    },
    log::*,
    solana_bincode::limited_deserialize,
    solana_instruction::{error::InstructionError, Instruction},
    solana_program_runtime::{declare_process_instruction, invoke_context::InvokeContext},
    solana_pubkey::Pubkey,
    solana_system_interface::instruction as system_instruction,
    solana_svm_log_collector::ic_msg,
    solana_transaction_context::IndexOfAccount,
    swapgate_runtime::Builtin,
};

/// Default compute-unit budget for governance instructions.
pub const DEFAULT_COMPUTE_UNITS: u64 = 2_000;

const SIGNER_INDEX: IndexOfAccount = 0;
const GROUP_INDEX: IndexOfAccount = 1;
const PROPOSAL_INDEX: IndexOfAccount = 2;

// ---------------------------------------------------------------------------
// Program ID
// ---------------------------------------------------------------------------

solana_pubkey::declare_id!("SMPLecH534NA9acpos4G6x7uf3LWbCAwZQE9e8ZekMu");

pub const BUILTIN: Builtin = Builtin {
    name: "swapgate_governance_program",
    program_id: ID,
    entrypoint: Entrypoint::vm,
};

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

declare_process_instruction!(Entrypoint, DEFAULT_COMPUTE_UNITS, |invoke_context| {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let instruction_data = instruction_context.get_instruction_data();

    let instruction: GovernanceInstruction =
        limited_deserialize(instruction_data, solana_packet::PACKET_DATA_SIZE as u64)?;

    trace!("governance process_instruction: {instruction:?}");

    match instruction {
        GovernanceInstruction::CreateGroup {
            threshold,
            create_key,
            members,
        } => process_create_group(invoke_context, threshold, create_key, members),
        GovernanceInstruction::AddMember { member } => process_add_member(invoke_context, member),
        GovernanceInstruction::RemoveMember { member } => {
            process_remove_member(invoke_context, member)
        }
        GovernanceInstruction::ChangeThreshold { threshold } => {
            process_change_threshold(invoke_context, threshold)
        }
        GovernanceInstruction::CreateProposal { authority_index } => {
            process_create_proposal(invoke_context, authority_index)
        }
        GovernanceInstruction::AddInstruction { instruction } => {
            process_add_instruction(invoke_context, instruction)
        }
        GovernanceInstruction::Activate => process_activate(invoke_context),
        GovernanceInstruction::Approve => process_vote(invoke_context, Vote::Approve),
        GovernanceInstruction::Reject => process_vote(invoke_context, Vote::Reject),
        GovernanceInstruction::Cancel => process_cancel(invoke_context),
        GovernanceInstruction::Execute => process_execute(invoke_context),
    }
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load and deserialise the `Group` from instruction account at `index`.
fn load_group(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<Group, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let account = instruction_context.try_borrow_instruction_account(account_index)?;

    if account.get_owner() != &id() {
        return Err(GovernanceError::InvalidAccountOwner.into());
    }
    Group::deserialize(account.get_data()).map_err(|_| GovernanceError::InvalidAccountData.into())
}

/// Load and deserialise a `Proposal` from instruction account at `index`.
fn load_proposal(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
) -> Result<Proposal, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let account = instruction_context.try_borrow_instruction_account(account_index)?;

    if account.get_owner() != &id() {
        return Err(GovernanceError::InvalidAccountOwner.into());
    }
    Proposal::deserialize(account.get_data())
        .map_err(|_| GovernanceError::InvalidAccountData.into())
}

/// Save a `Group` back to instruction account at `index`.
fn save_group(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
    group: &Group,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let mut account = instruction_context.try_borrow_instruction_account(account_index)?;

    let mut data = account.get_data().to_vec();
    if data.len() < Group::SERIALIZED_SIZE {
        data.resize(Group::SERIALIZED_SIZE, 0);
    }
    group
        .serialize_into(&mut data)
        .map_err(|_| GovernanceError::InvalidAccountData)?;
    account.set_data_from_slice(&data)
}

/// Save a `Proposal` back to instruction account at `index`.
fn save_proposal(
    invoke_context: &InvokeContext,
    account_index: IndexOfAccount,
    proposal: &Proposal,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    let mut account = instruction_context.try_borrow_instruction_account(account_index)?;

    let mut data = account.get_data().to_vec();
    if data.len() < Proposal::SERIALIZED_SIZE {
        data.resize(Proposal::SERIALIZED_SIZE, 0);
    }
    proposal
        .serialize_into(&mut data)
        .map_err(|_| GovernanceError::ProposalTooLarge)?;
    account.set_data_from_slice(&data)
}

fn check_threshold(threshold: u16, member_count: usize) -> Result<(), InstructionError> {
    if threshold == 0 || usize::from(threshold) > member_count {
        return Err(GovernanceError::InvalidThreshold.into());
    }
    Ok(())
}

fn tally(group: &Group, proposal: &Proposal) -> Tally {
    Tally {
        approvals: proposal.approved.len(),
        rejections: proposal.rejected.len(),
        threshold: group.threshold,
        member_count: group.members.len(),
    }
}

/// The group account at index 0 must have signed, which only a proposal
/// executed under authority index 0 can arrange.
fn load_group_as_signer(invoke_context: &InvokeContext) -> Result<Group, InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(1)?;
    if !instruction_context.is_instruction_account_signer(0)? {
        ic_msg!(invoke_context, "Group signature required");
        return Err(InstructionError::MissingRequiredSignature);
    }
    load_group(invoke_context, 0)
}

/// Common loading for instructions on an existing proposal.
///
/// Returns the signer at index 0, the group key, the group and the
/// proposal, having checked that the proposal belongs to the group.
fn load_proposal_accounts(
    invoke_context: &InvokeContext,
) -> Result<(Pubkey, Pubkey, Group, Proposal), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(PROPOSAL_INDEX.saturating_add(1))?;

    if !instruction_context.is_instruction_account_signer(SIGNER_INDEX)? {
        return Err(InstructionError::MissingRequiredSignature);
    }
    let signer = *instruction_context.get_key_of_instruction_account(SIGNER_INDEX)?;
    let group_key = *instruction_context.get_key_of_instruction_account(GROUP_INDEX)?;

    let group = load_group(invoke_context, GROUP_INDEX)?;
    let proposal = load_proposal(invoke_context, PROPOSAL_INDEX)?;
    if proposal.group != group_key {
        return Err(GovernanceError::GroupMismatch.into());
    }
    Ok((signer, group_key, group, proposal))
}

fn check_member(
    invoke_context: &InvokeContext,
    group: &Group,
    key: &Pubkey,
) -> Result<(), InstructionError> {
    if !group.is_member(key) {
        ic_msg!(invoke_context, "{} is not a member of the group", key);
        return Err(GovernanceError::KeyNotInMultisig.into());
    }
    Ok(())
}

fn check_creator(proposal: &Proposal, key: &Pubkey) -> Result<(), InstructionError> {
    if &proposal.creator != key {
        return Err(GovernanceError::NotProposalCreator.into());
    }
    Ok(())
}

fn check_not_stale(
    invoke_context: &InvokeContext,
    group: &Group,
    proposal: &Proposal,
) -> Result<(), InstructionError> {
    if group.is_stale(proposal.transaction_index) {
        ic_msg!(
            invoke_context,
            "Proposal {} predates configuration change {}",
            proposal.transaction_index,
            group.config_change_index
        );
        return Err(GovernanceError::StaleProposal.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Instruction handlers
// ---------------------------------------------------------------------------

/// `CreateGroup`
///
/// Accounts:
///   0. `[signer, writable]` — Creator
///   1. `[writable]`         — Group account
///   2. `[]`                 — System program
fn process_create_group(
    invoke_context: &mut InvokeContext,
    threshold: u16,
    create_key: Pubkey,
    mut members: Vec<Pubkey>,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(GROUP_INDEX.saturating_add(1))?;

    if !instruction_context.is_instruction_account_signer(SIGNER_INDEX)? {
        return Err(InstructionError::MissingRequiredSignature);
    }
    let creator = *instruction_context.get_key_of_instruction_account(SIGNER_INDEX)?;
    let group_key = *instruction_context.get_key_of_instruction_account(GROUP_INDEX)?;

    let (expected, bump) = get_group_address(&create_key);
    if group_key != expected {
        ic_msg!(invoke_context, "Group address does not match create key {}", create_key);
        return Err(InstructionError::InvalidSeeds);
    }
    {
        let account = instruction_context.try_borrow_instruction_account(GROUP_INDEX)?;
        if account.get_owner() == &id() || !account.get_data().is_empty() {
            return Err(GovernanceError::AlreadyInitialized.into());
        }
    }

    members.sort();
    if members.is_empty() {
        return Err(GovernanceError::EmptyMembers.into());
    }
    if members.len() > MAX_MEMBERS {
        return Err(GovernanceError::TooManyMembers.into());
    }
    if members.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(GovernanceError::DuplicateMember.into());
    }
    check_threshold(threshold, members.len())?;
    drop(instruction_context);

    let rent = invoke_context.get_sysvar_cache().get_rent()?;
    invoke_context.native_invoke(
        system_instruction::create_account(
            &creator,
            &group_key,
            rent.minimum_balance(Group::SERIALIZED_SIZE),
            Group::SERIALIZED_SIZE as u64,
            &id(),
        )
        .into(),
        &[group_key],
    )?;

    let group = Group {
        threshold,
        transaction_index: 0,
        config_change_index: 0,
        create_key,
        bump,
        members,
    };
    save_group(invoke_context, GROUP_INDEX, &group)?;

    ic_msg!(
        invoke_context,
        "Created group {} with {} members, threshold {}",
        group_key,
        group.members.len(),
        threshold
    );
    Ok(())
}

/// `AddMember`
///
/// Accounts:
///   0. `[signer, writable]` — Group account
fn process_add_member(invoke_context: &InvokeContext, member: Pubkey) -> Result<(), InstructionError> {
    let mut group = load_group_as_signer(invoke_context)?;

    if group.is_member(&member) {
        return Err(GovernanceError::MemberAlreadyExists.into());
    }
    if group.members.len() >= MAX_MEMBERS {
        return Err(GovernanceError::TooManyMembers.into());
    }
    group.add_member(member);
    group.mark_config_change();
    save_group(invoke_context, 0, &group)?;

    ic_msg!(invoke_context, "Added member {}", member);
    Ok(())
}

/// `RemoveMember`
///
/// Accounts:
///   0. `[signer, writable]` — Group account
fn process_remove_member(
    invoke_context: &InvokeContext,
    member: Pubkey,
) -> Result<(), InstructionError> {
    let mut group = load_group_as_signer(invoke_context)?;

    check_member(invoke_context, &group, &member)?;
    if group.members.len() == 1 {
        return Err(GovernanceError::CannotRemoveLastMember.into());
    }
    group.remove_member(&member);
    let member_count = u16::try_from(group.members.len())
        .map_err(|_| GovernanceError::ArithmeticOverflow)?;
    if group.threshold > member_count {
        debug!("threshold lowered from {} to {member_count}", group.threshold);
        group.threshold = member_count;
    }
    group.mark_config_change();
    save_group(invoke_context, 0, &group)?;

    ic_msg!(invoke_context, "Removed member {}", member);
    Ok(())
}

/// `ChangeThreshold`
///
/// Accounts:
///   0. `[signer, writable]` — Group account
fn process_change_threshold(
    invoke_context: &InvokeContext,
    threshold: u16,
) -> Result<(), InstructionError> {
    let mut group = load_group_as_signer(invoke_context)?;

    check_threshold(threshold, group.members.len())?;
    group.threshold = threshold;
    group.mark_config_change();
    save_group(invoke_context, 0, &group)?;

    ic_msg!(invoke_context, "Threshold set to {}", threshold);
    Ok(())
}

/// `CreateProposal`
///
/// Accounts:
///   0. `[signer, writable]` — Creator (member)
///   1. `[writable]`         — Group account
///   2. `[writable]`         — Proposal account
///   3. `[]`                 — System program
fn process_create_proposal(
    invoke_context: &mut InvokeContext,
    authority_index: u32,
) -> Result<(), InstructionError> {
    let transaction_context = &invoke_context.transaction_context;
    let instruction_context = transaction_context.get_current_instruction_context()?;
    instruction_context.check_number_of_instruction_accounts(PROPOSAL_INDEX.saturating_add(1))?;

    if !instruction_context.is_instruction_account_signer(SIGNER_INDEX)? {
        return Err(InstructionError::MissingRequiredSignature);
    }
    let creator = *instruction_context.get_key_of_instruction_account(SIGNER_INDEX)?;
    let group_key = *instruction_context.get_key_of_instruction_account(GROUP_INDEX)?;
    let proposal_key = *instruction_context.get_key_of_instruction_account(PROPOSAL_INDEX)?;

    let mut group = load_group(invoke_context, GROUP_INDEX)?;
    check_member(invoke_context, &group, &creator)?;

    let transaction_index = group
        .transaction_index
        .checked_add(1)
        .ok_or(GovernanceError::ArithmeticOverflow)?;
    let (expected, bump) = get_proposal_address(&group_key, transaction_index);
    if proposal_key != expected {
        ic_msg!(
            invoke_context,
            "Proposal address does not match index {}",
            transaction_index
        );
        return Err(InstructionError::InvalidSeeds);
    }
    let authority_bump = if authority_index == GROUP_AUTHORITY_INDEX {
        group.bump
    } else {
        get_vault_address(&group_key, authority_index).1
    };
    drop(instruction_context);

    let rent = invoke_context.get_sysvar_cache().get_rent()?;
    invoke_context.native_invoke(
        system_instruction::create_account(
            &creator,
            &proposal_key,
            rent.minimum_balance(Proposal::SERIALIZED_SIZE),
            Proposal::SERIALIZED_SIZE as u64,
            &id(),
        )
        .into(),
        &[proposal_key],
    )?;

    group.transaction_index = transaction_index;
    save_group(invoke_context, GROUP_INDEX, &group)?;
    let proposal = Proposal::new(
        creator,
        group_key,
        transaction_index,
        authority_index,
        authority_bump,
        bump,
    );
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)?;

    ic_msg!(
        invoke_context,
        "Created proposal {} (authority {}) in group {}",
        transaction_index,
        authority_index,
        group_key
    );
    Ok(())
}

/// `AddInstruction`
///
/// Accounts:
///   0. `[signer]`   — Proposal creator
///   1. `[]`         — Group account
///   2. `[writable]` — Proposal account
fn process_add_instruction(
    invoke_context: &InvokeContext,
    instruction: StoredInstruction,
) -> Result<(), InstructionError> {
    let (signer, _, group, mut proposal) = load_proposal_accounts(invoke_context)?;
    check_creator(&proposal, &signer)?;

    proposal.status =
        state_machine::next_status(proposal.status, Event::AddInstruction, &tally(&group, &proposal))?;
    if proposal.instructions.len() >= MAX_INSTRUCTIONS {
        return Err(GovernanceError::TooManyInstructions.into());
    }
    trace!(
        "proposal {}: adding instruction for {}",
        proposal.transaction_index,
        instruction.program_id
    );
    proposal.instructions.push(instruction);
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)
}

/// `Activate`
///
/// Accounts:
///   0. `[signer]`   — Proposal creator
///   1. `[]`         — Group account
///   2. `[writable]` — Proposal account
fn process_activate(invoke_context: &InvokeContext) -> Result<(), InstructionError> {
    let (signer, _, group, mut proposal) = load_proposal_accounts(invoke_context)?;
    check_creator(&proposal, &signer)?;
    check_not_stale(invoke_context, &group, &proposal)?;

    if proposal.instructions.is_empty() {
        return Err(GovernanceError::EmptyProposal.into());
    }
    proposal.status =
        state_machine::next_status(proposal.status, Event::Activate, &tally(&group, &proposal))?;
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)?;

    ic_msg!(
        invoke_context,
        "Proposal {} active with {} instructions",
        proposal.transaction_index,
        proposal.instructions.len()
    );
    Ok(())
}

/// `Approve` / `Reject`
///
/// Accounts:
///   0. `[signer]`   — Member
///   1. `[]`         — Group account
///   2. `[writable]` — Proposal account
fn process_vote(invoke_context: &InvokeContext, vote: Vote) -> Result<(), InstructionError> {
    let (member, _, group, mut proposal) = load_proposal_accounts(invoke_context)?;
    check_member(invoke_context, &group, &member)?;
    check_not_stale(invoke_context, &group, &proposal)?;

    let changed = state_machine::apply_vote(
        &mut proposal.approved,
        &mut proposal.rejected,
        member,
        vote,
    );
    proposal.status =
        state_machine::next_status(proposal.status, Event::Vote, &tally(&group, &proposal))?;
    if !changed {
        debug!("{member} repeated {vote:?} on proposal {}", proposal.transaction_index);
        return Ok(());
    }
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)?;

    ic_msg!(
        invoke_context,
        "{:?} by {}: {} approvals, {} rejections, status {:?}",
        vote,
        member,
        proposal.approved.len(),
        proposal.rejected.len(),
        proposal.status
    );
    Ok(())
}

/// `Cancel`
///
/// Accounts:
///   0. `[signer]`   — Proposal creator
///   1. `[]`         — Group account
///   2. `[writable]` — Proposal account
fn process_cancel(invoke_context: &InvokeContext) -> Result<(), InstructionError> {
    let (signer, _, group, mut proposal) = load_proposal_accounts(invoke_context)?;
    // Status first: an executed proposal reports `AlreadyExecuted` to anyone.
    proposal.status =
        state_machine::next_status(proposal.status, Event::Cancel, &tally(&group, &proposal))?;
    check_creator(&proposal, &signer)?;
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)?;

    ic_msg!(invoke_context, "Proposal {} cancelled", proposal.transaction_index);
    Ok(())
}

/// `Execute`
///
/// Accounts:
///   0. `[signer]`   — Member
///   1. `[writable]` — Group account
///   2. `[writable]` — Proposal account
///   3+. (varies)    — Accounts of the stored instructions
fn process_execute(invoke_context: &mut InvokeContext) -> Result<(), InstructionError> {
    let (executor, group_key, group, proposal) = load_proposal_accounts(invoke_context)?;
    // Status first: a proposal that already ran reports `AlreadyExecuted`
    // even after its own config change made it stale or removed the executor.
    let executed =
        state_machine::next_status(proposal.status, Event::Execute, &tally(&group, &proposal))?;
    check_member(invoke_context, &group, &executor)?;
    check_not_stale(invoke_context, &group, &proposal)?;

    let index_bytes = proposal.authority_index.to_le_bytes();
    let bump = [proposal.authority_bump];
    let group_seeds: [&[u8]; 4] = [SEED_PREFIX, group.create_key.as_ref(), SEED_MULTISIG, &bump];
    let vault_seeds: [&[u8]; 5] = [
        SEED_PREFIX,
        group_key.as_ref(),
        &index_bytes,
        SEED_AUTHORITY,
        &bump,
    ];
    let signer_seeds: &[&[u8]] = if proposal.authority_index == GROUP_AUTHORITY_INDEX {
        &group_seeds
    } else {
        &vault_seeds
    };
    let authority = Pubkey::create_program_address(signer_seeds, &id())
        .map_err(|_| InstructionError::InvalidSeeds)?;
    let instructions: Vec<Instruction> = proposal.instructions.iter().map(Instruction::from).collect();

    // Stored instructions may write the group (index 0) or touch any other
    // account of this instruction, so nothing may stay borrowed across them.
    for (position, instruction) in instructions.into_iter().enumerate() {
        trace!(
            "proposal {}: executing instruction {position} for {}",
            proposal.transaction_index,
            instruction.program_id
        );
        invoke_context.native_invoke(instruction.into(), &[authority])?;
    }

    let mut proposal = load_proposal(invoke_context, PROPOSAL_INDEX)?;
    proposal.status = executed;
    save_proposal(invoke_context, PROPOSAL_INDEX, &proposal)?;

    ic_msg!(
        invoke_context,
        "Executed proposal {} of group {}",
        proposal.transaction_index,
        group_key
    );
    Ok(())
}
