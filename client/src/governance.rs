//! Group, proposal, vote and execute flows for the governance program.
//!
//! Proposals under authority index 0 are signed by the group itself and
//! are how members and the threshold change; see [`propose_add_member`].

use {
    crate::{
        context::Context,
        error::{ClientError, Result},
        ledger::Ledger,
    },
    log::*,
    solana_instruction::Instruction,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_signer::Signer,
    swapgate_governance_program::{
        constants::GROUP_AUTHORITY_INDEX,
        get_group_address, get_proposal_address, get_vault_address,
        instruction as governance_instruction,
        state::{Group, Proposal, ProposalStatus},
    },
};

fn load_governance_account<L: Ledger>(context: &Context<L>, address: &Pubkey) -> Result<Vec<u8>> {
    let account = context.get_account(address)?;
    if !swapgate_governance_program::check_id(&account.owner) {
        return Err(ClientError::InvalidAccountData(*address));
    }
    Ok(account.data)
}

pub fn check_group_state<L: Ledger>(context: &Context<L>, group: &Pubkey) -> Result<Group> {
    let data = load_governance_account(context, group)?;
    Group::deserialize(&data).map_err(|_| ClientError::InvalidAccountData(*group))
}

pub fn check_proposal_state<L: Ledger>(context: &Context<L>, proposal: &Pubkey) -> Result<Proposal> {
    let data = load_governance_account(context, proposal)?;
    Proposal::deserialize(&data).map_err(|_| ClientError::InvalidAccountData(*proposal))
}

/// The key that signs a proposal's instructions at execution.
pub fn authority_address(group: &Pubkey, authority_index: u32) -> Pubkey {
    if authority_index == GROUP_AUTHORITY_INDEX {
        *group
    } else {
        get_vault_address(group, authority_index).0
    }
}

/// Create a group of `members` needing `threshold` approvals. `creator`
/// pays and need not be a member. Returns the group address.
pub fn create_group<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    members: Vec<Pubkey>,
    threshold: u16,
) -> Result<Pubkey> {
    let create_key = Keypair::new().pubkey();
    let (group, _) = get_group_address(&create_key);
    let member_count = members.len();
    let instruction =
        governance_instruction::create_group(&creator.pubkey(), &create_key, members, threshold);
    context.send(&[instruction], creator, &[])?;
    info!("group {group} created, {threshold} of {member_count}");
    Ok(group)
}

/// Create an empty `Draft` proposal signed by `authority_index` at
/// execution. Returns the proposal address.
pub fn create_proposal<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    authority_index: u32,
) -> Result<Pubkey> {
    let transaction_index = check_group_state(context, group)?
        .transaction_index
        .checked_add(1)
        .ok_or(ClientError::Governance(
            swapgate_governance_program::error::GovernanceError::ArithmeticOverflow,
        ))?;
    let (proposal, _) = get_proposal_address(group, transaction_index);
    let instruction = governance_instruction::create_proposal(
        &creator.pubkey(),
        group,
        transaction_index,
        authority_index,
    );
    context.send(&[instruction], creator, &[])?;
    debug!("proposal {proposal} (#{transaction_index}) created in {group}");
    Ok(proposal)
}

pub fn add_instruction<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    proposal: &Pubkey,
    instruction: &Instruction,
) -> Result<Signature> {
    let instruction =
        governance_instruction::add_instruction(&creator.pubkey(), group, proposal, instruction);
    context.send(&[instruction], creator, &[])
}

pub fn activate<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    proposal: &Pubkey,
) -> Result<Signature> {
    let instruction = governance_instruction::activate(&creator.pubkey(), group, proposal);
    context.send(&[instruction], creator, &[])
}

/// Create a proposal holding `instructions` and open it for voting.
pub fn create_and_activate_proposal<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    authority_index: u32,
    instructions: &[Instruction],
) -> Result<Pubkey> {
    let proposal = create_proposal(context, creator, group, authority_index)?;
    for instruction in instructions {
        add_instruction(context, creator, group, &proposal, instruction)?;
    }
    activate(context, creator, group, &proposal)?;
    info!(
        "proposal {proposal} active with {} instructions",
        instructions.len()
    );
    Ok(proposal)
}

/// Approve as `member`. Returns the proposal's status afterwards.
pub fn approve<L: Ledger>(
    context: &Context<L>,
    member: &Keypair,
    group: &Pubkey,
    proposal: &Pubkey,
) -> Result<ProposalStatus> {
    let instruction = governance_instruction::approve(&member.pubkey(), group, proposal);
    context.send(&[instruction], member, &[])?;
    let status = check_proposal_state(context, proposal)?.status;
    debug!("{} approved {proposal}: {status:?}", member.pubkey());
    Ok(status)
}

/// Reject as `member`. Returns the proposal's status afterwards.
pub fn reject<L: Ledger>(
    context: &Context<L>,
    member: &Keypair,
    group: &Pubkey,
    proposal: &Pubkey,
) -> Result<ProposalStatus> {
    let instruction = governance_instruction::reject(&member.pubkey(), group, proposal);
    context.send(&[instruction], member, &[])?;
    let status = check_proposal_state(context, proposal)?.status;
    debug!("{} rejected {proposal}: {status:?}", member.pubkey());
    Ok(status)
}

pub fn cancel<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    proposal: &Pubkey,
) -> Result<Signature> {
    let instruction = governance_instruction::cancel(&creator.pubkey(), group, proposal);
    context.send(&[instruction], creator, &[])
}

/// Run an `ExecuteReady` proposal's instructions.
///
/// `additional_signers` co-sign the enclosing transaction, for stored
/// instructions that need more than the vault, such as a mint whose
/// authority is a token multisig listing both the vault and another key.
pub fn execute<L: Ledger>(
    context: &Context<L>,
    executor: &Keypair,
    proposal: &Pubkey,
    additional_signers: &[&Keypair],
) -> Result<Signature> {
    let state = check_proposal_state(context, proposal)?;
    let authority = authority_address(&state.group, state.authority_index);
    let extra_keys: Vec<Pubkey> = additional_signers
        .iter()
        .map(|signer| signer.pubkey())
        .collect();
    let instruction = governance_instruction::execute(
        &executor.pubkey(),
        &state.group,
        proposal,
        &authority,
        &state.instructions,
        &extra_keys,
    );
    let signature = context.send(&[instruction], executor, additional_signers)?;
    info!("proposal {proposal} executed in {signature}");
    Ok(signature)
}

fn propose_config_change<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    instruction: Instruction,
) -> Result<Pubkey> {
    create_and_activate_proposal(context, creator, group, GROUP_AUTHORITY_INDEX, &[instruction])
}

/// An active proposal that adds `member` once executed.
pub fn propose_add_member<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    member: &Pubkey,
) -> Result<Pubkey> {
    propose_config_change(
        context,
        creator,
        group,
        governance_instruction::add_member(group, member),
    )
}

/// An active proposal that removes `member` once executed, lowering the
/// threshold if it would exceed the remaining member count.
pub fn propose_remove_member<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    member: &Pubkey,
) -> Result<Pubkey> {
    propose_config_change(
        context,
        creator,
        group,
        governance_instruction::remove_member(group, member),
    )
}

pub fn propose_change_threshold<L: Ledger>(
    context: &Context<L>,
    creator: &Keypair,
    group: &Pubkey,
    threshold: u16,
) -> Result<Pubkey> {
    propose_config_change(
        context,
        creator,
        group,
        governance_instruction::change_threshold(group, threshold),
    )
}
