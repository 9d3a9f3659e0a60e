//! E2E Test: Governance Lifecycle
//!
//! Verifies proposals against a group's vault:
//! - A mint whose authority is a 2-of-2 token multisig of the vault and an
//!   application wallet, minted through an approved proposal
//! - Rejections that leave the threshold reachable keep a proposal active
//! - Executed proposals cannot run twice
//! - Rejected and cancelled proposals accept no further votes
//! - Membership changes go through proposals of their own

use {
    assert_matches::assert_matches,
    solana_instruction::error::InstructionError,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    swapgate_client::{governance, token, ClientError, ErrorKind},
    swapgate_e2e_tests::helpers::*,
    swapgate_governance_program::{
        constants::DEFAULT_VAULT_INDEX, error::GovernanceError, state::ProposalStatus,
    },
    swapgate_token_program::instruction as token_instruction,
};

const MINT_AMOUNT: u64 = 1_000 * 10u64.pow(DECIMALS as u32);

/// A 2-of-3 group with funded members.
fn create_group(env: &TestEnv) -> (Pubkey, Vec<Keypair>) {
    let members: Vec<Keypair> = (0..3).map(|_| env.funded_keypair()).collect();
    let group = governance::create_group(
        &env.context,
        &env.payer,
        members.iter().map(|member| member.pubkey()).collect(),
        2,
    )
    .unwrap();
    (group, members)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Mint through the vault and an application wallet
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_vault_mints_with_app_wallet() {
    init_logging();
    println!("\n========================================");
    println!("  GOVERNANCE: Vault-controlled mint");
    println!("========================================\n");

    let env = TestEnv::new();
    let (group, members) = create_group(&env);
    let vault = governance::authority_address(&group, DEFAULT_VAULT_INDEX);
    let app_wallet = Keypair::new();
    println!("✓ Group {group} created, vault {vault}");

    let multisig = token::create_multisig(
        &env.context,
        &env.payer,
        &[vault, app_wallet.pubkey()],
        2,
    )
    .unwrap();
    let mint = token::create_mint(&env.context, &env.payer, &multisig, None, Some(DECIMALS)).unwrap();
    let recipient = Keypair::new().pubkey();
    let holding =
        token::get_or_create_holding_account(&env.context, &env.payer, &mint, &recipient).unwrap();
    println!("✓ Mint {mint} under 2-of-2 multisig of vault and app wallet");

    let mint_to = token_instruction::mint_to(
        &mint,
        &holding,
        &multisig,
        &[&vault, &app_wallet.pubkey()],
        MINT_AMOUNT,
    );
    let proposal = governance::create_and_activate_proposal(
        &env.context,
        &members[0],
        &group,
        DEFAULT_VAULT_INDEX,
        &[mint_to],
    )
    .unwrap();
    println!("✓ Proposal {proposal} active");

    // ── Voting ──
    let status = governance::reject(&env.context, &members[1], &group, &proposal).unwrap();
    assert_eq!(status, ProposalStatus::Active);
    let status = governance::approve(&env.context, &members[0], &group, &proposal).unwrap();
    assert_eq!(status, ProposalStatus::Active);
    println!("✓ One rejection, one approval: still active");

    let status = governance::approve(&env.context, &members[2], &group, &proposal).unwrap();
    assert_eq!(status, ProposalStatus::ExecuteReady);
    println!("✓ Second approval: ready to execute");

    // ── Execution ──
    // The vault alone is half of the multisig.
    let error = governance::execute(&env.context, &members[0], &proposal, &[]).unwrap_err();
    assert_matches!(
        error,
        ClientError::Instruction {
            index: 0,
            error: InstructionError::PrivilegeEscalation,
        }
    );
    assert_eq!(error.kind(), ErrorKind::Quorum);
    assert_eq!(env.token_balance(&recipient, &mint), 0);
    println!("✓ Without the app wallet: {error}");

    governance::execute(&env.context, &members[0], &proposal, &[&app_wallet]).unwrap();
    assert_eq!(env.token_balance(&recipient, &mint), MINT_AMOUNT);
    assert_eq!(env.supply(&mint), MINT_AMOUNT);
    assert_eq!(
        governance::check_proposal_state(&env.context, &proposal)
            .unwrap()
            .status,
        ProposalStatus::Executed
    );
    println!("✓ Executed: {MINT_AMOUNT} minted");

    let error =
        governance::execute(&env.context, &members[1], &proposal, &[&app_wallet]).unwrap_err();
    assert_matches!(
        error,
        ClientError::Governance(GovernanceError::AlreadyExecuted)
    );
    assert_eq!(error.kind(), ErrorKind::Concurrency);
    assert_eq!(env.token_balance(&recipient, &mint), MINT_AMOUNT);
    println!("✓ Second execution refused: {error}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Rejected and cancelled proposals
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rejected_and_cancelled_proposals() {
    init_logging();
    println!("\n========================================");
    println!("  GOVERNANCE: Rejection and cancellation");
    println!("========================================\n");

    let env = TestEnv::new();
    let (group, members) = create_group(&env);
    let vault = governance::authority_address(&group, DEFAULT_VAULT_INDEX);
    let transfer =
        solana_system_interface::instruction::transfer(&vault, &env.payer.pubkey(), 1_000);

    let proposal = governance::create_and_activate_proposal(
        &env.context,
        &members[0],
        &group,
        DEFAULT_VAULT_INDEX,
        std::slice::from_ref(&transfer),
    )
    .unwrap();
    governance::reject(&env.context, &members[1], &group, &proposal).unwrap();
    let status = governance::reject(&env.context, &members[2], &group, &proposal).unwrap();
    assert_eq!(status, ProposalStatus::Rejected);
    assert_matches!(
        governance::approve(&env.context, &members[0], &group, &proposal),
        Err(ClientError::Governance(GovernanceError::InvalidTransactionState))
    );
    println!("✓ Two rejections of 2-of-3: rejected, closed to votes");

    let proposal = governance::create_and_activate_proposal(
        &env.context,
        &members[0],
        &group,
        DEFAULT_VAULT_INDEX,
        &[transfer],
    )
    .unwrap();
    assert_matches!(
        governance::cancel(&env.context, &members[1], &group, &proposal),
        Err(ClientError::Governance(GovernanceError::NotProposalCreator))
    );
    governance::cancel(&env.context, &members[0], &group, &proposal).unwrap();
    assert_eq!(
        governance::check_proposal_state(&env.context, &proposal)
            .unwrap()
            .status,
        ProposalStatus::Cancelled
    );
    assert_matches!(
        governance::approve(&env.context, &members[1], &group, &proposal),
        Err(ClientError::Governance(GovernanceError::InvalidTransactionState))
    );
    println!("✓ Only the creator cancels; cancelled proposals take no votes");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Membership changes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_membership_changes() {
    init_logging();
    println!("\n========================================");
    println!("  GOVERNANCE: Membership changes");
    println!("========================================\n");

    let env = TestEnv::new();
    let (group, members) = create_group(&env);
    let newcomer = env.funded_keypair();

    let proposal =
        governance::propose_add_member(&env.context, &members[0], &group, &newcomer.pubkey())
            .unwrap();
    governance::approve(&env.context, &members[0], &group, &proposal).unwrap();
    governance::approve(&env.context, &members[1], &group, &proposal).unwrap();
    governance::execute(&env.context, &members[2], &proposal, &[]).unwrap();
    let state = governance::check_group_state(&env.context, &group).unwrap();
    assert!(state.is_member(&newcomer.pubkey()));
    println!("✓ Newcomer added, {} members", state.members.len());

    // The newcomer votes on the next proposal.
    let proposal =
        governance::propose_remove_member(&env.context, &newcomer, &group, &members[2].pubkey())
            .unwrap();
    governance::approve(&env.context, &newcomer, &group, &proposal).unwrap();
    assert_eq!(
        governance::approve(&env.context, &members[0], &group, &proposal).unwrap(),
        ProposalStatus::ExecuteReady
    );
    governance::execute(&env.context, &newcomer, &proposal, &[]).unwrap();
    let state = governance::check_group_state(&env.context, &group).unwrap();
    assert!(!state.is_member(&members[2].pubkey()));
    assert_eq!(state.members.len(), 3);
    println!("✓ Member removed by a vote including the newcomer");

    assert_matches!(
        governance::propose_remove_member(&env.context, &members[2], &group, &members[0].pubkey()),
        Err(ClientError::Governance(GovernanceError::KeyNotInMultisig))
    );
    println!("✓ Removed member can no longer propose");
}
