//! E2E Test: Swap Lifecycle
//!
//! Verifies the swap of asset A for asset B:
//! - Offline cosigning by fee payer, counterparty and sender
//! - Burn of A and mint of B commit together, exactly once
//! - Every validation failure leaves balances and supplies untouched
//! - A counterparty outside the mint multisig cannot complete the quorum
//! - The full scenario with UI amounts and nonce reclamation

use {
    assert_matches::assert_matches,
    solana_keypair::Keypair,
    solana_signer::Signer,
    solana_transaction_error::TransactionError,
    swapgate_client::{
        cosign::OfflineCosigningPipeline,
        nonce::{NonceCoordinator, NONCE_ACCOUNT_SPACE},
        swap::{begin_swap, swap_instruction, swap_with_offline_cosigning, SwapAccounts},
        token, ClientError, ErrorKind, Ledger,
    },
    swapgate_e2e_tests::helpers::*,
    swapgate_swap_program::error::SwapError,
    swapgate_token_program::error::TokenError,
};

/// Balances and supplies the failure cases compare before and after.
fn snapshot(env: &TestEnv, fixture: &SwapFixture) -> [u64; 4] {
    [
        env.token_balance(&fixture.sender.pubkey(), &fixture.mint_a),
        env.token_balance(&fixture.receiver, &fixture.mint_b),
        env.supply(&fixture.mint_a),
        env.supply(&fixture.mint_b),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Cosigned swap burns A and mints B, reported once
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cosigned_swap() {
    init_logging();
    println!("\n========================================");
    println!("  SWAP: Cosigned swap of 10");
    println!("========================================\n");

    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 100);
    assert_eq!(snapshot(&env, &fixture), [100, 0, 100, 0]);
    println!("✓ Sender holds 100 of A, receiver holds 0 of B");

    let token = NonceCoordinator::new(&env.context)
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let partial = begin_swap(&env.context, &token, &fixture.accounts(&env), 10).unwrap();
    assert_eq!(partial.missing_signers().len(), 3);
    println!("✓ Swap begun against nonce {}", partial.nonce_value());

    let partial = partial
        .sign(&fixture.sender)
        .unwrap()
        .sign(&fixture.counterparty)
        .unwrap()
        .sign(&env.payer)
        .unwrap();
    let pipeline = OfflineCosigningPipeline::new(&env.context);
    pipeline.submit(&partial).unwrap();
    assert_eq!(snapshot(&env, &fixture), [90, 10, 90, 10]);
    println!("✓ Sender holds 90 of A, receiver holds 10 of B");

    assert_matches!(
        pipeline.submit(&partial),
        Err(ClientError::Transaction(TransactionError::AlreadyProcessed))
    );
    assert_eq!(snapshot(&env, &fixture), [90, 10, 90, 10]);
    println!("✓ Resubmission reported as already processed");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Validation failures, in check order
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_validation_failures_change_nothing() {
    init_logging();
    println!("\n========================================");
    println!("  SWAP: Validation failures");
    println!("========================================\n");

    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 100);
    let before = snapshot(&env, &fixture);
    let signers = [&fixture.sender, &fixture.counterparty];
    let send = |accounts: &SwapAccounts, amount: u64| {
        env.context
            .send(&[swap_instruction(accounts, amount)], &env.payer, &signers)
    };

    // Asset A on both sides.
    let mut accounts = fixture.accounts(&env);
    accounts.mint_b = fixture.mint_a;
    token::get_or_create_holding_account(&env.context, &env.payer, &fixture.mint_a, &fixture.receiver)
        .unwrap();
    let error = send(&accounts, 10).unwrap_err();
    assert_matches!(error, ClientError::Swap(SwapError::RepeatedMint));
    assert_eq!(error.kind(), ErrorKind::Validation);
    println!("✓ Same asset on both sides: {error}");

    // Asset A with 4 decimals against asset B with 6.
    let coarse_mint = token::create_mint(
        &env.context,
        &env.payer,
        &fixture.mint_a_authority.pubkey(),
        None,
        Some(4),
    )
    .unwrap();
    let coarse_holding = token::get_or_create_holding_account(
        &env.context,
        &env.payer,
        &coarse_mint,
        &fixture.sender.pubkey(),
    )
    .unwrap();
    token::mint_to(
        &env.context,
        &env.payer,
        &coarse_mint,
        &coarse_holding,
        &fixture.mint_a_authority,
        100,
    )
    .unwrap();
    let mut accounts = fixture.accounts(&env);
    accounts.mint_a = coarse_mint;
    assert_matches!(
        send(&accounts, 10),
        Err(ClientError::Swap(SwapError::NotEqualDecimals))
    );
    assert_eq!(env.token_balance(&fixture.sender.pubkey(), &coarse_mint), 100);
    println!("✓ 4 decimals against 6 rejected");

    let accounts = fixture.accounts(&env);
    assert_matches!(
        send(&accounts, 0),
        Err(ClientError::Swap(SwapError::ZeroSwapAmount))
    );
    println!("✓ Zero amount rejected");

    assert_matches!(
        send(&accounts, 101),
        Err(ClientError::Swap(SwapError::NotEnoughTokens))
    );
    println!("✓ Amount above balance rejected");

    assert_eq!(snapshot(&env, &fixture), before);
    println!("✓ Balances and supplies unchanged");
}

#[test]
fn test_small_balance_not_enough() {
    init_logging();
    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 1);
    let result = env.context.send(
        &[swap_instruction(&fixture.accounts(&env), 10)],
        &env.payer,
        &[&fixture.sender, &fixture.counterparty],
    );
    assert_matches!(result, Err(ClientError::Swap(SwapError::NotEnoughTokens)));
    assert_eq!(snapshot(&env, &fixture), [1, 0, 1, 0]);
    println!("✓ Balance 1, amount 10: not enough tokens");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Counterparty outside the multisig
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_outside_counterparty_misses_quorum() {
    init_logging();
    println!("\n========================================");
    println!("  SWAP: Counterparty outside the multisig");
    println!("========================================\n");

    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 100);
    let outsider = Keypair::new();
    let mut accounts = fixture.accounts(&env);
    accounts.counterparty = outsider.pubkey();

    let error = env
        .context
        .send(
            &[swap_instruction(&accounts, 10)],
            &env.payer,
            &[&fixture.sender, &outsider],
        )
        .unwrap_err();
    assert_matches!(error, ClientError::Token(TokenError::QuorumNotMet));
    assert_eq!(error.kind(), ErrorKind::Quorum);
    println!("✓ Mint of B failed: {error}");

    assert_eq!(snapshot(&env, &fixture), [100, 0, 100, 0]);
    println!("✓ Burn of A rolled back with it");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Full scenario with UI amounts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_offline_swap_scenario() {
    init_logging();
    println!("\n========================================");
    println!("  SWAP: Offline scenario, 0.01 of A for B");
    println!("========================================\n");

    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 100_000_000);
    let lamports_before = env.lamports(&env.payer.pubkey());

    let receipt = swap_with_offline_cosigning(&env.context, &fixture.parties(&env), "0.01").unwrap();
    assert_eq!(receipt.amount, 10_000);
    println!("✓ Swapped {} base units in {}", receipt.amount, receipt.signature);

    assert_eq!(
        snapshot(&env, &fixture),
        [99_990_000, 10_000, 99_990_000, 10_000]
    );
    println!("✓ Balances moved by 0.01");

    assert!(receipt.reclaimed > 0);
    // The nonce deposit came back; only fees were spent.
    let spent = lamports_before.saturating_sub(env.lamports(&env.payer.pubkey()));
    assert!(spent < receipt.reclaimed, "spent {spent}");
    println!("✓ Nonce deposit of {} reclaimed, {spent} spent on fees", receipt.reclaimed);
}

#[test]
fn test_failed_offline_swap_reclaims_nonce() {
    init_logging();
    let env = TestEnv::new();
    let fixture = SwapFixture::new(&env, 1);
    let lamports_before = env.lamports(&env.payer.pubkey());
    let deposit = env
        .context
        .ledger
        .get_minimum_balance_for_rent_exemption(NONCE_ACCOUNT_SPACE)
        .unwrap();

    assert_matches!(
        swap_with_offline_cosigning(&env.context, &fixture.parties(&env), "0.01"),
        Err(ClientError::Swap(SwapError::NotEnoughTokens))
    );
    assert_eq!(snapshot(&env, &fixture), [1, 0, 1, 0]);
    println!("✓ Balance 1, amount 0.01: not enough tokens");

    let spent = lamports_before.saturating_sub(env.lamports(&env.payer.pubkey()));
    assert!(spent < deposit, "spent {spent}");
    println!("✓ Nonce deposit of {deposit} reclaimed, {spent} spent on fees");
}
