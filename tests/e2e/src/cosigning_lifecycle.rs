//! E2E Test: Cosigning Lifecycle
//!
//! Verifies nonce-bound transactions signed by several parties:
//! - A consumed nonce value invalidates every other transaction built on it
//! - Concurrent submissions against one value commit exactly once
//! - Submission refuses incomplete signature sets and names the missing keys
//! - A failed transaction consumes its nonce value too
//! - Nonce tokens are reclaimed by their authority only, in full

use {
    assert_matches::assert_matches,
    solana_instruction::Instruction,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    solana_system_interface::{error::SystemError, instruction as system_instruction},
    solana_transaction_error::TransactionError,
    swapgate_client::{
        cosign::{OfflineCosigningPipeline, PartiallySignedTransaction},
        nonce::{NonceCoordinator, NonceToken},
        ClientError, Context, ErrorKind, LocalLedger,
    },
    swapgate_e2e_tests::helpers::*,
};

const TRANSFER_AMOUNT: u64 = 1_000_000;

fn transfer(env: &TestEnv, to: &Pubkey) -> Instruction {
    system_instruction::transfer(&env.payer.pubkey(), to, TRANSFER_AMOUNT)
}

/// A transaction paying `to`, fully signed by the fee payer.
fn signed_transfer(
    env: &TestEnv,
    context: &Context<LocalLedger>,
    token: &NonceToken,
    to: &Pubkey,
) -> PartiallySignedTransaction {
    OfflineCosigningPipeline::new(context)
        .begin(&env.payer.pubkey(), token, &[transfer(env, to)])
        .unwrap()
        .sign(&env.payer)
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Consumed nonce values
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_consumed_nonce_value_is_stale() {
    init_logging();
    println!("\n========================================");
    println!("  COSIGNING: Consumed nonce value");
    println!("========================================\n");

    let env = TestEnv::new();
    let token = NonceCoordinator::new(&env.context)
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let first_recipient = Keypair::new().pubkey();
    let second_recipient = Keypair::new().pubkey();

    // Two parties build on the same value independently.
    let other_context = env.other_context();
    let first = signed_transfer(&env, &env.context, &token, &first_recipient);
    let second = signed_transfer(&env, &other_context, &token, &second_recipient);
    let value = first.nonce_value();
    assert_eq!(second.nonce_value(), value);
    println!("✓ Both transactions bound to nonce value {value}");

    OfflineCosigningPipeline::new(&env.context)
        .submit(&first)
        .unwrap();
    assert_eq!(env.lamports(&first_recipient), TRANSFER_AMOUNT);
    println!("✓ First submission committed");

    let error = OfflineCosigningPipeline::new(&other_context)
        .submit(&second)
        .unwrap_err();
    assert_matches!(error, ClientError::StaleAuthorization { nonce } if nonce == value);
    assert_eq!(error.kind(), ErrorKind::Concurrency);
    assert_eq!(env.lamports(&second_recipient), 0);
    println!("✓ Second submission stale: {error}");

    // Signing restarts against the advanced value.
    let retry = signed_transfer(&env, &other_context, &token, &second_recipient);
    assert_ne!(retry.nonce_value(), value);
    OfflineCosigningPipeline::new(&other_context)
        .submit(&retry)
        .unwrap();
    assert_eq!(env.lamports(&second_recipient), TRANSFER_AMOUNT);
    println!("✓ Restarted transaction committed");
}

#[test]
fn test_concurrent_submissions_commit_once() {
    init_logging();
    println!("\n========================================");
    println!("  COSIGNING: Concurrent submissions");
    println!("========================================\n");

    let env = TestEnv::new();
    let token = NonceCoordinator::new(&env.context)
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let recipients: Vec<Pubkey> = (0..4).map(|_| Keypair::new().pubkey()).collect();
    let contexts: Vec<Context<LocalLedger>> =
        recipients.iter().map(|_| env.other_context()).collect();
    let partials: Vec<PartiallySignedTransaction> = recipients
        .iter()
        .zip(&contexts)
        .map(|(recipient, context)| signed_transfer(&env, context, &token, recipient))
        .collect();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = contexts
            .iter()
            .zip(&partials)
            .map(|(context, partial)| {
                scope.spawn(move || OfflineCosigningPipeline::new(context).submit(partial))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for error in results.iter().filter_map(|result| result.as_ref().err()) {
        assert_matches!(error, ClientError::StaleAuthorization { .. });
    }
    let paid: Vec<u64> = recipients
        .iter()
        .map(|recipient| env.lamports(recipient))
        .filter(|lamports| *lamports > 0)
        .collect();
    assert_eq!(paid, vec![TRANSFER_AMOUNT]);
    println!("✓ {} submissions, one commit", results.len());
}

#[test]
fn test_failed_transaction_consumes_nonce_value() {
    init_logging();
    println!("\n========================================");
    println!("  COSIGNING: Failed transaction");
    println!("========================================\n");

    let env = TestEnv::new();
    let coordinator = NonceCoordinator::new(&env.context);
    let token = coordinator
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let cosigner = Keypair::new();
    env.ledger.airdrop(&cosigner.pubkey(), TRANSFER_AMOUNT).unwrap();
    let recipient = Keypair::new().pubkey();
    let pipeline = OfflineCosigningPipeline::new(&env.context);

    // The cosigner cannot cover the transfer.
    let overdraw = system_instruction::transfer(
        &cosigner.pubkey(),
        &recipient,
        TRANSFER_AMOUNT.saturating_add(1),
    );
    let failing = pipeline
        .begin(&env.payer.pubkey(), &token, &[overdraw])
        .unwrap()
        .sign(&env.payer)
        .unwrap()
        .sign(&cosigner)
        .unwrap();
    let other = signed_transfer(&env, &env.context, &token, &recipient);
    let value = failing.nonce_value();

    assert_matches!(
        pipeline.submit(&failing),
        Err(ClientError::System(SystemError::ResultWithNegativeLamports))
    );
    let advanced = coordinator
        .current_value(&token.address, env.context.config.nonce_commitment)
        .unwrap();
    assert_ne!(advanced, value);
    assert_eq!(env.lamports(&cosigner.pubkey()), TRANSFER_AMOUNT);
    println!("✓ Transfer failed, nonce advanced to {advanced}");

    assert_matches!(
        pipeline.submit(&failing),
        Err(ClientError::Transaction(TransactionError::AlreadyProcessed))
    );
    assert_matches!(
        pipeline.submit(&other),
        Err(ClientError::StaleAuthorization { nonce }) if nonce == value
    );
    assert_eq!(env.lamports(&recipient), 0);
    println!("✓ Neither the failed transaction nor its sibling can commit");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Incomplete signature sets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_incomplete_signature_set() {
    init_logging();
    let env = TestEnv::new();
    let token = NonceCoordinator::new(&env.context)
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let cosigner = env.funded_keypair();
    let recipient = Keypair::new().pubkey();
    let pipeline = OfflineCosigningPipeline::new(&env.context);

    let instruction = system_instruction::transfer(&cosigner.pubkey(), &recipient, TRANSFER_AMOUNT);
    let partial = pipeline
        .begin(&env.payer.pubkey(), &token, &[instruction])
        .unwrap()
        .sign(&env.payer)
        .unwrap();
    let error = pipeline.submit(&partial).unwrap_err();
    assert_matches!(
        &error,
        ClientError::IncompleteSignatureSet { missing } if missing == &[cosigner.pubkey()]
    );
    assert!(error.to_string().contains(&cosigner.pubkey().to_string()));
    assert_eq!(error.kind(), ErrorKind::Quorum);
    println!("✓ Refused: {error}");

    // Carried over the transport encoding, the set completes.
    let encoded = partial.encode().unwrap();
    let partial = PartiallySignedTransaction::decode(&encoded)
        .unwrap()
        .sign(&cosigner)
        .unwrap();
    assert!(partial.is_complete());
    pipeline.submit(&partial).unwrap();
    assert_eq!(env.lamports(&recipient), TRANSFER_AMOUNT);
    println!("✓ Completed after a decode and cosign");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test: Nonce token reclamation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reclaim_and_authority() {
    init_logging();
    println!("\n========================================");
    println!("  COSIGNING: Reclaiming nonce tokens");
    println!("========================================\n");

    let env = TestEnv::new();
    let coordinator = NonceCoordinator::new(&env.context);
    let token = coordinator
        .create_token(&env.payer, &env.payer.pubkey())
        .unwrap();
    let deposit = env.lamports(&token.address);

    let partial = signed_transfer(&env, &env.context, &token, &Keypair::new().pubkey());
    OfflineCosigningPipeline::new(&env.context)
        .submit(&partial)
        .unwrap();
    println!("✓ Token consumed by one transaction");

    let stranger = env.funded_keypair();
    let error = coordinator
        .reclaim(&token.address, &stranger, &stranger.pubkey())
        .unwrap_err();
    assert_matches!(error, ClientError::Unauthorized { signer, .. } if signer == stranger.pubkey());
    assert_eq!(error.kind(), ErrorKind::Resource);
    assert_eq!(env.lamports(&token.address), deposit);
    println!("✓ Stranger refused: {error}");

    let successor = env.funded_keypair();
    coordinator
        .authorize(&token.address, &env.payer, &successor.pubkey())
        .unwrap();
    assert_matches!(
        coordinator.reclaim(&token.address, &env.payer, &env.payer.pubkey()),
        Err(ClientError::Unauthorized { .. })
    );
    println!("✓ Authority handed to {}", successor.pubkey());

    let destination = Keypair::new().pubkey();
    let reclaimed = coordinator
        .reclaim(&token.address, &successor, &destination)
        .unwrap();
    assert_eq!(reclaimed, deposit);
    assert_eq!(env.lamports(&destination), deposit);
    assert_eq!(env.lamports(&token.address), 0);
    println!("✓ Successor reclaimed {reclaimed} lamports");
}

#[test]
fn test_token_needs_funds() {
    init_logging();
    let env = TestEnv::new();
    let poor = Keypair::new();
    env.ledger.airdrop(&poor.pubkey(), 1_000).unwrap();
    let error = NonceCoordinator::new(&env.context)
        .create_token(&poor, &poor.pubkey())
        .unwrap_err();
    assert_matches!(error, ClientError::InsufficientFunds { available: 1_000, .. });
    assert_eq!(error.kind(), ErrorKind::Resource);
    println!("✓ Underfunded creation refused: {error}");
}
