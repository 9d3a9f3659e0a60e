//! The swap instruction and the offline swap scenario.
//!
//! A swap needs three signatures: the fee payer, the asset-A sender whose
//! tokens are burned, and the counterparty whose key completes asset B's
//! mint multisig. [`swap_with_offline_cosigning`] collects them one at a
//! time over the transport encoding, the way separate parties would.

use {
    crate::{
        context::Context,
        cosign::{OfflineCosigningPipeline, PartiallySignedTransaction},
        error::Result,
        ledger::Ledger,
        nonce::{NonceCoordinator, NonceToken},
        token::{get_mint_info, get_or_create_holding_account, ui_amount_to_base_units},
    },
    log::*,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_signer::Signer,
};
pub use swapgate_swap_program::{
    find_mint_authority_address,
    instruction::{swap as swap_instruction, SwapAccounts},
};

/// The parties of a swap and the assets they exchange.
#[derive(Debug, Clone, Copy)]
pub struct SwapParties<'a> {
    pub fee_payer: &'a Keypair,
    pub sender: &'a Keypair,
    pub counterparty: &'a Keypair,
    pub receiver: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    /// Asset B's mint authority: a token multisig listing the counterparty
    /// and this program's mint authority address.
    pub mint_b_authority: Pubkey,
}

impl SwapParties<'_> {
    pub fn accounts(&self) -> SwapAccounts {
        SwapAccounts {
            fee_payer: self.fee_payer.pubkey(),
            mint_a: self.mint_a,
            mint_b: self.mint_b,
            sender: self.sender.pubkey(),
            receiver: self.receiver,
            mint_b_authority: self.mint_b_authority,
            counterparty: self.counterparty.pubkey(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub signature: Signature,
    /// Base units burned of A and minted of B.
    pub amount: u64,
    /// Lamports returned to the fee payer from the nonce token.
    pub reclaimed: u64,
}

/// Begin a nonce-bound swap transaction, unsigned.
pub fn begin_swap<L: Ledger>(
    context: &Context<L>,
    token: &NonceToken,
    accounts: &SwapAccounts,
    amount: u64,
) -> Result<PartiallySignedTransaction> {
    OfflineCosigningPipeline::new(context).begin(
        &accounts.fee_payer,
        token,
        &[swap_instruction(accounts, amount)],
    )
}

/// Swap `ui_amount` (in asset B's decimals) of A for B.
///
/// Holding accounts are created as needed. A fresh nonce token, with the
/// fee payer as its authority, carries the transaction between signers and
/// is reclaimed afterwards, whether or not the swap succeeded.
pub fn swap_with_offline_cosigning<L: Ledger>(
    context: &Context<L>,
    parties: &SwapParties<'_>,
    ui_amount: &str,
) -> Result<SwapReceipt> {
    let mint_b = get_mint_info(context, &parties.mint_b)?;
    let amount = ui_amount_to_base_units(ui_amount, mint_b.decimals)?;
    let fee_payer = parties.fee_payer;
    get_or_create_holding_account(context, fee_payer, &parties.mint_a, &parties.sender.pubkey())?;
    get_or_create_holding_account(context, fee_payer, &parties.mint_b, &parties.receiver)?;

    let coordinator = NonceCoordinator::new(context);
    let token = coordinator.create_token(fee_payer, &fee_payer.pubkey())?;
    let signature = match cosign_and_submit(context, parties, &token, amount) {
        Ok(signature) => signature,
        Err(err) => {
            // The swap's error is the one reported.
            if let Err(reclaim_err) =
                coordinator.reclaim(&token.address, fee_payer, &fee_payer.pubkey())
            {
                warn!("nonce token {} not reclaimed: {reclaim_err}", token.address);
            }
            return Err(err);
        }
    };
    let reclaimed = coordinator.reclaim(&token.address, fee_payer, &fee_payer.pubkey())?;
    info!(
        "swapped {amount} of {} for {} in {signature}",
        parties.mint_a, parties.mint_b
    );
    Ok(SwapReceipt {
        signature,
        amount,
        reclaimed,
    })
}

fn cosign_and_submit<L: Ledger>(
    context: &Context<L>,
    parties: &SwapParties<'_>,
    token: &NonceToken,
    amount: u64,
) -> Result<Signature> {
    let mut encoded = begin_swap(context, token, &parties.accounts(), amount)?
        .sign(parties.fee_payer)?
        .encode()?;
    for signer in [parties.counterparty, parties.sender] {
        encoded = PartiallySignedTransaction::decode(&encoded)?
            .sign(signer)?
            .encode()?;
        trace!("{} cosigned the swap", signer.pubkey());
    }
    OfflineCosigningPipeline::new(context).submit(&PartiallySignedTransaction::decode(&encoded)?)
}
