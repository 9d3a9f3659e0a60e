//! Offline cosigning.
//!
//! A transaction is built once against a [`NonceToken`], then travels
//! between signers as a base58 string. Each signer decodes it, adds their
//! signature and encodes it again. Signatures already present stay valid
//! because the message never changes after [`OfflineCosigningPipeline::begin`].

use {
    crate::{
        context::Context,
        error::{ClientError, Result},
        ledger::Ledger,
        nonce::{NonceCoordinator, NonceToken},
    },
    log::*,
    solana_hash::Hash,
    solana_instruction::Instruction,
    solana_message::Message,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_signer::Signer,
    solana_system_interface::instruction as system_instruction,
    solana_transaction::Transaction,
};

/// A nonce-bound transaction with some, possibly all, of its signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartiallySignedTransaction {
    transaction: Transaction,
}

impl PartiallySignedTransaction {
    fn required_signer_count(&self) -> usize {
        usize::from(self.transaction.message.header.num_required_signatures)
    }

    /// Keys that must sign, in signature-slot order. Fixed when the
    /// transaction was begun.
    pub fn required_signers(&self) -> &[Pubkey] {
        let keys = &self.transaction.message.account_keys;
        &keys[..self.required_signer_count().min(keys.len())]
    }

    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.required_signers()
            .iter()
            .zip(&self.transaction.signatures)
            .filter(|(_, signature)| **signature == Signature::default())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_signers().is_empty()
    }

    /// The nonce value the transaction was built against.
    pub fn nonce_value(&self) -> Hash {
        self.transaction.message.recent_blockhash
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Add `signer`'s signature at their slot. Signing twice with the same
    /// key replaces the signature with an identical one.
    pub fn sign(mut self, signer: &dyn Signer) -> Result<Self> {
        let pubkey = signer.try_pubkey()?;
        let position = self
            .required_signers()
            .iter()
            .position(|key| *key == pubkey)
            .ok_or(ClientError::NotARequiredSigner(pubkey))?;
        let signature = signer.try_sign_message(&self.transaction.message_data())?;
        self.transaction.signatures[position] = signature;
        trace!(
            "{pubkey} signed slot {position}, {} signatures missing",
            self.missing_signers().len()
        );
        Ok(self)
    }

    /// Base58 over the bincode wire form.
    pub fn encode(&self) -> Result<String> {
        let bytes = bincode::serialize(&self.transaction)
            .map_err(|err| ClientError::Encoding(err.to_string()))?;
        Ok(bs58::encode(bytes).into_string())
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|err| ClientError::Encoding(err.to_string()))?;
        let transaction: Transaction = bincode::deserialize(&bytes)
            .map_err(|err| ClientError::Encoding(err.to_string()))?;
        let partial = Self { transaction };
        if partial.transaction.signatures.len() != partial.required_signer_count()
            || partial.required_signers().len() != partial.required_signer_count()
        {
            return Err(ClientError::Encoding(
                "signature count does not match the message header".to_string(),
            ));
        }
        Ok(partial)
    }
}

pub struct OfflineCosigningPipeline<'a, L> {
    context: &'a Context<L>,
}

impl<'a, L: Ledger> OfflineCosigningPipeline<'a, L> {
    pub fn new(context: &'a Context<L>) -> Self {
        Self { context }
    }

    /// Build an unsigned transaction that advances `token` and then runs
    /// `instructions`, using the token's current value as its blockhash.
    pub fn begin(
        &self,
        fee_payer: &Pubkey,
        token: &NonceToken,
        instructions: &[Instruction],
    ) -> Result<PartiallySignedTransaction> {
        let nonce_value = NonceCoordinator::new(self.context)
            .current_value(&token.address, self.context.config.nonce_commitment)?;
        let mut all = Vec::with_capacity(instructions.len().saturating_add(1));
        all.push(system_instruction::advance_nonce_account(
            &token.address,
            &token.authority,
        ));
        all.extend_from_slice(instructions);
        let message = Message::new_with_blockhash(&all, Some(fee_payer), &nonce_value);
        let partial = PartiallySignedTransaction {
            transaction: Transaction::new_unsigned(message),
        };
        debug!(
            "cosigning begun against nonce {} ({nonce_value}), signers: {:?}",
            token.address,
            partial.required_signers()
        );
        Ok(partial)
    }

    /// Submit a fully signed transaction.
    ///
    /// Fails with [`ClientError::StaleAuthorization`] once the nonce value
    /// has been consumed; the signatures collected so far are then useless
    /// and signing restarts from [`Self::begin`]. Waits for
    /// [`ClientConfig::nonce_submit_commitment`](crate::ClientConfig::nonce_submit_commitment)
    /// so that restart reads the advanced value.
    pub fn submit(&self, partial: &PartiallySignedTransaction) -> Result<Signature> {
        let missing = partial.missing_signers();
        if !missing.is_empty() {
            return Err(ClientError::IncompleteSignatureSet { missing });
        }
        self.context
            .ledger
            .send_transaction(
                partial.transaction(),
                self.context.config.nonce_submit_commitment(),
            )
    }
}
