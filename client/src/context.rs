use {
    crate::{
        config::ClientConfig,
        error::{ClientError, Result},
        ledger::Ledger,
    },
    log::*,
    solana_account::Account,
    solana_commitment_config::CommitmentLevel,
    solana_instruction::Instruction,
    solana_keypair::Keypair,
    solana_message::Message,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_signer::Signer,
    solana_transaction::Transaction,
};

/// A ledger handle plus configuration, passed to every client operation.
#[derive(Debug, Clone)]
pub struct Context<L> {
    pub ledger: L,
    pub config: ClientConfig,
}

impl<L: Ledger> Context<L> {
    pub fn new(ledger: L, config: ClientConfig) -> Self {
        Self { ledger, config }
    }

    /// Sign `instructions` with `payer` and `signers` against the latest
    /// blockhash, then submit at the configured commitment.
    pub fn send(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature> {
        self.send_with_commitment(instructions, payer, signers, self.config.commitment)
    }

    pub fn send_with_commitment(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
        commitment: CommitmentLevel,
    ) -> Result<Signature> {
        let blockhash = self.ledger.get_latest_blockhash()?;
        let message = Message::new(instructions, Some(&payer.pubkey()));
        let mut keypairs = vec![payer];
        keypairs.extend_from_slice(signers);
        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(keypairs.as_slice(), blockhash)?;
        let signature = self.ledger.send_transaction(&tx, commitment)?;
        trace!("sent {signature} with {} instructions", instructions.len());
        Ok(signature)
    }

    /// The account at the configured commitment, which must exist.
    pub fn get_account(&self, pubkey: &Pubkey) -> Result<Account> {
        self.ledger
            .get_account(pubkey, self.config.commitment)?
            .ok_or(ClientError::AccountNotFound(*pubkey))
    }

    /// The account at the configured commitment, if it exists.
    pub fn find_account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        self.ledger.get_account(pubkey, self.config.commitment)
    }

    pub fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.ledger.get_balance(pubkey, self.config.commitment)
    }
}
