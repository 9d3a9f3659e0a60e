//! Shared test utilities for SwapGate end-to-end tests.
//!
//! Provides a funded in-process ledger and the fixture the swap scenarios
//! share:
//! - Asset A, minted by a plain keypair
//! - Asset B, minted by a 2-of-3 token multisig of the counterparty, a
//!   third key and the swap program's mint authority address
//! - A sender holding asset A and a receiver with an empty asset-B account

use {
    solana_keypair::Keypair,
    solana_native_token::LAMPORTS_PER_SOL,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    swapgate_client::{
        swap::{find_mint_authority_address, SwapAccounts, SwapParties},
        token, ClientConfig, Context, LocalLedger,
    },
    swapgate_runtime::BankConfig,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Decimals of both swap assets.
pub const DECIMALS: u8 = 6;

/// Lamports given to every funded keypair.
pub const INITIAL_BALANCE: u64 = 10 * LAMPORTS_PER_SOL;

/// Signatures the asset-B multisig requires.
pub const MINT_B_QUORUM: u8 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Test environment
// ─────────────────────────────────────────────────────────────────────────────

/// A ledger, a client context over it, and a funded fee payer.
pub struct TestEnv {
    pub ledger: LocalLedger,
    pub context: Context<LocalLedger>,
    pub payer: Keypair,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let ledger = LocalLedger::new(BankConfig::default()).expect("bank config");
        let context = Context::new(ledger.clone(), config);
        let env = Self {
            ledger,
            context,
            payer: Keypair::new(),
        };
        env.fund(&env.payer.pubkey());
        env
    }

    /// A second context over the same ledger, as another party would hold.
    pub fn other_context(&self) -> Context<LocalLedger> {
        Context::new(self.ledger.clone(), self.context.config.clone())
    }

    pub fn fund(&self, pubkey: &Pubkey) {
        self.ledger
            .airdrop(pubkey, INITIAL_BALANCE)
            .expect("airdrop");
    }

    pub fn funded_keypair(&self) -> Keypair {
        let keypair = Keypair::new();
        self.fund(&keypair.pubkey());
        keypair
    }

    pub fn lamports(&self, pubkey: &Pubkey) -> u64 {
        self.context.get_balance(pubkey).expect("balance")
    }

    pub fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        token::holding_balance(&self.context, owner, mint).expect("holding balance")
    }

    pub fn supply(&self, mint: &Pubkey) -> u64 {
        token::get_mint_info(&self.context, mint)
            .expect("mint")
            .supply
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Swap fixture
// ─────────────────────────────────────────────────────────────────────────────

pub struct SwapFixture {
    pub mint_a: Pubkey,
    pub mint_a_authority: Keypair,
    pub mint_b: Pubkey,
    pub mint_b_multisig: Pubkey,
    pub sender: Keypair,
    pub counterparty: Keypair,
    pub receiver: Pubkey,
}

impl SwapFixture {
    /// Set up both assets and give the sender `sender_balance` base units of
    /// asset A.
    pub fn new(env: &TestEnv, sender_balance: u64) -> Self {
        let context = &env.context;
        let payer = &env.payer;
        let mint_a_authority = Keypair::new();
        let counterparty = env.funded_keypair();
        let (program_authority, _) = find_mint_authority_address();

        let mint_a = token::create_mint(
            context,
            payer,
            &mint_a_authority.pubkey(),
            None,
            Some(DECIMALS),
        )
        .expect("mint A");
        let mint_b_multisig = token::create_multisig(
            context,
            payer,
            &[
                counterparty.pubkey(),
                Keypair::new().pubkey(),
                program_authority,
            ],
            MINT_B_QUORUM,
        )
        .expect("multisig");
        let mint_b = token::create_mint(context, payer, &mint_b_multisig, None, Some(DECIMALS))
            .expect("mint B");

        let sender = env.funded_keypair();
        let receiver = Keypair::new().pubkey();
        let holding = token::get_or_create_holding_account(context, payer, &mint_a, &sender.pubkey())
            .expect("sender holding");
        token::get_or_create_holding_account(context, payer, &mint_b, &receiver)
            .expect("receiver holding");
        if sender_balance > 0 {
            token::mint_to(
                context,
                payer,
                &mint_a,
                &holding,
                &mint_a_authority,
                sender_balance,
            )
            .expect("fund sender");
        }

        Self {
            mint_a,
            mint_a_authority,
            mint_b,
            mint_b_multisig,
            sender,
            counterparty,
            receiver,
        }
    }

    pub fn parties<'a>(&'a self, env: &'a TestEnv) -> SwapParties<'a> {
        SwapParties {
            fee_payer: &env.payer,
            sender: &self.sender,
            counterparty: &self.counterparty,
            receiver: self.receiver,
            mint_a: self.mint_a,
            mint_b: self.mint_b,
            mint_b_authority: self.mint_b_multisig,
        }
    }

    pub fn accounts(&self, env: &TestEnv) -> SwapAccounts {
        self.parties(env).accounts()
    }
}

/// Initialize env_logger once for test output.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
