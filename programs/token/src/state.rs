//! Account state types for the Token program.
//!
//! Every account starts with a discriminator byte followed by the Borsh
//! payload. Zeroed data (a freshly allocated account) is uninitialized.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_pubkey::Pubkey,
    std::io,
};

pub const MINT_DISCRIMINATOR: u8 = 1;
pub const HOLDING_ACCOUNT_DISCRIMINATOR: u8 = 2;
pub const MULTISIG_DISCRIMINATOR: u8 = 3;

/// Most signers a [`Multisig`] may list.
pub const MAX_SIGNERS: usize = 11;
/// Fewest signers a [`Multisig`] may list.
pub const MIN_SIGNERS: usize = 1;

/// Discriminated Borsh encoding shared by all token account types.
pub trait TokenState: BorshSerialize + BorshDeserialize {
    const DISCRIMINATOR: u8;
    /// Account space to allocate. At least as large as the longest encoding.
    const LEN: usize;

    /// Whether `data` carries this type's discriminator.
    fn is_of_type(data: &[u8]) -> bool {
        data.first() == Some(&Self::DISCRIMINATOR)
    }

    fn unpack(data: &[u8]) -> Result<Self, io::Error> {
        if !Self::is_of_type(data) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "missing or invalid token account discriminator",
            ));
        }
        let mut cursor = &data[1..];
        BorshDeserialize::deserialize_reader(&mut cursor)
    }

    fn pack_into(&self, data: &mut [u8]) -> Result<(), io::Error> {
        if data.len() < Self::LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "account data buffer too small",
            ));
        }
        data[0] = Self::DISCRIMINATOR;
        let mut cursor = &mut data[1..];
        BorshSerialize::serialize(self, &mut cursor)
    }
}

/// An asset: its supply, precision and authorities.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Mint {
    /// Key allowed to mint. `None` fixes the supply forever.
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    /// Immutable after initialization.
    pub decimals: u8,
    pub freeze_authority: Option<Pubkey>,
}

impl TokenState for Mint {
    const DISCRIMINATOR: u8 = MINT_DISCRIMINATOR;
    /// discriminator (1) + authority option (33) + supply (8) + decimals (1)
    /// + freeze option (33), padded to the customary 82 bytes.
    const LEN: usize = 82;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AccountState {
    Initialized,
    Frozen,
}

/// One owner's balance of one mint.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct HoldingAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub state: AccountState,
}

impl HoldingAccount {
    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }
}

impl TokenState for HoldingAccount {
    const DISCRIMINATOR: u8 = HOLDING_ACCOUNT_DISCRIMINATOR;
    const LEN: usize = 165;
}

/// M-of-N authority.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Multisig {
    /// Number of signers required.
    pub m: u8,
    pub signers: Vec<Pubkey>,
}

impl Multisig {
    /// Number of distinct listed signers among `signed`.
    pub fn count_signers(&self, signed: &[Pubkey]) -> usize {
        self.signers
            .iter()
            .enumerate()
            .filter(|(position, signer)| {
                // Listing the same key twice does not make it count twice.
                !self.signers[..*position].contains(signer) && signed.contains(signer)
            })
            .count()
    }
}

impl TokenState for Multisig {
    const DISCRIMINATOR: u8 = MULTISIG_DISCRIMINATOR;
    /// discriminator (1) + m (1) + vec length (4) + MAX_SIGNERS keys.
    const LEN: usize = 1 + 1 + 4 + 32 * MAX_SIGNERS;
}
