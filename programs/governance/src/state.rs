//! Account state types for the Governance program.

use {
    crate::constants::{MAX_MEMBERS, PROPOSAL_ACCOUNT_SIZE},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
};

// ---------------------------------------------------------------------------
// Discriminator bytes
// ---------------------------------------------------------------------------

/// Discriminator for `Group` accounts.
pub const GROUP_DISCRIMINATOR: u8 = 1;

/// Discriminator for `Proposal` accounts.
pub const PROPOSAL_DISCRIMINATOR: u8 = 2;

fn read_with_discriminator<T: BorshDeserialize>(
    data: &[u8],
    discriminator: u8,
    what: &str,
) -> Result<T, std::io::Error> {
    match data.split_first() {
        Some((first, mut rest)) if *first == discriminator => {
            BorshDeserialize::deserialize_reader(&mut rest)
        }
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("missing or invalid {what} discriminator"),
        )),
    }
}

fn write_with_discriminator<T: BorshSerialize>(
    value: &T,
    data: &mut [u8],
    discriminator: u8,
    size: usize,
) -> Result<(), std::io::Error> {
    if data.len() < size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "account data buffer too small",
        ));
    }
    let Some((first, mut rest)) = data.split_first_mut() else {
        return Err(std::io::ErrorKind::InvalidInput.into());
    };
    *first = discriminator;
    BorshSerialize::serialize(value, &mut rest)
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A set of members and the number of them needed to approve a proposal.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Group {
    /// Approvals needed for a proposal to become executable.
    pub threshold: u16,

    /// Index of the most recently created proposal. Starts at 0.
    pub transaction_index: u32,

    /// `transaction_index` at the time of the last configuration change.
    /// Proposals at or below it are stale.
    pub config_change_index: u32,

    /// Key the group address was derived from.
    pub create_key: Pubkey,

    /// Bump seed of the group address.
    pub bump: u8,

    /// Members, kept sorted.
    pub members: Vec<Pubkey>,
}

impl Group {
    /// Allocated size: discriminator (1) + fields, with room for
    /// `MAX_MEMBERS` members.
    ///
    /// Layout:
    ///   discriminator        (1)
    ///   threshold            (2)
    ///   transaction_index    (4)
    ///   config_change_index  (4)
    ///   create_key           (32)
    ///   bump                 (1)
    ///   members              (4 + 32 × 16)
    ///   = 560 bytes
    pub const SERIALIZED_SIZE: usize = 1 + 2 + 4 + 4 + 32 + 1 + 4 + 32 * MAX_MEMBERS;

    /// Deserialise from raw account data (expects leading discriminator).
    pub fn deserialize(data: &[u8]) -> Result<Self, std::io::Error> {
        read_with_discriminator(data, GROUP_DISCRIMINATOR, "group")
    }

    /// Serialise into raw account data (prepends discriminator).
    pub fn serialize_into(&self, data: &mut [u8]) -> Result<(), std::io::Error> {
        write_with_discriminator(self, data, GROUP_DISCRIMINATOR, Self::SERIALIZED_SIZE)
    }

    pub fn is_member(&self, key: &Pubkey) -> bool {
        self.members.binary_search(key).is_ok()
    }

    /// Inserts `member` in sort order. Returns `false` if already present.
    pub fn add_member(&mut self, member: Pubkey) -> bool {
        match self.members.binary_search(&member) {
            Ok(_) => false,
            Err(position) => {
                self.members.insert(position, member);
                true
            }
        }
    }

    /// Returns `false` if `member` was not present.
    pub fn remove_member(&mut self, member: &Pubkey) -> bool {
        match self.members.binary_search(member) {
            Ok(position) => {
                self.members.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    /// Invalidate every proposal created so far.
    pub fn mark_config_change(&mut self) {
        self.config_change_index = self.transaction_index;
    }

    pub fn is_stale(&self, transaction_index: u32) -> bool {
        transaction_index <= self.config_change_index
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
pub enum ProposalStatus {
    /// Created; instructions may still be added.
    Draft = 0,
    /// Instructions frozen, voting open.
    Active = 1,
    /// Approval threshold reached.
    ExecuteReady = 2,
    /// Instructions ran successfully.
    Executed = 3,
    /// Approval became unreachable.
    Rejected = 4,
    /// Withdrawn by its creator.
    Cancelled = 5,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Executed | Self::Rejected | Self::Cancelled)
    }
}

/// An account reference of a stored instruction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct StoredAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction held by a proposal until execution.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct StoredInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<StoredAccountMeta>,
    pub data: Vec<u8>,
}

impl From<&Instruction> for StoredInstruction {
    fn from(instruction: &Instruction) -> Self {
        Self {
            program_id: instruction.program_id,
            accounts: instruction
                .accounts
                .iter()
                .map(|meta| StoredAccountMeta {
                    pubkey: meta.pubkey,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: instruction.data.clone(),
        }
    }
}

impl From<&StoredInstruction> for Instruction {
    fn from(stored: &StoredInstruction) -> Self {
        Instruction {
            program_id: stored.program_id,
            accounts: stored
                .accounts
                .iter()
                .map(|meta| AccountMeta {
                    pubkey: meta.pubkey,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: stored.data.clone(),
        }
    }
}

/// On-chain state for a single proposal.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Proposal {
    /// Member that created the proposal. Only they may add instructions,
    /// activate or cancel.
    pub creator: Pubkey,

    /// Owning group.
    pub group: Pubkey,

    /// Position of this proposal in the group's sequence, starting at 1.
    pub transaction_index: u32,

    /// Which authority signs at execution. 0 is the group itself.
    pub authority_index: u32,

    /// Bump seed of the signing authority's address.
    pub authority_bump: u8,

    /// Bump seed of this proposal's address.
    pub bump: u8,

    pub status: ProposalStatus,

    /// Instructions replayed at execution, in order.
    pub instructions: Vec<StoredInstruction>,

    /// Members in favour. Disjoint from `rejected`.
    pub approved: Vec<Pubkey>,

    /// Members against.
    pub rejected: Vec<Pubkey>,
}

impl Proposal {
    /// Fixed allocation for every proposal account.
    ///
    /// The serialised size grows with the instruction list and the vote
    /// sets; writes that no longer fit fail instead of reallocating.
    pub const SERIALIZED_SIZE: usize = PROPOSAL_ACCOUNT_SIZE;

    pub fn new(
        creator: Pubkey,
        group: Pubkey,
        transaction_index: u32,
        authority_index: u32,
        authority_bump: u8,
        bump: u8,
    ) -> Self {
        Self {
            creator,
            group,
            transaction_index,
            authority_index,
            authority_bump,
            bump,
            status: ProposalStatus::Draft,
            instructions: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Deserialise from raw account data (expects leading discriminator).
    pub fn deserialize(data: &[u8]) -> Result<Self, std::io::Error> {
        read_with_discriminator(data, PROPOSAL_DISCRIMINATOR, "proposal")
    }

    /// Serialise into raw account data (prepends discriminator).
    pub fn serialize_into(&self, data: &mut [u8]) -> Result<(), std::io::Error> {
        write_with_discriminator(self, data, PROPOSAL_DISCRIMINATOR, Self::SERIALIZED_SIZE)
    }
}
