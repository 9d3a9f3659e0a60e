//! Custom errors for the Governance program.

use {num_derive::FromPrimitive, solana_instruction::error::InstructionError, thiserror::Error};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum GovernanceError {
    #[error("Account is not owned by the governance program")]
    InvalidAccountOwner = 0,

    #[error("Account data is invalid or corrupted")]
    InvalidAccountData,

    #[error("Group is already initialised")]
    AlreadyInitialized,

    #[error("Threshold must be between 1 and the number of members")]
    InvalidThreshold,

    #[error("Member list is empty")]
    EmptyMembers,

    #[error("Member list exceeds the group capacity")]
    TooManyMembers,

    #[error("Member appears more than once")]
    DuplicateMember,

    #[error("Key is already a member")]
    MemberAlreadyExists,

    #[error("Signer is not a member of the group")]
    KeyNotInMultisig,

    #[error("The last member cannot be removed")]
    CannotRemoveLastMember,

    #[error("Proposal does not belong to this group")]
    GroupMismatch,

    #[error("Proposal is not in the expected status for this operation")]
    InvalidTransactionState,

    #[error("Proposal has already been executed")]
    AlreadyExecuted,

    #[error("Group configuration changed after this proposal was created")]
    StaleProposal,

    #[error("Only the proposal creator may do this")]
    NotProposalCreator,

    #[error("Proposal carries the maximum number of instructions")]
    TooManyInstructions,

    #[error("Proposal does not fit in its account")]
    ProposalTooLarge,

    #[error("Proposal has no instructions")]
    EmptyProposal,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<GovernanceError> for InstructionError {
    fn from(error: GovernanceError) -> Self {
        InstructionError::Custom(error as u32)
    }
}

impl GovernanceError {
    pub fn from_custom(code: u32) -> Option<Self> {
        num_traits::FromPrimitive::from_u32(code)
    }
}
