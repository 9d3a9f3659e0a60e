//! Proposal status transitions.
//!
//! Everything here is a function of the current status and vote counts, so
//! the rules can be exercised without a ledger. The processor loads state,
//! asks for the next status and stores the answer.

use {
    crate::{error::GovernanceError, state::ProposalStatus},
    solana_pubkey::Pubkey,
};

/// Something that may move a proposal to another status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    AddInstruction,
    Activate,
    /// A vote was recorded; re-evaluate against the tally.
    Vote,
    Cancel,
    /// All instructions ran.
    Execute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approve,
    Reject,
}

/// Vote counts and group parameters a transition is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub approvals: usize,
    pub rejections: usize,
    pub threshold: u16,
    pub member_count: usize,
}

impl Tally {
    pub fn is_approved(&self) -> bool {
        self.approvals >= usize::from(self.threshold)
    }

    /// More members rejected than could be spared while still reaching
    /// the threshold.
    pub fn is_rejected(&self) -> bool {
        self.rejections > self.member_count.saturating_sub(usize::from(self.threshold))
    }
}

/// Status after `event`, or why `event` is not allowed in `status`.
pub fn next_status(
    status: ProposalStatus,
    event: Event,
    tally: &Tally,
) -> Result<ProposalStatus, GovernanceError> {
    use ProposalStatus::*;

    match (status, event) {
        (Draft, Event::AddInstruction) => Ok(Draft),
        (Draft, Event::Activate) => Ok(Active),
        (Active, Event::Vote) => Ok(if tally.is_approved() {
            ExecuteReady
        } else if tally.is_rejected() {
            Rejected
        } else {
            Active
        }),
        (Active | ExecuteReady, Event::Cancel) => Ok(Cancelled),
        (ExecuteReady, Event::Execute) => Ok(Executed),
        (Executed, _) => Err(GovernanceError::AlreadyExecuted),
        _ => Err(GovernanceError::InvalidTransactionState),
    }
}

/// Record `vote` by `member`, moving it out of the opposite set if needed.
///
/// Returns `false` when the member had already cast the same vote.
pub fn apply_vote(
    approved: &mut Vec<Pubkey>,
    rejected: &mut Vec<Pubkey>,
    member: Pubkey,
    vote: Vote,
) -> bool {
    let (add_to, remove_from) = match vote {
        Vote::Approve => (approved, rejected),
        Vote::Reject => (rejected, approved),
    };
    if add_to.contains(&member) {
        return false;
    }
    remove_from.retain(|key| key != &member);
    add_to.push(member);
    true
}
