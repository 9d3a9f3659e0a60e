//! Seeds and limits of the Governance program.

/// Common first seed of every governance address.
pub const SEED_PREFIX: &[u8] = b"squad";

/// Last seed of a group address.
pub const SEED_MULTISIG: &[u8] = b"multisig";

/// Last seed of a vault address.
pub const SEED_AUTHORITY: &[u8] = b"authority";

/// Last seed of a proposal address.
pub const SEED_TRANSACTION: &[u8] = b"transaction";

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Largest member set a group account has room for.
pub const MAX_MEMBERS: usize = 16;

/// Most instructions one proposal may carry.
pub const MAX_INSTRUCTIONS: usize = 8;

/// Allocated size of every proposal account. Instructions and votes must fit.
pub const PROPOSAL_ACCOUNT_SIZE: usize = 2_048;

/// Authority index under which a proposal acts as the group itself.
pub const GROUP_AUTHORITY_INDEX: u32 = 0;

/// Vault used by proposals unless another is requested.
pub const DEFAULT_VAULT_INDEX: u32 = 1;
