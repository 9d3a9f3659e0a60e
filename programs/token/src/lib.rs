//! SwapGate Token program
//!
//! Fungible assets on the ledger. A [`state::Mint`] describes an asset and
//! who may change its supply; a [`state::HoldingAccount`] holds one owner's
//! balance of one mint. Any authority may be a plain signer or a
//! [`state::Multisig`], in which case `m` of its `n` signers must co-sign the
//! instruction.
//!
//! ## Instructions
//!
//! | Instruction        | Description                                         |
//! |--------------------|-----------------------------------------------------|
//! | InitializeMint     | Set decimals and the mint/freeze authorities        |
//! | InitializeAccount  | Bind a holding account to an owner and a mint       |
//! | InitializeMultisig | Record an M-of-N signer set                         |
//! | Transfer           | Move tokens between holding accounts of one mint    |
//! | MintTo             | Create supply into a holding account                |
//! | Burn               | Destroy tokens from a holding account               |
//! | SetAuthority       | Replace or remove an authority                      |
//! | FreezeAccount      | Stop a holding account from moving tokens           |
//! | ThawAccount        | Undo `FreezeAccount`                                |

#![allow(clippy::arithmetic_side_effects)]

pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;

pub use processor::{check_id, id, Entrypoint, BUILTIN, ID};
