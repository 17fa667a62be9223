//! Debate cycle orchestration.
//!
//! # Cycle flow
//!
//! ```text
//! Idle → Proposal → Challenge → Voting → Result ──► accepted? ─ yes ─► WorldUpdate
//!   ▲                                     │                                │
//!   │                                     no                               │
//!   └──────────────── pause ◄─────────────┴────────────────────────────────┘
//! ```
//!
//! The proposer rotates by cycle number; votes tally with a strict
//! accept→reject→mutate priority and fall through to delay. Accepted
//! proposals become doctrines and spawn world structures.

pub mod orchestrator;
pub mod types;

pub use orchestrator::{
    CycleError, CycleReport, DebateOrchestrator, DebatePhase, DebateTimings,
};
pub use types::{
    AgentStanding, Challenge, DebateContext, DebateOutcomeKind, Doctrine, Proposal, ProposalType,
    Vote, VoteTally, VoteType,
};
