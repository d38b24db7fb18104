// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! catnip-pty: multiplexed pseudo-terminal sessions.
//!
//! Each session hosts one child process (a login shell or an agent CLI) in a
//! PTY. A reader thread pulls bytes from the PTY master into a bounded replay
//! ring and fans them out to every attached subscriber; new subscribers get
//! the ring contents as their first frame so reconnects see recent history.
//! When the child exits the session survives: a banner goes out and the child
//! is transparently recreated with the same id, agent, and size.

pub mod command;
pub mod engine;
pub mod prompt;
pub mod reaper;
pub mod ring;
pub mod session;

pub use command::{agent_command, AgentCommand};
pub use engine::{EngineConfig, PtyEngine};
pub use prompt::{send_prompt, PromptSpec};
pub use reaper::run_reaper;
pub use ring::RingBuffer;
pub use session::{PtyError, PtySession, SubscriberHandle};

/// Default replay ring capacity in bytes.
pub const DEFAULT_RING_CAPACITY: usize = 32 * 1024;

/// Initial terminal size applied to fresh sessions.
pub const INITIAL_COLS: u16 = 80;
pub const INITIAL_ROWS: u16 = 24;
