//! # System Interaction Layer
//!
//! The boundary between the core and the operating system.
//!
//! - **`executor`**: spawns a rendered command line as a child process, feeds
//!   it optional standard input and waits for its exit status.

pub mod executor;
