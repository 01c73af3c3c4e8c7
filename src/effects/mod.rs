//! Effect-based operations for composable I/O (future implementation)
//!
//! This module is a placeholder for future Effect-based wrappers around I/O operations.
//! Following the "functional core, imperative shell" pattern, Effects will separate pure
//! business logic from side effects, making code easier to test and reason about.
//!
//! # Architecture (Planned)
//!
//! - **Pure Logic**: In `src/core/` - no I/O, easily testable
//! - **Effect Composition**: In this module - declarative I/O pipelines
//! - **Environment**: `AppEnv` provides all I/O capabilities
//!
//! # Current Status
//!
//! The `env` module provides environment trait abstractions (FileEnv, GitEnv, ProcessEnv, DbEnv)
//! with real and mock implementations. Effect-based composition will be added in a future phase
//! once stillwater's Effect API is available.
//!
//! # Future Usage
//!
//! ```ignore
//! use prodigy::effects::config::load_from_path;
//! use prodigy::env::AppEnv;
//! use std::path::PathBuf;
//!
//! // Define an effect
//! let load_effect = load_from_path(PathBuf::from("workflow.yml"));
//!
//! // Run it at the application boundary
//! let env = AppEnv::real();
//! let config = load_effect.run(&env)?;
//! ```
