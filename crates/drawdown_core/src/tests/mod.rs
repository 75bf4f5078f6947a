//! Integration tests for the drawdown engine
//!
//! Tests are organized by topic:
//! - `basic` - Month stepping, growth and depletion
//! - `events` - Streams, indexation and one-time events
//! - `solver` - Reverse solver round trips
//! - `scenarios` - What-if comparisons
//! - `builder_dsl` - Builder DSL for fluent input setup
//! - `properties` - Property-based invariants
