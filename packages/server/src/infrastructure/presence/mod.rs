//! Presence Tracker の実装
//!
//! ## 概要
//!
//! このモジュールは `PresenceTracker` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装

pub mod inmemory;

pub use inmemory::InMemoryPresenceTracker;
