//! Identity 解決の実装
//!
//! - `inmemory`: 事前登録したトークン表とクエリパラメータによる解決

pub mod inmemory;

pub use inmemory::InMemoryIdentityResolver;
