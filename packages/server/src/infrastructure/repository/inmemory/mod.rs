//! InMemory Repository 実装
//!
//! プロセス再起動で内容は失われます。バイナリの既定構成とテストで使用します。

mod conversation;
mod message;

pub use conversation::InMemoryConversationRepository;
pub use message::InMemoryMessageRepository;
