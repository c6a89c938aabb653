//! 会话状态
//!
//! - `SessionStore`: 宿主会话的键值接口，显式传入解析器
//! - `MemorySession`: 内存实现
//! - `SessionRegistry`: 演示服务器使用的会话表

mod memory;
mod registry;
mod store;

pub use memory::MemorySession;
pub use registry::SessionRegistry;
pub(crate) use store::write_location;
pub use store::{LocationRecord, SessionLocationExt, SessionStore, keys};
