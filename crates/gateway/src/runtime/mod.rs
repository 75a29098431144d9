pub mod session_lock;
pub mod turn;

pub use session_lock::{SenderBusy, SenderLockMap};
pub use turn::handle_inbound;
