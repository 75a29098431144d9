//! Per-sender session state and menu dispatch (§3, §4.6).
//!
//! Deliberately has no dependency on the tenant registry, persistence, or
//! round/admin commands: it only tracks what menu surface a sender is
//! looking at and resolves their next message to an `Action`. The gateway
//! composes this with the rest of the engine.

pub mod menu;
pub mod router;
pub mod session;
pub mod store;

pub use menu::{
    admin_menu_option, member_menu_option, render_admin_menu, render_admin_pick_menu, render_member_menu,
    render_root_menu, root_menu, AdminOption, MemberOption, RootOption, ADMIN_MENU, MEMBER_MENU,
};
pub use router::{classify, normalize, Action, ClassifyInput, LegacyCommand, OfferReply};
pub use session::{Awaiting, Mode, Session};
pub use store::SessionStore;
