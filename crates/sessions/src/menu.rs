//! Menu option lists. Each is a plain ordered list; a numeral from the
//! sender selects by its 1-based position in *this specific list as
//! rendered for them* (§4.6's ambiguity rule depends on that: the same
//! numeral means different things, or nothing, to different senders).

/// Root menu (§4.6, Mode::Root). Built dynamically: an option is present
/// only if it applies to the sender (see SPEC_FULL.md's "C6 supplement").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOption {
    MemberMenu,
    AdminMenu,
    MyStatus,
}

pub fn root_menu(is_member: bool, is_admin: bool) -> Vec<RootOption> {
    let mut opts = Vec::new();
    if is_member {
        opts.push(RootOption::MemberMenu);
    }
    if is_admin {
        opts.push(RootOption::AdminMenu);
    }
    if is_member {
        opts.push(RootOption::MyStatus);
    }
    opts
}

pub fn render_root_menu(opts: &[RootOption]) -> String {
    if opts.is_empty() {
        return "You aren't registered with any club yet. Ask an admin to add you.".to_owned();
    }
    let mut lines = vec!["What would you like to do?".to_owned()];
    for (i, opt) in opts.iter().enumerate() {
        let label = match opt {
            RootOption::MemberMenu => "Member menu",
            RootOption::AdminMenu => "Admin menu",
            RootOption::MyStatus => "My status",
        };
        lines.push(format!("{}. {label}", i + 1));
    }
    lines.join("\n")
}

/// Member menu (Mode::Member) — fixed, always these three in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOption {
    MyRole,
    RoundStatus,
    Back,
}

pub const MEMBER_MENU: [MemberOption; 3] = [MemberOption::MyRole, MemberOption::RoundStatus, MemberOption::Back];

pub fn render_member_menu() -> String {
    "1. My role\n2. Round status\n3. Back".to_owned()
}

/// Look up a 1-based numeral against the fixed member menu.
pub fn member_menu_option(n: usize) -> Option<MemberOption> {
    n.checked_sub(1).and_then(|i| MEMBER_MENU.get(i)).copied()
}

/// Admin menu (Mode::Admin) — fixed, always these eight in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOption {
    StartRound,
    Status,
    CancelRound,
    Reset,
    MembersList,
    AddMemberPrompt,
    RemoveMemberPrompt,
    Back,
}

pub const ADMIN_MENU: [AdminOption; 8] = [
    AdminOption::StartRound,
    AdminOption::Status,
    AdminOption::CancelRound,
    AdminOption::Reset,
    AdminOption::MembersList,
    AdminOption::AddMemberPrompt,
    AdminOption::RemoveMemberPrompt,
    AdminOption::Back,
];

pub fn render_admin_menu() -> String {
    "1. Start round\n2. Status\n3. Cancel round\n4. Reset\n5. Members\n6. Add member\n7. Remove member\n8. Back"
        .to_owned()
}

/// Look up a 1-based numeral against the fixed admin menu.
pub fn admin_menu_option(n: usize) -> Option<AdminOption> {
    n.checked_sub(1).and_then(|i| ADMIN_MENU.get(i)).copied()
}

pub fn render_admin_pick_menu(club_ids: &[String]) -> String {
    let mut lines = vec!["You administer more than one club — which one?".to_owned()];
    for (i, club) in club_ids.iter().enumerate() {
        lines.push(format!("{}. {club}", i + 1));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_menu_omits_admin_option_for_non_admin() {
        let opts = root_menu(true, false);
        assert_eq!(opts, vec![RootOption::MemberMenu, RootOption::MyStatus]);
    }

    #[test]
    fn root_menu_is_empty_for_unknown_sender() {
        assert!(root_menu(false, false).is_empty());
    }

    #[test]
    fn root_menu_has_both_for_member_admin() {
        let opts = root_menu(true, true);
        assert_eq!(opts, vec![RootOption::MemberMenu, RootOption::AdminMenu, RootOption::MyStatus]);
    }
}
