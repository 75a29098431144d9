//! Dispatch precedence (§4.6) as a tagged dispatch over explicit enums —
//! no pattern-based routing that depends on runtime introspection (§9).
//!
//! `classify` is pure: it never touches the registry, the round state, or
//! the catalog. The caller (gateway) gathers the facts it needs (is the
//! sender a member? an admin? do they have a pending offer anywhere?),
//! normalizes the text, and hands them in as `ClassifyInput`.

use crate::menu::{admin_menu_option, member_menu_option, root_menu, AdminOption, MemberOption, RootOption};
use crate::session::{Awaiting, Mode, Session};

/// What the pending-offer bypass (§4.6 step 1) resolves "1"/"2"/"3" to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferReply {
    Accept,
    Reject,
    Defer,
}

/// Legacy text commands (§4.6 step 3, plus the `AGREGAR`/`ELIMINAR` forms
/// named in §6), kept for backward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyCommand {
    Iniciar,
    Estado,
    Cancelar,
    Reset,
    Miembros,
    MiRol,
    Acepto,
    Rechazo,
    Hola,
    /// `AGREGAR <name>, <id>` — raw, untrimmed argument text after the
    /// command word.
    Agregar(String),
    /// `ELIMINAR <id|name>` — raw, untrimmed argument text.
    Eliminar(String),
}

/// The resolved action for one inbound message. The gateway matches on
/// this to decide which command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The sender's next message is the free-text argument to an admin op
    /// already in flight (§4.6: `awaiting` capture). Carries the raw text.
    AwaitingCapture(Awaiting, String),
    OfferReply(OfferReply),
    Root(RootOption),
    Member(MemberOption),
    Admin(AdminOption),
    /// A club id picked out of the admin's ambiguous club list.
    AdminPick(String),
    Legacy(LegacyCommand),
    /// No rule matched (or the numeral was out of range for the rendered
    /// menu, §4.6's ambiguity rule): render the root menu.
    Fallback,
}

/// Case-fold and trim per §4.6's normalized input.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn is_numeric_token(text: &str) -> bool {
    let len = text.len();
    (1..=3).contains(&len) && text.chars().all(|c| c.is_ascii_digit())
}

pub struct ClassifyInput<'a> {
    pub session: &'a Session,
    pub is_member: bool,
    pub is_admin: bool,
    pub has_pending_offer: bool,
    /// Already normalized (see `normalize`).
    pub text: &'a str,
}

/// Resolve one inbound message to an `Action`, following §4.6's strict
/// precedence: `awaiting` capture first (not itself one of the four
/// precedence steps — it's consuming an argument to a command already
/// chosen, see SPEC_FULL.md), then pending-offer reply, then session-driven
/// menu numerals, then legacy text commands, then fallback.
pub fn classify(input: &ClassifyInput) -> Action {
    if input.session.awaiting != Awaiting::None {
        return Action::AwaitingCapture(input.session.awaiting, input.text.to_owned());
    }

    if input.has_pending_offer {
        match input.text {
            "1" => return Action::OfferReply(OfferReply::Accept),
            "2" => return Action::OfferReply(OfferReply::Reject),
            "3" => return Action::OfferReply(OfferReply::Defer),
            _ => {}
        }
    }

    if is_numeric_token(input.text) {
        let n: usize = match input.text.parse() {
            Ok(n) if n >= 1 => n,
            _ => return Action::Fallback,
        };
        return match input.session.mode {
            Mode::Root => root_menu(input.is_member, input.is_admin)
                .get(n - 1)
                .copied()
                .map(Action::Root)
                .unwrap_or(Action::Fallback),
            Mode::Member => member_menu_option(n).map(Action::Member).unwrap_or(Action::Fallback),
            Mode::Admin => admin_menu_option(n).map(Action::Admin).unwrap_or(Action::Fallback),
            Mode::AdminPick => input
                .session
                .buffer
                .get(input.text)
                .cloned()
                .map(Action::AdminPick)
                .unwrap_or(Action::Fallback),
        };
    }

    legacy_command(input.text).map(Action::Legacy).unwrap_or(Action::Fallback)
}

fn legacy_command(text: &str) -> Option<LegacyCommand> {
    if let Some(rest) = text.strip_prefix("agregar ") {
        return Some(LegacyCommand::Agregar(rest.trim().to_owned()));
    }
    if let Some(rest) = text.strip_prefix("eliminar ") {
        return Some(LegacyCommand::Eliminar(rest.trim().to_owned()));
    }
    Some(match text {
        "iniciar" => LegacyCommand::Iniciar,
        "estado" => LegacyCommand::Estado,
        "cancelar" => LegacyCommand::Cancelar,
        "reset" => LegacyCommand::Reset,
        "miembros" => LegacyCommand::Miembros,
        "mi rol" => LegacyCommand::MiRol,
        "acepto" => LegacyCommand::Acepto,
        "rechazo" => LegacyCommand::Rechazo,
        "hola" => LegacyCommand::Hola,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: Mode) -> Session {
        let mut s = Session::default();
        s.mode = mode;
        s
    }

    #[test]
    fn pending_offer_bypasses_menu_regardless_of_mode() {
        // Scenario G: sender in admin menu, "1" still means ACCEPT.
        let s = session(Mode::Admin);
        let input = ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: true, text: "1" };
        assert_eq!(classify(&input), Action::OfferReply(OfferReply::Accept));
    }

    #[test]
    fn no_pending_offer_numeral_falls_to_menu() {
        let s = session(Mode::Admin);
        let input = ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: "1" };
        assert_eq!(classify(&input), Action::Admin(AdminOption::StartRound));
    }

    #[test]
    fn awaiting_capture_outranks_pending_offer() {
        let mut s = session(Mode::Admin);
        s.awaiting = Awaiting::AddMember;
        let input =
            ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: true, text: "1" };
        assert_eq!(classify(&input), Action::AwaitingCapture(Awaiting::AddMember, "1".to_owned()));
    }

    #[test]
    fn root_numeral_out_of_range_is_ambiguous_falls_back() {
        // Member-only sender: root menu has 2 options (member menu, my status).
        let s = session(Mode::Root);
        let input = ClassifyInput { session: &s, is_member: true, is_admin: false, has_pending_offer: false, text: "5" };
        assert_eq!(classify(&input), Action::Fallback);
    }

    #[test]
    fn root_numeral_in_range_resolves_by_position() {
        let s = session(Mode::Root);
        // Admin-only sender: root menu is [AdminMenu] only.
        let input = ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: "1" };
        assert_eq!(classify(&input), Action::Root(RootOption::AdminMenu));
    }

    #[test]
    fn admin_pick_resolves_from_session_buffer() {
        let mut s = session(Mode::AdminPick);
        s.buffer.insert("1".into(), "x".into());
        s.buffer.insert("2".into(), "y".into());
        let input = ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: "2" };
        assert_eq!(classify(&input), Action::AdminPick("y".into()));
    }

    #[test]
    fn legacy_command_matches_case_insensitively_once_normalized() {
        let s = session(Mode::Root);
        let text = normalize("INICIAR");
        let input =
            ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: &text };
        assert_eq!(classify(&input), Action::Legacy(LegacyCommand::Iniciar));
    }

    #[test]
    fn unrecognized_text_falls_back_to_root_menu() {
        let s = session(Mode::Root);
        let input =
            ClassifyInput { session: &s, is_member: false, is_admin: false, has_pending_offer: false, text: "asdf" };
        assert_eq!(classify(&input), Action::Fallback);
    }

    #[test]
    fn member_menu_numerals_map_to_fixed_options() {
        let s = session(Mode::Member);
        let input = ClassifyInput { session: &s, is_member: true, is_admin: false, has_pending_offer: false, text: "3" };
        assert_eq!(classify(&input), Action::Member(MemberOption::Back));
    }

    #[test]
    fn legacy_agregar_captures_the_raw_argument() {
        let s = session(Mode::Root);
        let text = normalize("AGREGAR Juan Perez, 15551230099");
        let input =
            ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: &text };
        assert_eq!(classify(&input), Action::Legacy(LegacyCommand::Agregar("juan perez, 15551230099".into())));
    }

    #[test]
    fn legacy_eliminar_captures_the_raw_argument() {
        let s = session(Mode::Root);
        let text = normalize("ELIMINAR 15551230099");
        let input =
            ClassifyInput { session: &s, is_member: false, is_admin: true, has_pending_offer: false, text: &text };
        assert_eq!(classify(&input), Action::Legacy(LegacyCommand::Eliminar("15551230099".into())));
    }
}
