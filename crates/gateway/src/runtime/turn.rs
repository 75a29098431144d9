//! One inbound message, start to finish: resolve the sender's tenant,
//! classify the message, run whichever command it names, persist, then
//! send the outbound replies — in that order, and strictly in that order
//! (§5: a command must persist before the tenant lock releases; outbound
//! sends happen only after release).

use cb_domain::error::{Error, Result};
use cb_domain::{Catalog, RoundState};
use cb_registry::{TenantRegistry, TenantResolution};
use cb_round::OutboundMessage;
use cb_sessions::{
    classify, normalize, render_admin_menu, render_admin_pick_menu, render_member_menu, render_root_menu, root_menu,
    Action, AdminOption, Awaiting, ClassifyInput, LegacyCommand, MemberOption, Mode, OfferReply, RootOption, Session,
    SessionStore,
};

use crate::outbound::OutboundGateway;
use crate::state::AppState;

/// Handle one inbound `{sender_id, text}` message end to end. Returns
/// whether every resulting outbound message was delivered (used for the
/// HTTP response's `accepted` flag).
pub async fn handle_inbound(state: &AppState, sender_id: &str, text: &str) -> bool {
    let _permit = state.sender_locks.acquire(sender_id).await;
    let normalized = normalize(text);

    let messages = match run_turn(&state.registry, &state.sessions, sender_id, &normalized).await {
        Ok(messages) => messages,
        Err(e) => {
            state.sessions.with_mut(sender_id, |s| s.back_to_root());
            vec![OutboundMessage { to: sender_id.to_owned(), text: e.to_string() }]
        }
    };

    let mut ok = true;
    for m in &messages {
        ok &= send(state.outbound.as_ref(), &m.to, &m.text).await;
    }
    ok
}

async fn run_turn(
    registry: &TenantRegistry,
    sessions: &SessionStore,
    sender_id: &str,
    text: &str,
) -> Result<Vec<OutboundMessage>> {
    let pending_offer = registry.pending_offer_for(sender_id);
    let session = sessions.snapshot(sender_id);

    if session.awaiting != Awaiting::None {
        let club_id = session.club_id.clone().ok_or(Error::Unauthorized)?;
        let reply = run_awaiting_capture(registry, &club_id, session.awaiting, text).await?;
        sessions.with_mut(sender_id, |s| s.back_to_root());
        return Ok(vec![OutboundMessage { to: sender_id.to_owned(), text: reply }]);
    }

    if let Some((club_id, _role)) = &pending_offer {
        let reply = match text {
            "1" => Some(OfferReply::Accept),
            "2" => Some(OfferReply::Reject),
            "3" => Some(OfferReply::Defer),
            _ => None,
        };
        if let Some(reply) = reply {
            return run_offer_reply(registry, club_id, sender_id, reply).await;
        }
    }

    let (club_id, is_member, is_admin) = match resolve_club(registry, sessions, sender_id, &session).await? {
        Resolved::Club(club_id, is_member, is_admin) => (Some(club_id), is_member, is_admin),
        Resolved::PickMenuRendered(text) => {
            return Ok(vec![OutboundMessage { to: sender_id.to_owned(), text }]);
        }
        Resolved::Unknown => (None, false, false),
    };

    let session = sessions.snapshot(sender_id);
    let action = classify(&ClassifyInput {
        session: &session,
        is_member,
        is_admin,
        has_pending_offer: pending_offer.is_some(),
        text,
    });

    dispatch(registry, sessions, sender_id, club_id.as_deref(), is_member, is_admin, action).await
}

enum Resolved {
    Club(String, bool, bool),
    PickMenuRendered(String),
    Unknown,
}

async fn resolve_club(
    registry: &TenantRegistry,
    sessions: &SessionStore,
    sender_id: &str,
    session: &Session,
) -> Result<Resolved> {
    match registry.infer_tenant(sender_id, session.club_id.as_deref()) {
        TenantResolution::Club(club_id) => {
            let ctx = registry.context(&club_id).ok_or_else(|| Error::NotFound(club_id.clone()))?;
            let is_member = ctx.store.catalog.snapshot().find_member(sender_id).is_ok();
            let is_admin = ctx.admins.iter().any(|a| a == sender_id);
            if session.club_id.as_deref() != Some(club_id.as_str()) {
                sessions.with_mut(sender_id, |s| s.club_id = Some(club_id.clone()));
            }
            Ok(Resolved::Club(club_id, is_member, is_admin))
        }
        TenantResolution::NeedsPick(clubs) => {
            if session.mode == Mode::AdminPick {
                // Already showing a pick menu for this sender; let classify
                // resolve the numeral against the buffered club list.
                return Ok(Resolved::Club(session.club_id.clone().unwrap_or_default(), false, true));
            }
            sessions.with_mut(sender_id, |s| s.enter_admin_pick(&clubs));
            Ok(Resolved::PickMenuRendered(render_admin_pick_menu(&clubs)))
        }
        TenantResolution::UnknownSender => Ok(Resolved::Unknown),
    }
}

async fn run_offer_reply(
    registry: &TenantRegistry,
    club_id: &str,
    sender_id: &str,
    reply: OfferReply,
) -> Result<Vec<OutboundMessage>> {
    with_tenant(registry, club_id, |catalog, state, admins| match reply {
        OfferReply::Accept => cb_round::accept(club_id, catalog, state, admins, sender_id),
        OfferReply::Reject => cb_round::reject(club_id, catalog, state, admins, sender_id),
        OfferReply::Defer => cb_round::defer(state, sender_id),
    })
    .await
}

async fn run_awaiting_capture(
    registry: &TenantRegistry,
    club_id: &str,
    awaiting: Awaiting,
    arg: &str,
) -> Result<String> {
    match awaiting {
        Awaiting::AddMember => do_add_member(registry, club_id, arg).await,
        Awaiting::RemoveMember => do_remove_member(registry, club_id, arg).await,
        Awaiting::None => unreachable!("caller checks awaiting != None"),
    }
}

/// `AGREGAR <name>, <id>` / the add-member menu prompt's captured argument.
async fn do_add_member(registry: &TenantRegistry, club_id: &str, arg: &str) -> Result<String> {
    let (name, id) = arg
        .split_once(',')
        .map(|(n, i)| (n.trim().to_owned(), i.trim().to_owned()))
        .ok_or_else(|| Error::InvalidId("expected \"name, id\"".into()))?;
    let club_id_owned = club_id.to_owned();
    with_tenant(registry, club_id, move |catalog, _state, _admins| {
        cb_admin::add_member(&club_id_owned, catalog, &name, &id)
    })
    .await?;
    Ok("Member added.".to_owned())
}

/// `ELIMINAR <id|name>` / the remove-member menu prompt's captured argument.
async fn do_remove_member(registry: &TenantRegistry, club_id: &str, arg: &str) -> Result<String> {
    let reference = arg.trim().to_owned();
    let club_id_owned = club_id.to_owned();
    let removed = with_tenant(registry, club_id, move |catalog, state, _admins| {
        cb_admin::remove_member(&club_id_owned, catalog, state, &reference)
    })
    .await?;
    Ok(format!("Removed {}.", removed.name))
}

#[allow(clippy::too_many_arguments)]
async fn dispatch(
    registry: &TenantRegistry,
    sessions: &SessionStore,
    sender_id: &str,
    club_id: Option<&str>,
    is_member: bool,
    is_admin: bool,
    action: Action,
) -> Result<Vec<OutboundMessage>> {
    let reply = |text: String| vec![OutboundMessage { to: sender_id.to_owned(), text }];
    let need_club = || club_id.map(str::to_owned).ok_or(Error::Unauthorized);
    // Every admin op (menu-driven or legacy-text) is admin-gated (§4.5,
    // §4.7); a non-admin reaching one — e.g. by typing "iniciar" directly,
    // bypassing the menu that would otherwise hide the option — is refused.
    let need_admin_club = || if is_admin { need_club() } else { Err(Error::Unauthorized) };

    match action {
        Action::AwaitingCapture(..) | Action::OfferReply(_) => {
            unreachable!("handled before classify")
        }

        Action::Root(RootOption::MemberMenu) => {
            sessions.with_mut(sender_id, |s| s.mode = Mode::Member);
            Ok(reply(render_member_menu()))
        }
        Action::Root(RootOption::AdminMenu) => {
            sessions.with_mut(sender_id, |s| s.mode = Mode::Admin);
            Ok(reply(render_admin_menu()))
        }
        Action::Root(RootOption::MyStatus) => {
            let club_id = need_club()?;
            Ok(reply(round_status(registry, &club_id).await?))
        }

        Action::Member(MemberOption::MyRole) => {
            let club_id = need_club()?;
            Ok(reply(my_role_text(registry, &club_id, sender_id).await?))
        }
        Action::Member(MemberOption::RoundStatus) => {
            let club_id = need_club()?;
            Ok(reply(round_status(registry, &club_id).await?))
        }
        Action::Member(MemberOption::Back) => {
            sessions.with_mut(sender_id, |s| s.back_to_root());
            Ok(reply(render_root(is_member, is_admin)))
        }

        Action::Admin(AdminOption::StartRound) | Action::Legacy(LegacyCommand::Iniciar) => {
            let club_id = need_admin_club()?;
            with_tenant(registry, &club_id, |catalog, state, admins| {
                cb_round::start_round(&club_id, catalog, state, admins)
            })
            .await
        }
        Action::Admin(AdminOption::Status) | Action::Legacy(LegacyCommand::Estado) => {
            let club_id = need_admin_club()?;
            Ok(reply(round_status(registry, &club_id).await?))
        }
        Action::Admin(AdminOption::CancelRound) | Action::Legacy(LegacyCommand::Cancelar) => {
            let club_id = need_admin_club()?;
            with_tenant(registry, &club_id, |_catalog, state, _admins| {
                cb_round::cancel_round(&club_id, state);
                Ok(())
            })
            .await?;
            Ok(reply("Round canceled.".to_owned()))
        }
        Action::Admin(AdminOption::Reset) | Action::Legacy(LegacyCommand::Reset) => {
            let club_id = need_admin_club()?;
            with_tenant(registry, &club_id, |_catalog, state, _admins| {
                cb_round::reset(&club_id, state);
                Ok(())
            })
            .await?;
            Ok(reply("Round ledger reset.".to_owned()))
        }
        Action::Admin(AdminOption::MembersList) | Action::Legacy(LegacyCommand::Miembros) => {
            let club_id = need_admin_club()?;
            Ok(reply(members_text(registry, &club_id)?))
        }
        Action::Admin(AdminOption::AddMemberPrompt) => {
            if !is_admin {
                return Err(Error::Unauthorized);
            }
            sessions.with_mut(sender_id, |s| s.awaiting = Awaiting::AddMember);
            Ok(reply("Reply with \"name, id\" for the new member.".to_owned()))
        }
        Action::Admin(AdminOption::RemoveMemberPrompt) => {
            if !is_admin {
                return Err(Error::Unauthorized);
            }
            sessions.with_mut(sender_id, |s| s.awaiting = Awaiting::RemoveMember);
            Ok(reply("Reply with the member's name or id to remove.".to_owned()))
        }
        Action::Admin(AdminOption::Back) => {
            sessions.with_mut(sender_id, |s| s.back_to_root());
            Ok(reply(render_root(is_member, is_admin)))
        }

        Action::AdminPick(club_id) => {
            sessions.with_mut(sender_id, |s| s.pick_club(club_id));
            Ok(reply(render_admin_menu()))
        }

        Action::Legacy(LegacyCommand::MiRol) => {
            let club_id = need_club()?;
            Ok(reply(my_role_text(registry, &club_id, sender_id).await?))
        }
        Action::Legacy(LegacyCommand::Acepto) => {
            let club_id = need_club()?;
            run_offer_reply(registry, &club_id, sender_id, OfferReply::Accept).await
        }
        Action::Legacy(LegacyCommand::Rechazo) => {
            let club_id = need_club()?;
            run_offer_reply(registry, &club_id, sender_id, OfferReply::Reject).await
        }
        Action::Legacy(LegacyCommand::Agregar(arg)) => {
            let club_id = need_admin_club()?;
            Ok(reply(do_add_member(registry, &club_id, &arg).await?))
        }
        Action::Legacy(LegacyCommand::Eliminar(arg)) => {
            let club_id = need_admin_club()?;
            Ok(reply(do_remove_member(registry, &club_id, &arg).await?))
        }
        Action::Legacy(LegacyCommand::Hola) | Action::Fallback => {
            sessions.with_mut(sender_id, |s| s.back_to_root());
            Ok(reply(render_root(is_member, is_admin)))
        }
    }
}

fn render_root(is_member: bool, is_admin: bool) -> String {
    render_root_menu(&root_menu(is_member, is_admin))
}

async fn round_status(registry: &TenantRegistry, club_id: &str) -> Result<String> {
    with_tenant(registry, club_id, |catalog, state, _admins| Ok(cb_round::status(catalog, state))).await
}

fn members_text(registry: &TenantRegistry, club_id: &str) -> Result<String> {
    let ctx = registry.context(club_id).ok_or_else(|| Error::NotFound(club_id.to_owned()))?;
    let rows = cb_admin::members_list(&ctx.store.catalog.snapshot());
    Ok(rows.iter().map(|r| format!("{} ({}) — level {}", r.name, r.id, r.level)).collect::<Vec<_>>().join("\n"))
}

async fn my_role_text(registry: &TenantRegistry, club_id: &str, sender_id: &str) -> Result<String> {
    with_tenant(registry, club_id, |_catalog, state, _admins| {
        if let Some(role) = state.pending_role_for(sender_id) {
            return Ok(format!("You have a pending offer for {role}."));
        }
        for (role, accepted) in &state.accepted {
            if accepted.waid == sender_id {
                return Ok(format!("You are assigned {role} this round."));
            }
        }
        Ok("You have no role this round.".to_owned())
    })
    .await
}

/// Runs `f` against the loaded catalog/round-state for `club_id` under the
/// tenant's exclusive lock, persisting both documents before the lock
/// releases. Works for read-only commands too (`status`, `my_role_text`) —
/// they just return without mutating, and the unchanged snapshot is
/// rewritten verbatim, which is harmless since the write is atomic either
/// way.
async fn with_tenant<F, R>(registry: &TenantRegistry, club_id: &str, f: F) -> Result<R>
where
    F: FnOnce(&mut Catalog, &mut RoundState, &[String]) -> Result<R>,
{
    let ctx = registry.context(club_id).ok_or_else(|| Error::NotFound(club_id.to_owned()))?;
    let _permit = registry.locks.acquire(club_id).await;
    let mut catalog = ctx.store.catalog.snapshot();
    let mut state = ctx.store.state.snapshot();
    let result = f(&mut catalog, &mut state, &ctx.admins)?;
    ctx.store.catalog.replace(catalog)?;
    ctx.store.state.replace(state)?;
    Ok(result)
}

async fn send(outbound: &dyn OutboundGateway, to: &str, text: &str) -> bool {
    match outbound.send(to, text).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(to, error = %e, "outbound send failed");
            false
        }
    }
}
