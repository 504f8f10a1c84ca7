// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Unix-socket spotlight hub.
//!
//! Owns the one [`SpotlightSession`] for the community behind a mutex (the
//! whole session is a single critical section), dispatches client commands,
//! fans deliveries out to the DM and community sinks, and runs the session
//! scheduler (daily open tick, claim-relative close timer).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use spotlight_config::{ConfigService, FsConfigStore};
use spotlight_core::{ContributionMode, Participant, SpotlightSession};
use spotlight_proto::{
    default_socket_path,
    wire::{decode_command, encode_server},
    Command, Delivery, LedgerSnapshot, Notification, NotifyKind, ReplyPayload, ServerMessage,
    StatusReportPayload,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

mod sched;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HostPrefs {
    socket_path: String,
    community_channel: String,
    open_interval_secs: u64,
    close_after_claim_secs: u64,
}

impl Default for HostPrefs {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path().display().to_string(),
            community_channel: "compliments".to_string(),
            open_interval_secs: 86_400,
            close_after_claim_secs: 86_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlight_core::{ChannelKind, ContributionMode, SessionState};
    use spotlight_proto::{wire::decode_server, AckStatus, ComplimentPayload, HelloPayload};
    use tokio::time::{timeout, Duration};

    async fn add_conn(
        hub: &Arc<Mutex<HubState>>,
        participant: Option<Participant>,
    ) -> (u64, tokio::sync::mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = tokio::sync::mpsc::channel::<Vec<u8>>(64);
        let mut h = hub.lock().await;
        let id = h.next_conn_id;
        h.next_conn_id += 1;
        h.conns.insert(id, ConnState { participant, tx });
        (id, rx)
    }

    async fn next_msg(rx: &mut tokio::sync::mpsc::Receiver<Vec<u8>>) -> ServerMessage {
        let pkt = timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
            .expect("server message");
        let (msg, _ts, _) = decode_server(&pkt).expect("decode server message");
        msg
    }

    /// Skip broadcasts until the next direct reply on this connection.
    async fn next_reply(rx: &mut tokio::sync::mpsc::Receiver<Vec<u8>>) -> ReplyPayload {
        loop {
            if let ServerMessage::Reply(r) = next_msg(rx).await {
                return r;
            }
        }
    }

    /// Skip everything until the DM-side delivery arrives.
    async fn next_delivery(rx: &mut tokio::sync::mpsc::Receiver<Vec<u8>>) -> Delivery {
        loop {
            if let ServerMessage::Delivery(d) = next_msg(rx).await {
                return d;
            }
        }
    }

    fn p(id: u64, name: &str) -> Participant {
        Participant::new(id, name)
    }

    #[tokio::test]
    async fn concurrent_claims_have_exactly_one_winner() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();

        let mut conns = Vec::new();
        for i in 0..8u64 {
            let (id, rx) = add_conn(&hub, Some(p(i + 1, &format!("P{i}")))).await;
            conns.push((id, rx));
        }

        let mut tasks = Vec::new();
        for (id, _) in &conns {
            let hub = Arc::clone(&hub);
            let id = *id;
            tasks.push(tokio::spawn(async move {
                handle_command(Command::Claim, id, &hub).await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        let mut winners = 0;
        let mut already_claimed = 0;
        for (_, rx) in &mut conns {
            let reply = next_reply(rx).await;
            match reply.status {
                AckStatus::Ok => winners += 1,
                AckStatus::Error => {
                    assert_eq!(reply.error.unwrap().name, "E_ALREADY_CLAIMED");
                    already_claimed += 1;
                }
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(already_claimed, 7);
        assert_eq!(hub.lock().await.session.state(), SessionState::Claimed);
    }

    #[tokio::test]
    async fn identity_is_required_before_claiming() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();
        let (anon, mut rx) = add_conn(&hub, None).await;

        handle_command(Command::Claim, anon, &hub).await.unwrap();
        let reply = next_reply(&mut rx).await;
        assert_eq!(reply.error.unwrap().name, "E_NO_IDENTITY");

        handle_command(
            Command::Hello(HelloPayload {
                participant: p(9, "Iris"),
            }),
            anon,
            &hub,
        )
        .await
        .unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
        handle_command(Command::Claim, anon, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
    }

    #[tokio::test]
    async fn wrong_channel_is_rejected_and_nothing_is_recorded() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();
        let (claimant, mut claimant_rx) = add_conn(&hub, Some(p(1, "Avery"))).await;
        let (sender, mut sender_rx) = add_conn(&hub, Some(p(2, "Blair"))).await;

        handle_command(Command::Claim, claimant, &hub).await.unwrap();
        assert_eq!(next_reply(&mut claimant_rx).await.status, AckStatus::Ok);

        handle_command(
            Command::Compliment(ComplimentPayload {
                channel: ChannelKind::Community,
                mode: ContributionMode::Anonymous,
                text: "sneaky".into(),
            }),
            sender,
            &hub,
        )
        .await
        .unwrap();
        let reply = next_reply(&mut sender_rx).await;
        assert_eq!(reply.error.unwrap().name, "E_WRONG_CHANNEL");

        handle_command(Command::CloseSession, claimant, &hub)
            .await
            .unwrap();
        let delivery = next_delivery(&mut claimant_rx).await;
        assert!(delivery.snapshot.is_empty());
    }

    #[tokio::test]
    async fn delivery_reaches_dm_and_community_sinks() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();
        let (claimant, mut claimant_rx) = add_conn(&hub, Some(p(1, "Avery"))).await;
        let (public_sender, mut public_rx) = add_conn(&hub, Some(p(2, "Blair"))).await;
        let (anon_sender, mut anon_rx) = add_conn(&hub, Some(p(3, "Cleo"))).await;

        handle_command(Command::Claim, claimant, &hub).await.unwrap();
        assert_eq!(next_reply(&mut claimant_rx).await.status, AckStatus::Ok);

        handle_command(
            Command::Compliment(ComplimentPayload {
                channel: ChannelKind::Community,
                mode: ContributionMode::Public,
                text: "nice job".into(),
            }),
            public_sender,
            &hub,
        )
        .await
        .unwrap();
        assert_eq!(next_reply(&mut public_rx).await.status, AckStatus::Ok);

        handle_command(
            Command::Compliment(ComplimentPayload {
                channel: ChannelKind::Direct,
                mode: ContributionMode::Anonymous,
                text: "great work".into(),
            }),
            anon_sender,
            &hub,
        )
        .await
        .unwrap();
        assert_eq!(next_reply(&mut anon_rx).await.status, AckStatus::Ok);

        handle_command(Command::CloseSession, public_sender, &hub)
            .await
            .unwrap();

        // DM sink: claimant gets the full snapshot, anonymous unlabeled.
        let delivery = next_delivery(&mut claimant_rx).await;
        assert_eq!(delivery.recipient, p(1, "Avery"));
        assert_eq!(delivery.snapshot.public.len(), 1);
        assert_eq!(delivery.snapshot.public[0].author, "Blair");
        assert_eq!(delivery.snapshot.anonymous, vec!["great work".to_string()]);

        // Community sink: everyone sees the broadcast rendering.
        let notification = loop {
            if let ServerMessage::Notification(n) = next_msg(&mut anon_rx).await {
                if n.title.contains("Avery") {
                    break n;
                }
            }
        };
        let body = notification.body.unwrap();
        assert!(body.contains("nice job"));
        assert!(body.contains("great work"));
        assert!(!body.contains("Cleo"));

        assert_eq!(hub.lock().await.session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn status_reports_state_and_spotlight() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        let (conn, mut rx) = add_conn(&hub, Some(p(1, "Avery"))).await;

        handle_command(Command::Status, conn, &hub).await.unwrap();
        match next_msg(&mut rx).await {
            ServerMessage::Status(s) => {
                assert_eq!(s.state, SessionState::Idle);
                assert!(s.spotlight.is_none());
            }
            other => panic!("expected status, got {other:?}"),
        }

        handle_command(Command::OpenSession, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
        handle_command(Command::Claim, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);

        handle_command(Command::Status, conn, &hub).await.unwrap();
        let status = loop {
            if let ServerMessage::Status(s) = next_msg(&mut rx).await {
                break s;
            }
        };
        assert_eq!(status.state, SessionState::Claimed);
        assert_eq!(status.spotlight, Some(p(1, "Avery")));
    }

    #[tokio::test]
    async fn opt_out_blocks_claims_until_opt_in() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();
        let (conn, mut rx) = add_conn(&hub, Some(p(1, "Avery"))).await;

        handle_command(Command::OptOut, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
        handle_command(Command::Claim, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.error.unwrap().name, "E_OPTED_OUT");

        handle_command(Command::OptIn, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
        handle_command(Command::Claim, conn, &hub).await.unwrap();
        assert_eq!(next_reply(&mut rx).await.status, AckStatus::Ok);
    }

    #[tokio::test]
    async fn random_claim_picks_a_connected_eligible_participant() {
        let hub = Arc::new(Mutex::new(HubState::default()));
        hub.lock().await.session.open_session().unwrap();
        let (admin, mut admin_rx) = add_conn(&hub, Some(p(1, "Avery"))).await;
        let (_other, _other_rx) = add_conn(&hub, Some(p(2, "Blair"))).await;
        hub.lock().await.session.opt_out(2);

        handle_command(Command::ClaimRandom, admin, &hub).await.unwrap();
        assert_eq!(next_reply(&mut admin_rx).await.status, AckStatus::Ok);
        let h = hub.lock().await;
        assert_eq!(h.session.spotlight().map(|s| s.id), Some(1));
    }
}

struct ConnState {
    participant: Option<Participant>,
    tx: tokio::sync::mpsc::Sender<Vec<u8>>,
}

struct HubState {
    next_conn_id: u64,
    next_ts: u64,
    session: SpotlightSession,
    conns: HashMap<u64, ConnState>,
    close_timer: Option<JoinHandle<()>>,
    close_after: Duration,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            next_conn_id: 0,
            next_ts: 0,
            session: SpotlightSession::new(),
            conns: HashMap::new(),
            close_timer: None,
            close_after: Duration::from_secs(86_400),
        }
    }
}

impl HubState {
    fn alloc_ts(&mut self) -> u64 {
        let t = self.next_ts;
        self.next_ts += 1;
        t
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Config (best-effort)
    let config: Option<ConfigService<FsConfigStore>> =
        FsConfigStore::new().map(ConfigService::new).ok();

    let prefs: HostPrefs = config
        .as_ref()
        .and_then(|c| c.load::<HostPrefs>("spotlight_hub").ok().flatten())
        .unwrap_or_default();

    // Persist defaults once if absent
    if let Some(cfg) = &config {
        let _ = cfg.save("spotlight_hub", &prefs);
    }

    let socket_path = prefs.socket_path.clone();

    let hub = Arc::new(Mutex::new(HubState {
        close_after: Duration::from_secs(prefs.close_after_claim_secs),
        ..HubState::default()
    }));

    // Daily open tick
    tokio::spawn(sched::run_open_ticker(
        Arc::clone(&hub),
        Duration::from_secs(prefs.open_interval_secs),
    ));

    // Remove stale socket if present
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;
    info!(
        "spotlight hub listening at {} (community channel: {})",
        socket_path, prefs.community_channel
    );

    loop {
        let (stream, _) = listener.accept().await?;
        let hub_state = hub.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_client(stream, hub_state).await {
                warn!(?err, "client handler error");
            }
        });
    }
}

async fn handle_client(stream: UnixStream, hub: Arc<Mutex<HubState>>) -> Result<()> {
    let (mut reader, writer) = tokio::io::split(stream);

    // allocate conn id and outbox
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<u8>>(256);
    let conn_id = {
        let mut h = hub.lock().await;
        let id = h.next_conn_id;
        h.next_conn_id += 1;
        h.conns.insert(
            id,
            ConnState {
                participant: None,
                tx,
            },
        );
        id
    };

    // writer task
    tokio::spawn(async move {
        let mut ws = writer;
        while let Some(buf) = rx.recv().await {
            if ws.write_all(&buf).await.is_err() {
                break;
            }
        }
    });

    const MAX_PAYLOAD: usize = 1024 * 1024;
    let mut read_buf: Vec<u8> = vec![0u8; 16 * 1024];
    let mut acc: Vec<u8> = Vec::with_capacity(32 * 1024);
    loop {
        let n = reader.read(&mut read_buf).await?;
        if n == 0 {
            break;
        }
        acc.extend_from_slice(&read_buf[..n]);

        // process as many frames as available
        loop {
            if acc.len() < 12 {
                break;
            }
            let len = u32::from_be_bytes([acc[8], acc[9], acc[10], acc[11]]) as usize;
            if len > MAX_PAYLOAD {
                warn!("payload too large from conn {}", conn_id);
                cleanup_conn(&hub, conn_id).await;
                return Ok(());
            }
            let frame_len = 12usize
                .checked_add(len)
                .and_then(|v| v.checked_add(32))
                .unwrap_or(usize::MAX);
            if frame_len == usize::MAX || acc.len() < frame_len {
                // need more data
                break;
            }
            let packet: Vec<u8> = acc.drain(..frame_len).collect();
            match decode_command(&packet) {
                Ok((cmd, _ts, _used)) => {
                    if let Err(err) = handle_command(cmd, conn_id, &hub).await {
                        warn!(?err, "dropping connection {}", conn_id);
                        cleanup_conn(&hub, conn_id).await;
                        return Ok(());
                    }
                }
                Err(err) => {
                    warn!(?err, "failed to decode packet");
                    cleanup_conn(&hub, conn_id).await;
                    return Ok(());
                }
            }
        }
    }

    cleanup_conn(&hub, conn_id).await;
    Ok(())
}

async fn cleanup_conn(hub: &Arc<Mutex<HubState>>, conn_id: u64) {
    let mut h = hub.lock().await;
    h.conns.remove(&conn_id);
}

// Handle a single inbound command from a connection. Session errors become
// rejecting replies; only transport faults bubble up as Err.
async fn handle_command(cmd: Command, conn_id: u64, hub: &Arc<Mutex<HubState>>) -> Result<()> {
    match cmd {
        Command::Hello(payload) => {
            let mut h = hub.lock().await;
            let name = payload.participant.display_name.clone();
            if let Some(conn) = h.conns.get_mut(&conn_id) {
                conn.participant = Some(payload.participant);
            }
            reply(&mut h, conn_id, ReplyPayload::ok(format!("hello, {name}"))).await?;
        }
        Command::OpenSession => {
            let mut h = hub.lock().await;
            match h.session.open_session() {
                Ok(()) => {
                    reply(
                        &mut h,
                        conn_id,
                        ReplyPayload::ok("spotlight session opened".to_string()),
                    )
                    .await?;
                    announce_open(&mut h).await?;
                }
                Err(e) => reply(&mut h, conn_id, ReplyPayload::err(e.name(), e.to_string())).await?,
            }
        }
        Command::Claim => {
            let mut h = hub.lock().await;
            let Some(me) = identity(&h, conn_id) else {
                return no_identity(&mut h, conn_id).await;
            };
            match h.session.claim(me.clone()) {
                Ok(()) => {
                    reply(
                        &mut h,
                        conn_id,
                        ReplyPayload::ok("you claimed today's spotlight".to_string()),
                    )
                    .await?;
                    announce_claimed(&mut h, &me).await?;
                    sched::arm_close_timer(&mut h, hub);
                }
                Err(e) => reply(&mut h, conn_id, ReplyPayload::err(e.name(), e.to_string())).await?,
            }
        }
        Command::ClaimRandom => {
            let mut h = hub.lock().await;
            // every identified connection is a candidate, once per id
            let mut by_id: HashMap<u64, Participant> = HashMap::new();
            for conn in h.conns.values() {
                if let Some(p) = &conn.participant {
                    by_id.entry(p.id).or_insert_with(|| p.clone());
                }
            }
            let candidates: Vec<Participant> = by_id.into_values().collect();
            let claimed = h.session.claim_random(&mut rand::thread_rng(), &candidates);
            match claimed {
                Ok(chosen) => {
                    reply(
                        &mut h,
                        conn_id,
                        ReplyPayload::ok(format!("{} is today's spotlight", chosen.display_name)),
                    )
                    .await?;
                    announce_claimed(&mut h, &chosen).await?;
                    sched::arm_close_timer(&mut h, hub);
                }
                Err(e) => reply(&mut h, conn_id, ReplyPayload::err(e.name(), e.to_string())).await?,
            }
        }
        Command::Compliment(payload) => {
            let mut h = hub.lock().await;
            let Some(me) = identity(&h, conn_id) else {
                return no_identity(&mut h, conn_id).await;
            };
            let spotlight = h.session.spotlight().cloned();
            match h
                .session
                .submit(&me, payload.channel, payload.mode, payload.text)
            {
                Ok(()) => {
                    let ack = match payload.mode {
                        ContributionMode::Anonymous => {
                            "your anonymous compliment has been saved".to_string()
                        }
                        ContributionMode::Public => {
                            let name = spotlight
                                .as_ref()
                                .map_or("the spotlight", |s| s.display_name.as_str());
                            format!("compliment for {name} noted")
                        }
                    };
                    reply(&mut h, conn_id, ReplyPayload::ok(ack)).await?;
                    if payload.mode == ContributionMode::Public {
                        if let Some(s) = spotlight {
                            broadcast(
                                &mut h,
                                NotifyKind::Info,
                                format!("A compliment for {} was noted", s.display_name),
                                None,
                            )
                            .await?;
                        }
                    }
                }
                Err(e) => reply(&mut h, conn_id, ReplyPayload::err(e.name(), e.to_string())).await?,
            }
        }
        Command::OptOut => {
            let mut h = hub.lock().await;
            let Some(me) = identity(&h, conn_id) else {
                return no_identity(&mut h, conn_id).await;
            };
            h.session.opt_out(me.id);
            reply(
                &mut h,
                conn_id,
                ReplyPayload::ok("you will no longer be spotlighted".to_string()),
            )
            .await?;
        }
        Command::OptIn => {
            let mut h = hub.lock().await;
            let Some(me) = identity(&h, conn_id) else {
                return no_identity(&mut h, conn_id).await;
            };
            h.session.opt_in(me.id);
            reply(
                &mut h,
                conn_id,
                ReplyPayload::ok("you can be spotlighted again".to_string()),
            )
            .await?;
        }
        Command::CloseSession => {
            let mut h = hub.lock().await;
            sched::disarm_close_timer(&mut h);
            let delivery = h.session.close_and_deliver();
            reply(
                &mut h,
                conn_id,
                ReplyPayload::ok("spotlight session closed".to_string()),
            )
            .await?;
            if let Some(delivery) = delivery {
                emit_delivery(&mut h, &delivery).await?;
            }
        }
        Command::Reopen => {
            let mut h = hub.lock().await;
            sched::disarm_close_timer(&mut h);
            let delivery = h.session.force_reopen();
            reply(
                &mut h,
                conn_id,
                ReplyPayload::ok("spotlight session reopened".to_string()),
            )
            .await?;
            if let Some(delivery) = delivery {
                emit_delivery(&mut h, &delivery).await?;
            }
            announce_open(&mut h).await?;
        }
        Command::Status => {
            let mut h = hub.lock().await;
            let report = StatusReportPayload {
                state: h.session.state(),
                spotlight: h.session.spotlight().cloned(),
            };
            send_to_conn(&mut h, conn_id, &ServerMessage::Status(report)).await?;
        }
    }
    Ok(())
}

fn identity(h: &HubState, conn_id: u64) -> Option<Participant> {
    h.conns.get(&conn_id).and_then(|c| c.participant.clone())
}

async fn no_identity(h: &mut HubState, conn_id: u64) -> Result<()> {
    reply(
        h,
        conn_id,
        ReplyPayload::err("E_NO_IDENTITY", "introduce yourself with hello first"),
    )
    .await
}

async fn reply(h: &mut HubState, conn_id: u64, payload: ReplyPayload) -> Result<()> {
    send_to_conn(h, conn_id, &ServerMessage::Reply(payload)).await
}

async fn send_to_conn(h: &mut HubState, conn_id: u64, msg: &ServerMessage) -> Result<()> {
    let ts = h.alloc_ts();
    if let Some(conn) = h.conns.get(&conn_id) {
        let pkt = encode_server(msg, ts)?;
        let _ = conn.tx.send(pkt).await;
    }
    Ok(())
}

async fn broadcast(
    h: &mut HubState,
    kind: NotifyKind,
    title: String,
    body: Option<String>,
) -> Result<()> {
    let ts = h.alloc_ts();
    let pkt = encode_server(
        &ServerMessage::Notification(Notification { kind, title, body }),
        ts,
    )?;
    for conn in h.conns.values() {
        let _ = conn.tx.send(pkt.clone()).await;
    }
    Ok(())
}

async fn announce_open(h: &mut HubState) -> Result<()> {
    broadcast(
        h,
        NotifyKind::Info,
        "Daily spotlight is now open".to_string(),
        Some(
            "First to claim becomes today's spotlight; everyone else can send \
             compliments once it is claimed."
                .to_string(),
        ),
    )
    .await
}

async fn announce_claimed(h: &mut HubState, spotlight: &Participant) -> Result<()> {
    broadcast(
        h,
        NotifyKind::Info,
        format!("{} is today's spotlight", spotlight.display_name),
        Some(
            "Send public compliments from the community channel, or anonymous \
             ones from a DM."
                .to_string(),
        ),
    )
    .await
}

/// Emit one delivery to both sinks: the DM to the spotlighted participant's
/// connections and the community broadcast. Both are best-effort; the
/// session has already reset by the time this runs.
async fn emit_delivery(h: &mut HubState, delivery: &Delivery) -> Result<()> {
    let ts = h.alloc_ts();
    let pkt = encode_server(&ServerMessage::Delivery(delivery.clone()), ts)?;
    let recipient = delivery.recipient.id;
    let mut reached_dm = false;
    for conn in h.conns.values() {
        if conn.participant.as_ref().map(|p| p.id) == Some(recipient) {
            let _ = conn.tx.send(pkt.clone()).await;
            reached_dm = true;
        }
    }
    if !reached_dm {
        warn!(
            "could not DM {}; recipient not connected",
            delivery.recipient.display_name
        );
    }
    broadcast(
        h,
        NotifyKind::Info,
        format!("Compliments for {}", delivery.recipient.display_name),
        Some(render_snapshot(&delivery.snapshot)),
    )
    .await
}

fn render_snapshot(snapshot: &LedgerSnapshot) -> String {
    let public = if snapshot.public.is_empty() {
        "(none)".to_string()
    } else {
        snapshot
            .public
            .iter()
            .map(|e| format!("- {}: {}", e.author, e.text))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let anonymous = if snapshot.anonymous.is_empty() {
        "(none)".to_string()
    } else {
        snapshot
            .anonymous
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("Public:\n{public}\n\nAnonymous:\n{anonymous}")
}
