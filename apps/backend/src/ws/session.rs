//! Per-connection session actor.
//!
//! Each WebSocket connection owns one `WsSession` with a process-unique
//! player id. The session decodes client commands, drives the room service,
//! and fans results out through the hub. Connection teardown (close frame,
//! protocol error, or heartbeat timeout) runs the leave flow, so a vanished
//! player can never hold a round open.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};

use crate::domain::room::PlayerId;
use crate::domain::round_flow::RoundTransition;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;
use crate::services::registry::Removal;
use crate::services::rooms::GenerationOutcome;
use crate::state::app_state::AppState;
use crate::ws::hub::OutboundEvent;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    player_id: PlayerId,
    app_state: web::Data<AppState>,
    /// Code of the room this session currently belongs to.
    room_code: Option<String>,

    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,
}

impl WsSession {
    fn new(app_state: web::Data<AppState>) -> Self {
        Self {
            player_id: PlayerId::new(),
            app_state,
            room_code: None,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        self.send_error(ctx, code, message);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    /// Rejected actions keep the socket open; the initiator gets the typed
    /// reason and can retry.
    fn send_domain_error(&self, ctx: &mut ws::WebsocketContext<Self>, err: DomainError) {
        let err = AppError::from(err);
        self.send_error(ctx, err.code(), err.detail());
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    player_id = %actor.player_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn handle_create(&mut self, ctx: &mut ws::WebsocketContext<Self>, player_name: String) {
        // A session can inhabit one room at a time.
        self.leave_current_room();
        match self.app_state.rooms.create_room(self.player_id, &player_name) {
            Ok(created) => {
                self.app_state.hub.register(
                    &created.code,
                    self.player_id,
                    ctx.address().recipient::<OutboundEvent>(),
                );
                self.room_code = Some(created.code.clone());
                Self::send_json(
                    ctx,
                    &ServerMsg::RoomCreated {
                        room_code: created.code.clone(),
                    },
                );
                self.app_state.hub.broadcast(
                    &created.code,
                    ServerMsg::PlayersUpdated {
                        players: created.roster,
                    },
                );
            }
            Err(err) => self.send_domain_error(ctx, err),
        }
    }

    fn handle_join(
        &mut self,
        ctx: &mut ws::WebsocketContext<Self>,
        room_code: String,
        player_name: String,
    ) {
        self.leave_current_room();
        match self
            .app_state
            .rooms
            .join_room(&room_code, self.player_id, &player_name)
        {
            Ok(joined) => {
                self.app_state.hub.register(
                    &joined.code,
                    self.player_id,
                    ctx.address().recipient::<OutboundEvent>(),
                );
                self.room_code = Some(joined.code.clone());
                Self::send_json(
                    ctx,
                    &ServerMsg::RoomJoined {
                        room_code: joined.code.clone(),
                    },
                );
                self.app_state.hub.broadcast(
                    &joined.code,
                    ServerMsg::PlayersUpdated {
                        players: joined.roster,
                    },
                );
            }
            Err(err) => self.send_domain_error(ctx, err),
        }
    }

    fn handle_start(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(code) = self.room_code.clone() else {
            self.send_error(ctx, ErrorCode::NotInRoom, "Join a room before starting a game");
            return;
        };
        match self.app_state.rooms.start_game(&code, self.player_id) {
            Ok(started) => self.app_state.hub.broadcast(
                &code,
                ServerMsg::GameStarted {
                    round: started.round,
                    max_rounds: started.max_rounds,
                },
            ),
            Err(err) => self.send_domain_error(ctx, err),
        }
    }

    fn handle_submit(&mut self, ctx: &mut ws::WebsocketContext<Self>, sentence: String) {
        let Some(code) = self.room_code.clone() else {
            self.send_error(ctx, ErrorCode::NotInRoom, "Join a room before submitting");
            return;
        };
        match self
            .app_state
            .rooms
            .submit_sentence(&code, self.player_id, &sentence)
        {
            Ok(transition) => self.dispatch_transition(&code, transition),
            Err(err) => self.send_domain_error(ctx, err),
        }
    }

    /// Translate a round transition into outbound events. The next-round
    /// prompt is identical for every player, so it goes out as a broadcast.
    fn dispatch_transition(&self, code: &str, transition: RoundTransition) {
        let hub = &self.app_state.hub;
        match transition {
            RoundTransition::Waiting(progress) => {
                hub.broadcast(
                    code,
                    ServerMsg::SubmissionReceived {
                        player_id: self.player_id,
                        submissions_count: progress.submissions_count,
                        total_players: progress.total_players,
                    },
                );
            }
            RoundTransition::RoundAdvanced {
                round,
                max_rounds,
                last_sentence,
            } => {
                hub.broadcast(
                    code,
                    ServerMsg::NextRound {
                        round,
                        max_rounds,
                        last_sentence,
                    },
                );
            }
            RoundTransition::GameEnded { chains } => {
                hub.broadcast(code, ServerMsg::GeneratingComics);
                self.spawn_generation(code.to_string(), chains);
            }
        }
    }

    /// Generation outlives the triggering session, so it runs in a detached
    /// task holding its own handles.
    fn spawn_generation(&self, code: String, chains: BTreeMap<PlayerId, Vec<String>>) {
        let rooms = Arc::clone(&self.app_state.rooms);
        let hub = Arc::clone(&self.app_state.hub);
        tokio::spawn(async move {
            match rooms.run_generation(&code, chains).await {
                GenerationOutcome::Ready(comics) => {
                    hub.broadcast(&code, ServerMsg::ComicsReady { comics });
                }
                GenerationOutcome::Failed => {
                    hub.broadcast(
                        &code,
                        ServerMsg::Error {
                            code: ErrorCode::GenerationFailed,
                            message: "Failed to generate comics. Please try again.".to_string(),
                        },
                    );
                }
                GenerationOutcome::RoomGone => {}
            }
        });
    }

    fn leave_current_room(&mut self) {
        let Some(code) = self.room_code.take() else {
            return;
        };
        self.app_state.hub.unregister(&code, self.player_id);
        match self.app_state.rooms.leave_room(&code, self.player_id) {
            Removal::NotFound | Removal::Destroyed => {}
            Removal::Remaining {
                players,
                transition,
            } => {
                self.app_state
                    .hub
                    .broadcast(&code, ServerMsg::PlayersUpdated { players });
                if let Some(transition) = transition {
                    self.dispatch_transition(&code, transition);
                }
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(player_id = %self.player_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.leave_current_room();
        info!(player_id = %self.player_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed message");
                    return;
                };

                match cmd {
                    ClientMsg::CreateRoom { player_name } => self.handle_create(ctx, player_name),
                    ClientMsg::JoinRoom {
                        room_code,
                        player_name,
                    } => self.handle_join(ctx, room_code, player_name),
                    ClientMsg::StartGame => self.handle_start(ctx),
                    ClientMsg::SubmitSentence { sentence } => self.handle_submit(ctx, sentence),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    player_id = %self.player_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<OutboundEvent> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: OutboundEvent, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg.0);
    }
}
