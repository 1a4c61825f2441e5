//! Generic runtime for session orchestration.
//!
//! The Runtime drives one session's event loop, coordinating between:
//! - [`SessionHandle`]: commands from the owning view
//! - [`Driver`]: the streaming socket
//! - the tick timer, which exists exactly while the session asks for it
//!
//! The runtime exclusively owns the timer and the socket. Every exit path
//! (shutdown command, all handles dropped, the future itself being dropped)
//! releases both. Commands are served during the socket handshake too, so a
//! server that never answers cannot pin the runtime.

use std::{collections::VecDeque, future};

use neuroviz_core::{ConnectionState, SessionAction, SessionEvent, StreamSession};
use tokio::{
    sync::{mpsc, watch},
    time::{self, Instant, Interval, MissedTickBehavior},
};

use crate::{Driver, SessionCommand, SessionHandle, SessionView};

/// Capacity of the command queue between handles and the runtime.
const COMMAND_QUEUE_DEPTH: usize = 32;

/// Generic runtime that owns a [`StreamSession`], its timer and its socket.
///
/// # Type Parameters
///
/// - `D`: Platform-specific socket driver
pub struct Runtime<D: Driver> {
    driver: D,
    session: StreamSession,
    ticker: Option<Interval>,
    commands: mpsc::Receiver<SessionCommand>,
    view: watch::Sender<SessionView>,
    /// Shutdown arrived while an action was in flight.
    exiting: bool,
}

/// What a command asks of the runtime.
enum CommandOutcome {
    Execute(Vec<SessionAction>),
    Exit,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime for `session` and a handle to control it.
    pub fn new(driver: D, session: StreamSession) -> (Self, SessionHandle) {
        let (command_tx, commands) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (view, view_rx) = watch::channel(SessionView::from_session(&session));
        let runtime = Self { driver, session, ticker: None, commands, view, exiting: false };
        (runtime, SessionHandle::new(command_tx, view_rx))
    }

    /// Run the event loop until shutdown.
    ///
    /// Each iteration waits for exactly one of: a command, an inbound frame
    /// (only while connected), or a timer tick (only while the timer runs).
    /// Commands win ties so a stop is never starved by a busy socket.
    ///
    /// Returns the torn-down session.
    pub async fn run(mut self) -> StreamSession {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("all session handles dropped");
                        break;
                    };
                    if !self.handle_command(command).await {
                        break;
                    }
                },
                frame = next_frame(&mut self.driver) => {
                    let event = match frame {
                        Some(Ok(text)) => SessionEvent::FrameReceived(text),
                        Some(Err(e)) => SessionEvent::Failed { reason: e.to_string() },
                        None => SessionEvent::Closed { reason: "closed by server".to_owned() },
                    };
                    self.dispatch(event).await;
                },
                () = next_tick(&mut self.ticker) => {
                    self.dispatch(SessionEvent::Tick).await;
                },
            }
            self.publish();
            if self.exiting {
                break;
            }
        }

        let actions = self.session.teardown();
        self.execute(actions).await;
        self.publish();
        tracing::debug!("session runtime stopped");
        self.session
    }

    /// Apply one command. Returns `false` if the runtime should exit.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match apply_command(&mut self.session, command) {
            CommandOutcome::Execute(actions) => {
                self.execute(actions).await;
                true
            },
            CommandOutcome::Exit => false,
        }
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        let actions = self.session.handle(event);
        self.execute(actions).await;
    }

    /// Execute session actions, feeding resulting events back until quiet.
    async fn execute(&mut self, initial_actions: Vec<SessionAction>) {
        let mut pending: VecDeque<SessionAction> = initial_actions.into();

        while let Some(action) = pending.pop_front() {
            match action {
                SessionAction::Connect { url } => {
                    let actions = self.connect(&url).await;
                    pending.extend(actions);
                },
                SessionAction::Send(message) => {
                    let text = match message.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to encode control message");
                            continue;
                        },
                    };
                    if let Err(e) = self.driver.send_text(text).await {
                        tracing::warn!(error = %e, %message, "failed to send control message");
                        self.driver.close().await;
                        pending.extend(self.session.handle(SessionEvent::Failed {
                            reason: e.to_string(),
                        }));
                    }
                },
                SessionAction::Close => self.driver.close().await,
                SessionAction::StartTimer { interval } => {
                    let mut ticker = time::interval_at(Instant::now() + interval, interval);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    self.ticker = Some(ticker);
                },
                SessionAction::StopTimer => self.ticker = None,
            }
        }
    }

    /// Run the handshake while still serving commands.
    ///
    /// Commands that leave the session connecting are applied and their
    /// actions run after the handshake settles. A disconnect abandons the
    /// handshake; a shutdown or the last handle going away abandons it and
    /// marks the runtime as exiting. The configured deadline turns a stalled
    /// handshake into `Failed`.
    async fn connect(&mut self, url: &str) -> Vec<SessionAction> {
        publish(&self.view, &self.session);

        let deadline = self.session.config().connect_timeout;
        let mut deferred = Vec::new();
        let outcome = {
            let handshake = time::timeout(deadline, self.driver.connect(url));
            tokio::pin!(handshake);

            loop {
                tokio::select! {
                    biased;

                    command = self.commands.recv() => {
                        let outcome = match command {
                            Some(command) => apply_command(&mut self.session, command),
                            None => CommandOutcome::Exit,
                        };
                        match outcome {
                            CommandOutcome::Exit => {
                                tracing::debug!(%url, "abandoning handshake, runtime exiting");
                                self.exiting = true;
                                break None;
                            },
                            CommandOutcome::Execute(actions) => {
                                deferred.extend(actions);
                                publish(&self.view, &self.session);
                                if self.session.connection_state() != ConnectionState::Connecting {
                                    tracing::debug!(%url, "abandoning handshake");
                                    break None;
                                }
                            },
                        }
                    },
                    result = &mut handshake => break Some(result),
                }
            }
        };

        let event = match outcome {
            None => return deferred,
            Some(Ok(Ok(()))) => SessionEvent::Opened,
            Some(Ok(Err(e))) => SessionEvent::Failed { reason: e.to_string() },
            Some(Err(_)) => {
                tracing::warn!(%url, timeout = ?deadline, "handshake timed out");
                SessionEvent::Failed { reason: format!("handshake timed out after {deadline:?}") }
            },
        };
        deferred.extend(self.session.handle(event));
        deferred
    }

    fn publish(&self) {
        publish(&self.view, &self.session);
    }

    /// Session owned by this runtime.
    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    /// Returns true if the tick timer exists.
    pub fn has_timer(&self) -> bool {
        self.ticker.is_some()
    }
}

fn apply_command(session: &mut StreamSession, command: SessionCommand) -> CommandOutcome {
    let actions = match command {
        SessionCommand::Start => session.start(),
        SessionCommand::Stop => session.stop(),
        SessionCommand::Disconnect => session.disconnect(),
        SessionCommand::Reset => {
            session.reset();
            Vec::new()
        },
        SessionCommand::Select { channel, reply } => {
            let _ = reply.send(session.select_channel(&channel));
            Vec::new()
        },
        SessionCommand::Deselect { channel, reply } => {
            let _ = reply.send(session.deselect_channel(&channel));
            Vec::new()
        },
        SessionCommand::Shutdown => return CommandOutcome::Exit,
    };
    CommandOutcome::Execute(actions)
}

fn publish(view: &watch::Sender<SessionView>, session: &StreamSession) {
    view.send_replace(SessionView::from_session(session));
}

/// Next inbound frame, or pending forever while there is no socket.
async fn next_frame<D: Driver>(driver: &mut D) -> Option<Result<String, D::Error>> {
    if driver.is_connected() { driver.recv_frame().await } else { future::pending().await }
}

/// Next timer tick, or pending forever while there is no timer.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        },
        None => future::pending().await,
    }
}
