use crate::io::{Io, Pipe};
use anyhow::Error as Anyhow;
use clap::Parser;
use derive_more::{Display, Error};
use futures_util::future::{FutureExt, LocalBoxFuture, OptionFuture};
use lib::authority::{Authority, AuthorityConfig, AuthorityError, HttpAuthority, Reply};
use lib::chess::{Color, Move, Square};
use lib::history::Transcript;
use lib::session::{GameSession, Submission};
use std::{io, str::FromStr};
use tokio::io::{stdin, stdout};
use tracing::{error, instrument};

const HELP: &str = "\
commands:
  <square>           select a piece or move the selected piece there, e.g. `e2`
  <move>             play a move directly, e.g. `e2e4` or `e7e8n`
  new [white|black]  start a new game
  flip               turn the board around
  board              show the board
  history            show the moves played so far
  fen                show the current position
  help               show this message
  quit               leave";

/// Play a game against the authority.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// The side to play.
    #[clap(short, long, default_value = "white")]
    color: Color,

    /// Show the board from the opponent's side.
    #[clap(short, long)]
    flip: bool,
}

impl Default for Play {
    fn default() -> Self {
        Play {
            color: Color::White,
            flip: false,
        }
    }
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self, config: AuthorityConfig) -> Result<(), Anyhow> {
        let mut io = Pipe::new(stdout(), stdin());

        match HttpAuthority::new(&config) {
            Ok(authority) => Client::new(self.color, self.flip).run(&mut io, &authority).await,
            Err(e) => {
                error!(error = %e);
                misconfigured(&mut io, &e.to_string()).await
            }
        }
    }
}

/// A line of user input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Command {
    Click(Square),
    Play(Move),
    New(Option<Color>),
    Flip,
    Board,
    History,
    Fen,
    Help,
    Quit,
}

/// The reason why parsing [`Command`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "unknown command `{}`, type `help` for a list of commands", _0)]
struct ParseCommandError(#[error(not(source))] String);

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseCommandError(s.trim().into());
        let mut args = s.split_whitespace();
        let cmd = args.next().ok_or_else(unknown)?;

        let command = match cmd {
            "new" => match args.next() {
                None => Command::New(None),
                Some(c) => Command::New(Some(c.parse().map_err(|_| unknown())?)),
            },

            "flip" => Command::Flip,
            "board" => Command::Board,
            "history" => Command::History,
            "fen" => Command::Fen,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            s if s.len() == 2 => Command::Click(s.parse().map_err(|_| unknown())?),
            s => Command::Play(s.parse().map_err(|_| unknown())?),
        };

        match args.next() {
            None => Ok(command),
            Some(_) => Err(unknown()),
        }
    }
}

type Settlement = (Submission, Result<Reply, AuthorityError>);

fn dispatch<A: Authority + ?Sized>(authority: &A, s: Submission) -> LocalBoxFuture<'_, Settlement> {
    async move {
        let result = s.send(authority).await;
        (s, result)
    }
    .boxed_local()
}

/// Reads a line, treating the end of input as `quit`.
async fn recv<T: Io>(io: &mut T) -> io::Result<Option<String>> {
    match io.recv().await {
        Ok(line) => Ok(Some(line)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Keeps reporting a configuration error until the user leaves.
async fn misconfigured<T: Io>(io: &mut T, reason: &str) -> Result<(), Anyhow> {
    loop {
        io.send(&format!("error: {}", reason)).await?;
        io.prompt("> ").await?;

        match recv(io).await?.map(|l| l.parse::<Command>()) {
            None | Some(Ok(Command::Quit)) => return Ok(()),
            Some(Ok(Command::Help)) => io.send(HELP).await?,
            _ => {}
        }
    }
}

struct Client {
    session: GameSession,
    color: Color,
    flip: bool,
}

impl Client {
    fn new(color: Color, flip: bool) -> Self {
        Client {
            session: GameSession::default(),
            color,
            flip,
        }
    }

    fn perspective(&self) -> Color {
        if self.flip {
            !self.session.color()
        } else {
            self.session.color()
        }
    }

    async fn render<T: Io>(&self, io: &mut T) -> io::Result<()> {
        io.send(&self.session.board(self.perspective()).to_string()).await?;

        let mut status = format!("{}, {}", self.session.phase(), self.session.status());
        if let Some(game) = self.session.game() {
            status = format!("game {}: {}", game, status);
        }

        io.send(&status).await?;

        if let Some(e) = self.session.error() {
            io.send(&format!("error: {}", e)).await?;
        }

        Ok(())
    }

    async fn run<T: Io, A: Authority + ?Sized>(mut self, io: &mut T, authority: &A) -> Result<(), Anyhow> {
        self.session.create(authority, self.color).await;
        self.render(io).await?;

        let mut pending: Option<LocalBoxFuture<'_, Settlement>> = None;

        loop {
            io.prompt("> ").await?;

            tokio::select! {
                biased;

                Some((submission, result)) = OptionFuture::from(pending.as_mut()) => {
                    pending = None;
                    io.send("").await?;
                    self.session.settle(&submission, result);
                    self.render(io).await?;
                }

                line = recv(io) => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }

                    match line.parse::<Command>() {
                        Ok(Command::Click(s)) => {
                            self.session.clear_error();
                            if let Some(submission) = self.session.click(s) {
                                pending = Some(dispatch(authority, submission));
                            }

                            self.render(io).await?;
                        }

                        Ok(Command::Play(m)) => {
                            self.session.clear_error();
                            match self.session.play(m) {
                                Some(submission) => pending = Some(dispatch(authority, submission)),
                                None => io.send(&format!("cannot play `{}` now", m)).await?,
                            }

                            self.render(io).await?;
                        }

                        Ok(Command::New(color)) => {
                            self.color = color.unwrap_or(self.color);
                            pending = None;
                            self.session.create(authority, self.color).await;
                            self.render(io).await?;
                        }

                        Ok(Command::Flip) => {
                            self.flip = !self.flip;
                            self.render(io).await?;
                        }

                        Ok(Command::Board) => self.render(io).await?,

                        Ok(Command::History) => match self.session.history() {
                            [] => io.send("no moves yet").await?,
                            h => io.send(&Transcript(h).to_string()).await?,
                        },

                        Ok(Command::Fen) => io.send(&self.session.serialize()).await?,
                        Ok(Command::Help) => io.send(HELP).await?,
                        Ok(Command::Quit) => break,
                        Err(e) => io.send(&e.to_string()).await?,
                    }
                }
            }
        }

        self.session.dispose();
        Ok(())
    }
}
