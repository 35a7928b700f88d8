use crate::board::{Color, Square};
use crate::evaluation::{DrawReason, GameState};
use crate::game::Game;
use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

/// Line-oriented front end. Squares are given as `row col`, both 0-7, with row 0
/// being Black's back rank.
pub struct ConsoleHandler {
    game: Game,
    player: Color,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleHandler {
    pub fn new() -> Self {
        ConsoleHandler {
            game: Game::new(),
            player: Color::White,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        print!("{}", self.game.board());
        stdout.flush()?;

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }
            match self.handle_command(command) {
                Ok(response) => print!("{}", response),
                Err(e) => eprintln!("error: {:#}", e),
            }
            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        match parts[0] {
            "new" => Ok(self.handle_new()),
            "side" => self.handle_side(&parts[1..]),
            "board" => Ok(self.game.board().to_string()),
            "moves" => self.handle_moves(&parts[1..]),
            "move" => self.handle_move(&parts[1..]),
            "go" => Ok(self.handle_go()),
            "depth" => self.handle_depth(&parts[1..]),
            "status" => Ok(format!("{}\n", describe(self.game.status()))),
            "tree" => self.handle_tree(&parts[1..]),
            "help" => Ok(HELP.to_string()),
            other => bail!("unknown command `{}`", other),
        }
    }

    fn handle_new(&mut self) -> String {
        let depth = self.game.opponent_mut().max_depth();
        self.game = Game::new();
        self.game.opponent_mut().set_max_depth(depth);
        let mut response = self.game.board().to_string();
        if self.player == Color::Black {
            response.push_str(&self.handle_go());
        }
        response
    }

    fn handle_side(&mut self, parts: &[&str]) -> Result<String> {
        self.player = match parts.first() {
            Some(&"white") => Color::White,
            Some(&"black") => Color::Black,
            _ => bail!("usage: side white|black"),
        };
        let mut response = format!("playing {}\n", self.player);
        if self.game.board().side_to_move != self.player && !self.game.status().is_over() {
            response.push_str(&self.handle_go());
        }
        Ok(response)
    }

    fn handle_moves(&self, parts: &[&str]) -> Result<String> {
        let square = parse_square(parts)?;
        let destinations = self.game.legal_destinations(square);
        let list: Vec<String> = destinations.iter().map(|sq| sq.to_string()).collect();
        Ok(format!("{}\n", list.join(" ")))
    }

    fn handle_move(&mut self, parts: &[&str]) -> Result<String> {
        if parts.len() != 4 {
            bail!("usage: move <row> <col> <row> <col>");
        }
        if self.game.status().is_over() {
            bail!("the game is over");
        }
        let from = parse_square(&parts[..2])?;
        let to = parse_square(&parts[2..])?;
        let mv = self
            .game
            .apply_user_move(from, to)
            .with_context(|| format!("illegal move {} -> {}", from, to))?;

        let status = self.game.status();
        let mut response = format!("played {}\n{}\n", mv, describe(status));
        if !status.is_over() {
            response.push_str(&self.handle_go());
        }
        Ok(response)
    }

    fn handle_go(&mut self) -> String {
        match self.game.opponent_move() {
            Some(mv) => {
                let nodes = self.game.opponent_mut().get_nodes_searched();
                format!(
                    "opponent plays {} ({} nodes)\n{}{}\n",
                    mv,
                    nodes,
                    self.game.board(),
                    describe(self.game.status())
                )
            }
            None => format!("{}\n", describe(self.game.status())),
        }
    }

    fn handle_depth(&mut self, parts: &[&str]) -> Result<String> {
        let depth: u32 = parts
            .first()
            .context("usage: depth <plies>")?
            .parse()
            .context("depth must be a positive number")?;
        self.game.opponent_mut().set_max_depth(depth);
        Ok(format!("search depth {}\n", self.game.opponent_mut().max_depth()))
    }

    fn handle_tree(&mut self, parts: &[&str]) -> Result<String> {
        let level = match parts.first() {
            Some(s) => s.parse().context("tree level must be a number")?,
            None => 1,
        };
        let board = *self.game.board();
        let tree = self.game.opponent_mut().search(&board);
        Ok(tree.render(level))
    }
}

const HELP: &str = "\
new                      start a new game
side white|black         choose your colour
board                    print the board
moves <row> <col>        legal destinations of a piece
move <r> <c> <r> <c>     play a move (king onto own rook castles)
go                       let the opponent move
depth <plies>            set the search depth
status                   report check, mate or draw
tree [level]             dump the search tree
quit                     leave
";

fn parse_square(parts: &[&str]) -> Result<Square> {
    if parts.len() != 2 {
        bail!("expected a square as <row> <col>");
    }
    let row: usize = parts[0].parse().with_context(|| format!("invalid row `{}`", parts[0]))?;
    let col: usize = parts[1].parse().with_context(|| format!("invalid column `{}`", parts[1]))?;
    if row > 7 || col > 7 {
        bail!("square ({}, {}) is off the board", row, col);
    }
    Ok(Square::new(row, col))
}

fn describe(state: GameState) -> String {
    match state {
        GameState::Normal => "in play".to_string(),
        GameState::Check => "check".to_string(),
        GameState::Checkmate(winner) => format!("checkmate, {} wins", winner),
        GameState::Stalemate => "stalemate".to_string(),
        GameState::Draw(DrawReason::InsufficientMaterial) => "draw by insufficient material".to_string(),
        GameState::Draw(DrawReason::FiftyMoveRule) => "draw by the fifty-move rule".to_string(),
        GameState::Draw(DrawReason::Stalemate) => "stalemate".to_string(),
    }
}
