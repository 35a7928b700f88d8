use crate::board::Board;
use crate::evaluation::{Evaluator, INFINITY};
use crate::movegen::{Move, MoveGenerator};

/// One position in the game tree.
///
/// `score` is from the point of view of the side that played `mv`. The root has
/// no move and holds the static score for the side to move.
#[derive(Debug, Clone)]
pub struct Node {
    pub mv: Option<Move>,
    pub score: i32,
    pub children: Vec<Node>,
}

impl Node {
    fn new(mv: Option<Move>, score: i32) -> Self {
        Self {
            mv,
            score,
            children: Vec::new(),
        }
    }

    /// Overwrites every interior score with the negated best score of its children.
    fn backup(&mut self) -> i32 {
        if self.children.is_empty() {
            return self.score;
        }
        let best = self
            .children
            .iter_mut()
            .map(Node::backup)
            .max()
            .unwrap_or(self.score);
        self.score = -best;
        self.score
    }

    fn render_into(&self, level: usize, max_level: usize, out: &mut String) {
        if level > max_level {
            return;
        }
        let label = match self.mv {
            Some(mv) => mv.to_string(),
            None => "root".to_string(),
        };
        out.push_str(&format!("{}|__{}: {}\n", "   ".repeat(level), label, self.score));
        for child in &self.children {
            child.render_into(level + 1, max_level, out);
        }
    }
}

/// Fixed-depth game tree built by simulating every legal move on a copy of the board.
pub struct SearchTree {
    pub root: Node,
    nodes: u64,
}

impl SearchTree {
    pub fn build(board: &Board, depth: u32, evaluator: &Evaluator, move_generator: &MoveGenerator) -> Self {
        let mut root = Node::new(None, evaluator.evaluate(board, board.side_to_move));
        let mut nodes = 1;
        expand(&mut root, board, depth, evaluator, move_generator, &mut nodes);
        Self { root, nodes }
    }

    /// Negamax backup from the leaves to the root's children.
    pub fn backup(&mut self) {
        for child in &mut self.root.children {
            child.backup();
        }
    }

    /// The root child with the highest score; the first one found wins ties.
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<&Node> = None;
        for child in &self.root.children {
            if best.map_or(true, |b| child.score > b.score) {
                best = Some(child);
            }
        }
        best.and_then(|node| node.mv)
    }

    pub fn node_count(&self) -> u64 {
        self.nodes
    }

    /// Indented dump of the tree down to `max_level`, one node per line.
    pub fn render(&self, max_level: usize) -> String {
        let mut out = String::new();
        self.root.render_into(0, max_level, &mut out);
        out
    }
}

fn expand(
    node: &mut Node,
    board: &Board,
    remaining: u32,
    evaluator: &Evaluator,
    move_generator: &MoveGenerator,
    nodes: &mut u64,
) {
    if remaining == 0 {
        return;
    }
    let moves = move_generator.generate_moves(board);
    if moves.is_empty() && node.mv.is_some() {
        // Only mate or stalemate leave the side to move without a reply.
        assert!(
            node.score == INFINITY || node.score == 0,
            "position after {:?} has no legal reply but scores {}",
            node.mv,
            node.score
        );
    }

    for mv in moves {
        let mut child_board = *board;
        child_board.make_move(mv);
        let score = -evaluator.evaluate(&child_board, child_board.side_to_move);
        let mut child = Node::new(Some(mv), score);
        *nodes += 1;
        expand(&mut child, &child_board, remaining - 1, evaluator, move_generator, nodes);
        node.children.push(child);
    }
}

/// The automated opponent: builds a tree, backs it up and plays the best move.
pub struct Opponent {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
    max_depth: u32,
    nodes_searched: u64,
}

impl Default for Opponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Opponent {
    pub fn new() -> Self {
        Self::with_depth(3)
    }

    pub fn with_depth(depth: u32) -> Self {
        Self {
            evaluator: Evaluator::new(),
            move_generator: MoveGenerator::new(),
            max_depth: depth.max(1),
            nodes_searched: 0,
        }
    }

    /// Builds and backs up the tree for the side to move on `board`.
    pub fn search(&mut self, board: &Board) -> SearchTree {
        let mut tree = SearchTree::build(board, self.max_depth, &self.evaluator, &self.move_generator);
        tree.backup();
        self.nodes_searched = tree.node_count();
        tree
    }

    pub fn find_best_move(&mut self, board: &Board) -> Option<Move> {
        self.search(board).best_move()
    }

    /// Picks a move for the side to move and plays it on `board`.
    /// Returns `None` when that side has no legal move.
    pub fn make_move(&mut self, board: &mut Board) -> Option<Move> {
        let mv = self.find_best_move(board)?;
        board.make_move(mv);
        Some(mv)
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth.max(1);
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Piece, Square};

    #[test]
    fn test_backup_negates_best_child() {
        let leaf = |score| Node::new(None, score);
        let mut node = Node::new(None, 7);
        node.children = vec![leaf(-20), leaf(35), leaf(10)];
        assert_eq!(node.backup(), -35);
        assert_eq!(node.score, -35);

        let mut lone = Node::new(None, 12);
        assert_eq!(lone.backup(), 12);
    }

    #[test]
    fn test_tree_size_matches_move_counts() {
        let board = Board::new();
        let tree = SearchTree::build(&board, 2, &Evaluator::new(), &MoveGenerator::new());

        assert_eq!(tree.root.children.len(), 20);
        assert!(tree.root.children.iter().all(|c| c.children.len() == 20));
        assert_eq!(tree.node_count(), 1 + 20 + 400);
    }

    #[test]
    fn test_grabs_hanging_queen() {
        let mut board = Board::empty();
        board.place(Square::new(7, 0), Piece::King, Color::White);
        board.place(Square::new(0, 7), Piece::King, Color::Black);
        board.place(Square::new(4, 4), Piece::Rook, Color::White);
        board.place(Square::new(1, 4), Piece::Queen, Color::Black);

        let mut opponent = Opponent::with_depth(1);
        let mv = opponent.find_best_move(&board).unwrap();
        assert_eq!((mv.from, mv.to), (Square::new(4, 4), Square::new(1, 4)));
    }

    #[test]
    fn test_mate_and_stalemate_end_their_branch() {
        let mut board = Board::empty();
        board.place(Square::new(0, 0), Piece::King, Color::Black);
        board.place(Square::new(2, 2), Piece::King, Color::White);
        board.place(Square::new(3, 1), Piece::Queen, Color::White);

        let tree = Opponent::with_depth(2).search(&board);
        let child = |from: Square, to: Square| {
            tree.root
                .children
                .iter()
                .find(|c| c.mv.map(|m| (m.from, m.to)) == Some((from, to)))
                .unwrap()
        };

        let stalemate = child(Square::new(3, 1), Square::new(2, 1));
        assert_eq!(stalemate.score, 0);
        assert!(stalemate.children.is_empty());

        let mate = child(Square::new(3, 1), Square::new(1, 1));
        assert_eq!(mate.score, INFINITY);
        assert!(mate.children.is_empty());

        let best = tree.best_move().unwrap();
        assert_eq!((best.from, best.to), (Square::new(3, 1), Square::new(1, 1)));
    }

    #[test]
    fn test_render_respects_max_level() {
        let board = Board::new();
        let mut opponent = Opponent::with_depth(2);
        let tree = opponent.search(&board);

        let shallow = tree.render(0);
        assert_eq!(shallow.lines().count(), 1);
        assert!(shallow.starts_with("|__root"));

        let one_level = tree.render(1);
        assert_eq!(one_level.lines().count(), 21);
    }
}
