use domino::game::Game;
use domino::players::{legal_placements, DominoPlayer, GreedyPlayer, RandomPlayer};
use domino::{Edge, EngineConfig, EngineError, EngineSession, GameSnapshot, PlacedTile, Play, Seat, Tile};

fn seat(n: u8) -> Seat {
    Seat::new(n).unwrap()
}

fn tiles(pairs: &[(u8, u8)]) -> Vec<Tile> {
    pairs.iter().map(|(a, b)| Tile::new(*a, *b)).collect()
}

fn snapshot(s: u8, hand: &[(u8, u8)], plays: &[(u8, u8, u8, Edge)]) -> GameSnapshot {
    let plays = plays
        .iter()
        .map(|(p, a, b, e)| Play::new(seat(*p), PlacedTile::opening(Tile::new(*a, *b), *e)))
        .collect();
    GameSnapshot::from_plays(seat(s), tiles(hand), plays).unwrap()
}

/// Twelve tiles down in seat order, seat 1 to act. Left shows 6, right shows 1.
fn crowded_table(hand: &[(u8, u8)]) -> GameSnapshot {
    let plays: Vec<(u8, u8, u8, Edge)> = [
        (6, 6, Edge::Left),
        (1, 6, Edge::Left),
        (0, 1, Edge::Left),
        (6, 2, Edge::Right),
        (0, 0, Edge::Left),
        (0, 3, Edge::Left),
        (3, 5, Edge::Left),
        (2, 2, Edge::Right),
        (5, 5, Edge::Left),
        (1, 2, Edge::Right),
        (0, 5, Edge::Left),
        (0, 6, Edge::Left),
    ]
    .iter()
    .enumerate()
    .map(|(i, (a, b, e))| (i as u8 % 4 + 1, *a, *b, *e))
    .collect();
    snapshot(1, hand, &plays)
}

#[test]
fn test_opening_plays_heaviest_tile() {
    let mut session = EngineSession::new();
    let snap = snapshot(1, &[(0, 0), (0, 3), (1, 2), (1, 3), (1, 6), (3, 6), (5, 5)], &[]);
    let mv = session.decide(&snap).unwrap();
    assert_eq!(mv.seat, seat(1));
    assert_eq!(mv.tile(), Some(Tile::new(5, 5)));
}

#[test]
fn test_crowded_table_does_not_pass() {
    let mut session = EngineSession::new();
    let snap = crowded_table(&[(5, 6), (1, 1), (1, 3), (1, 4)]);
    assert_eq!(snap.table.exposed(Edge::Left), Some(6));
    assert_eq!(snap.table.exposed(Edge::Right), Some(1));

    let mv = session.decide(&snap).unwrap();
    let placed = mv.placed.expect("a legal glue exists");
    assert!(legal_placements(&snap).contains(&placed));
}

#[test]
fn test_closing_edge_sends_play_to_other_edge() {
    // Left shows 5: two fives on the table and five in hand account for all seven.
    let snap = snapshot(
        3,
        &[(0, 5), (1, 5), (2, 5), (4, 5), (5, 6), (3, 6), (0, 0)],
        &[(1, 5, 5, Edge::Left), (2, 5, 3, Edge::Right)],
    );
    assert_eq!(snap.table.exposed(Edge::Left), Some(5));
    assert_eq!(snap.table.exposed(Edge::Right), Some(3));

    let mut session = EngineSession::new();
    let mv = session.decide(&snap).unwrap();
    assert_eq!(mv.tile(), Some(Tile::new(3, 6)));
    assert_eq!(mv.placed.map(|p| p.edge), Some(Edge::Right));
}

#[test]
fn test_same_snapshot_same_move() {
    let snap = crowded_table(&[(5, 6), (1, 1), (1, 3), (1, 4)]);
    let mut session = EngineSession::new();
    let first = session.decide(&snap).unwrap();
    let second = session.decide(&snap).unwrap();
    assert_eq!(first, second);

    let mut fresh = EngineSession::new();
    assert_eq!(fresh.decide(&snap).unwrap(), first);
}

#[test]
fn test_inferred_passes_and_reset() {
    let mut session = EngineSession::new();
    // Seat 2 was skipped while 6|6 was the whole table.
    let snap = snapshot(
        1,
        &[(6, 3), (2, 2), (0, 4)],
        &[(1, 6, 6, Edge::Left), (3, 6, 1, Edge::Left), (4, 6, 4, Edge::Right)],
    );
    session.decide(&snap).unwrap();
    assert!(session.knowledge().is_unavailable(seat(2), 6));

    // A shorter history is a new hand.
    let opening = snapshot(1, &[(2, 2), (0, 4)], &[]);
    session.decide(&opening).unwrap();
    assert!(session.knowledge().for_seat(seat(2)).is_empty());
}

#[test]
fn test_pinned_session_refuses_other_seat() {
    let mut session = EngineSession::for_seat(seat(1));
    let snap = snapshot(2, &[(5, 5)], &[]);
    assert_eq!(
        session.decide(&snap).unwrap_err(),
        EngineError::not_your_turn(seat(1), seat(2))
    );
}

fn engine_lineup(config: EngineConfig, opponent: impl Fn(usize) -> Box<dyn DominoPlayer>) -> Vec<Box<dyn DominoPlayer>> {
    (0..4)
        .map(|index| {
            if index % 2 == 0 {
                Box::new(EngineSession::with_config(config.clone()).pinned(Seat::from_index(index)))
                    as Box<dyn DominoPlayer>
            } else {
                opponent(index)
            }
        })
        .collect()
}

#[test]
fn test_engine_finishes_hands_against_greedy() {
    for seed in 0..4 {
        let mut game = Game::deal(seed);
        let mut players = engine_lineup(EngineConfig::default(), |_| Box::new(GreedyPlayer::new()));
        let result = game.play_out(&mut players).unwrap();
        assert!(result.turns >= result.plays.len());
        assert!(!result.plays.is_empty());
    }
}

#[test]
fn test_engine_finishes_hands_against_random() {
    for seed in 10..14 {
        let mut game = Game::deal(seed);
        let mut players = engine_lineup(EngineConfig::without_solver(), |index| {
            Box::new(RandomPlayer::new(seed * 4 + index as u64))
        });
        let result = game.play_out(&mut players).unwrap();
        if !result.blocked {
            assert!(game.hand(result.winner).is_empty());
        }
    }
}
