use std::sync::{Arc, Barrier};
use std::thread;

use estimo::db::Database;
use estimo::gateway::{GameService, LockScope, MutationError};
use estimo::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn service(scope: LockScope) -> GameService<Database> {
    let db = Database::open_memory().expect("Failed to create in-memory database");
    db.migrate().expect("Failed to run migrations");
    GameService::new(db, scope)
}

fn rejection(result: Result<(), MutationError>) -> GameError {
    match result {
        Err(MutationError::Rejected(reason)) => reason,
        other => panic!("expected a rejection, got {:?}", other),
    }
}

/// Every player estimates at the same moment; returns the stored estimations.
fn estimate_concurrently(
    service: Arc<GameService<Database>>,
    id: Uuid,
    players: usize,
) -> Vec<Estimation> {
    let barrier = Arc::new(Barrier::new(players));

    let handles: Vec<_> = (0..players)
        .map(|i| {
            let (service, barrier) = (service.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                service.estimate(id, "5", &format!("player-{}", i))
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked").expect("Estimate failed");
    }

    service
        .get_game(id)
        .expect("Query failed")
        .expect("Game missing")
        .rounds[0]
        .estimations
        .clone()
}

speculate! {
    before {
        let games = service(LockScope::Global);
        let game = games.create_game("alice").expect("Failed to create game");
    }

    describe "create_game" {
        it "stores an empty game owned by the creator" {
            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            assert_eq!(stored.owner, "alice");
            assert!(stored.rounds.is_empty());
            assert_eq!(games.game_ids().expect("Query failed"), vec![game.id]);
        }
    }

    describe "new_round" {
        it "persists the round" {
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");

            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            assert_eq!(stored.rounds.len(), 1);
            assert_eq!(stored.rounds[0].subject, "API design");
        }

        it "rejects a second open round without storing it" {
            games.new_round(game.id, "First", "alice").expect("Failed to start round");

            let reason = rejection(games.new_round(game.id, "Second", "alice"));

            assert_eq!(reason, GameError::RoundInProgress);
            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            assert_eq!(stored.rounds.len(), 1);
        }

        it "lets players other than the owner start rounds" {
            games.new_round(game.id, "First", "bob").expect("Failed to start round");
        }

        it "fails with GameNotFound for an unknown game" {
            let id = Uuid::new_v4();
            assert_eq!(
                rejection(games.new_round(id, "First", "alice")),
                GameError::GameNotFound(id)
            );
        }
    }

    describe "estimate" {
        it "rejects estimates before any round" {
            assert_eq!(
                rejection(games.estimate(game.id, "5", "alice")),
                GameError::NoOpenRound
            );
        }

        it "keeps the first estimate of a player" {
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");
            games.estimate(game.id, "5", "alice").expect("Failed to estimate");

            assert_eq!(
                rejection(games.estimate(game.id, "3", "alice")),
                GameError::DuplicateEstimate("alice".to_string())
            );

            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            assert_eq!(stored.rounds[0].estimations.len(), 1);
            assert_eq!(stored.rounds[0].estimations[0].value, EstimationValue::Five);
        }

        it "rejects unknown card tokens" {
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");
            assert_eq!(
                rejection(games.estimate(game.id, "7", "alice")),
                GameError::InvalidValue("7".to_string())
            );
        }
    }

    describe "finish_round" {
        it "records the consensus" {
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");
            games.finish_round(game.id, "8", "alice").expect("Failed to finish");

            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            assert_eq!(stored.rounds[0].consensus, Some(EstimationValue::Eight));
        }

        it "rejects finishing without an open round" {
            assert_eq!(
                rejection(games.finish_round(game.id, "8", "alice")),
                GameError::NoOpenRound
            );
        }
    }

    describe "full scenario" {
        it "plays a round from start to finish" {
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");
            games.estimate(game.id, "5", "alice").expect("Failed to estimate");
            games.estimate(game.id, "8", "bob").expect("Failed to estimate");
            assert_eq!(
                rejection(games.estimate(game.id, "3", "alice")),
                GameError::DuplicateEstimate("alice".to_string())
            );
            games.finish_round(game.id, "8", "alice").expect("Failed to finish");
            assert_eq!(
                rejection(games.estimate(game.id, "1", "carol")),
                GameError::RoundFinished
            );

            let stored = games.get_game(game.id).expect("Query failed").expect("Game missing");
            let round = &stored.rounds[0];
            assert_eq!(round.estimations, vec![
                Estimation::new("5", "alice").expect("Invalid estimation"),
                Estimation::new("8", "bob").expect("Invalid estimation"),
            ]);
            assert_eq!(round.consensus, Some(EstimationValue::Eight));
        }
    }

    describe "concurrency" {
        it "loses no estimate under the global lock" {
            let games = Arc::new(games);
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");

            let estimations = estimate_concurrently(games, game.id, 8);

            assert_eq!(estimations.len(), 8);
            for i in 0..8 {
                let player = format!("player-{}", i);
                assert!(estimations.iter().any(|e| e.player == player));
            }
        }

        it "loses no estimate under per-game locks" {
            let games = Arc::new(service(LockScope::PerGame));
            let game = games.create_game("alice").expect("Failed to create game");
            games.new_round(game.id, "API design", "alice").expect("Failed to start round");

            let estimations = estimate_concurrently(games, game.id, 8);

            assert_eq!(estimations.len(), 8);
        }

        it "keeps games apart under per-game locks" {
            let games = Arc::new(service(LockScope::PerGame));
            let ids: Vec<Uuid> = (0..4)
                .map(|_| {
                    let game = games.create_game("alice").expect("Failed to create game");
                    games.new_round(game.id, "API design", "alice").expect("Failed to start round");
                    game.id
                })
                .collect();

            let handles: Vec<_> = ids
                .iter()
                .flat_map(|&id| (0..3).map(move |i| (id, format!("player-{}", i))))
                .map(|(id, player)| {
                    let games = games.clone();
                    thread::spawn(move || games.estimate(id, "3", &player))
                })
                .collect();

            for handle in handles {
                handle.join().expect("Thread panicked").expect("Estimate failed");
            }

            for id in ids {
                let stored = games.get_game(id).expect("Query failed").expect("Game missing");
                assert_eq!(stored.rounds[0].estimations.len(), 3);
            }
        }
    }
}
