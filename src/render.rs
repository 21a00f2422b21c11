//! Plain-text rendering of a game table.

use crate::models::{Game, Round};

const OPEN: char = '○';
const FINISHED: char = '●';
const OUTSTANDING: &str = " ← explain";

fn round_symbol(round: &Round) -> char {
    if round.is_finished() {
        FINISHED
    } else {
        OPEN
    }
}

/// Render a game with its rounds and estimations.
///
/// Example output:
/// ```text
/// Game 0b8e… (owner: alice)
/// ├── ● API design [consensus: 8]
/// │   ├── alice: 5 ← explain
/// │   ├── bob: 13 ← explain
/// │   └── carol: 8
/// └── ○ Login page
///     └── alice: ?
/// ```
pub fn render_game(game: &Game) -> String {
    let mut output = format!("Game {} (owner: {})\n", game.id, game.owner);

    if game.rounds.is_empty() {
        output.push_str("└── (no rounds yet)\n");
        return output;
    }

    for (i, round) in game.rounds.iter().enumerate() {
        let is_last = i == game.rounds.len() - 1;
        render_round(&mut output, round, is_last);
    }
    output
}

fn render_round(output: &mut String, round: &Round, is_last: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(branch);
    output.push(round_symbol(round));
    output.push(' ');
    output.push_str(&round.subject);
    if let Some(consensus) = round.consensus {
        output.push_str(&format!(" [consensus: {}]", consensus));
    }
    output.push('\n');

    let prefix = if is_last { "    " } else { "│   " };
    let outstanding = round.outstanding_players();

    for (i, estimation) in round.estimations.iter().enumerate() {
        let branch = if i == round.estimations.len() - 1 {
            "└── "
        } else {
            "├── "
        };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&format!("{}: {}", estimation.player, estimation.value));
        if outstanding.contains(&estimation.player.as_str()) {
            output.push_str(OUTSTANDING);
        }
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Estimation, EstimationValue};

    #[test]
    fn renders_empty_game() {
        let game = Game::new("alice");
        let output = render_game(&game);
        assert_eq!(
            output,
            format!("Game {} (owner: alice)\n└── (no rounds yet)\n", game.id)
        );
    }

    #[test]
    fn renders_rounds_and_outstanding_estimations() {
        let mut game = Game::new("alice");
        game.new_round("API design", "alice").unwrap();
        game.estimate(Estimation::new("5", "alice").unwrap()).unwrap();
        game.estimate(Estimation::new("13", "bob").unwrap()).unwrap();
        game.estimate(Estimation::new("8", "carol").unwrap()).unwrap();
        game.finish_current_round(EstimationValue::Eight, "alice")
            .unwrap();
        game.new_round("Login page", "bob").unwrap();
        game.estimate(Estimation::new("?", "alice").unwrap()).unwrap();

        let output = render_game(&game);
        let expected = format!(
            "Game {} (owner: alice)\n\
             ├── ● API design [consensus: 8]\n\
             │   ├── alice: 5 ← explain\n\
             │   ├── bob: 13 ← explain\n\
             │   └── carol: 8\n\
             └── ○ Login page\n    \
             └── alice: ?\n",
            game.id
        );
        assert_eq!(output, expected);
    }
}
