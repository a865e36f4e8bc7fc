use kibitz::Game;
use serde::Deserialize;
use serde_with::{formats::SpaceSeparator, serde_as, StringWithSeparator};

#[serde_as]
#[derive(Deserialize)]
struct Record {
    fen: String,
    #[serde_as(as = "StringWithSeparator<SpaceSeparator, String>")]
    moves: Vec<String>,
    movetext: String,
    final_fen: String,
}

#[test]
fn test_games() {
    let mut reader = csv::Reader::from_path("tests/games.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");

        let mut game = Game::from_fen(&record.fen).expect("valid fen");
        let start = game.fen();

        for token in &record.moves {
            if let Err(err) = game.play(token) {
                panic!("line {}: {token}: {err}", i + 1);
            }
        }

        assert_eq!(game.movetext(), record.movetext, "line {}", i + 1);
        assert_eq!(game.fen(), record.final_fen, "line {}", i + 1);

        while game.undo().is_ok() {}
        assert_eq!(game.fen(), start, "line {}", i + 1);
    }
}
