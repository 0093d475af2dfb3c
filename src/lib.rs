//! Minesweeper auto-player driven by least-squares mine probabilities.
//!
//! Every turn the undetermined cells are grouped into classes that the same
//! clues constrain, each clue and the global mine count become one linear
//! equation over the class probabilities, and the system is solved by
//! bounded least squares. The player flags certain mines, reveals certainly
//! safe cells, and otherwise makes the least risky guess.
//!
//! Grid data crossing the WASM boundary is flat and row-major:
//! `cells[row * cols + col]`.

pub mod board;
pub mod config;
pub mod error;
pub mod grid;
pub mod lstsq;
pub mod partition;
pub mod player;
pub mod rng;
pub mod selector;
pub mod solver;
pub mod system;
pub mod types;

pub use board::Board;
pub use config::SolverConfig;
pub use error::{MineTriggered, TurnError};
pub use grid::Grid;
pub use player::{play_from, play_random, GameReport, Player, Status, TurnReport};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::board::Board;
    use crate::config::SolverConfig;
    use crate::player::{play_from, play_random, Player};
    use crate::rng::BoardRng;
    use crate::types::{Mines, MAX_DIMENSION};

    fn check_dimensions(rows: usize, cols: usize) -> Result<(), JsValue> {
        if rows > MAX_DIMENSION || cols > MAX_DIMENSION {
            return Err(JsValue::from_str("board dimensions exceed the supported maximum"));
        }
        Ok(())
    }

    fn board_from_flat(rows: usize, cols: usize, mines_flat: &[u8]) -> Result<Board, JsValue> {
        check_dimensions(rows, cols)?;
        if mines_flat.len() != rows * cols {
            return Err(JsValue::from_str("mines array does not match board dimensions"));
        }
        Ok(Board::from_mines(Mines {
            rows,
            cols,
            cells: mines_flat.to_vec(),
        }))
    }

    fn config_from_js(config: JsValue) -> Result<SolverConfig, JsValue> {
        if config.is_undefined() || config.is_null() {
            return Ok(SolverConfig::default());
        }
        serde_wasm_bindgen::from_value(config).map_err(JsValue::from)
    }

    /// Play a whole game from an opening click.
    /// Returns `{ status, turns, trigger }`.
    #[wasm_bindgen(js_name = "playGame")]
    pub fn wasm_play_game(
        rows: usize,
        cols: usize,
        mines_flat: &[u8],
        start_row: usize,
        start_col: usize,
        max_turns: usize,
        config: JsValue,
    ) -> Result<JsValue, JsValue> {
        let mut board = board_from_flat(rows, cols, mines_flat)?;
        let report = play_from(&mut board, (start_row, start_col), max_turns, config_from_js(config)?)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }

    /// Play a freshly generated board. Pass a seed for a reproducible layout.
    /// Returns `{ status, turns, trigger }`.
    #[wasm_bindgen(js_name = "playRandom")]
    pub fn wasm_play_random(
        rows: usize,
        cols: usize,
        mine_count: usize,
        start_row: usize,
        start_col: usize,
        max_turns: usize,
        seed: Option<u32>,
        config: JsValue,
    ) -> Result<JsValue, JsValue> {
        check_dimensions(rows, cols)?;
        let mut rng = BoardRng::seeded_or_random(seed.map(u64::from));
        let report = play_random(
            rows,
            cols,
            mine_count,
            (start_row, start_col),
            max_turns,
            config_from_js(config)?,
            &mut rng,
        )
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }

    /// Mine probabilities after an opening click, row-major.
    /// Revealed cells hold `Infinity`.
    #[wasm_bindgen(js_name = "cellProbabilities")]
    pub fn wasm_cell_probabilities(
        rows: usize,
        cols: usize,
        mines_flat: &[u8],
        start_row: usize,
        start_col: usize,
    ) -> Result<js_sys::Float64Array, JsValue> {
        let mut board = board_from_flat(rows, cols, mines_flat)?;
        let mut player = Player::new(&board);

        player
            .reveal_at(&mut board, &[(start_row, start_col)])
            .and_then(|_| player.evaluate(&board))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let field = &player.field().cells;
        let arr = js_sys::Float64Array::new_with_length(field.len() as u32);
        arr.copy_from(field);
        Ok(arr)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM player ready".to_string()
    }
}
