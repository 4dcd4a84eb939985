use minesweeper_kb as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(width: u8, height: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::GameConfig::new(width as usize, height as usize, mines as usize)
        .map_err(|e| e.to_string())?;
    let session = ms::Session::new(&config, &mut rand::rng()).map_err(|e| e.to_string())?;
    session.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, x: usize, y: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    let res = session
        .reveal(ms::Point { x, y })
        .map_err(|e| e.to_string())?;
    let mut xs = session.serialize().map_err(|e| e.to_string())?;
    xs.push(if res { 0 } else { 1 });
    Ok(xs)
}

/// Lets the bot play one move.
#[wasm_bindgen]
pub fn bot_step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    session.step(&mut rand::rng()).map_err(|e| e.to_string())?;
    session.serialize().map_err(|e| e.to_string())
}

/// `[x, y]` of a cell proven safe and not yet revealed, or empty.
#[wasm_bindgen]
pub fn hint(bts: Vec<u8>) -> Result<Vec<usize>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(session
        .knowledge()
        .safe_unplayed_cell()
        .map(|p| vec![p.x, p.y])
        .unwrap_or_default())
}

#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(match session.game_state() {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}

/// Row-major cells: `-2` flagged by deduction, `-1` hidden, otherwise the
/// revealed neighbor count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    let knowledge = session.knowledge();
    Ok(session
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, cell)| match cell {
                ms::Cell::Hidden if knowledge.is_dangerous(&ms::Point { x, y }) => -2,
                ms::Cell::Hidden => -1,
                ms::Cell::Revealed(n) => *n as i8,
            })
        })
        .collect())
}
