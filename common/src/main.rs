use clap::Parser;
use minesweeper_kb::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

/// Autonomous minesweeper bot: plays proven-safe cells, guesses otherwise.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,

    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,

    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,

    /// Seed for mine placement and guesses; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of games to play.
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Pause between moves, to make a single game watchable.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Only print the final summary.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GameConfig::new(args.width, args.height, args.mines)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut wins = 0;
    for game in 1..=args.games {
        let mut session = Session::new(&config, &mut rng)?;
        let state = play(&mut session, &mut rng, &args)?;
        log::info!("game {game}: {state:?}");
        if state == GameState::Won {
            wins += 1;
        }
    }

    println!(
        "\nWon {wins} of {} games on {}x{} with {} mines.",
        args.games, config.width, config.height, config.mines
    );
    Ok(())
}

fn play(session: &mut Session, rng: &mut StdRng, args: &Args) -> anyhow::Result<GameState> {
    let mut move_count = 0;
    while session.game_state() == GameState::Playing {
        move_count += 1;

        let Some(mv) = session.step(rng)? else {
            log::warn!("no cell left to play");
            break;
        };

        if !args.quiet {
            let p = mv.point();
            match mv {
                Move::Safe(_) => println!("\n--- Move #{move_count}: ({}, {}) is safe ---", p.x, p.y),
                Move::Guess(_) => println!("\n--- Move #{move_count}: guessing ({}, {}) ---", p.x, p.y),
            }
            print_board(session);
        }

        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }

    if !args.quiet {
        match session.game_state() {
            GameState::Won => println!("Result: The bot won!"),
            GameState::Lost => println!("Result: The bot hit a mine and lost."),
            GameState::Playing => println!("Result: The game ended unexpectedly."),
        }
    }
    Ok(session.game_state())
}

fn print_board(session: &Session) {
    let width = session.board().width();

    print!("   ");
    for x in 0..width {
        print!("{:^3}", x);
    }
    println!("\n  +{}", "---".repeat(width));

    for (y, row) in session.rows().iter().enumerate() {
        print!("{:^2}|", y);
        for (x, cell) in row.iter().enumerate() {
            let display = match cell {
                Cell::Revealed(0) => " . ".to_string(),
                Cell::Revealed(n) => format!(" {} ", n),
                Cell::Hidden if session.knowledge().is_dangerous(&Point { x, y }) => {
                    " F ".to_string()
                }
                Cell::Hidden => " ■ ".to_string(),
            };
            print!("{}", display);
        }
        println!();
    }
}
