use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rs_dice::geometry::DieMesh;
use rs_dice::session::DiceSession;
use rs_dice::utils::{DiceError, SessionConfig};

fn main() -> Result<(), DiceError> {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(2024);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut session = DiceSession::new(SessionConfig::default())?;
    session.set_die_mesh(DieMesh::standard_d6(1.0));
    for _ in 0..4 {
        session.request_random_throw(&mut rng)?;
    }

    if !session.run_until_settled(1800) {
        warn!("Dice still rolling after 30 simulated seconds");
    }
    info!("Simulated {:.2}s", session.world().simulated_time());

    let mut total = 0u32;
    for (die, result) in session.results() {
        let pose = session.pose_of(die)?;
        match result {
            Ok(value) => {
                total += u32::from(value);
                println!("die {}: {} at ({:.2}, {:.2}, {:.2})", die, value, pose.position.0, pose.position.1, pose.position.2);
            }
            Err(err) => println!("die {}: no result ({})", die, err),
        }
    }
    println!("total: {}", total);
    Ok(())
}
