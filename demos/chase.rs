//! Minimal headless run: a police chase across a small street grid,
//! printed once a second.

use glam::Vec2;
use pursuitsim::{CarControls, Race, RaceConfig, RaceOutcome, RoadNetwork, RoadSegment};

fn main() {
    pursuitsim::logging::try_init().ok();

    let mut segments = Vec::new();
    for i in 0..6 {
        let c = i as f32 * 600.0;
        segments.push(RoadSegment {
            points: (0..=60).map(|j| Vec2::new(j as f32 * 50.0, c)).collect(),
            width: 30.0,
            kind: "residential".into(),
            name: format!("Street {i}"),
            oneway: false,
        });
        segments.push(RoadSegment {
            points: (0..=60).map(|j| Vec2::new(c, j as f32 * 50.0)).collect(),
            width: 30.0,
            kind: "residential".into(),
            name: format!("Avenue {i}"),
            oneway: false,
        });
    }
    let network = RoadNetwork::new(segments, Vec2::ZERO, Vec2::new(3000.0, 3000.0));

    let config = RaceConfig {
        rng_seed: Some(1977),
        ..RaceConfig::DEFAULT
    };
    let mut race = Race::cannonball(network, config);

    let dt = 1.0 / 60.0;
    for step in 0..(60 * 60) {
        race.set_player_controls(CarControls {
            throttle: 1.0,
            steer: 0.2,
            ..CarControls::DEFAULT
        });
        race.advance(dt);

        if step % 60 == 0 {
            let player = race.player();
            let chasing = race
                .police_status()
                .iter()
                .filter(|s| s.is_chasing)
                .count();
            let street = race
                .course()
                .as_open()
                .and_then(|net| net.road_name_at(player.pos))
                .unwrap_or("-");
            println!(
                "t={:5.1}s pos=({:7.1},{:7.1}) speed={:5.1} progress={:4.1}% chasing={} on {}",
                race.time(),
                player.pos.x,
                player.pos.y,
                player.speed,
                player.stats.race_progress * 100.0,
                chasing,
                street
            );
        }

        match race.outcome() {
            RaceOutcome::Running => {}
            RaceOutcome::Finished => {
                println!("made it in {:.1}s", race.time());
                break;
            }
            RaceOutcome::Busted => {
                println!("busted after {} warnings", race.warnings_issued());
                break;
            }
        }
    }
}
