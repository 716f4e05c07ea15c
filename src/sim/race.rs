use super::controller::Controller;
use super::{
    ArrestPolicy, Car, CarConfig, CarControls, CarKind, Course, DriverProfile, PoliceController,
    PoliceStatus, RaceConfig, RacerController, RoadNetwork, SpawnPose, TrackGeometry,
    TrafficController, collision, dynamics,
};
use crate::consts::{self, police, traffic};
use fastrand::Rng;

const PLAYER_COLOR: &str = "#FFD700";
const POLICE_COLOR: &str = "#1565C0";

/// The stock AI field for circuit races.
const AI_ROSTER: [(&str, &str, DriverProfile); 4] = [
    (
        "ROSSO",
        "#E53935",
        DriverProfile {
            skill: 0.94,
            aggression: 0.75,
            top_speed_factor: 0.96,
            line_offset: -0.3,
        },
    ),
    (
        "AZURE",
        "#1E88E5",
        DriverProfile {
            skill: 0.88,
            aggression: 0.65,
            top_speed_factor: 0.93,
            line_offset: 0.2,
        },
    ),
    (
        "VERDE",
        "#43A047",
        DriverProfile {
            skill: 0.82,
            aggression: 0.7,
            top_speed_factor: 0.90,
            line_offset: 0.0,
        },
    ),
    (
        "VIOLA",
        "#8E24AA",
        DriverProfile {
            skill: 0.76,
            aggression: 0.55,
            top_speed_factor: 0.86,
            line_offset: 0.4,
        },
    ),
];

const GRID_SLOTS: usize = 5;
const GRID_SLOT_SPACING_T: f32 = 0.006;
const GRID_LATERAL_OFFSET: f32 = 18.0;
const PLAYER_GRID_SLOT: usize = 2;

/// Spawn descriptor for one car: its control policy, where it starts,
/// and its physical tuning.
#[derive(Clone, Debug)]
pub struct CarDesc {
    pub controller: Controller,
    pub pose: SpawnPose,
    pub config: CarConfig,
    pub color: &'static str,
    pub name: &'static str,
}

/// Lifecycle of one race.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RaceOutcome {
    #[default]
    Running,
    /// The player finished the route or completed the laps.
    Finished,
    /// The player was caught by the police.
    Busted,
}

/// The step driver: owns the geometry, the cars, and their controllers,
/// and advances everything in one synchronous sweep per step.
///
/// Restarting is stop-the-world: drop the race and build a new one; the
/// geometry owns no references back into the car list.
pub struct Race {
    course: Course,
    config: RaceConfig,
    cars: Vec<Car>,
    controllers: Vec<Controller>,
    player_idx: usize,
    time: f32,
    outcome: RaceOutcome,
    warnings_issued: u32,
    warning_cooldown: f32,
}

impl Race {
    /// Set up a race from explicit spawn descriptors. Exactly one of them
    /// must be the player.
    #[must_use]
    pub fn new(course: Course, config: RaceConfig, descs: Vec<CarDesc>) -> Self {
        let players = descs
            .iter()
            .filter(|d| d.controller.kind() == CarKind::Player)
            .count();
        assert!(players == 1, "a race needs exactly one player car, got {players}");

        let player_idx = descs
            .iter()
            .position(|d| d.controller.kind() == CarKind::Player)
            .unwrap();

        let mut cars = Vec::with_capacity(descs.len());
        let mut controllers = Vec::with_capacity(descs.len());
        for desc in descs {
            cars.push(Car::new(
                desc.controller.kind(),
                desc.pose,
                desc.config,
                desc.color,
                desc.name,
            ));
            controllers.push(desc.controller);
        }

        log::debug!(
            "race ready: {} cars, {}",
            cars.len(),
            if course.is_open() { "open world" } else { "circuit" }
        );

        Self {
            course,
            config,
            cars,
            controllers,
            player_idx,
            time: 0.0,
            outcome: RaceOutcome::Running,
            warnings_issued: 0,
            warning_cooldown: 0.0,
        }
    }

    /// A circuit race: the player and the stock AI field on a staggered
    /// starting grid just before the line.
    #[must_use]
    pub fn circuit(track: TrackGeometry, config: RaceConfig) -> Self {
        let course = Course::Circuit(track);
        let mut descs = Vec::with_capacity(GRID_SLOTS);

        for slot in 0..GRID_SLOTS {
            let t = (1.0 - slot as f32 * GRID_SLOT_SPACING_T).rem_euclid(1.0);
            let lateral = if slot % 2 == 0 {
                GRID_LATERAL_OFFSET
            } else {
                -GRID_LATERAL_OFFSET
            };
            let pose = SpawnPose {
                pos: course.point_at(t) + course.normal_at(t) * lateral,
                angle: course.tangent_at(t).to_angle(),
            };

            if slot == PLAYER_GRID_SLOT {
                descs.push(CarDesc {
                    controller: Controller::Player,
                    pose,
                    config: CarConfig::STREET,
                    color: PLAYER_COLOR,
                    name: "PLAYER",
                });
            } else {
                let (name, color, profile) =
                    AI_ROSTER[if slot < PLAYER_GRID_SLOT { slot } else { slot - 1 }];
                let mut car_config = CarConfig::STREET;
                car_config.max_speed *= profile.top_speed_factor;
                descs.push(CarDesc {
                    controller: Controller::Racer(RacerController::new(profile)),
                    pose,
                    config: car_config,
                    color,
                    name,
                });
            }
        }

        Self::new(course, config, descs)
    }

    /// An open-world run: the player on the start marker, police scattered
    /// across the network away from the start, traffic cruising everywhere.
    #[must_use]
    pub fn cannonball(network: RoadNetwork, config: RaceConfig) -> Self {
        let mut rng = match config.rng_seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };

        let start = network.start();
        let mut descs = vec![CarDesc {
            controller: Controller::Player,
            pose: SpawnPose {
                pos: start.pos,
                angle: start.angle,
            },
            config: CarConfig::STREET,
            color: PLAYER_COLOR,
            name: "PLAYER",
        }];

        let candidates = road_spawn_candidates(&network);

        let mut police_candidates: Vec<SpawnPose> = candidates
            .iter()
            .copied()
            .filter(|c| c.pos.distance(start.pos) >= police::MIN_DIST_FROM_START)
            .collect();
        rng.shuffle(&mut police_candidates);
        let chosen = pick_spaced(&police_candidates, config.num_police, police::MIN_SPACING);
        if chosen.len() < config.num_police {
            log::warn!(
                "only placed {} of {} police cruisers",
                chosen.len(),
                config.num_police
            );
        }
        for pose in chosen {
            descs.push(CarDesc {
                controller: Controller::Police(PoliceController::new()),
                pose,
                config: CarConfig::POLICE,
                color: POLICE_COLOR,
                name: "POLICE",
            });
        }

        let mut traffic_candidates = candidates;
        rng.shuffle(&mut traffic_candidates);
        let chosen = pick_spaced(&traffic_candidates, config.num_traffic, traffic::MIN_SPACING);
        for pose in chosen {
            let cruise =
                traffic::MIN_SPEED + rng.f32() * (traffic::MAX_SPEED - traffic::MIN_SPEED);
            descs.push(CarDesc {
                controller: Controller::Traffic(TrafficController::new(cruise)),
                pose,
                config: CarConfig {
                    max_speed: cruise * 1.2,
                    ..CarConfig::TRAFFIC
                },
                color: traffic::COLORS[rng.usize(..traffic::COLORS.len())],
                name: "TRAFFIC",
            });
        }

        Self::new(Course::Open(network), config, descs)
    }

    /// Hand the player's input to its car, clamped to valid ranges.
    pub fn set_player_controls(&mut self, mut controls: CarControls) {
        controls.clamp_fix();
        self.cars[self.player_idx].controls = controls;
    }

    /// Advance simulated time. `dt` is clamped to a small maximum so frame
    /// hitches cannot blow up the integration; non-positive values fall
    /// back to a nominal frame.
    pub fn advance(&mut self, dt: f32) {
        if self.outcome != RaceOutcome::Running {
            return;
        }
        let dt = if dt <= 0.0 {
            1.0 / 60.0
        } else {
            dt.min(consts::MAX_STEP_DT)
        };
        self.time += dt;
        if self.warning_cooldown > 0.0 {
            self.warning_cooldown = (self.warning_cooldown - dt).max(0.0);
        }

        // controller + integration, one car at a time in list order;
        // later cars see earlier cars' already-updated state
        for i in 0..self.cars.len() {
            let player_pos = self.cars[self.player_idx].pos;
            let (head, rest) = self.cars.split_at_mut(i);
            let (car, tail) = rest.split_first_mut().unwrap();

            car.stats.total_time = self.time;
            self.controllers[i].drive(car, head, tail, &self.course, player_pos, dt);
            let surface = self.course.surface_at(car.pos);
            dynamics::integrate(car, dt, surface);
            dynamics::update_progress(car, &self.course);
        }

        if self.course.is_open() {
            self.check_radar();
        }

        match &self.course {
            Course::Circuit(track) => {
                for car in &mut self.cars {
                    collision::resolve_boundary(car, track);
                }
            }
            Course::Open(network) => {
                for car in &mut self.cars {
                    collision::correct_off_road(car, network);
                }
            }
        }

        collision::resolve_pairs(&mut self.cars);

        self.check_finish();
    }

    fn check_radar(&mut self) {
        if self.warning_cooldown > 0.0 || self.outcome != RaceOutcome::Running {
            return;
        }
        let player_pos = self.cars[self.player_idx].pos;
        for i in 0..self.cars.len() {
            let Controller::Police(ctl) = &mut self.controllers[i] else {
                continue;
            };
            if !ctl.check_arrest(&self.cars[i], player_pos) {
                continue;
            }
            match self.config.arrest_policy {
                ArrestPolicy::Immediate => self.outcome = RaceOutcome::Busted,
                ArrestPolicy::WarnThenBust { max_warnings } => {
                    if self.warnings_issued >= max_warnings {
                        self.outcome = RaceOutcome::Busted;
                    } else {
                        self.warnings_issued += 1;
                        ctl.freeze();
                        self.warning_cooldown = police::WARNING_COOLDOWN;
                        log::info!("police warning {}/{max_warnings}", self.warnings_issued);
                    }
                }
            }
            break;
        }
    }

    fn check_finish(&mut self) {
        match &self.course {
            Course::Open(_) => {
                if self.cars[self.player_idx].stats.finished {
                    self.outcome = RaceOutcome::Finished;
                }
            }
            Course::Circuit(_) => {
                let total = self.config.total_laps;
                for car in &mut self.cars {
                    if car.kind.competes() && car.stats.current_lap >= total {
                        car.stats.finished = true;
                    }
                }
                if self.cars[self.player_idx].stats.finished {
                    self.outcome = RaceOutcome::Finished;
                }
            }
        }
    }

    #[must_use]
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    #[must_use]
    pub fn player(&self) -> &Car {
        &self.cars[self.player_idx]
    }

    #[must_use]
    pub const fn player_idx(&self) -> usize {
        self.player_idx
    }

    #[must_use]
    pub const fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub const fn config(&self) -> &RaceConfig {
        &self.config
    }

    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub const fn outcome(&self) -> RaceOutcome {
        self.outcome
    }

    #[must_use]
    pub const fn warnings_issued(&self) -> u32 {
        self.warnings_issued
    }

    /// Car indices ordered by race progress, best first. Police and
    /// traffic do not compete and are excluded.
    #[must_use]
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cars.len())
            .filter(|&i| self.cars[i].kind.competes())
            .collect();
        order.sort_by(|&a, &b| {
            self.cars[b]
                .stats
                .race_progress
                .total_cmp(&self.cars[a].stats.race_progress)
        });
        order
    }

    /// Pursuit info for every police cruiser, for the HUD radar.
    #[must_use]
    pub fn police_status(&self) -> Vec<PoliceStatus> {
        self.controllers
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Controller::Police(ctl) => Some(PoliceStatus {
                    car: i,
                    is_chasing: ctl.is_chasing(),
                    is_frozen: ctl.is_frozen(),
                    radar_radius: police::RADAR_RADIUS,
                    chase_range: police::CHASE_RANGE,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Spawn candidates sampled sparsely along every segment, with headings
/// taken from the neighboring points.
fn road_spawn_candidates(network: &RoadNetwork) -> Vec<SpawnPose> {
    let mut candidates = Vec::new();
    for seg in network.segments() {
        if seg.points.len() < 2 {
            continue;
        }
        let step = (seg.points.len() / 3).max(1);
        let mut i = step;
        while i < seg.points.len() - 1 {
            let prev = seg.points[i - 1];
            let next = seg.points[(i + 1).min(seg.points.len() - 1)];
            candidates.push(SpawnPose {
                pos: seg.points[i],
                angle: (next - prev).to_angle(),
            });
            i += step;
        }
    }
    candidates
}

/// Greedily take up to `count` poses that keep `min_spacing` between
/// each other. Candidates should already be shuffled.
fn pick_spaced(candidates: &[SpawnPose], count: usize, min_spacing: f32) -> Vec<SpawnPose> {
    let mut chosen: Vec<SpawnPose> = Vec::with_capacity(count);
    for candidate in candidates {
        if chosen.len() >= count {
            break;
        }
        if chosen
            .iter()
            .all(|p| p.pos.distance(candidate.pos) >= min_spacing)
        {
            chosen.push(*candidate);
        }
    }
    chosen
}
