//! End-to-end trace execution tests: multi-bot builds, seed accounting,
//! energy totals, and the codec → engine → codec pipeline.

use nanovox_engine::{Engine, EngineError, Harmonics, Status};
use nanovox_geom::{Coordinate, Difference};
use nanovox_grid::VoxelGrid;
use nanovox_proto::{read_model, read_trace, write_model, write_trace, Command};

fn d(dx: i32, dy: i32, dz: i32) -> Difference {
    Difference::new(dx, dy, dz)
}

fn c(x: i32, y: i32, z: i32) -> Coordinate {
    Coordinate::new(x, y, z)
}

/// An 11-tick two-bot build: fission, travel, a supported group-fill
/// beam, fusion, return, halt.
fn beam_trace() -> Vec<Command> {
    vec![
        // Tick 1: spawn the anchor bot at (1,0,1).
        Command::fission(d(1, 0, 1), 0).unwrap(),
        // Ticks 2-3: bot 1 travels to (1,0,3).
        Command::smove(d(0, 0, 3)).unwrap(),
        Command::Wait,
        Command::smove(d(1, 0, 0)).unwrap(),
        Command::Wait,
        // Tick 4: bot 2 lays the floor support under the beam.
        Command::Wait,
        Command::fill(d(0, 0, 1)).unwrap(),
        // Tick 5: both bots fill the beam (1,1,1)-(1,1,3) together.
        Command::group_fill(d(0, 1, 0), d(0, 0, -2)).unwrap(),
        Command::group_fill(d(0, 1, 0), d(0, 0, 2)).unwrap(),
        // Ticks 6-7: bot 1 comes alongside bot 2.
        Command::smove(d(1, 0, 0)).unwrap(),
        Command::Wait,
        Command::smove(d(0, 0, -2)).unwrap(),
        Command::Wait,
        // Tick 8: fuse; bot 2 survives.
        Command::fusion_secondary(d(-1, 0, 0)).unwrap(),
        Command::fusion_primary(d(1, 0, 0)).unwrap(),
        // Ticks 9-11: return to the origin and halt.
        Command::smove(d(-1, 0, 0)).unwrap(),
        Command::smove(d(0, 0, -1)).unwrap(),
        Command::Halt,
    ]
}

#[test]
fn beam_build_reaches_target() {
    let mut engine = Engine::new(VoxelGrid::new(6), beam_trace()).unwrap();
    engine.run_to_halt().unwrap();

    assert_eq!(engine.status(), Status::Halted);
    assert_eq!(engine.bot_count(), 0);
    assert_eq!(engine.remaining_commands(), 0);
    assert_eq!(engine.harmonics(), Harmonics::Low);
    assert_eq!(engine.steps(), 11);

    let mut target = VoxelGrid::new(6);
    for v in [c(1, 0, 2), c(1, 1, 1), c(1, 1, 2), c(1, 1, 3)] {
        target.fill(v).unwrap();
    }
    assert!(engine.verify_target(&target));
    assert!(!engine.verify_empty());
}

#[test]
fn beam_build_energy_total() {
    let mut engine = Engine::new(VoxelGrid::new(6), beam_trace()).unwrap();
    let mut outcome_sum = 0;
    while engine.status() == Status::Running {
        let outcome = engine.step().unwrap();
        outcome_sum += outcome.base_energy + outcome.command_energy;
    }
    // Base: 4 single-bot ticks at 3*216+20, 7 two-bot ticks at 3*216+40.
    // Commands: fission 24, moves 6+2+2+4+2+2, fill 12, group fill 36,
    // fusion -24.
    assert_eq!(engine.energy(), 4 * 668 + 7 * 688 + 66);
    assert_eq!(engine.energy(), outcome_sum);
}

#[test]
fn fission_chain_and_fusion_chain_conserve_seeds() {
    let trace = vec![
        // Tick 1: bot 1 spawns bot 2 with 5 seeds.
        Command::fission(d(1, 0, 0), 5).unwrap(),
        // Tick 2: bot 2 spawns bot 3 with 2 seeds.
        Command::Wait,
        Command::fission(d(0, 0, 1), 2).unwrap(),
        // Tick 3: bot 3 folds back into bot 2.
        Command::Wait,
        Command::fusion_primary(d(0, 0, 1)).unwrap(),
        Command::fusion_secondary(d(0, 0, -1)).unwrap(),
        // Tick 4: bot 2 folds back into bot 1.
        Command::fusion_primary(d(1, 0, 0)).unwrap(),
        Command::fusion_secondary(d(-1, 0, 0)).unwrap(),
    ];
    let mut engine = Engine::new(VoxelGrid::new(5), trace).unwrap();
    for _ in 0..4 {
        engine.step().unwrap();
    }
    assert_eq!(engine.bot_count(), 1);
    let survivor = engine.bots().next().unwrap();
    let expected: Vec<u32> = (2..=40).collect();
    let got: Vec<u32> = survivor.seeds().iter().copied().collect();
    assert_eq!(got, expected, "fusion must exactly undo fission");
}

#[test]
fn wait_trace_energy_is_the_base_floor() {
    let mut trace = vec![Command::Wait; 9];
    trace.push(Command::Halt);
    let mut engine = Engine::new(VoxelGrid::new(4), trace).unwrap();
    engine.run_to_halt().unwrap();
    // 10 ticks of one idle bot under Low harmonics.
    assert_eq!(engine.energy(), 10 * (3 * 64 + 20));
}

#[test]
fn high_harmonics_ticks_cost_ten_times_the_voxel_rate() {
    let low = {
        let mut e = Engine::new(VoxelGrid::new(4), vec![Command::Wait]).unwrap();
        e.step().unwrap().base_energy
    };
    let high = {
        let mut e =
            Engine::new(VoxelGrid::new(4), vec![Command::Flip, Command::Wait]).unwrap();
        e.step().unwrap();
        e.step().unwrap().base_energy
    };
    assert_eq!(low, 3 * 64 + 20);
    assert_eq!(high, 30 * 64 + 20);
    assert!(high > low);
}

#[test]
fn failed_step_is_terminal_for_the_run() {
    // The second command collides with the voxel the first one filled.
    let trace = vec![
        Command::fill(d(0, 0, 1)).unwrap(),
        Command::smove(d(0, 0, 1)).unwrap(),
    ];
    let mut engine = Engine::new(VoxelGrid::new(4), trace).unwrap();
    engine.step().unwrap();
    let err = engine.step().unwrap_err();
    assert!(matches!(err, EngineError::CollisionOrBounds { .. }));
}

#[test]
fn trace_and_model_files_round_trip_through_a_run() {
    let trace = beam_trace();

    // Ship the trace through its wire format.
    let mut trace_bytes = Vec::new();
    write_trace(&mut trace_bytes, &trace).unwrap();
    let decoded = read_trace(&mut trace_bytes.as_slice()).unwrap();
    assert_eq!(decoded, trace);

    // Run it and ship the resulting model through its wire format.
    let mut engine = Engine::new(VoxelGrid::new(6), decoded).unwrap();
    engine.run_to_halt().unwrap();
    let mut model_bytes = Vec::new();
    write_model(&mut model_bytes, engine.grid()).unwrap();
    let reloaded = read_model(&mut model_bytes.as_slice()).unwrap();
    assert!(engine.verify_target(&reloaded));
    assert_eq!(reloaded.filled_count(), 4);
    assert!(reloaded.all_grounded());
}

#[test]
fn deconstruction_run_verifies_empty() {
    // Start from a single supported voxel and void it.
    let mut grid = VoxelGrid::new(4);
    grid.fill(c(0, 0, 1)).unwrap();
    let trace = vec![Command::void(d(0, 0, 1)).unwrap(), Command::Halt];
    let mut engine = Engine::new(grid, trace).unwrap();
    engine.run_to_halt().unwrap();
    assert!(engine.verify_empty());
    // Void refunds: base energy of two ticks minus 12.
    assert_eq!(engine.energy(), 2 * (3 * 64 + 20) - 12);
}
