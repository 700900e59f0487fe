#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

mod common;

use common::create_test_params;
use flappy_evo::simulation::bird::Bird;
use flappy_evo::simulation::mask::BIRD_HEIGHT;

#[test]
fn test_displacement_is_clamped_every_tick() {
    let params = create_test_params();
    let mut bird = Bird::new(params.spawn_x, params.spawn_y);

    for tick in 0..500 {
        // Mix long falls with occasional jumps so both arcs are covered.
        if tick % 37 == 0 {
            bird.jump(&params);
        }
        let displacement = bird.advance(&params);
        assert!(
            displacement.abs() <= params.terminal_velocity,
            "tick {tick}: |{displacement}| > {}",
            params.terminal_velocity
        );
    }
}

#[test]
fn test_jump_resets_arc_state() {
    let params = create_test_params();
    let mut bird = Bird::new(params.spawn_x, params.spawn_y);

    for _ in 0..7 {
        bird.advance(&params);
    }
    assert_eq!(bird.tick_count, 7);

    let y_before = bird.y;
    bird.jump(&params);

    assert_eq!(bird.vel, params.jump_impulse);
    assert_eq!(bird.tick_count, 0);
    assert_eq!(bird.height, y_before);
}

#[test]
fn test_first_tick_after_jump_gets_ascent_boost() {
    let params = create_test_params();
    let mut bird = Bird::new(params.spawn_x, params.spawn_y);
    bird.jump(&params);

    // d = -10.5 + 0.5 * 3 = -9, minus the 2.0 boost.
    let displacement = bird.advance(&params);
    assert_eq!(displacement, -11.0);
}

#[test]
fn test_free_fall_reaches_floor_deterministically() {
    let params = create_test_params();
    let mut bird = Bird::new(params.spawn_x, params.spawn_y);

    let mut ticks = 0;
    while !bird.out_of_bounds(params.floor_y, params.ceiling_y) {
        bird.advance(&params);
        ticks += 1;
        assert!(ticks < 1000, "bird never reached the floor");
    }

    // From y=350 with g=3: 1.5 + 6 + 13.5, then 16 per tick until the
    // bird's lower edge crosses the floor at 730.
    assert_eq!(ticks, 23);
    assert!(bird.y + BIRD_HEIGHT as f32 >= params.floor_y);
}

#[test]
fn test_ceiling_bound() {
    let params = create_test_params();
    let mut bird = Bird::new(params.spawn_x, params.ceiling_y + 1.0);
    assert!(!bird.out_of_bounds(params.floor_y, params.ceiling_y));
    bird.y = params.ceiling_y - 1.0;
    assert!(bird.out_of_bounds(params.floor_y, params.ceiling_y));
}
