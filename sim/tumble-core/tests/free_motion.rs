//! Free motion of a single box under gravity and the scripted impulse.
//!
//! Checks the discrete behavior of the symplectic Euler step against closed
//! forms, and the one-shot impulse lifecycle across binds.

use approx::assert_relative_eq;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use tumble_core::{
    BodyState, BoxConfig, DynamicsError, Gravity, Integrator, IntegratorConfig, ScriptedImpulse,
};

fn cube(edge: f64, density: f64) -> BodyState {
    BoxConfig::cube(edge).density(density).build().expect("valid box")
}

fn integrator(gravity: Gravity, impulse: bool) -> Integrator {
    let config = IntegratorConfig::with_gravity(gravity);
    let config = if impulse {
        config
    } else {
        config.without_impulse()
    };
    Integrator::with_config(config).expect("valid config")
}

/// Test: a resting body with no forces stays put for any timestep.
#[test]
fn body_at_rest_stays_at_rest() {
    for dt in [1e-4, 0.001, 1.0 / 60.0, 0.1, 1.0] {
        let mut integrator = integrator(Gravity::zero(), false);
        integrator.bind(cube(0.1, 10.0));

        for _ in 0..100 {
            integrator.step(dt).expect("step");
        }

        let body = integrator.body().expect("bound");
        assert_eq!(body.position, Point3::origin());
        assert_eq!(body.orientation(), &UnitQuaternion::identity());
        assert_eq!(body.velocity, Vector3::zeros());
        assert_eq!(body.angular_velocity, Vector3::zeros());
    }
}

/// Test: velocity after n gravity steps is n·g·dt, position follows the discrete sum.
#[test]
fn gravity_matches_discrete_closed_form() {
    let g = Gravity::earth().acceleration;
    let dt = 1.0 / 60.0;
    let n = 120;

    let mut integrator = integrator(Gravity::earth(), false);
    integrator.bind(cube(0.5, 2.0));

    let mut expected_position = Vector3::zeros();
    for i in 1..=n {
        integrator.step(dt).expect("step");
        // Symplectic Euler: the position update uses the already-updated velocity
        expected_position += g * (f64::from(i) * dt) * dt;
    }

    let body = integrator.body().expect("bound");
    assert_relative_eq!(body.velocity, g * (f64::from(n) * dt), epsilon = 1e-10);
    assert_relative_eq!(body.position.coords, expected_position, epsilon = 1e-10);

    // x_n = g dt² n(n+1)/2, which overshoots the parabola ½ g t² by ½ g dt t
    let t = f64::from(n) * dt;
    let closed_form = g * dt * dt * f64::from(n * (n + 1)) / 2.0;
    assert_relative_eq!(body.position.coords, closed_form, epsilon = 1e-10);
    let parabola = g * (0.5 * t * t);
    assert_relative_eq!(
        body.position.coords - parabola,
        g * (0.5 * dt * t),
        epsilon = 1e-10
    );
}

/// Test: the impulse contributes to the first step only.
#[test]
fn impulse_fires_exactly_once() {
    let dt = 0.01;
    let mut integrator = integrator(Gravity::earth(), true);
    integrator.bind(cube(1.0, 10.0));
    assert!(integrator.impulse_pending());

    let mass = integrator.body().expect("bound").mass();
    let weight = Gravity::earth().force_on_mass(mass);
    let impulse = ScriptedImpulse::default();

    integrator.step(dt).expect("step 1");
    let p1 = integrator.body().expect("bound").linear_momentum;
    let l1 = integrator.body().expect("bound").angular_momentum;
    assert!(!integrator.impulse_pending());
    assert_relative_eq!(p1, (weight + impulse.force) * dt, epsilon = 1e-12);

    // r = vertex 0 of the unrotated unit cube
    let r = Vector3::new(-0.5, -0.5, -0.5);
    assert_relative_eq!(l1, r.cross(&impulse.force) * dt, epsilon = 1e-12);

    integrator.step(dt).expect("step 2");
    let p2 = integrator.body().expect("bound").linear_momentum;
    integrator.step(dt).expect("step 3");
    let body = integrator.body().expect("bound");
    let p3 = body.linear_momentum;

    assert_relative_eq!(p2 - p1, weight * dt, epsilon = 1e-12);
    assert_relative_eq!(p3 - p2, weight * dt, epsilon = 1e-12);

    // Gravity exerts no torque, so L keeps the impulse contribution only
    assert_relative_eq!(body.angular_momentum, l1, epsilon = 1e-15);
}

/// Test: rebinding re-arms the impulse for the new body.
#[test]
fn rebind_rearms_impulse() {
    let dt = 0.01;
    let mut integrator = integrator(Gravity::zero(), true);

    integrator.bind(cube(1.0, 1.0));
    for _ in 0..5 {
        integrator.step(dt).expect("step");
    }
    let first = integrator.bind(cube(1.0, 1.0)).expect("previous body returned");
    assert_eq!(integrator.steps(), 0);
    assert_eq!(integrator.time(), 0.0);

    integrator.step(dt).expect("step");
    let second = integrator.body().expect("bound");

    // Both bodies received the same single kick
    assert_relative_eq!(
        second.linear_momentum,
        ScriptedImpulse::default().force * dt,
        epsilon = 1e-12
    );
    assert_relative_eq!(first.linear_momentum, second.linear_momentum, epsilon = 1e-12);
}

/// Test: explicitly re-arming kicks the same body again.
#[test]
fn rearm_impulse_without_rebind() {
    let dt = 0.01;
    let mut integrator = integrator(Gravity::zero(), true);
    integrator.bind(cube(1.0, 1.0));

    integrator.step(dt).expect("step");
    integrator.rearm_impulse();
    assert!(integrator.impulse_pending());
    integrator.step(dt).expect("step");

    let body = integrator.body().expect("bound");
    assert_relative_eq!(
        body.linear_momentum,
        ScriptedImpulse::default().force * (2.0 * dt),
        epsilon = 1e-12
    );
    assert_eq!(integrator.steps(), 2);
}

/// Test: mass and body-space inertia never change while stepping.
#[test]
fn mass_properties_invariant() {
    let mut integrator = integrator(Gravity::earth(), true);
    integrator.bind(BoxConfig::new(0.3, 0.2, 0.1).density(7.0).build().expect("valid box"));

    let before = integrator.body().expect("bound").clone();
    for _ in 0..1000 {
        integrator.step(1.0 / 60.0).expect("step");
    }
    let after = integrator.body().expect("bound");

    assert_eq!(after.mass(), before.mass());
    assert_eq!(after.inertia_body(), before.inertia_body());
    assert_eq!(after.inverse_inertia_body(), before.inverse_inertia_body());
    assert_eq!(after.vertices_body(), before.vertices_body());
}

/// Test: after every step the derived views agree with the authoritative state.
#[test]
fn derived_state_consistent() {
    let mut integrator = integrator(Gravity::lab(), true);
    integrator.bind(BoxConfig::new(0.2, 0.1, 0.05).density(10.0).build().expect("valid box"));

    for _ in 0..200 {
        integrator.step(0.017).expect("step");
        let body = integrator.body().expect("bound");

        assert_relative_eq!(body.orientation().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            *body.rotation(),
            body.orientation().to_rotation_matrix().into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            body.velocity,
            body.linear_momentum / body.mass(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            body.angular_velocity,
            body.inverse_inertia_world * body.angular_momentum,
            epsilon = 1e-12
        );
        assert!(body.accumulators_clear());
    }
}

/// Test: the impulse sets the body tumbling while the center of mass falls.
#[test]
fn impulse_starts_tumble() {
    let mut integrator = integrator(Gravity::lab(), true);
    integrator.bind(cube(0.1, 10.0));

    for _ in 0..60 {
        integrator.step(1.0 / 60.0).expect("step");
    }

    let body = integrator.body().expect("bound");
    assert!(body.angular_velocity.norm() > 0.0);
    assert!(body.orientation().angle() > 0.0);
    assert!(body.velocity.y < 0.0);
    // Impulse pushes +X, gravity has no X component
    assert!(body.position.x > 0.0);
}

/// Test: rejected steps leave the body and counters untouched.
#[test]
fn rejected_steps_do_not_mutate() {
    let mut integrator = integrator(Gravity::earth(), true);
    integrator.bind(cube(1.0, 1.0));
    integrator.step(0.01).expect("step");
    let before = integrator.body().expect("bound").clone();

    for dt in [0.0, -1.0, f64::NAN, f64::NEG_INFINITY] {
        let err = integrator.step(dt).expect_err("dt should be rejected");
        assert!(err.is_step_error());
    }

    assert_eq!(integrator.body().expect("bound"), &before);
    assert_eq!(integrator.steps(), 1);
}

/// Test: an unbound integrator refuses to step.
#[test]
fn unbound_integrator_is_inert() {
    let mut integrator = integrator(Gravity::earth(), true);
    assert_eq!(integrator.step(0.01), Err(DynamicsError::Unbound));

    integrator.bind(cube(1.0, 1.0));
    integrator.unbind();
    assert!(!integrator.impulse_pending());
    assert_eq!(integrator.step(0.01), Err(DynamicsError::Unbound));
}

/// Test: bad box parameters never yield a body.
#[test]
fn invalid_box_rejected() {
    for (w, h, d, rho) in [(0.0, 1.0, 1.0, 1.0), (1.0, 1.0, -2.0, 1.0), (1.0, 1.0, 1.0, 0.0)] {
        let err = BoxConfig::new(w, h, d)
            .density(rho)
            .build()
            .expect_err("box should be rejected");
        assert!(err.is_config_error());
    }
}
