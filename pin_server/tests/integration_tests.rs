use std::sync::Arc;

use pin_server::{
    actuation::actuation_pass,
    heightfield::{DepthBuffer, HeightFieldMapper},
    latest::{latest_depth_cell, DepthProvider},
    pins::PinGrid,
};

/// Provider that has never seen a completed inference pass.
struct EmptyProvider;

impl DepthProvider for EmptyProvider {
    fn latest_depth(&self) -> Option<Arc<DepthBuffer>> {
        None
    }
}

fn plateau_buffer() -> DepthBuffer {
    let data = vec![
        0.0, 0.0, 0.0, 0.0, //
        0.0, 10.0, 10.0, 0.0, //
        0.0, 10.0, 10.0, 0.0, //
        0.0, 0.0, 0.0, 0.0, //
    ];

    DepthBuffer::new(data, 4, 4).unwrap()
}

#[test]
fn published_depth_reaches_the_pins() {
    let (tx, rx) = latest_depth_cell();
    let mapper = HeightFieldMapper::new(2).unwrap();
    let mut pins = PinGrid::new(2, 5.0);

    tx.publish(plateau_buffer());

    let actuated = actuation_pass(&rx, &mapper, &mut pins).unwrap();
    assert!(actuated);

    // Every 2x2 cell samples the raised plateau.
    for travel in pins.travel() {
        assert!(*travel > 4.5, "pin travel {travel} should be near maximum");
    }
}

#[test]
fn pass_without_depth_skips_the_pins() {
    let mapper = HeightFieldMapper::new(4).unwrap();
    let mut pins = PinGrid::new(4, 5.0);

    let actuated = actuation_pass(&EmptyProvider, &mapper, &mut pins).unwrap();

    assert!(!actuated);
    assert!(pins.travel().iter().all(|t| *t == 0.0));
}

#[test]
fn depth_resolution_change_needs_no_restart() {
    let (tx, rx) = latest_depth_cell();
    let mapper = HeightFieldMapper::new(3).unwrap();
    let mut pins = PinGrid::new(3, 1.0);

    let coarse: Vec<f32> = (0..8 * 8).map(|i| i as f32).collect();
    tx.publish(DepthBuffer::new(coarse, 8, 8).unwrap());
    assert!(actuation_pass(&rx, &mapper, &mut pins).unwrap());
    let before = pins.travel().to_vec();

    // The sender was reconfigured to a finer capture resolution.
    let fine: Vec<f32> = (0..32 * 24).map(|i| i as f32).collect();
    tx.publish(DepthBuffer::new(fine, 32, 24).unwrap());
    assert!(actuation_pass(&rx, &mapper, &mut pins).unwrap());

    // Same grid, same pin bed, fresh heights; both frames are ramps so the
    // last pin is always the highest.
    assert_eq!(pins.travel().len(), before.len());
    let travel = pins.travel();
    assert!(travel[8] >= travel[0]);
    assert!(travel.iter().all(|t| (0.0..=1.0).contains(t)));
}

#[test]
fn reapplied_buffer_leaves_actuators_unchanged() {
    let (tx, rx) = latest_depth_cell();
    let mapper = HeightFieldMapper::new(2).unwrap();
    let mut pins = PinGrid::new(2, 5.0);

    tx.publish(plateau_buffer());

    assert!(actuation_pass(&rx, &mapper, &mut pins).unwrap());
    let first = pins.travel().to_vec();

    // The actuation loop ticks faster than inference; re-applying the same
    // buffer must reproduce the same actuator state.
    assert!(actuation_pass(&rx, &mapper, &mut pins).unwrap());
    assert_eq!(pins.travel(), &first[..]);
}

#[test]
fn grid_and_bed_size_mismatch_is_fatal() {
    let (tx, rx) = latest_depth_cell();
    let mapper = HeightFieldMapper::new(4).unwrap();
    let mut pins = PinGrid::new(5, 5.0);

    tx.publish(plateau_buffer());

    assert!(actuation_pass(&rx, &mapper, &mut pins).is_err());
}
