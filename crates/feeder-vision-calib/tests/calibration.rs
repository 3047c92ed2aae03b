use approx::assert_abs_diff_eq;
use feeder_vision_calib::{
    compute_transform, compute_tray_offsets, validate_consistency, CalibrationError, OffsetField,
    TrayAxis, TrayOffsets, CONSISTENCY_TOLERANCE, RIGHT_ANGLE_TOLERANCE_DEG,
};
use feeder_vision_core::{LengthUnit, Location};

#[test]
fn pure_translation_has_zero_rotation() {
    let a = Location::mm(12.5, -3.0);
    let b = Location::mm(40.0, 7.25);
    let base = Location::new(LengthUnit::Millimeters, 0.0, 0.0, 11.0, -45.0);
    for (vx, vy) in [(0.0, 0.0), (100.0, 50.0), (-3.25, 0.5), (1e-3, -7e2)] {
        let v = Location::mm(vx, vy);
        let t = compute_transform(&base, &a, &b, &a.add(&v), &b.add(&v)).expect("transform");
        assert_abs_diff_eq!(t.rotation_deg, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.translation.x, vx, epsilon = 1e-9);
        assert_abs_diff_eq!(t.translation.y, vy, epsilon = 1e-9);
        assert_eq!(t.translation.z, 11.0);
        assert_eq!(t.translation.rotation, -45.0);
    }
}

#[test]
fn transform_maps_local_points_onto_captures() {
    let la = Location::mm(0.0, 0.0);
    let lb = Location::mm(20.0, 0.0);
    let ca = Location::mm(100.0, 100.0);
    let cb = la.rotate_xy(30.0).add(&ca).add(&lb.rotate_xy(30.0));
    let t = compute_transform(&Location::default(), &la, &lb, &ca, &cb).expect("transform");
    assert_abs_diff_eq!(t.rotation_deg, 30.0, epsilon = 1e-9);
    for (local, captured) in [(la, ca), (lb, cb)] {
        let m = t.apply(&local);
        assert_abs_diff_eq!(m.x, captured.x, epsilon = 1e-9);
        assert_abs_diff_eq!(m.y, captured.y, epsilon = 1e-9);
    }
}

#[test]
fn transform_converts_units_to_base() {
    let base = Location::origin(LengthUnit::Millimeters);
    let la = Location::new(LengthUnit::Centimeters, 0.0, 0.0, 0.0, 0.0);
    let lb = Location::new(LengthUnit::Centimeters, 1.0, 0.0, 0.0, 0.0);
    let ca = Location::mm(5.0, 5.0);
    let cb = Location::mm(15.0, 5.0);
    let t = compute_transform(&base, &la, &lb, &ca, &cb).expect("transform");
    assert_eq!(t.translation.units, LengthUnit::Millimeters);
    assert_abs_diff_eq!(t.translation.x, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(t.translation.y, 5.0, epsilon = 1e-9);
}

#[test]
fn square_tray_offsets() {
    let a = Location::mm(0.0, 0.0);
    let b = Location::mm(10.0, 0.0);
    let c = Location::mm(10.0, 5.0);
    let t = compute_tray_offsets(&a, &b, &c, 3, 2, 0.0).expect("offsets");
    assert_abs_diff_eq!(t.col_step, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t.row_step, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t.rotation_deg, 0.0, epsilon = 1e-12);

    // Rotating C towards A closes the corner to 80°.
    let skewed = c.rotate_xy_about(&b, 10.0);
    match compute_tray_offsets(&a, &b, &skewed, 3, 2, 0.0) {
        Err(CalibrationError::RightAngleViolation {
            angle_deg,
            tolerance_deg,
        }) => {
            assert_abs_diff_eq!(angle_deg, 80.0, epsilon = 1e-9);
            assert_eq!(tolerance_deg, RIGHT_ANGLE_TOLERANCE_DEG);
        }
        other => panic!("expected right angle violation, got {other:?}"),
    }
}

#[test]
fn right_angle_message_names_measured_angle() {
    let err = CalibrationError::RightAngleViolation {
        angle_deg: 100.0,
        tolerance_deg: 2.5,
    };
    assert!(err.to_string().contains("100.000"));
}

#[test]
fn coincident_columns_with_several_columns_is_a_mismatch() {
    let a = Location::mm(0.0, 0.0);
    let c = Location::mm(0.0, 10.0);
    let err = compute_tray_offsets(&a, &a, &c, 3, 2, 0.0).unwrap_err();
    assert_eq!(
        err,
        CalibrationError::CardinalityMismatch {
            axis: TrayAxis::Column,
            length: 0.0,
            count: 3
        }
    );

    // The converse: a row edge with a single row.
    let b = Location::mm(10.0, 0.0);
    let err = compute_tray_offsets(&a, &b, &Location::mm(10.0, 4.0), 2, 1, 0.0).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::CardinalityMismatch {
            axis: TrayAxis::Row,
            count: 1,
            ..
        }
    ));
}

fn tray_corners(origin: (f64, f64), rotation_deg: f64, width: f64, height: f64) -> [Location; 3] {
    let a = Location::mm(origin.0, origin.1);
    let b = a.add(&Location::mm(width, 0.0).rotate_xy(rotation_deg));
    let c = b.add(&Location::mm(0.0, height).rotate_xy(rotation_deg));
    [a, b, c]
}

#[test]
fn computed_offsets_validate_against_their_own_points() {
    let rotations = [0.0, 37.0, 90.0, -120.0, 179.5, -179.5];
    let shapes = [
        (20.0, 12.0, 5, 4),
        (20.0, -12.0, 5, 4),
        (33.3, 0.0, 7, 1),
        (0.0, 8.0, 1, 3),
        (0.0, 0.0, 1, 1),
    ];
    for rotation in rotations {
        for (width, height, cols, rows) in shapes {
            let [a, b, c] = tray_corners((3.0, -4.0), rotation, width, height);
            let offsets = compute_tray_offsets(&a, &b, &c, cols, rows, 15.0).expect("offsets");
            let validated =
                validate_consistency(&offsets, &a, &b, &c, cols, rows, CONSISTENCY_TOLERANCE)
                    .expect("consistent");
            assert_eq!(validated, offsets, "rotation {rotation}, shape {width}x{height}");

            // The last component lands on C.
            let last = offsets.pick_location(&a, cols - 1, rows - 1);
            assert_abs_diff_eq!(last.x, c.x, epsilon = 1e-9);
            assert_abs_diff_eq!(last.y, c.y, epsilon = 1e-9);
        }
    }
}

#[test]
fn edited_offsets_are_flagged() {
    let [a, b, c] = tray_corners((0.0, 0.0), 0.0, 20.0, 10.0);
    let offsets = compute_tray_offsets(&a, &b, &c, 5, 3, 0.0).expect("offsets");
    let edited = TrayOffsets {
        row_step: offsets.row_step + 0.01,
        ..offsets
    };
    let err = validate_consistency(&edited, &a, &b, &c, 5, 3, CONSISTENCY_TOLERANCE).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::ConsistencyViolation {
            field: OffsetField::RowStep,
            ..
        }
    ));

    let rotated = TrayOffsets {
        rotation_deg: 359.9999,
        ..offsets
    };
    // 359.9999° is 0.0001° away from the recomputed 0°.
    assert!(validate_consistency(&rotated, &a, &b, &c, 5, 3, CONSISTENCY_TOLERANCE).is_ok());
}

#[test]
fn stored_offsets_load_from_json() {
    let stored: TrayOffsets =
        serde_json::from_str(r#"{ "col_step": 5.0, "row_step": 5.0, "rotation_deg": 0.0 }"#)
            .expect("offsets");
    let [a, b, c] = tray_corners((0.0, 0.0), 0.0, 10.0, 5.0);
    let computed =
        validate_consistency(&stored, &a, &b, &c, 3, 2, CONSISTENCY_TOLERANCE).expect("consistent");
    assert_eq!(computed, stored);
}
