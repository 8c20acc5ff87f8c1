//! Constant recoding tables for the extract's coded columns.
//!
//! Two kinds of rewrite happen here:
//!
//! - **consolidation**: the vehicle-type codebook is collapsed into a handful
//!   of classes, for both `vehicle_type` and `casualty_type`;
//! - **sentinel clearing**: the codebook's `-1` ("data missing or out of
//!   range") and each column's own "unknown" codes become missing.

use stats19_model::{
    AccidentRecord, CasualtyRecord, FATAL_SEVERITY, NON_INJURY_SEVERITY, SERIOUS_SEVERITY,
    SLIGHT_SEVERITY, TableKind, VehicleRecord,
};

/// "Data missing or out of range", shared by every coded column.
pub const MISSING_CODE: i64 = -1;

/// Vehicle-type consolidation. `None` targets become missing; codes not
/// listed pass through unchanged.
pub const VEHICLE_TYPE_CONSOLIDATION: &[(i64, Option<i64>)] = &[
    // motorcycles: every engine size, electric, unknown cc
    (3, Some(2)),
    (4, Some(2)),
    (5, Some(2)),
    (23, Some(2)),
    (97, Some(2)),
    // buses and coaches
    (10, Some(11)),
    // ridden horse, agricultural vehicle
    (16, Some(90)),
    (17, Some(90)),
    // goods vehicles
    (20, Some(19)),
    (21, Some(19)),
    (98, Some(19)),
    // mobility scooter
    (22, Some(1)),
    // unknown
    (99, None),
];

/// Column-specific "unknown" codes of the vehicle table.
pub const VEHICLE_UNKNOWN_CODES: &[(&str, &[i64])] = &[
    ("towing_and_articulation", &[9]),
    ("junction_location", &[9]),
    ("skidding_and_overturning", &[9]),
    ("vehicle_leaving_carriageway", &[9]),
    ("first_point_of_impact", &[9]),
    ("vehicle_left_hand_drive", &[9]),
    ("vehicle_manoeuvre", &[99]),
    ("vehicle_location_restricted_lane", &[99]),
    ("hit_object_in_carriageway", &[99]),
    ("hit_object_off_carriageway", &[99]),
    ("journey_purpose_of_driver", &[6, 15]),
    ("sex_of_driver", &[3]),
];

/// Column-specific "unknown" codes of the accident table.
pub const ACCIDENT_UNKNOWN_CODES: &[(&str, &[i64])] = &[
    ("road_type", &[9]),
    ("junction_control", &[9]),
    ("weather_conditions", &[9]),
    ("road_surface_conditions", &[9]),
    ("special_conditions_at_site", &[9]),
    ("carriageway_hazards", &[9]),
    ("speed_limit", &[99]),
    ("junction_detail", &[99]),
];

/// "Unknown" sex of a casualty.
pub const CASUALTY_SEX_UNKNOWN: i64 = 9;

/// Worst severity to binary label: fatal or serious is 1.
pub const WORST_SEVERITY_LABELS: &[(i64, i64)] = &[
    (FATAL_SEVERITY, 1),
    (SERIOUS_SEVERITY, 1),
    (SLIGHT_SEVERITY, 0),
    (NON_INJURY_SEVERITY, 0),
];

/// Applies a consolidation table; unlisted codes pass through.
pub fn recode(code: Option<i64>, table: &[(i64, Option<i64>)]) -> Option<i64> {
    let code = code?;
    match table.iter().find(|(from, _)| *from == code) {
        Some((_, to)) => *to,
        None => Some(code),
    }
}

pub fn consolidate_vehicle_type(code: Option<i64>) -> Option<i64> {
    recode(clear_missing(code), VEHICLE_TYPE_CONSOLIDATION)
}

/// `-1` becomes missing.
pub fn clear_missing(code: Option<i64>) -> Option<i64> {
    code.filter(|value| *value != MISSING_CODE)
}

/// `-1` and any of `unknown` become missing.
pub fn clear_unknown(code: Option<i64>, unknown: &[i64]) -> Option<i64> {
    clear_missing(code).filter(|value| !unknown.contains(value))
}

/// "Unknown" codes declared for `column` of `kind`; empty when it has none.
pub fn unknown_codes(kind: TableKind, column: &str) -> &'static [i64] {
    let table = match kind {
        TableKind::Accident => ACCIDENT_UNKNOWN_CODES,
        TableKind::Vehicle => VEHICLE_UNKNOWN_CODES,
        TableKind::Casualty => &[],
    };
    table
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, codes)| *codes)
        .unwrap_or(&[])
}

/// Binary worst-severity label; `None` for codes outside 1..=4.
pub fn worst_severity_label(severity: i64) -> Option<i64> {
    WORST_SEVERITY_LABELS
        .iter()
        .find(|(from, _)| *from == severity)
        .map(|(_, label)| *label)
}

/// Male indicator of a casualty: 1 male, 0 female, `None` unknown.
pub fn male_indicator(sex: Option<i64>) -> Option<f64> {
    match clear_unknown(sex, &[CASUALTY_SEX_UNKNOWN]) {
        Some(1) => Some(1.0),
        Some(2) => Some(0.0),
        _ => None,
    }
}

pub fn recode_vehicle(vehicle: &mut VehicleRecord) {
    vehicle.vehicle_type = consolidate_vehicle_type(vehicle.vehicle_type);
    let coded = [
        ("accident_year", &mut vehicle.accident_year),
        ("towing_and_articulation", &mut vehicle.towing_and_articulation),
        ("vehicle_manoeuvre", &mut vehicle.vehicle_manoeuvre),
        (
            "vehicle_location_restricted_lane",
            &mut vehicle.vehicle_location_restricted_lane,
        ),
        ("junction_location", &mut vehicle.junction_location),
        ("skidding_and_overturning", &mut vehicle.skidding_and_overturning),
        ("hit_object_in_carriageway", &mut vehicle.hit_object_in_carriageway),
        (
            "vehicle_leaving_carriageway",
            &mut vehicle.vehicle_leaving_carriageway,
        ),
        ("hit_object_off_carriageway", &mut vehicle.hit_object_off_carriageway),
        ("first_point_of_impact", &mut vehicle.first_point_of_impact),
        ("vehicle_left_hand_drive", &mut vehicle.vehicle_left_hand_drive),
        ("journey_purpose_of_driver", &mut vehicle.journey_purpose_of_driver),
        ("sex_of_driver", &mut vehicle.sex_of_driver),
        ("age_of_driver", &mut vehicle.age_of_driver),
        ("engine_capacity_cc", &mut vehicle.engine_capacity_cc),
        ("propulsion_code", &mut vehicle.propulsion_code),
        ("age_of_vehicle", &mut vehicle.age_of_vehicle),
        ("driver_imd_decile", &mut vehicle.driver_imd_decile),
        ("driver_home_area_type", &mut vehicle.driver_home_area_type),
    ];
    for (column, value) in coded {
        *value = clear_unknown(*value, unknown_codes(TableKind::Vehicle, column));
    }
}

pub fn recode_accident(accident: &mut AccidentRecord) {
    let coded = [
        ("number_of_vehicles", &mut accident.number_of_vehicles),
        ("local_authority_district", &mut accident.local_authority_district),
        ("first_road_class", &mut accident.first_road_class),
        ("road_type", &mut accident.road_type),
        ("speed_limit", &mut accident.speed_limit),
        ("junction_detail", &mut accident.junction_detail),
        ("junction_control", &mut accident.junction_control),
        ("second_road_class", &mut accident.second_road_class),
        ("light_conditions", &mut accident.light_conditions),
        ("weather_conditions", &mut accident.weather_conditions),
        ("road_surface_conditions", &mut accident.road_surface_conditions),
        (
            "special_conditions_at_site",
            &mut accident.special_conditions_at_site,
        ),
        ("carriageway_hazards", &mut accident.carriageway_hazards),
        ("urban_or_rural_area", &mut accident.urban_or_rural_area),
    ];
    for (column, value) in coded {
        *value = clear_unknown(*value, unknown_codes(TableKind::Accident, column));
    }
}

/// Clears `-1` from casualty codes. Type consolidation and sex handling are
/// left to the aggregator, which needs the person-level values.
pub fn recode_casualty(casualty: &mut CasualtyRecord) {
    for value in [
        &mut casualty.casualty_reference,
        &mut casualty.casualty_class,
        &mut casualty.sex_of_casualty,
        &mut casualty.age_of_casualty,
        &mut casualty.casualty_severity,
        &mut casualty.casualty_type,
    ] {
        *value = clear_missing(*value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_type_consolidation() {
        for code in [3, 4, 5, 23, 97] {
            assert_eq!(consolidate_vehicle_type(Some(code)), Some(2), "code {code}");
        }
        assert_eq!(consolidate_vehicle_type(Some(10)), Some(11));
        assert_eq!(consolidate_vehicle_type(Some(16)), Some(90));
        assert_eq!(consolidate_vehicle_type(Some(17)), Some(90));
        for code in [20, 21, 98] {
            assert_eq!(consolidate_vehicle_type(Some(code)), Some(19), "code {code}");
        }
        assert_eq!(consolidate_vehicle_type(Some(22)), Some(1));
        assert_eq!(consolidate_vehicle_type(Some(99)), None);
        assert_eq!(consolidate_vehicle_type(Some(-1)), None);
        assert_eq!(consolidate_vehicle_type(None), None);
    }

    #[test]
    fn test_unlisted_codes_pass_through() {
        for code in [1, 2, 8, 9, 11, 18, 19, 90] {
            assert_eq!(consolidate_vehicle_type(Some(code)), Some(code));
        }
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        for (_, to) in VEHICLE_TYPE_CONSOLIDATION {
            assert_eq!(consolidate_vehicle_type(*to), *to);
        }
    }

    #[test]
    fn test_vehicle_unknown_codes() {
        let mut vehicle = VehicleRecord {
            vehicle_type: Some(4),
            towing_and_articulation: Some(9),
            junction_location: Some(8),
            vehicle_manoeuvre: Some(99),
            hit_object_off_carriageway: Some(9),
            journey_purpose_of_driver: Some(15),
            sex_of_driver: Some(3),
            age_of_driver: Some(-1),
            engine_capacity_cc: Some(1598),
            ..VehicleRecord::default()
        };
        recode_vehicle(&mut vehicle);

        assert_eq!(vehicle.vehicle_type, Some(2));
        assert_eq!(vehicle.towing_and_articulation, None);
        assert_eq!(vehicle.junction_location, Some(8));
        assert_eq!(vehicle.vehicle_manoeuvre, None);
        assert_eq!(vehicle.hit_object_off_carriageway, Some(9));
        assert_eq!(vehicle.journey_purpose_of_driver, None);
        assert_eq!(vehicle.sex_of_driver, None);
        assert_eq!(vehicle.age_of_driver, None);
        assert_eq!(vehicle.engine_capacity_cc, Some(1598));
    }

    #[test]
    fn test_journey_purpose_six_is_unknown() {
        let mut vehicle = VehicleRecord {
            journey_purpose_of_driver: Some(6),
            ..VehicleRecord::default()
        };
        recode_vehicle(&mut vehicle);
        assert_eq!(vehicle.journey_purpose_of_driver, None);
    }

    #[test]
    fn test_accident_unknown_codes() {
        let mut accident = AccidentRecord {
            road_type: Some(9),
            weather_conditions: Some(1),
            carriageway_hazards: Some(9),
            speed_limit: Some(99),
            junction_detail: Some(99),
            light_conditions: Some(-1),
            urban_or_rural_area: Some(1),
            ..AccidentRecord::default()
        };
        recode_accident(&mut accident);

        assert_eq!(accident.road_type, None);
        assert_eq!(accident.weather_conditions, Some(1));
        assert_eq!(accident.carriageway_hazards, None);
        assert_eq!(accident.speed_limit, None);
        assert_eq!(accident.junction_detail, None);
        assert_eq!(accident.light_conditions, None);
        assert_eq!(accident.urban_or_rural_area, Some(1));
    }

    #[test]
    fn test_casualty_missing_codes() {
        let mut casualty = CasualtyRecord {
            casualty_class: Some(-1),
            casualty_severity: Some(2),
            casualty_type: Some(-1),
            ..CasualtyRecord::default()
        };
        recode_casualty(&mut casualty);
        assert_eq!(casualty.casualty_class, None);
        assert_eq!(casualty.casualty_severity, Some(2));
        assert_eq!(casualty.casualty_type, None);
    }

    #[test]
    fn test_worst_severity_label() {
        assert_eq!(worst_severity_label(1), Some(1));
        assert_eq!(worst_severity_label(2), Some(1));
        assert_eq!(worst_severity_label(3), Some(0));
        assert_eq!(worst_severity_label(4), Some(0));
        assert_eq!(worst_severity_label(5), None);
    }

    #[test]
    fn test_male_indicator() {
        assert_eq!(male_indicator(Some(1)), Some(1.0));
        assert_eq!(male_indicator(Some(2)), Some(0.0));
        assert_eq!(male_indicator(Some(9)), None);
        assert_eq!(male_indicator(Some(-1)), None);
        assert_eq!(male_indicator(None), None);
    }

    #[test]
    fn test_unknown_codes_lookup() {
        assert_eq!(unknown_codes(TableKind::Vehicle, "sex_of_driver"), &[3]);
        assert_eq!(unknown_codes(TableKind::Accident, "speed_limit"), &[99]);
        assert!(unknown_codes(TableKind::Vehicle, "speed_limit").is_empty());
        assert!(unknown_codes(TableKind::Casualty, "casualty_type").is_empty());
    }
}
