use super::*;

#[test]
fn optional_values_treat_blank_as_unset() {
    assert_eq!(parse_optional(None), None);
    assert_eq!(parse_optional(Some("   ")), None);
    assert_eq!(parse_optional(Some(" v2 ")), Some("v2".to_string()));
}

#[test]
fn rating_defaults_when_unset() {
    assert_eq!(parse_rating("R", None).unwrap().value(), DEFAULT_REVIEW_RATING);
    assert_eq!(parse_rating("R", Some("")).unwrap().value(), DEFAULT_REVIEW_RATING);
}

#[test]
fn rating_parses_in_range_values() {
    assert_eq!(parse_rating("R", Some("3")).unwrap().value(), 3);
    assert_eq!(parse_rating("R", Some(" 1 ")).unwrap().value(), 1);
}

#[test]
fn rating_rejects_garbage_and_out_of_range() {
    let err = parse_rating("R", Some("five")).unwrap_err();
    assert_eq!(err, ConfigError::NotANumber { var: "R", value: "five".into() });
    assert_eq!(err.error_code(), "E_CONFIG_NUMBER");

    let err = parse_rating("R", Some("9")).unwrap_err();
    assert_eq!(err, ConfigError::Rating { var: "R", source: InvalidRating(9) });
    assert_eq!(err.to_string(), "R: rating must be between 1 and 5, got 9");
}

// Env manipulation requires unsafe in edition 2024; this is the only test
// touching FLEETVIEW_* variables.
#[test]
fn from_env_reads_overrides() {
    unsafe {
        std::env::set_var("FLEETVIEW_BOAT_TYPE", " Sailboat ");
        std::env::set_var("FLEETVIEW_SELECT", "v2");
        std::env::set_var("FLEETVIEW_SEED_FILE", "fleet.json");
        std::env::set_var("FLEETVIEW_REVIEW_RATING", "4");
    }

    let cfg = AppConfig::from_env().unwrap();

    unsafe {
        std::env::remove_var("FLEETVIEW_BOAT_TYPE");
        std::env::remove_var("FLEETVIEW_SELECT");
        std::env::remove_var("FLEETVIEW_SEED_FILE");
        std::env::remove_var("FLEETVIEW_REVIEW_RATING");
    }

    assert_eq!(cfg.boat_type, "Sailboat");
    assert_eq!(cfg.select.as_deref(), Some("v2"));
    assert_eq!(cfg.seed_file, Some(PathBuf::from("fleet.json")));
    assert_eq!(cfg.review_rating.value(), 4);
}
