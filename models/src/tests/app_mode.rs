use crate::AppMode;

#[test]
fn given_mode_strings_when_parsed_then_accepts_long_and_short_forms() {
    assert_eq!("production".parse::<AppMode>(), Ok(AppMode::Production));
    assert_eq!(" PROD ".parse::<AppMode>(), Ok(AppMode::Production));
    assert_eq!("dev".parse::<AppMode>(), Ok(AppMode::Development));
    assert!("staging".parse::<AppMode>().is_err());
}

#[test]
fn given_default_mode_then_development() {
    assert_eq!(AppMode::default(), AppMode::Development);
    assert!(AppMode::default().is_development());
}
