use ai_core::{BbKey, Blackboard, ParameterError, ParameterLocation, TaskParameter};

const SPEED: BbKey<f32> = BbKey::named("speed");

#[test]
fn user_value_ignores_the_blackboard() {
    let bb = Blackboard::new();
    bb.set_value(&SPEED, 9.0);

    let param = TaskParameter::value(2.5f32);
    assert_eq!(param.location(), ParameterLocation::UserValue);
    assert_eq!(param.try_resolve(&bb), Ok(2.5));
}

#[test]
fn blackboard_parameter_reads_its_key_through_the_parent_chain() {
    let parent = Blackboard::new().into_ref();
    parent.set_value(&SPEED, 4.0);
    let bb = Blackboard::with_parents([&parent]);

    let param = TaskParameter::blackboard(SPEED).with_fallback(1.0);
    assert_eq!(param.resolve(&bb), Some(4.0));
}

#[test]
fn blackboard_parameter_falls_back_to_the_user_value_on_a_miss() {
    let bb = Blackboard::new();
    let param = TaskParameter::blackboard(SPEED).with_fallback(1.0);

    assert_eq!(param.try_resolve(&bb), Ok(1.0));
}

#[test]
fn blackboard_parameter_without_fallback_is_unresolved() {
    let bb = Blackboard::new();
    let param = TaskParameter::blackboard(SPEED);

    assert_eq!(
        param.try_resolve(&bb),
        Err(ParameterError::Unresolved {
            location: ParameterLocation::Blackboard,
        })
    );
    assert_eq!(param.resolve(&bb), None);
}

#[test]
fn mistyped_blackboard_entry_is_reported() {
    let bb = Blackboard::new();
    bb.set_value(&BbKey::<u32>::named("speed"), 3u32);

    let param = TaskParameter::blackboard(SPEED).with_fallback(1.0);
    assert!(matches!(
        param.try_resolve(&bb),
        Err(ParameterError::Blackboard(_))
    ));
}

#[test]
fn plain_values_convert_into_parameters() {
    let param: TaskParameter<u32> = 7.into();
    assert_eq!(param.user_value(), Some(&7));
    assert!(param.key().is_none());
}
