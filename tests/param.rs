use rapidcap::{ParamState, ParamType, Preset, Value};

fn sample_map() -> rapidcap::param::ParamMap {
    let mut map = rapidcap::param::ParamMap::new();
    map.register(
        1,
        ParamType::UInt,
        Value::UInt(10),
        [Value::UInt(5), Value::UInt(10), Value::UInt(20)],
        ParamState::Ready,
        false,
    );
    map.register(2, ParamType::Bool, Value::Bool(false), [Value::Bool(false); 3], ParamState::Blocked, false);
    map.register(3, ParamType::UInt, Value::UInt(1920), [Value::UInt(1920); 3], ParamState::Ready, true);
    map
}

#[test]
fn insertion_order_is_preserved() {
    let map = sample_map();
    let names: Vec<u32> = map.iter().map(|p| p.name).collect();
    assert_eq!(names, vec![1, 2, 3]);
}

#[test]
fn set_on_ready_parameter_succeeds() {
    let mut map = sample_map();
    map.set(1, Value::UInt(42)).unwrap();
    assert_eq!(map.get(1).unwrap().value(), Value::UInt(42));
}

#[test]
fn set_on_blocked_parameter_is_denied() {
    let mut map = sample_map();
    assert_eq!(map.set(2, Value::Bool(true)), Err(rapidcap::param::ParamSetError::Denied));
}

#[test]
fn set_on_protected_parameter_is_denied_even_if_ready() {
    let mut map = sample_map();
    assert_eq!(map.set(3, Value::UInt(100)), Err(rapidcap::param::ParamSetError::Denied));
}

#[test]
fn set_on_unknown_name_is_unknown() {
    let mut map = sample_map();
    assert_eq!(map.set(999, Value::UInt(1)), Err(rapidcap::param::ParamSetError::Unknown));
}

#[test]
fn internal_set_bypasses_protection() {
    let mut map = sample_map();
    map.set_internal(3, Value::UInt(1280), ParamState::Ready);
    assert_eq!(map.get(3).unwrap().value(), Value::UInt(1280));
}

#[test]
fn apply_preset_overwrites_current_values() {
    let mut map = sample_map();
    map.apply_preset(Preset::Quality);
    assert_eq!(map.get(1).unwrap().value(), Value::UInt(20));
}
