//! End-to-end training scenarios.

use ripr::common::RipConf;
use ripr::data::{Attribute, Instances, NumKind};
use ripr::rule::RuleSet;

/// Two-class data over one Boolean attribute: `x = 1` iff the class is `yes`.
fn boolean_data() -> Instances {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::discrete("x", vec!["0".into(), "1".into()]),
    ])
    .unwrap();
    for _ in 0..5 {
        data.push(vec![Some(1.), Some(1.)]).unwrap();
        data.push(vec![Some(0.), Some(0.)]).unwrap()
    }
    data
}

#[test]
fn perfectly_correlated_boolean_attribute() {
    let data = boolean_data();
    let rules = ripr::learn(&data, RipConf::default()).unwrap();

    assert_eq!(rules.to_string(), "(x = 1) => [1]\n=> [0]\n");
    assert_eq!(rules.accuracy(&data).unwrap(), 1.0)
}

#[test]
fn perfectly_separated_continuous_attribute() {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::continuous("x", NumKind::Float),
    ])
    .unwrap();
    for _ in 0..5 {
        data.push(vec![Some(1.), Some(1.)]).unwrap();
        data.push(vec![Some(0.), Some(9.)]).unwrap()
    }

    let rules = ripr::learn(&data, RipConf::default()).unwrap();
    assert_eq!(rules.to_string(), "(x <= 1) => [1]\n=> [0]\n");
    assert_eq!(rules.accuracy(&data).unwrap(), 1.0)
}

#[test]
fn missing_value_falls_through_to_the_default_rule() {
    let data = boolean_data();
    let rules = ripr::learn(&data, RipConf::default()).unwrap();

    let mut test = data.empty_like();
    test.push(vec![Some(1.), None]).unwrap();
    // no antecedent on `x` may cover the instance, whatever the class
    for rule in rules.rules() {
        for antd in rule.antecedents() {
            assert!(!antd.covers(&test, 0))
        }
    }
    // so it falls through to the default rule
    assert_eq!(rules.predict(&test).unwrap(), vec![0.into()])
}

#[test]
fn three_classes_train_to_one_rule_each() {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["a".into(), "b".into(), "c".into()]),
        Attribute::discrete("color", vec!["red".into(), "green".into(), "blue".into()]),
    ])
    .unwrap();
    for (count, cls) in [(4, 0.), (5, 1.), (6, 2.)] {
        for _ in 0..count {
            data.push(vec![Some(cls), Some(cls)]).unwrap()
        }
    }

    let rules = ripr::learn(&data, RipConf::default()).unwrap();
    assert_eq!(rules.accuracy(&data).unwrap(), 1.0);
    // the most frequent class is the default consequent
    let default = rules.rules().last().unwrap();
    assert!(!default.has_antds());
    assert_eq!(default.consequent(), 2.into())
}

#[test]
fn weighted_instances_drive_the_default_class() {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::discrete("x", vec!["0".into(), "1".into()]),
    ])
    .unwrap();
    // fewer `yes` rows, but they carry most of the weight
    for _ in 0..4 {
        data.push_weighted(vec![Some(0.), Some(0.)], 1.0).unwrap()
    }
    for _ in 0..3 {
        data.push_weighted(vec![Some(1.), Some(1.)], 4.0).unwrap()
    }

    let rules = ripr::learn(&data, RipConf::default()).unwrap();
    let default = rules.rules().last().unwrap();
    assert_eq!(default.consequent(), 1.into());
    assert_eq!(rules.accuracy(&data).unwrap(), 1.0)
}

#[test]
fn same_seed_reproduces_the_same_ruleset() {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::discrete("flag", vec!["off".into(), "on".into()]),
        Attribute::continuous("x", NumKind::Float),
    ])
    .unwrap();
    // deterministic pseudo-noise: the flag mostly agrees with the class,
    // the continuous attribute is informative above 4, some values missing
    for i in 0..30usize {
        let cls = if i % 3 == 0 { 0. } else { 1. };
        let flag = if i % 7 == 0 { 1. - cls } else { cls };
        let x = if i % 11 == 0 {
            None
        } else {
            Some((i % 9) as f64 + if cls > 0. { 4.0 } else { 0.0 })
        };
        data.push(vec![Some(cls), Some(flag), x]).unwrap()
    }

    let conf = RipConf::default().with_seed(42);
    let first = ripr::learn(&data, conf.clone()).unwrap();
    let second = ripr::learn(&data, conf).unwrap();
    assert_eq!(first.to_string(), second.to_string());

    let other_seed = ripr::learn(&data, RipConf::default().with_seed(43)).unwrap();
    // not necessarily different, but still a valid model over the same header
    assert_eq!(other_seed.rules().last().unwrap().consequent(), 1.into())
}

#[test]
fn parsed_ruleset_scenario() {
    let data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::discrete("A", vec!["0".into(), "1".into()]),
        Attribute::continuous("B", NumKind::Float),
    ])
    .unwrap();

    let set = RuleSet::parse("(A = 1 and B <= 2) => [0]\n => [1]", &data).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.rules()[1].size(), 0);
    assert_eq!(set.rules()[1].consequent(), 1.into());
    assert_eq!(set.rules()[0].size(), 2)
}

#[test]
fn parsed_rules_predict_like_hand_written_logic() {
    let mut data = Instances::new(vec![
        Attribute::discrete("y", vec!["no".into(), "yes".into()]),
        Attribute::continuous("temp", NumKind::Float),
    ])
    .unwrap();
    for temp in [10., 20., 30.] {
        data.push(vec![None, Some(temp)]).unwrap()
    }

    let set = RuleSet::parse("(temp <= 15) => [1]\n=> [0]", &data).unwrap();
    assert_eq!(
        set.predict(&data).unwrap(),
        vec![1.into(), 0.into(), 0.into()]
    )
}

#[test]
fn pruning_can_be_turned_off() {
    let data = boolean_data();
    let conf = RipConf::default().with_pruning(false);
    let rules = ripr::learn(&data, conf).unwrap();
    assert_eq!(rules.accuracy(&data).unwrap(), 1.0);
    assert_eq!(rules.rules().last().unwrap().consequent(), 0.into())
}
