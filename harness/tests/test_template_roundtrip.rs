//! The emitted template, once filled in, must resolve back through the
//! same grammar with every declared field intact.

mod common;

use common::TestModel;
use sweep_harness_core_rs::{template, Harness, ParamRole, SimulationModel};

#[test]
fn test_template_lists_every_declared_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inputTemplate.txt");
    let model = TestModel::new();
    template::write_template_to(&model, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    for name in model.param_names() {
        assert!(
            text.contains(&format!("\n{} = \n", name)),
            "template missing field {}",
            name
        );
    }
    assert!(text.contains("*agentInfo = energy memory"));
    assert!(text.contains("*edgeList = friends"));
    for key in sweep_harness_core_rs::KEY_PARAMS {
        assert!(text.contains(&format!("*{} = ", key)), "missing key {}", key);
    }
}

#[test]
fn test_filled_template_resolves_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inputTemplate.txt");
    let model = TestModel::new();
    template::write_template_to(&model, &path).unwrap();

    // fill in the template the way a user would: values for the key
    // parameters and most fields, `total` and `history` left bare so
    // they become collected results
    let fills = [
        ("*seed = ", "11"),
        ("*sep = ", ","),
        ("*steps = ", "4"),
        ("*iters = ", "1"),
        ("*reps = ", "2"),
        ("*fname = ", "out_"),
        ("*testint = ", "2"),
        ("*teststart = ", "0"),
        ("*gui = ", "0"),
        ("*agentint = ", "0"),
        ("*netint = ", "0"),
        ("*listint = ", "0"),
        ("num_agents = ", "2 4"),
        ("growth = ", "0.5"),
        ("label = ", "demo"),
        ("track = ", "1"),
        ("gap_slot = ", "-1"),
        ("exhaust_at = ", "0"),
    ];
    let filled: String = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| {
            for (prefix, value) in fills {
                if let Some(rest) = line.strip_prefix(prefix) {
                    return format!("{}{}{}\n", prefix, value, rest);
                }
            }
            format!("{}\n", line)
        })
        .collect();
    let filled_path = dir.path().join("filled.txt");
    std::fs::write(&filled_path, filled).unwrap();

    let harness = Harness::new(TestModel::new());
    let resolved = harness.resolve(&filled_path).unwrap();

    assert_eq!(resolved.settings.seed, 11);
    assert_eq!(resolved.settings.steps, 4);
    assert_eq!(resolved.settings.reps, 2);
    assert_eq!(resolved.settings.fname, "out_");

    // parameters come back in declaration order with their filled roles
    let names: Vec<&str> = resolved.specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["num_agents", "growth", "label", "track", "gap_slot", "exhaust_at"]
    );
    assert_eq!(
        resolved.specs[0].role,
        ParamRole::Swept(vec!["2".into(), "4".into()])
    );
    assert_eq!(resolved.specs[1].role, ParamRole::Fixed);

    assert_eq!(resolved.model_results, vec!["total"]);
    assert_eq!(resolved.model_lists, vec!["history"]);
    assert_eq!(resolved.agent_results, vec!["energy"]);
    assert_eq!(resolved.agent_lists, vec!["memory"]);
    assert_eq!(resolved.networks, vec!["friends"]);
}
