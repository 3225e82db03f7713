use chain_planner::{FanInPolicy, Planner, PlannerConfig, RecipeCatalog, Target};

const CATALOG: &str = r#"{ "recipes": [
    { "recipeId": "R1", "building": "Assembler", "timeSec": 2,
      "inputs":  [ { "name": "Iron", "qtyPerCycle": 2 } ],
      "outputs": [ { "name": "Gear", "qtyPerCycle": 1 } ] },
    { "recipeId": "frame", "building": "Assembler", "timeSec": 4,
      "inputs":  [ { "name": "Gear", "qtyPerCycle": 2 },
                   { "name": "Beam", "qtyPerCycle": 1 } ],
      "outputs": [ { "name": "Frame", "qtyPerCycle": 1 } ] },
    { "recipeId": "beam", "building": "Assembler", "timeSec": 3,
      "inputs":  [ { "name": "Girder", "qtyPerCycle": 1 } ],
      "outputs": [ { "name": "Beam", "qtyPerCycle": 2 } ] },
    { "recipeId": "girder", "building": "Assembler", "timeSec": 3,
      "inputs":  [ { "name": "Rivet", "qtyPerCycle": 4 },
                   { "name": "Iron", "qtyPerCycle": 1 } ],
      "outputs": [ { "name": "Girder", "qtyPerCycle": 1 } ] },
    { "recipeId": "rivet", "building": "Assembler", "timeSec": 1,
      "inputs":  [ { "name": "Wire", "qtyPerCycle": 1 } ],
      "outputs": [ { "name": "Rivet", "qtyPerCycle": 4 },
                   { "name": "Offcut", "qtyPerCycle": 1 } ] },
    { "recipeId": "wire", "building": "Drawer", "timeSec": 1,
      "inputs":  [ { "name": "Iron", "qtyPerCycle": 1 } ],
      "outputs": [ { "name": "Wire", "qtyPerCycle": 2 } ] }
] }"#;

fn catalog() -> RecipeCatalog {
    RecipeCatalog::from_json_str(CATALOG).unwrap()
}

#[test]
fn gear_from_iron_via_json_catalog() {
    let catalog = catalog();
    let mut planner = Planner::new(&catalog);
    let snapshot = planner.set_target(Target::new("Gear", 60.0).unwrap()).unwrap();

    let root = &snapshot.graph_nodes[0];
    assert_eq!(root.id, "Gear::R1");
    assert_eq!(root.runs_per_min, 2.0);
    assert_eq!(root.inputs[0].rate_per_min, 4.0);
    assert_eq!(snapshot.totals.raw.len(), 1);
    assert_eq!(snapshot.totals.raw.get("Iron"), Some(&4.0));
}

#[test]
fn raw_totals_cover_root_and_first_hop() {
    let catalog = catalog();
    let mut planner = Planner::new(&catalog);
    let snapshot = planner.set_target(Target::new("Frame", 15.0).unwrap()).unwrap();

    // Frame -> Gear (Iron raw) and Beam (Girder craftable, not yet shown)
    assert_eq!(snapshot.graph_nodes.len(), 3);
    let gear = snapshot.node("Gear::R1").unwrap();
    // 2 gears/min at 2 iron per run of a 30/min recipe
    assert!((gear.inputs[0].rate_per_min - 2.0 / 15.0).abs() < 1e-9);
    assert_eq!(snapshot.totals.raw.get("Iron"), Some(&0.13));
    assert!(snapshot.frontier_needs.contains_key("Girder"));
    assert!(!snapshot.totals.raw.contains_key("Girder"));
}

#[test]
fn expand_all_then_collapse_returns_to_baseline() {
    let catalog = catalog();
    let mut planner = Planner::new(&catalog);
    let baseline = planner
        .set_target(Target::new("Frame", 15.0).unwrap())
        .unwrap()
        .clone();

    let expanded = planner.expand_branch_all("Frame::frame").clone();
    // Frame, Gear, Beam, Girder, Rivet, Wire
    assert_eq!(expanded.graph_nodes.len(), 6);
    assert_eq!(expanded.max_depth(), 4);
    assert!(expanded.totals.byproducts.contains_key("Offcut"));

    let collapsed = planner.collapse_branch("Wire::wire");
    assert_eq!(collapsed, &baseline);
}

#[test]
fn swap_round_trip_keeps_node_ids() {
    let json = r#"{ "recipes": [
        { "recipeId": "frame", "building": "Assembler", "timeSec": 4,
          "inputs":  [ { "name": "Beam", "qtyPerCycle": 1 } ],
          "outputs": [ { "name": "Frame", "qtyPerCycle": 1 } ] },
        { "recipeId": "beam", "building": "Assembler", "timeSec": 3,
          "inputs":  [ { "name": "Steel", "qtyPerCycle": 1 } ],
          "outputs": [ { "name": "Beam", "qtyPerCycle": 2 } ] },
        { "recipeId": "beam-cast", "building": "Caster", "timeSec": 6,
          "inputs":  [ { "name": "Molten Steel", "qtyPerCycle": 3 } ],
          "outputs": [ { "name": "Beam", "qtyPerCycle": 4 } ] }
    ] }"#;
    let catalog = RecipeCatalog::from_json_str(json).unwrap();
    let mut planner = Planner::new(&catalog);
    planner.set_target(Target::new("Frame", 60.0).unwrap()).unwrap();
    planner.expand_branch_by("Beam::beam", 2);
    let before = planner.snapshot().clone();

    planner.swap_node_recipe("Beam::beam", "beam-cast").unwrap();
    assert!(planner.snapshot().contains_node("Beam::beam-cast"));
    assert_eq!(planner.snapshot().totals.raw.get("Molten Steel"), Some(&0.3));

    let after = planner.swap_node_recipe("Beam::beam-cast", "beam").unwrap();
    assert_eq!(after, &before);
    assert_eq!(planner.state().budgets.get("Beam::beam"), 2);
}

#[test]
fn summed_fan_in_counts_every_consumer_of_shared_iron_steps() {
    let json = r#"{ "recipes": [
        { "recipeId": "kit", "building": "Assembler", "timeSec": 1,
          "inputs":  [ { "name": "Bolt", "qtyPerCycle": 2 },
                       { "name": "Nut", "qtyPerCycle": 2 } ],
          "outputs": [ { "name": "Kit", "qtyPerCycle": 1 } ] },
        { "recipeId": "bolt", "building": "Assembler", "timeSec": 60,
          "inputs":  [ { "name": "Rod", "qtyPerCycle": 1 } ],
          "outputs": [ { "name": "Bolt", "qtyPerCycle": 1 } ] },
        { "recipeId": "nut", "building": "Assembler", "timeSec": 60,
          "inputs":  [ { "name": "Rod", "qtyPerCycle": 1 } ],
          "outputs": [ { "name": "Nut", "qtyPerCycle": 1 } ] },
        { "recipeId": "rod", "building": "Assembler", "timeSec": 60,
          "inputs":  [ { "name": "Iron", "qtyPerCycle": 1 } ],
          "outputs": [ { "name": "Rod", "qtyPerCycle": 1 } ] }
    ] }"#;
    let catalog = RecipeCatalog::from_json_str(json).unwrap();

    let raw_iron = |fan_in: FanInPolicy| {
        let mut planner = Planner::with_config(
            &catalog,
            PlannerConfig {
                fan_in,
                ..PlannerConfig::default()
            },
        );
        planner.set_target(Target::new("Kit", 60.0).unwrap()).unwrap();
        planner.expand_branch_by("Kit::kit", 2);
        planner.snapshot().totals.raw.get("Iron").copied().unwrap()
    };

    let summed = raw_iron(FanInPolicy::Summed);
    let first = raw_iron(FanInPolicy::FirstWins);
    assert_eq!(first, 2.0);
    assert_eq!(summed, 4.0);
}
