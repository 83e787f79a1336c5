use super::*;

#[test]
fn like_defaults_to_adding_a_like() {
    let cli = Cli::try_parse_from(["chefai", "like", "generated", "g1"]).unwrap();
    let Command::Like { kind, id, unlike } = cli.command else {
        panic!("expected like command");
    };
    let collection = seeded(kind.into(), &id, ToggleKind::Like, unlike);
    assert_eq!(collection.kind(), EntityKind::GeneratedRecipe);
    assert!(!collection.get("g1").unwrap().liked);
}

#[test]
fn unlike_flag_seeds_a_liked_entity() {
    let cli = Cli::try_parse_from(["chefai", "like", "generated", "g1", "--unlike"]).unwrap();
    let Command::Like { kind, id, unlike } = cli.command else {
        panic!("expected like command");
    };
    let entity = seeded(kind.into(), &id, ToggleKind::Like, unlike).get("g1").unwrap();
    assert!(entity.liked);
    assert!(!entity.saved);
}

#[test]
fn unsave_flag_seeds_a_saved_entity() {
    let cli = Cli::try_parse_from(["chefai", "save", "meal-plan", "m1", "--unsave"]).unwrap();
    let Command::Save { kind, id, unsave } = cli.command else {
        panic!("expected save command");
    };
    let entity = seeded(kind.into(), &id, ToggleKind::Save, unsave).get("m1").unwrap();
    assert!(entity.saved);
    assert!(!entity.liked);
}

#[test]
fn recipe_command_takes_form_and_title() {
    let cli =
        Cli::try_parse_from(["chefai", "recipe", "--data", r#"{"query":"soup"}"#, "--title", "Miso soup"]).unwrap();
    assert!(matches!(cli.command, Command::Recipe { ref title, .. } if title == "Miso soup"));
}
