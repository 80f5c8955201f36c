//! End-to-end expansion over function files on disk
//!
//! Each test writes a functions directory into a temp dir, loads it with the
//! built-in grammar and invokes procedures through the registry.

use std::path::Path;
use std::sync::Arc;

use command_functions::{
    ArgValue, ArgumentCompound, CommandSource, DispatcherValidator, EngineConfig,
    ExpansionContext, Identifier, InvocationError, LoadError, MacroError, Procedure,
    ProcedureRegistry,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_function(root: &Path, id: &str, source: &str) {
    let (namespace, path) = id.split_once(':').unwrap();
    let file = root.join(namespace).join(format!("{}.mcfunction", path));
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, source).unwrap();
}

fn functions(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (id, source) in files {
        write_function(dir.path(), id, source);
    }
    dir
}

fn load(dir: &TempDir, validator: &DispatcherValidator) -> ProcedureRegistry {
    let ctx = ExpansionContext::new(CommandSource::default(), validator);
    let (registry, report) =
        ProcedureRegistry::load_from_dir(dir.path(), "mcfunction", &ctx).unwrap();
    assert!(report.is_clean(), "load failures: {:?}", report.failures);
    registry
}

fn id(s: &str) -> Identifier {
    Identifier::parse(s).unwrap()
}

fn commands(expanded: &command_functions::ExpandedProcedure) -> Vec<String> {
    expanded.commands().map(str::to_string).collect()
}

#[test]
fn test_greet_scenario() {
    let dir = functions(&[("test:greet", "say hello $name$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::new("Steve", 0), &validator);

    let args = ArgumentCompound::new().with("name", "Ash");
    let expanded = registry.invoke(&id("test:greet"), Some(&args), &ctx).unwrap();

    assert_eq!(commands(&expanded), vec!["say hello Ash"]);
    assert_eq!(expanded.actions()[0].source().name, "Steve");
}

#[test]
fn test_files_classified_by_placeholders() {
    let dir = functions(&[
        ("test:greet", "# greets someone\nsay hello $name$\n"),
        ("test:reset", "kill @e\ntime set day\n"),
        ("test:util/price", "say costs 5$$\n"),
    ]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.source_files().len(), 3);
    assert!(registry.get(&id("test:greet")).unwrap().is_template());
    assert!(!registry.get(&id("test:reset")).unwrap().is_template());

    let ctx = ExpansionContext::new(CommandSource::default(), &validator);
    let price = registry.invoke(&id("test:util/price"), None, &ctx).unwrap();
    assert_eq!(commands(&price), vec!["say costs 5$"]);
}

#[test]
fn test_literal_procedure_expansion_is_identity() {
    let dir = functions(&[("test:reset", "kill @e\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let Procedure::Expanded(stored) = registry.get(&id("test:reset")).unwrap().as_ref() else {
        panic!("expected expanded procedure");
    };

    let args = ArgumentCompound::new().with("unused", 1);
    let first = registry.invoke(&id("test:reset"), None, &ctx).unwrap();
    let second = registry.invoke(&id("test:reset"), Some(&args), &ctx).unwrap();
    assert!(Arc::ptr_eq(stored, &first));
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_missing_arguments_listed_together() {
    let dir = functions(&[("test:move", "tp @s $x$ 64 $y$\nsay moved to $x$ $y$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    for args in [None, Some(ArgumentCompound::new().with("z", 1))] {
        let err = registry.invoke(&id("test:move"), args.as_ref(), &ctx).unwrap_err();
        match err {
            InvocationError::Macro(MacroError::MissingArguments { procedure, names }) => {
                assert_eq!(procedure, id("test:move"));
                assert_eq!(names, vec!["x", "y"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_substituted_text_exact() {
    let dir = functions(&[("test:show", "say x=$x$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let args = ArgumentCompound::new().with("x", "5");
    let expanded = registry.invoke(&id("test:show"), Some(&args), &ctx).unwrap();
    assert_eq!(commands(&expanded), vec!["say x=5"]);
}

#[test]
fn test_invalid_expansion_names_failing_action() {
    let dir = functions(&[(
        "test:score",
        "say setting $who$\nscoreboard players set $who$ kills $score$\nsay done\n",
    )]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let args = ArgumentCompound::new().with("who", "@s").with("score", "lots");
    let err = registry.invoke(&id("test:score"), Some(&args), &ctx).unwrap_err();
    match err {
        InvocationError::Macro(MacroError::InvalidExpansion {
            action_index, error, ..
        }) => {
            assert_eq!(action_index, 1);
            assert_eq!(error.cursor, Some(32));
        }
        other => panic!("unexpected error: {other}"),
    }

    let args = ArgumentCompound::new().with("who", "@s").with("score", 12);
    let expanded = registry.invoke(&id("test:score"), Some(&args), &ctx).unwrap();
    assert_eq!(
        commands(&expanded),
        vec![
            "say setting @s",
            "scoreboard players set @s kills 12",
            "say done",
        ]
    );
}

#[test]
fn test_value_splitting_command_is_rejected() {
    let dir = functions(&[("test:kill", "kill $who$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let args = ArgumentCompound::new().with("who", "@e extra");
    let err = registry.invoke(&id("test:kill"), Some(&args), &ctx).unwrap_err();
    assert!(matches!(
        err,
        InvocationError::Macro(MacroError::InvalidExpansion { action_index: 0, .. })
    ));
}

#[test]
fn test_compound_arguments_render_as_snbt() {
    let dir = functions(&[("test:store", "data merge storage test:data $payload$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let payload = ArgumentCompound::new()
        .with("count", ArgValue::Byte(3))
        .with("name", "Iron Sword");
    let args = ArgumentCompound::new().with("payload", payload);
    let expanded = registry.invoke(&id("test:store"), Some(&args), &ctx).unwrap();
    assert_eq!(
        commands(&expanded),
        vec![r#"data merge storage test:data {count:3b,name:"Iron Sword"}"#]
    );
}

#[test]
fn test_json_arguments() {
    let dir = functions(&[("test:give", "give $who$ $item$ $count$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let args = ArgumentCompound::from_json_str(
        r#"{"who": "@p", "item": "test:apple", "count": 3, "extra": [1, 2]}"#,
    )
    .unwrap();
    let expanded = registry.invoke(&id("test:give"), Some(&args), &ctx).unwrap();
    assert_eq!(commands(&expanded), vec!["give @p test:apple 3"]);
}

#[test]
fn test_expanding_result_returns_same_result() {
    let dir = functions(&[("test:greet", "say hello $name$\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);

    let args = ArgumentCompound::new().with("name", "Ash");
    let expanded = registry.invoke(&id("test:greet"), Some(&args), &ctx).unwrap();
    let again = Procedure::from(Arc::clone(&expanded)).expand(None, &ctx).unwrap();
    assert!(Arc::ptr_eq(&expanded, &again));
}

#[test]
fn test_concurrent_expansion_of_one_template() {
    let dir = functions(&[("test:greet", "say hello $name$\ntell $name$ welcome back\n")]);
    let validator = DispatcherValidator::builtin();
    let registry = load(&dir, &validator);
    let names = ["Ash", "Brock", "Misty", "Gary", "Oak", "Joy", "Jenny", "Dawn"];

    std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let registry = &registry;
                let validator = &validator;
                scope.spawn(move || {
                    let ctx = ExpansionContext::new(CommandSource::new(*name, 0), validator);
                    let args = ArgumentCompound::new().with("name", *name);
                    let mut results = Vec::new();
                    for _ in 0..50 {
                        let expanded = registry
                            .invoke(&id("test:greet"), Some(&args), &ctx)
                            .unwrap();
                        results.push(commands(&expanded));
                    }
                    (*name, results)
                })
            })
            .collect();

        for handle in handles {
            let (name, results) = handle.join().unwrap();
            let expected = vec![
                format!("say hello {}", name),
                format!("tell {} welcome back", name),
            ];
            assert!(results.iter().all(|r| *r == expected), "mixed results for {name}");
        }
    });

    assert!(registry.get(&id("test:greet")).unwrap().is_template());
}

#[test]
fn test_bad_files_reported_without_aborting_load() {
    let dir = functions(&[
        ("test:good", "say fine\n"),
        ("test:typo", "say fine\nkil @e\n"),
        ("test:open", "say $unterminated\n"),
    ]);
    std::fs::write(dir.path().join("test").join("notes.txt"), "ignored").unwrap();

    let validator = DispatcherValidator::builtin();
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);
    let (registry, report) =
        ProcedureRegistry::load_from_dir(dir.path(), "mcfunction", &ctx).unwrap();

    assert_eq!(registry.ids(), vec![&id("test:good")]);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.failures.len(), 2);

    let typo = report
        .failures
        .iter()
        .find(|(path, _)| path.ends_with("typo.mcfunction"))
        .map(|(_, e)| e)
        .unwrap();
    assert!(matches!(typo, LoadError::InvalidCommand { line: 2, .. }));

    let open = report
        .failures
        .iter()
        .find(|(path, _)| path.ends_with("open.mcfunction"))
        .map(|(_, e)| e)
        .unwrap();
    assert!(matches!(
        open,
        LoadError::Macro(MacroError::MalformedPlaceholder { .. })
    ));
}

#[test]
fn test_missing_functions_dir_is_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let validator = DispatcherValidator::builtin();
    let ctx = ExpansionContext::new(CommandSource::default(), &validator);
    let (registry, report) =
        ProcedureRegistry::load_from_dir(&dir.path().join("absent"), "mcfunction", &ctx).unwrap();
    assert!(registry.is_empty());
    assert!(report.is_clean());
}

#[test]
fn test_engine_config_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_function(&dir.path().join("data"), "game:ping", "ping $who$\n");
    std::fs::write(
        dir.path().join("grammar.yaml"),
        "commands:\n  - \"ping <target:word>\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("cmdfn.yaml"),
        "functions_dir: data\ngrammar_file: grammar.yaml\ndefault_namespace: game\nmax_command_length: 12\n",
    )
    .unwrap();

    let config = EngineConfig::load(&dir.path().join("cmdfn.yaml")).unwrap();
    let validator = config.validator().unwrap();
    let ctx = ExpansionContext::new(config.load_source.clone(), &validator);
    let (registry, report) = config.load_registry(&ctx).unwrap();
    assert!(report.is_clean());

    let ping = config.parse_identifier("ping").unwrap();
    let args = ArgumentCompound::new().with("who", "@a");
    let expanded = registry.invoke(&ping, Some(&args), &ctx).unwrap();
    assert_eq!(commands(&expanded), vec!["ping @a"]);

    // "ping " plus 8 characters exceeds the 12 character limit
    let args = ArgumentCompound::new().with("who", "somebody");
    let err = registry.invoke(&ping, Some(&args), &ctx).unwrap_err();
    assert!(matches!(
        err,
        InvocationError::Macro(MacroError::InvalidExpansion { action_index: 0, .. })
    ));
}
